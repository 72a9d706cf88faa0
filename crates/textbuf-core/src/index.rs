//! Index expressions.
//!
//! An index is a base followed by any number of modifiers:
//!
//! ```text
//! expr     := base modifier*
//! base     := <line>.<char> | <line>.end | end | <mark>
//! modifier := ' '? ('+'|'-') ' '? '-'? <count> ' '? (chars|indices|lines)
//!           | ' '? (line|word) (start|end)
//! ```
//!
//! Unit and position words may be abbreviated to any non-empty prefix.
//! Numeric components never fail: they are clamped into the buffer.

static LINE_CHAR: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^([0-9]+)\.(\w+)").expect("valid regex"));

static COUNT: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"^ ?([+-]) ?(-?)([0-9]+) ?([cil]\w*)").expect("valid regex")
});

static START_END: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"^ ?(line|word)([se]\w*)").expect("valid regex")
});

/// Parses a run of ASCII digits, saturating instead of overflowing.
#[inline]
fn parse_count(digits: &str) -> usize {
    digits.parse().unwrap_or(usize::MAX)
}

const END: &str = "end";

/// `Some(None)` for `end`, `Some(Some(n))` for digits, `None` otherwise.
fn parse_column(token: &str) -> Option<Option<usize>> {
    match token {
        END => Some(None),
        digits if digits.bytes().all(|b| b.is_ascii_digit()) => Some(Some(parse_count(digits))),
        _ => None,
    }
}

/// Whether a mark called `name` would always be shadowed by a `<line>.<char>`
/// base or by the `end` keyword.
pub(crate) fn shadows_mark_name(name: &str) -> bool {
    name == END
        || LINE_CHAR
            .captures(name)
            .is_some_and(|caps| parse_column(&caps[2]).is_some())
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Read-only view over the buffer state that resolves index expressions.
#[derive(Debug, Clone, Copy)]
pub struct IndexResolver<'buf> {
    lines: &'buf crate::lines::LineStore,
    marks: &'buf crate::marks::MarkTable,
}

impl<'buf> IndexResolver<'buf> {
    #[must_use]
    pub fn new(lines: &'buf crate::lines::LineStore, marks: &'buf crate::marks::MarkTable) -> Self {
        Self { lines, marks }
    }

    /// Resolves `expr` into a valid position.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if the base or any modifier cannot be parsed.
    pub fn resolve(&self, expr: &str) -> crate::errors::TextBufferResult<crate::position::Position> {
        let (mut pos, mut rest) = self.parse_base(expr)?;

        while !rest.is_empty() {
            if let Some(caps) = COUNT.captures(rest) {
                let forward = (&caps[1] == "+") == caps[2].is_empty();
                let count = parse_count(&caps[3]);
                let unit = &caps[4];

                pos = if "chars".starts_with(unit) || "indices".starts_with(unit) {
                    if forward {
                        self.forward_chars(pos, count)
                    } else {
                        self.backward_chars(pos, count)
                    }
                } else if "lines".starts_with(unit) {
                    self.move_lines(pos, count, forward)
                } else {
                    return Err(crate::errors::TextBufferError::index_syntax(
                        expr,
                        "bad count unit",
                    ));
                };

                rest = &rest[caps[0].len()..];
            } else if let Some(caps) = START_END.captures(rest) {
                let which = &caps[2];
                let to_start = "start".starts_with(which);

                if !to_start && !"end".starts_with(which) {
                    return Err(crate::errors::TextBufferError::index_syntax(
                        expr,
                        "bad index modifier",
                    ));
                }

                pos = match (&caps[1], to_start) {
                    ("line", true) => crate::position::Position::new(pos.line, 0),
                    ("line", false) => {
                        crate::position::Position::new(pos.line, self.lines.line_len(pos.line))
                    }
                    (_, true) => self.word_start(pos),
                    (_, false) => self.word_end(pos),
                };

                rest = &rest[caps[0].len()..];
            } else {
                return Err(crate::errors::TextBufferError::index_syntax(
                    expr,
                    "bad index modifier",
                ));
            }
        }

        Ok(pos)
    }

    /// Resolves the base and returns it together with the unparsed remainder.
    ///
    /// A `<line>.<char>` prefix with a bad char token is not an error yet: the
    /// input may still be a mark such as `1.5x`. A mark name longer than `end`
    /// wins over the keyword.
    fn parse_base<'expr>(
        &self,
        expr: &'expr str,
    ) -> crate::errors::TextBufferResult<(crate::position::Position, &'expr str)> {
        let line_char = LINE_CHAR.captures(expr);

        if let Some(caps) = &line_char
            && let Some(column) = parse_column(&caps[2])
        {
            let line = parse_count(&caps[1]);

            return Ok((self.clamp(line, column), &expr[caps[0].len()..]));
        }

        match (self.marks.longest_prefix(expr), expr.strip_prefix(END)) {
            (Some((len, pos)), None) => Ok((pos, &expr[len..])),
            (Some((len, pos)), Some(_)) if len > END.len() => Ok((pos, &expr[len..])),
            (_, Some(rest)) => Ok((self.lines.end(), rest)),
            (None, None) => Err(crate::errors::TextBufferError::index_syntax(
                expr,
                if line_char.is_some() {
                    "bad line.char index"
                } else {
                    "bad index base"
                },
            )),
        }
    }

    /// Clamps a raw line/char pair into the buffer. `None` for the column means
    /// the end of the line.
    fn clamp(&self, line: usize, column: Option<usize>) -> crate::position::Position {
        let line_count = self.lines.line_count();

        if line < 1 {
            return crate::position::Position::START;
        }

        if line > line_count {
            return self.lines.end();
        }

        let len = self.lines.line_len(line);

        crate::position::Position::new(line, column.map_or(len, |column| column.min(len)))
    }
}

/*

=============================
========= MOVEMENT ==========
=============================

*/

impl IndexResolver<'_> {
    /// Every line break counts as one char.
    fn forward_chars(
        &self,
        mut pos: crate::position::Position,
        mut count: usize,
    ) -> crate::position::Position {
        let line_count = self.lines.line_count();

        loop {
            let len = self.lines.line_len(pos.line);
            let room = len - pos.column;

            if count <= room {
                pos.column += count;

                return pos;
            }

            if pos.line >= line_count {
                pos.column = len;

                return pos;
            }

            count -= room + 1;
            pos = crate::position::Position::new(pos.line + 1, 0);
        }
    }

    fn backward_chars(
        &self,
        mut pos: crate::position::Position,
        mut count: usize,
    ) -> crate::position::Position {
        loop {
            if count <= pos.column {
                pos.column -= count;

                return pos;
            }

            if pos.line <= 1 {
                return crate::position::Position::START;
            }

            count -= pos.column + 1;
            pos.line -= 1;
            pos.column = self.lines.line_len(pos.line);
        }
    }

    /// Moves by whole lines. The column is kept unless the new line is shorter.
    fn move_lines(
        &self,
        pos: crate::position::Position,
        count: usize,
        forward: bool,
    ) -> crate::position::Position {
        let line = if forward {
            pos.line.saturating_add(count).min(self.lines.line_count())
        } else {
            pos.line.saturating_sub(count).max(1)
        };

        crate::position::Position::new(line, pos.column.min(self.lines.line_len(line)))
    }

    fn word_start(&self, pos: crate::position::Position) -> crate::position::Position {
        let chars: Vec<char> = self
            .lines
            .line(pos.line)
            .unwrap_or_default()
            .chars()
            .collect();
        let mut column = pos.column.min(chars.len());

        while column > 0 && is_word_char(chars[column - 1]) {
            column -= 1;
        }

        crate::position::Position::new(pos.line, column)
    }

    fn word_end(&self, pos: crate::position::Position) -> crate::position::Position {
        let chars: Vec<char> = self
            .lines
            .line(pos.line)
            .unwrap_or_default()
            .chars()
            .collect();
        let mut column = pos.column.min(chars.len());

        while column < chars.len() && is_word_char(chars[column]) {
            column += 1;
        }

        crate::position::Position::new(pos.line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use rstest::rstest;

    fn state(text: &str) -> (crate::lines::LineStore, crate::marks::MarkTable) {
        let mut lines = crate::lines::LineStore::new();

        lines.insert(Position::START, text).unwrap();

        (lines, crate::marks::MarkTable::default())
    }

    #[rstest]
    #[case("0.0", 1, 0)]
    #[case("1.3", 1, 3)]
    #[case("1.9", 1, 5)]
    #[case("1.end", 1, 5)]
    #[case("2.end", 2, 5)]
    #[case("5.0", 2, 5)]
    #[case("99999999999999999999999.0", 2, 5)]
    #[case("end", 2, 5)]
    #[case("1.0 -5c", 1, 0)]
    #[case("1.0 +3c", 1, 3)]
    #[case("1.0 +6c", 2, 0)]
    #[case("1.0+6chars", 2, 0)]
    #[case("2.0 -1c", 1, 5)]
    #[case("2.0 - 1 indices", 1, 5)]
    #[case("2.0 +9c", 2, 5)]
    #[case("1.0 + -1c", 1, 0)]
    #[case("2.2 - -2c", 2, 4)]
    #[case("1.4 +1l", 2, 4)]
    #[case("1.4 +5lines", 2, 4)]
    #[case("2.3 -1li", 1, 3)]
    #[case("end -99999999999999999999l", 1, 5)]
    #[case("1.3 linestart", 1, 0)]
    #[case("1.3 lineend", 1, 5)]
    #[case("1.3 lines", 1, 0)]
    #[case("1.3 linee", 1, 5)]
    #[case("end linestart +2c", 2, 2)]
    fn test_resolve_line_char_and_modifiers(
        #[case] expr: &str,
        #[case] line: usize,
        #[case] column: usize,
    ) {
        let (lines, marks) = state("hello\nworld");
        let resolver = IndexResolver::new(&lines, &marks);

        assert_eq!(resolver.resolve(expr), Ok(Position::new(line, column)), "{expr}");
    }

    #[rstest]
    #[case("1.7 wordstart", 1, 6)]
    #[case("1.7 wordend", 1, 15)]
    #[case("1.5 wordstart", 1, 0)]
    #[case("1.5 wordend", 1, 5)]
    #[case("1.19 wordstart", 1, 17)]
    #[case("1.17 worde", 1, 20)]
    #[case("1.20 wordstart", 1, 17)]
    fn test_resolve_word_modifiers(
        #[case] expr: &str,
        #[case] line: usize,
        #[case] column: usize,
    ) {
        let (lines, marks) = state("hello big_world, é2x!");
        let resolver = IndexResolver::new(&lines, &marks);

        assert_eq!(resolver.resolve(expr), Ok(Position::new(line, column)), "{expr}");
    }

    #[rstest]
    #[case("")]
    #[case("bad")]
    #[case("1.bad")]
    #[case("1.2x")]
    #[case("1.0 +3")]
    #[case("1.0 +3x")]
    #[case("1.0 +3cx")]
    #[case("1.0 linemiddle")]
    #[case("1.0 wordsx")]
    #[case("1.0 ")]
    #[case("end+")]
    fn test_resolve_rejects_malformed(#[case] expr: &str) {
        let (lines, marks) = state("hello\nworld");
        let resolver = IndexResolver::new(&lines, &marks);

        assert!(
            matches!(
                resolver.resolve(expr),
                Err(crate::errors::TextBufferError::IndexSyntax { .. })
            ),
            "{expr:?} should not parse"
        );
    }

    #[test]
    fn test_resolve_marks_longest_name_wins() {
        let (lines, mut marks) = state("hello\nworld");

        marks.set("in", Position::new(1, 1)).unwrap();
        marks.set("insert", Position::new(2, 2)).unwrap();

        let resolver = IndexResolver::new(&lines, &marks);

        assert_eq!(resolver.resolve("insert"), Ok(Position::new(2, 2)));
        assert_eq!(resolver.resolve("in"), Ok(Position::new(1, 1)));
        assert_eq!(resolver.resolve("insert -1c"), Ok(Position::new(2, 1)));
        assert_eq!(resolver.resolve("in +1c"), Ok(Position::new(1, 2)));
    }

    #[test]
    fn test_resolve_marks_that_look_like_other_bases() {
        let (lines, mut marks) = state("hello\nworld");

        marks.set("1.5x", Position::new(2, 1)).unwrap();
        marks.set("end2", Position::new(1, 3)).unwrap();
        marks.set("e", Position::new(1, 1)).unwrap();

        let resolver = IndexResolver::new(&lines, &marks);

        assert_eq!(resolver.resolve("1.5x"), Ok(Position::new(2, 1)));
        assert_eq!(resolver.resolve("1.5x +1c"), Ok(Position::new(2, 2)));
        assert_eq!(resolver.resolve("1.5"), Ok(Position::new(1, 5)));
        assert_eq!(resolver.resolve("end2"), Ok(Position::new(1, 3)));
        assert_eq!(resolver.resolve("end"), Ok(Position::new(2, 5)));
        assert_eq!(resolver.resolve("end -1c"), Ok(Position::new(2, 4)));
        assert_eq!(resolver.resolve("e +1c"), Ok(Position::new(1, 2)));
        assert!(resolver.resolve("1.6x").is_err());
    }

    #[test]
    fn test_resolve_canonical_round_trip() {
        let (lines, marks) = state("alpha\nbé\n\ngamma");
        let resolver = IndexResolver::new(&lines, &marks);

        for line in 1..=lines.line_count() {
            for column in 0..=lines.line_len(line) {
                let pos = Position::new(line, column);

                assert_eq!(resolver.resolve(&pos.to_string()), Ok(pos));
            }
        }
    }
}
