/// Ordered line storage. Line terminators are never stored; the store always
/// holds at least one (possibly empty) line.
///
/// All positions taken by the splice methods are expected to be valid, which
/// the index resolver guarantees. A position naming a missing line is reported
/// as [`TextBufferError::LineOutOfRange`](crate::errors::TextBufferError).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<String>,
}

/// Converts a char column into a byte offset inside `line`, clamped to its end.
#[inline]
fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(offset, _)| offset)
}

/// Splits `text` on line breaks. Always yields at least one segment.
fn segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;

    for brk in memchr::memchr_iter(b'\n', text.as_bytes()) {
        segments.push(&text[last..brk]);
        last = brk + 1;
    }
    segments.push(&text[last..]);

    segments
}

/*

====================
===== CREATION =====
====================

*/

impl LineStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl LineStore {
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns line `number` (1-based).
    #[inline]
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Length of line `number` in chars, `0` for a missing line.
    #[inline]
    #[must_use]
    pub fn line_len(&self, number: usize) -> usize {
        self.line(number).map_or(0, |line| line.chars().count())
    }

    /// The position just past the last char of the buffer.
    #[inline]
    #[must_use]
    pub fn end(&self) -> crate::position::Position {
        let last = self.line_count();

        crate::position::Position::new(last, self.line_len(last))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    fn line_mut(&mut self, number: usize) -> crate::errors::TextBufferResult<&mut String> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get_mut(idx))
            .ok_or(crate::errors::TextBufferError::LineOutOfRange(number))
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl LineStore {
    /// Copies the text between `start` and `end`, joining lines with `\n`.
    /// Returns an empty string unless `start < end`.
    pub fn slice(
        &self,
        start: crate::position::Position,
        end: crate::position::Position,
    ) -> crate::errors::TextBufferResult<String> {
        let mut text = String::new();

        if start >= end {
            return Ok(text);
        }

        for number in start.line..=end.line {
            let line = self
                .line(number)
                .ok_or(crate::errors::TextBufferError::LineOutOfRange(number))?;
            let from = if number == start.line {
                byte_offset(line, start.column)
            } else {
                text.push('\n');
                0
            };
            let to = if number == end.line {
                byte_offset(line, end.column)
            } else {
                line.len()
            };

            text.push_str(&line[from..to]);
        }

        Ok(text)
    }
}

/*

========================================
========= INSERTION & DELETION =========
========================================

*/

impl LineStore {
    /// Splices `text` in at `at` and returns the position just past it.
    ///
    /// The first segment joins `at`'s line, every further segment becomes a
    /// new line, and the original suffix of `at`'s line is re-attached to the
    /// last segment.
    pub fn insert(
        &mut self,
        at: crate::position::Position,
        text: &str,
    ) -> crate::errors::TextBufferResult<crate::position::Position> {
        let segments = segments(text);
        let line = self.line_mut(at.line)?;
        let cut = byte_offset(line, at.column);
        let suffix = line.split_off(cut);

        line.push_str(segments[0]);

        let idx = at.line - 1;
        let new_lines = segments[1..].iter().map(ToString::to_string);

        self.lines.splice(idx + 1..idx + 1, new_lines);

        let end = at.advanced_by(text);

        self.line_mut(end.line)?.push_str(&suffix);

        Ok(end)
    }

    /// Removes the text between `start` and `end` and returns it verbatim,
    /// line breaks included. The prefix of `start`'s line and the suffix of
    /// `end`'s line are merged into one line.
    pub fn remove(
        &mut self,
        start: crate::position::Position,
        end: crate::position::Position,
    ) -> crate::errors::TextBufferResult<String> {
        if start >= end {
            return Ok(String::new());
        }

        if start.line == 0 {
            return Err(crate::errors::TextBufferError::LineOutOfRange(start.line));
        }

        if end.line > self.line_count() {
            return Err(crate::errors::TextBufferError::LineOutOfRange(end.line));
        }

        if start.line == end.line {
            let line = self.line_mut(start.line)?;
            let range = byte_offset(line, start.column)..byte_offset(line, end.column);
            let removed = line[range.clone()].to_string();

            line.replace_range(range, "");

            return Ok(removed);
        }

        let mut following: Vec<String> = self.lines.drain(start.line..end.line).collect();
        let last = following.pop().unwrap_or_default();
        let first = self.line_mut(start.line)?;
        let cut = byte_offset(first, start.column);
        let mut removed = first.split_off(cut);

        for line in &following {
            removed.push('\n');
            removed.push_str(line);
        }

        let split = byte_offset(&last, end.column);

        removed.push('\n');
        removed.push_str(&last[..split]);
        first.push_str(&last[split..]);

        Ok(removed)
    }
}
