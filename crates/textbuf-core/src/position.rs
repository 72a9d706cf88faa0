/// Represents a specific location in the buffer.
///
/// `line` is 1-based. `column` counts `char`s from the start of the line and
/// always lies in `0..=line_length` for positions handed out by the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The first position of every buffer, `1.0`.
    pub const START: Self = Self { line: 1, column: 0 };

    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns the position just past `text` when it is laid down starting at `self`.
    ///
    /// A text without line breaks only moves the column. Otherwise the line
    /// advances by the number of breaks and the column becomes the length of
    /// the final segment.
    #[must_use]
    pub fn advanced_by(self, text: &str) -> Self {
        let bytes = text.as_bytes();

        match memchr::memrchr(b'\n', bytes) {
            Some(last_break) => {
                let breaks = memchr::memchr_iter(b'\n', bytes).count();

                Self {
                    line: self.line + breaks,
                    column: text[last_break + 1..].chars().count(),
                }
            }
            None => Self {
                line: self.line,
                column: self.column + text.chars().count(),
            },
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

/// Canonical `<line>.<char>` form, the only shape persisted in the edit log.
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}
