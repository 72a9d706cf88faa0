pub type TextBufferResult<T> = Result<T, TextBufferError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextBufferError {
    /// The index expression could not be parsed. Raised before any mutation.
    #[error("bad index \"{index}\": {reason}")]
    IndexSyntax { index: String, reason: &'static str },

    #[error("mark does not exist: {0}")]
    MarkNotFound(String),

    /// Mark names must be non-empty and contain no whitespace.
    #[error("invalid mark name: \"{0}\"")]
    InvalidMarkName(String),

    /// A resolved position referred to a line the store does not hold.
    #[error("line {0} is out of range")]
    LineOutOfRange(usize),
}

impl TextBufferError {
    pub(crate) fn index_syntax(index: &str, reason: &'static str) -> Self {
        TextBufferError::IndexSyntax {
            index: index.to_string(),
            reason,
        }
    }
}
