/// Decides where a mark ends up when text is inserted exactly at its position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gravity {
    /// The mark stays to the left of the inserted text.
    Left,
    /// The mark moves to the right of the inserted text.
    #[default]
    Right,
}

impl std::fmt::Display for Gravity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gravity::Left => write!(f, "left"),
            Gravity::Right => write!(f, "right"),
        }
    }
}

/// One entry of the undo or redo stack.
///
/// End points are kept as canonical `<line>.<char>` strings so that they can be
/// resolved again after later edits have reshaped the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOp {
    Insert {
        /// Where the text was inserted.
        start: String,
        /// The position just past the inserted text, right after the insert.
        end: String,
        text: String,
    },
    Delete {
        /// Start of the removed range.
        start: String,
        /// End of the removed range, before the removal took place.
        end: String,
        /// The removed text, line breaks included.
        text: String,
    },
    /// Boundary between two undo groups.
    Separator,
}

impl EditOp {
    #[inline]
    #[must_use]
    pub fn is_separator(&self) -> bool {
        matches!(self, EditOp::Separator)
    }
}
