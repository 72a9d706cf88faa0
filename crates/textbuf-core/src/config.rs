/// Options fixed when a buffer is created. Each one can also be changed later
/// through the matching setter on [`TextBuffer`](crate::text::TextBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Record edits for undo/redo.
    pub undo: bool,
    /// Start a new undo group whenever an edit cannot be merged into the previous one.
    pub autoseparators: bool,
    /// Maximum number of undo groups kept, `0` for no limit.
    pub max_undo: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            undo: true,
            autoseparators: false,
            max_undo: 0,
        }
    }
}

impl BufferConfig {
    #[must_use]
    pub fn with_undo(mut self, undo: bool) -> Self {
        self.undo = undo;
        self
    }

    #[must_use]
    pub fn with_autoseparators(mut self, autoseparators: bool) -> Self {
        self.autoseparators = autoseparators;
        self
    }

    #[must_use]
    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo;
        self
    }
}
