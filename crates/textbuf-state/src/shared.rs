/// A [`TextBuffer`](textbuf_core::text::TextBuffer) that can be shared between threads.
///
/// Queries take the shared lock, edits take the exclusive one. An edit,
/// its mark adjustment and its undo record all happen under a single write
/// guard, so no reader ever observes a half-recorded edit.
#[derive(Debug, Clone, Default)]
pub struct SharedTextBuffer {
    inner: std::sync::Arc<std::sync::RwLock<textbuf_core::text::TextBuffer>>,
}

/*

====================
===== CREATION =====
====================

*/

impl SharedTextBuffer {
    #[must_use]
    pub fn new(buffer: textbuf_core::text::TextBuffer) -> Self {
        Self {
            inner: std::sync::Arc::new(std::sync::RwLock::new(buffer)),
        }
    }

    #[must_use]
    pub fn with_config(config: textbuf_core::config::BufferConfig) -> Self {
        Self::new(textbuf_core::text::TextBuffer::with_config(config))
    }
}

/*

==========================
===== LOCK HANDLING ======
==========================

*/

impl SharedTextBuffer {
    /// A panic while holding the lock leaves the buffer consistent, because
    /// every edit validates its indices before mutating. Poisoning is
    /// therefore recovered from instead of propagated.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, textbuf_core::text::TextBuffer> {
        self.inner.read().unwrap_or_else(|poisoned| {
            log::warn!("text buffer lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, textbuf_core::text::TextBuffer> {
        self.inner.write().unwrap_or_else(|poisoned| {
            log::warn!("text buffer lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Runs `f` with shared access to the buffer.
    pub fn with_read<R>(&self, f: impl FnOnce(&textbuf_core::text::TextBuffer) -> R) -> R {
        f(&self.read())
    }

    /// Runs `f` with exclusive access, for edits that must not interleave
    /// with other writers (e.g. a replace followed by a separator).
    pub fn with_write<R>(&self, f: impl FnOnce(&mut textbuf_core::text::TextBuffer) -> R) -> R {
        f(&mut self.write())
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl SharedTextBuffer {
    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn get(&self, index1: &str, index2: &str) -> textbuf_core::errors::TextBufferResult<String> {
        self.read().get(index1, index2)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn index(
        &self,
        index: &str,
    ) -> textbuf_core::errors::TextBufferResult<textbuf_core::position::Position> {
        self.read().index(index)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn compare(
        &self,
        index1: &str,
        index2: &str,
    ) -> textbuf_core::errors::TextBufferResult<std::cmp::Ordering> {
        self.read().compare(index1, index2)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn count_chars(
        &self,
        index1: &str,
        index2: &str,
    ) -> textbuf_core::errors::TextBufferResult<isize> {
        self.read().count_chars(index1, index2)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn count_lines(
        &self,
        index1: &str,
        index2: &str,
    ) -> textbuf_core::errors::TextBufferResult<isize> {
        self.read().count_lines(index1, index2)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.read().line_count()
    }

    /// Owned copy of line `number`, since the guard cannot outlive the call.
    #[must_use]
    pub fn line(&self, number: usize) -> Option<String> {
        self.read().line(number).map(str::to_string)
    }

    #[must_use]
    pub fn mark_names(&self) -> Vec<String> {
        self.read().mark_names()
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn mark_next(&self, index: &str) -> textbuf_core::errors::TextBufferResult<Option<String>> {
        self.read().mark_next(index)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn mark_previous(
        &self,
        index: &str,
    ) -> textbuf_core::errors::TextBufferResult<Option<String>> {
        self.read().mark_previous(index)
    }

    /// # Errors
    ///
    /// Returns `MarkNotFound` if the mark is not set.
    pub fn mark_gravity(
        &self,
        name: &str,
    ) -> textbuf_core::errors::TextBufferResult<textbuf_core::enums::Gravity> {
        self.read().mark_gravity(name)
    }

    #[must_use]
    pub fn edit_modified(&self) -> bool {
        self.read().edit_modified()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.read().to_string()
    }
}

/*

==========================
========= EDITS ==========
==========================

*/

impl SharedTextBuffer {
    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn insert(&self, index: &str, text: &str) -> textbuf_core::errors::TextBufferResult<()> {
        self.write().insert(index, text)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn delete(&self, index1: &str, index2: &str) -> textbuf_core::errors::TextBufferResult<()> {
        self.write().delete(index1, index2)
    }

    /// Both halves of the replace run under one write guard.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index.
    pub fn replace(
        &self,
        index1: &str,
        index2: &str,
        text: &str,
    ) -> textbuf_core::errors::TextBufferResult<()> {
        self.write().replace(index1, index2, text)
    }

    /// # Errors
    ///
    /// Returns `IndexSyntax` or `InvalidMarkName`.
    pub fn mark_set(&self, name: &str, index: &str) -> textbuf_core::errors::TextBufferResult<()> {
        self.write().mark_set(name, index)
    }

    pub fn mark_unset<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.write().mark_unset(names);
    }

    /// # Errors
    ///
    /// Returns `MarkNotFound` if the mark is not set.
    pub fn set_mark_gravity(
        &self,
        name: &str,
        gravity: textbuf_core::enums::Gravity,
    ) -> textbuf_core::errors::TextBufferResult<()> {
        self.write().set_mark_gravity(name, gravity)
    }

    pub fn edit_undo(&self) -> bool {
        self.write().edit_undo()
    }

    pub fn edit_redo(&self) -> bool {
        self.write().edit_redo()
    }

    pub fn edit_separator(&self) {
        self.write().edit_separator();
    }

    pub fn edit_reset(&self) {
        self.write().edit_reset();
    }

    pub fn set_undo(&self, enabled: bool) {
        self.write().set_undo(enabled);
    }

    pub fn set_autoseparators(&self, enabled: bool) {
        self.write().set_autoseparators(enabled);
    }

    pub fn set_max_undo(&self, max_undo: usize) {
        self.write().set_max_undo(max_undo);
    }

    pub fn set_edit_modified(&self, modified: bool) {
        self.write().set_edit_modified(modified);
    }
}
