use std::hash::{Hash, Hasher};

/// # The Core Philosophies of This API
///
/// - Index-Based: callers never see line storage. They address text with index
///   expressions (`"3.4"`, `"end -1c"`, `"insert wordstart"`) and the buffer
///   resolves them before touching anything, so a malformed index can never
///   leave a half-applied edit behind.
/// - Immutability for Reads: queries take `&self`, edits take `&mut self`.
///   Mutation, mark adjustment and undo recording happen under one borrow.
/// - Ownership of State: the `TextBuffer` owns the lines, the marks and the
///   edit log so they never drift out of sync.
#[derive(Debug)]
pub struct TextBuffer {
    lines: crate::lines::LineStore,
    marks: crate::marks::MarkTable,
    history: crate::history::EditLog,

    /// Whether edits are recorded and undo/redo are available.
    undo: bool,

    /// Forced modified flag, see [`TextBuffer::set_edit_modified`].
    modified: bool,
    /// End position and content hash at the last time the buffer was marked clean.
    saved_end: crate::position::Position,
    saved_checksum: u64,
}

fn checksum(lines: &crate::lines::LineStore) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();

    for line in lines.iter() {
        line.hash(&mut hasher);
    }

    hasher.finish()
}

fn signed(magnitude: usize, negative: bool) -> isize {
    let value = isize::try_from(magnitude).unwrap_or(isize::MAX);

    if negative { -value } else { value }
}

/*

====================
===== CREATION =====
====================

*/

impl TextBuffer {
    /// Creates an empty buffer: one empty line, no marks, empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(crate::config::BufferConfig::default())
    }

    #[must_use]
    pub fn with_config(config: crate::config::BufferConfig) -> Self {
        let lines = crate::lines::LineStore::new();
        let saved_end = lines.end();
        let saved_checksum = checksum(&lines);

        Self {
            lines,
            marks: crate::marks::MarkTable::default(),
            history: crate::history::EditLog::new(config.autoseparators, config.max_undo),
            undo: config.undo,
            modified: false,
            saved_end,
            saved_checksum,
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl TextBuffer {
    /// Returns the total number of lines in the buffer.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Returns line `number` (1-based) without its terminator.
    #[inline]
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        self.lines.line(number)
    }

    #[inline]
    #[must_use]
    pub fn undo_enabled(&self) -> bool {
        self.undo
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &crate::history::EditLog {
        &self.history
    }

    #[inline]
    fn resolver(&self) -> crate::index::IndexResolver<'_> {
        crate::index::IndexResolver::new(&self.lines, &self.marks)
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl TextBuffer {
    /// Resolves an index expression into a position inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if `index` cannot be parsed.
    pub fn index(&self, index: &str) -> crate::errors::TextBufferResult<crate::position::Position> {
        self.resolver().resolve(index)
    }

    /// Orders two indices by the positions they resolve to.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if either index cannot be parsed.
    pub fn compare(
        &self,
        index1: &str,
        index2: &str,
    ) -> crate::errors::TextBufferResult<std::cmp::Ordering> {
        Ok(self.index(index1)?.cmp(&self.index(index2)?))
    }

    /// Number of chars from `index1` to `index2`, each line break counting as
    /// one. Negative when `index1` comes after `index2`.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if either index cannot be parsed.
    pub fn count_chars(&self, index1: &str, index2: &str) -> crate::errors::TextBufferResult<isize> {
        let (from, to) = (self.index(index1)?, self.index(index2)?);
        let reverse = from > to;
        let (from, to) = if reverse { (to, from) } else { (from, to) };

        let spanned: usize = (from.line..to.line)
            .map(|number| self.lines.line_len(number) + 1)
            .sum();

        Ok(signed(spanned + to.column - from.column, reverse))
    }

    /// Number of line breaks from `index1` to `index2`. Negative when
    /// `index1` comes after `index2`.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if either index cannot be parsed.
    pub fn count_lines(&self, index1: &str, index2: &str) -> crate::errors::TextBufferResult<isize> {
        let (from, to) = (self.index(index1)?, self.index(index2)?);

        Ok(signed(from.line.abs_diff(to.line), from.line > to.line))
    }

    /// Returns the text between two indices. Empty unless `index1` comes
    /// before `index2`.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if either index cannot be parsed.
    pub fn get(&self, index1: &str, index2: &str) -> crate::errors::TextBufferResult<String> {
        let (start, end) = (self.index(index1)?, self.index(index2)?);

        self.lines.slice(start, end)
    }
}

/*

========================================
========= INSERTION & DELETION =========
========================================

*/

impl TextBuffer {
    /// Inserts `text` at `index`. Inserting an empty string does nothing.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if `index` cannot be parsed. Nothing is modified then.
    pub fn insert(&mut self, index: &str, text: &str) -> crate::errors::TextBufferResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        let at = self.index(index)?;

        self.insert_at(at, text)?;

        self.record(|history| history.record_insert(at, text));

        Ok(())
    }

    /// Deletes the text from `index1` to `index2`. Nothing happens unless
    /// `index1` comes before `index2`.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if either index cannot be parsed. Nothing is modified then.
    pub fn delete(&mut self, index1: &str, index2: &str) -> crate::errors::TextBufferResult<()> {
        let (start, end) = (self.index(index1)?, self.index(index2)?);

        if start >= end {
            return Ok(());
        }

        let removed = self.delete_range(start, end)?;

        self.record(|history| history.record_delete(start, end, &removed));

        Ok(())
    }

    /// Replaces the text from `index1` to `index2` with `text`.
    ///
    /// `index1` is pinned to a `<line>.<char>` position before anything is
    /// deleted, because the deletion may move whatever it referred to (a mark
    /// inside the range, for instance).
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if either index cannot be parsed.
    pub fn replace(
        &mut self,
        index1: &str,
        index2: &str,
        text: &str,
    ) -> crate::errors::TextBufferResult<()> {
        let start = self.index(index1)?.to_string();

        self.delete(&start, index2)?;
        self.insert(&start, text)
    }

    /// Logs a fresh user edit. An unrecorded edit shifts the text under
    /// every stored index, so with undo off both stacks are dropped instead.
    fn record(&mut self, log_edit: impl FnOnce(&mut crate::history::EditLog)) {
        if self.undo {
            log_edit(&mut self.history);
            self.history.discard_redo();
        } else if !self.history.undo_stack.is_empty() || !self.history.redo_stack.is_empty() {
            self.history.reset();
            log::debug!("edit history dropped after an unrecorded edit");
        }
    }

    fn insert_at(
        &mut self,
        at: crate::position::Position,
        text: &str,
    ) -> crate::errors::TextBufferResult<crate::position::Position> {
        let end = self.lines.insert(at, text)?;

        self.marks.adjust_for_insert(at, end);
        log::trace!("inserted {} chars at {at}, now ending at {end}", text.chars().count());

        Ok(end)
    }

    fn delete_range(
        &mut self,
        start: crate::position::Position,
        end: crate::position::Position,
    ) -> crate::errors::TextBufferResult<String> {
        let removed = self.lines.remove(start, end)?;

        self.marks.adjust_for_delete(start, end);
        log::trace!("deleted {start} to {end}");

        Ok(removed)
    }
}

/*

=========================
========= MARKS =========
=========================

*/

impl TextBuffer {
    /// Places mark `name` at `index`, moving it if it already exists.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` for a malformed index and `InvalidMarkName` for an
    /// empty name or one containing whitespace.
    pub fn mark_set(&mut self, name: &str, index: &str) -> crate::errors::TextBufferResult<()> {
        let pos = self.index(index)?;

        self.marks.set(name, pos)
    }

    /// Removes the given marks. Names that are not set are ignored.
    pub fn mark_unset<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.marks.unset(name.as_ref());
        }
    }

    /// Names of all marks currently set, sorted.
    #[must_use]
    pub fn mark_names(&self) -> Vec<String> {
        self.marks.names()
    }

    /// The first mark at or after `index`. If `index` is itself a mark name,
    /// that mark is skipped, so repeated calls walk through every mark.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if `index` cannot be parsed.
    pub fn mark_next(&self, index: &str) -> crate::errors::TextBufferResult<Option<String>> {
        let pos = self.index(index)?;
        let current = self.marks.contains(index).then_some(index);

        Ok(self.marks.next_after(pos, current))
    }

    /// The first mark at or before `index`, walking backwards.
    ///
    /// # Errors
    ///
    /// Returns `IndexSyntax` if `index` cannot be parsed.
    pub fn mark_previous(&self, index: &str) -> crate::errors::TextBufferResult<Option<String>> {
        let pos = self.index(index)?;
        let current = self.marks.contains(index).then_some(index);

        Ok(self.marks.previous_before(pos, current))
    }

    /// # Errors
    ///
    /// Returns `MarkNotFound` if no mark is called `name`.
    pub fn mark_gravity(&self, name: &str) -> crate::errors::TextBufferResult<crate::enums::Gravity> {
        self.marks.gravity(name)
    }

    /// # Errors
    ///
    /// Returns `MarkNotFound` if no mark is called `name`.
    pub fn set_mark_gravity(
        &mut self,
        name: &str,
        gravity: crate::enums::Gravity,
    ) -> crate::errors::TextBufferResult<()> {
        self.marks.set_gravity(name, gravity)
    }
}

/*

===============================
========= UNDO & REDO =========
===============================

*/

impl TextBuffer {
    /// Undoes edits until a separator is met after at least one change, or the
    /// undo stack runs dry. Returns whether anything was undone.
    pub fn edit_undo(&mut self) -> bool {
        if !self.undo {
            return false;
        }

        let mut applied = 0usize;

        while let Some(op) = self.history.pop_undo() {
            if op.is_separator() && applied > 0 {
                self.history.push_undo(op);
                break;
            }

            let changed = match self.replay(&op, true) {
                Ok(changed) => changed,
                Err(err) => {
                    log::error!("could not undo {op:?}: {err}");
                    self.history.push_undo(op);
                    break;
                }
            };

            applied += usize::from(changed);
            self.history.push_redo(op);
        }

        log::debug!("undid {applied} edits");

        applied > 0
    }

    /// Redoes edits until a separator is met after at least one change, or the
    /// redo stack runs dry. Returns whether anything was redone.
    pub fn edit_redo(&mut self) -> bool {
        if !self.undo {
            return false;
        }

        let mut applied = 0usize;

        while let Some(op) = self.history.pop_redo() {
            if op.is_separator() && applied > 0 {
                self.history.push_redo(op);
                break;
            }

            let changed = match self.replay(&op, false) {
                Ok(changed) => changed,
                Err(err) => {
                    log::error!("could not redo {op:?}: {err}");
                    self.history.push_redo(op);
                    break;
                }
            };

            applied += usize::from(changed);
            self.history.push_undo(op);
        }

        log::debug!("redid {applied} edits");

        applied > 0
    }

    /// Closes the current undo group.
    pub fn edit_separator(&mut self) {
        self.history.push_separator();
        log::debug!("undo group closed");
    }

    /// Clears both the undo and the redo stack.
    pub fn edit_reset(&mut self) {
        self.history.reset();
        log::debug!("edit history reset");
    }

    /// Enables or disables the undo mechanism. Disabling keeps the stacks but
    /// stops recording, and undo/redo report no change until it is enabled
    /// again. The first edit made while disabled drops both stacks.
    pub fn set_undo(&mut self, enabled: bool) {
        self.undo = enabled;
        log::debug!("undo {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn set_autoseparators(&mut self, enabled: bool) {
        self.history.set_autoseparators(enabled);
    }

    pub fn set_max_undo(&mut self, max_undo: usize) {
        self.history.set_max_undo(max_undo);
    }

    /// Applies `op`, or its inverse, without recording it.
    /// Returns `false` for separators, which change nothing.
    fn replay(
        &mut self,
        op: &crate::enums::EditOp,
        inverse: bool,
    ) -> crate::errors::TextBufferResult<bool> {
        match op {
            crate::enums::EditOp::Separator => return Ok(false),
            crate::enums::EditOp::Insert { start, end, text } => {
                if inverse {
                    let (start, end) = (self.index(start)?, self.index(end)?);
                    self.delete_range(start, end)?;
                } else {
                    let start = self.index(start)?;
                    self.insert_at(start, text)?;
                }
            }
            crate::enums::EditOp::Delete { start, end, text } => {
                if inverse {
                    let start = self.index(start)?;
                    self.insert_at(start, text)?;
                } else {
                    let (start, end) = (self.index(start)?, self.index(end)?);
                    self.delete_range(start, end)?;
                }
            }
        }

        Ok(true)
    }
}

/*

=================================
========= MODIFIED FLAG =========
=================================

*/

impl TextBuffer {
    /// Returns true if the flag was forced on, or if the content differs from
    /// what it was when the flag was last cleared.
    #[must_use]
    pub fn edit_modified(&self) -> bool {
        self.modified
            || self.lines.end() != self.saved_end
            || checksum(&self.lines) != self.saved_checksum
    }

    /// Setting the flag makes [`TextBuffer::edit_modified`] report true until it
    /// is cleared. Clearing it takes a snapshot of the current content to
    /// compare against.
    pub fn set_edit_modified(&mut self, modified: bool) {
        self.modified = modified;

        if !modified {
            self.saved_end = self.lines.end();
            self.saved_checksum = checksum(&self.lines);
        }
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }

        Ok(())
    }
}
