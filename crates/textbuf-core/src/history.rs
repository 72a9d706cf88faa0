/// Undo and redo stacks.
///
/// The top of each stack is the end of its `Vec`. Entries store canonical
/// index strings only; replaying them is the buffer's job.
#[derive(Debug, Default)]
pub struct EditLog {
    pub undo_stack: Vec<crate::enums::EditOp>,
    pub redo_stack: Vec<crate::enums::EditOp>,

    /// Push a separator in front of every entry that could not be merged.
    autoseparators: bool,
    /// Maximum number of undo groups kept, `0` for no limit.
    max_undo: usize,
    /// Non-empty runs between separators on `undo_stack`, kept in step with every push and pop.
    groups: usize,
}

/// Number of non-empty runs between separators.
fn count_groups(stack: &[crate::enums::EditOp]) -> usize {
    stack
        .split(crate::enums::EditOp::is_separator)
        .filter(|group| !group.is_empty())
        .count()
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl EditLog {
    #[must_use]
    pub fn new(autoseparators: bool, max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            autoseparators,
            max_undo,
            groups: 0,
        }
    }

    pub fn set_autoseparators(&mut self, enabled: bool) {
        self.autoseparators = enabled;
    }

    pub fn set_max_undo(&mut self, max_undo: usize) {
        self.max_undo = max_undo;
        self.trim_to_limit();
        self.trim_redo_to_limit();
    }
}

/*

===========================
========= RECORDING =======
===========================

*/

impl EditLog {
    /// Records an insertion of `text` at `start`, batching it with the previous
    /// insertion when the two touch.
    pub fn record_insert(&mut self, start: crate::position::Position, text: &str) {
        let start_idx = start.to_string();

        if let Some(crate::enums::EditOp::Insert {
            start: last_start,
            end: last_end,
            text: last_text,
        }) = self.undo_stack.last_mut()
        {
            // Typing on: the new text continues where the previous one ended.
            if *last_end == start_idx {
                last_text.push_str(text);
                *last_end = start.advanced_by(text).to_string();

                return;
            }

            // Typing at a fixed point: the new text lands in front of the previous one.
            if *last_start == start_idx {
                last_text.insert_str(0, text);
                *last_end = start.advanced_by(last_text).to_string();

                return;
            }
        }

        self.push(crate::enums::EditOp::Insert {
            start: start_idx,
            end: start.advanced_by(text).to_string(),
            text: text.to_string(),
        });
    }

    /// Records the removal of `removed`, which spanned `start..end` before it
    /// was deleted. Consecutive backspaces and forward deletes are batched.
    pub fn record_delete(
        &mut self,
        start: crate::position::Position,
        end: crate::position::Position,
        removed: &str,
    ) {
        let start_idx = start.to_string();
        let end_idx = end.to_string();

        if let Some(crate::enums::EditOp::Delete {
            start: last_start,
            end: last_end,
            text: last_text,
        }) = self.undo_stack.last_mut()
        {
            // Forward delete: both removals started at the same place.
            if *last_start == start_idx {
                last_text.push_str(removed);
                *last_end = start.advanced_by(last_text).to_string();

                return;
            }

            // Backspace: the new removal ends where the previous one started.
            if *last_start == end_idx {
                last_text.insert_str(0, removed);
                *last_start = start_idx;
                *last_end = start.advanced_by(last_text).to_string();

                return;
            }
        }

        self.push(crate::enums::EditOp::Delete {
            start: start_idx,
            end: end_idx,
            text: removed.to_string(),
        });
    }

    /// Pushes a group boundary unless the stack is empty or already ends in one.
    pub fn push_separator(&mut self) {
        if self
            .undo_stack
            .last()
            .is_some_and(|op| !op.is_separator())
        {
            self.undo_stack.push(crate::enums::EditOp::Separator);
        }
    }

    fn push(&mut self, op: crate::enums::EditOp) {
        if self.autoseparators {
            self.push_separator();
        }

        self.push_undo(op);
    }

    #[inline]
    #[must_use]
    pub fn undo_groups(&self) -> usize {
        self.groups
    }

    /// Drops the oldest groups until at most `max_undo` remain.
    fn trim_to_limit(&mut self) {
        if self.max_undo == 0 {
            return;
        }

        while self.groups > self.max_undo {
            let Some(boundary) = self
                .undo_stack
                .iter()
                .position(crate::enums::EditOp::is_separator)
            else {
                break;
            };

            if boundary > 0 {
                self.groups -= 1;
            }

            self.undo_stack.drain(..=boundary);
            log::debug!("dropped oldest undo group, {} entries left", self.undo_stack.len());
        }
    }

    /// Drops the redo groups furthest from the present until at most
    /// `max_undo` remain. The bottom of the redo stack is the furthest.
    fn trim_redo_to_limit(&mut self) {
        if self.max_undo == 0 {
            return;
        }

        let excess = count_groups(&self.redo_stack).saturating_sub(self.max_undo);

        if excess == 0 {
            return;
        }

        let mut closed = 0;
        let mut in_group = false;
        let mut cut = None;

        for (idx, op) in self.redo_stack.iter().enumerate() {
            if !op.is_separator() {
                in_group = true;
            } else if in_group {
                in_group = false;
                closed += 1;

                if closed == excess {
                    cut = Some(idx);
                    break;
                }
            }
        }

        if let Some(cut) = cut {
            self.redo_stack.drain(..=cut);
            log::debug!("dropped {excess} redo groups over the limit");
        }
    }
}

/*

===============================
========= UNDO & REDO =========
===============================

*/

impl EditLog {
    pub fn pop_undo(&mut self) -> Option<crate::enums::EditOp> {
        let op = self.undo_stack.pop()?;

        if !op.is_separator()
            && self
                .undo_stack
                .last()
                .is_none_or(crate::enums::EditOp::is_separator)
        {
            self.groups = self.groups.saturating_sub(1);
        }

        Some(op)
    }

    pub fn pop_redo(&mut self) -> Option<crate::enums::EditOp> {
        self.redo_stack.pop()
    }

    /// Pushes onto the undo stack without merging, as redo does. The oldest
    /// groups are dropped if this goes over `max_undo`.
    pub fn push_undo(&mut self, op: crate::enums::EditOp) {
        if !op.is_separator()
            && self
                .undo_stack
                .last()
                .is_none_or(crate::enums::EditOp::is_separator)
        {
            self.groups += 1;
        }

        self.undo_stack.push(op);
        self.trim_to_limit();
    }

    pub fn push_redo(&mut self, op: crate::enums::EditOp) {
        self.redo_stack.push(op);
    }

    /// A fresh edit forks history: whatever could be redone is gone.
    pub fn discard_redo(&mut self) {
        self.redo_stack.clear();
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.groups = 0;
    }
}
