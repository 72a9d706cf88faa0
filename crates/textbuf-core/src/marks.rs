#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub position: crate::position::Position,
    pub gravity: crate::enums::Gravity,
}

/// Named anchors that follow the text they were placed next to.
///
/// The table owns no references into the line store. Every structural edit
/// reports its range through [`MarkTable::adjust_for_insert`] or
/// [`MarkTable::adjust_for_delete`] and the positions are rewritten in place.
#[derive(Debug, Clone, Default)]
pub struct MarkTable {
    marks: std::collections::HashMap<String, Mark>,
}

/*

===========================
===== SET / UNSET =========
===========================

*/

impl MarkTable {
    /// Places `name` at `position`. An existing mark is moved and keeps its gravity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarkName` if `name` is empty, contains whitespace, or
    /// could never be resolved because `end` or a `<line>.<char>` index shadows it.
    pub fn set(
        &mut self,
        name: &str,
        position: crate::position::Position,
    ) -> crate::errors::TextBufferResult<()> {
        if name.is_empty()
            || name.chars().any(char::is_whitespace)
            || crate::index::shadows_mark_name(name)
        {
            return Err(crate::errors::TextBufferError::InvalidMarkName(
                name.to_string(),
            ));
        }

        self.marks
            .entry(name.to_string())
            .and_modify(|mark| mark.position = position)
            .or_insert(Mark {
                position,
                gravity: crate::enums::Gravity::default(),
            });

        Ok(())
    }

    /// Removes `name`. Returns whether the mark existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.marks.remove(name).is_some()
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl MarkTable {
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Mark> {
        self.marks.get(name)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// All mark names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.marks.keys().cloned().collect();

        names.sort_unstable();

        names
    }

    /// # Errors
    ///
    /// Returns `MarkNotFound` if no mark is called `name`.
    pub fn gravity(&self, name: &str) -> crate::errors::TextBufferResult<crate::enums::Gravity> {
        self.marks
            .get(name)
            .map(|mark| mark.gravity)
            .ok_or_else(|| crate::errors::TextBufferError::MarkNotFound(name.to_string()))
    }

    /// # Errors
    ///
    /// Returns `MarkNotFound` if no mark is called `name`.
    pub fn set_gravity(
        &mut self,
        name: &str,
        gravity: crate::enums::Gravity,
    ) -> crate::errors::TextBufferResult<()> {
        let mark = self
            .marks
            .get_mut(name)
            .ok_or_else(|| crate::errors::TextBufferError::MarkNotFound(name.to_string()))?;

        mark.gravity = gravity;

        Ok(())
    }

    /// Finds the longest mark name that `input` starts with.
    /// Returns the name's length in bytes together with the mark's position.
    #[must_use]
    pub fn longest_prefix(&self, input: &str) -> Option<(usize, crate::position::Position)> {
        self.marks
            .iter()
            .filter(|(name, _)| input.starts_with(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, mark)| (name.len(), mark.position))
    }

    /// Marks ordered by position, ties broken by name.
    fn sorted(&self) -> Vec<(&str, crate::position::Position)> {
        let mut marks: Vec<(&str, crate::position::Position)> = self
            .marks
            .iter()
            .map(|(name, mark)| (name.as_str(), mark.position))
            .collect();

        marks.sort_unstable_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        marks
    }

    /// The first mark at or after `position`.
    ///
    /// When `current` names the mark the search starts from, that mark and any
    /// mark sharing its position with a smaller name are skipped, which lets a
    /// caller step through every mark in order.
    #[must_use]
    pub fn next_after(
        &self,
        position: crate::position::Position,
        current: Option<&str>,
    ) -> Option<String> {
        self.sorted()
            .into_iter()
            .find(|(name, pos)| match (*pos).cmp(&position) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => current.is_none_or(|current| *name > current),
                std::cmp::Ordering::Less => false,
            })
            .map(|(name, _)| name.to_string())
    }

    /// Mirror image of [`MarkTable::next_after`].
    #[must_use]
    pub fn previous_before(
        &self,
        position: crate::position::Position,
        current: Option<&str>,
    ) -> Option<String> {
        self.sorted()
            .into_iter()
            .rev()
            .find(|(name, pos)| match (*pos).cmp(&position) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => current.is_none_or(|current| *name < current),
                std::cmp::Ordering::Greater => false,
            })
            .map(|(name, _)| name.to_string())
    }
}

/*

=====================================
========= EDIT ADJUSTMENT  ==========
=====================================

*/

impl MarkTable {
    /// Moves marks after text was inserted between `at` and `end`.
    ///
    /// Marks before `at` stay. Marks after it keep their distance to the
    /// inserted text's tail. A mark exactly at `at` follows the text only with
    /// right gravity.
    pub fn adjust_for_insert(
        &mut self,
        at: crate::position::Position,
        end: crate::position::Position,
    ) {
        let added_lines = end.line - at.line;

        for mark in self.marks.values_mut() {
            let pos = &mut mark.position;

            if pos.line > at.line {
                pos.line += added_lines;
            } else if pos.line == at.line
                && (pos.column > at.column
                    || (pos.column == at.column
                        && mark.gravity == crate::enums::Gravity::Right))
            {
                *pos = crate::position::Position::new(end.line, end.column + pos.column - at.column);
            }
        }
    }

    /// Moves marks after the text between `start` and `end` was removed.
    ///
    /// Marks inside the range collapse onto `start`. Marks after it move back
    /// with the text that followed the range.
    pub fn adjust_for_delete(
        &mut self,
        start: crate::position::Position,
        end: crate::position::Position,
    ) {
        let removed_lines = end.line - start.line;

        for mark in self.marks.values_mut() {
            let pos = &mut mark.position;

            if *pos < start {
                continue;
            }

            if *pos <= end {
                *pos = start;
            } else if pos.line == end.line {
                *pos = crate::position::Position::new(start.line, start.column + pos.column - end.column);
            } else {
                pos.line -= removed_lines;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Gravity;
    use crate::position::Position;

    fn table(marks: &[(&str, Position)]) -> MarkTable {
        let mut table = MarkTable::default();

        for (name, pos) in marks {
            table.set(name, *pos).unwrap();
        }

        table
    }

    #[track_caller]
    fn assert_mark(table: &MarkTable, name: &str, expected: Position) {
        assert_eq!(
            table.get(name).map(|mark| mark.position),
            Some(expected),
            "mark {name} is misplaced"
        );
    }

    #[test]
    fn test_set_rejects_bad_names() {
        let mut table = MarkTable::default();

        assert!(matches!(
            table.set("", Position::START),
            Err(crate::errors::TextBufferError::InvalidMarkName(_))
        ));
        assert!(matches!(
            table.set("has space", Position::START),
            Err(crate::errors::TextBufferError::InvalidMarkName(_))
        ));
        for shadowed in ["end", "1.5", "2.end", "1.5+x", "12.0 tail"] {
            assert!(
                matches!(
                    table.set(shadowed, Position::START),
                    Err(crate::errors::TextBufferError::InvalidMarkName(_))
                ),
                "{shadowed} should be rejected"
            );
        }
        assert!(table.is_empty());

        for allowed in ["end2", "ending", "1.5x", "1.endx", "e"] {
            table.set(allowed, Position::START).unwrap();
        }
        assert_eq!(table.names().len(), 5);
    }

    #[test]
    fn test_set_existing_mark_keeps_gravity() {
        let mut table = table(&[("m", Position::START)]);

        table.set_gravity("m", Gravity::Left).unwrap();
        table.set("m", Position::new(1, 3)).unwrap();

        assert_mark(&table, "m", Position::new(1, 3));
        assert_eq!(table.gravity("m"), Ok(Gravity::Left));
    }

    #[test]
    fn test_gravity_of_missing_mark() {
        let mut table = MarkTable::default();

        assert_eq!(
            table.gravity("nope"),
            Err(crate::errors::TextBufferError::MarkNotFound("nope".into()))
        );
        assert_eq!(
            table.set_gravity("nope", Gravity::Left),
            Err(crate::errors::TextBufferError::MarkNotFound("nope".into()))
        );
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = table(&[
            ("a", Position::new(1, 1)),
            ("ab", Position::new(1, 2)),
            ("abc", Position::new(1, 3)),
        ]);

        assert_eq!(table.longest_prefix("abc +1c"), Some((3, Position::new(1, 3))));
        assert_eq!(table.longest_prefix("abx"), Some((2, Position::new(1, 2))));
        assert_eq!(table.longest_prefix("zzz"), None);
    }

    #[test]
    fn test_next_and_previous_order() {
        let table = table(&[
            ("b", Position::new(1, 2)),
            ("a", Position::new(1, 2)),
            ("c", Position::new(2, 0)),
        ]);

        assert_eq!(table.next_after(Position::START, None), Some("a".into()));
        assert_eq!(table.next_after(Position::new(1, 2), Some("a")), Some("b".into()));
        assert_eq!(table.next_after(Position::new(1, 2), Some("b")), Some("c".into()));
        assert_eq!(table.next_after(Position::new(2, 0), Some("c")), None);

        assert_eq!(table.previous_before(Position::new(9, 0), None), Some("c".into()));
        assert_eq!(table.previous_before(Position::new(1, 2), Some("b")), Some("a".into()));
        assert_eq!(table.previous_before(Position::new(1, 2), Some("a")), None);
    }

    #[test]
    fn test_insert_single_line_adjustment() {
        let mut table = table(&[
            ("before", Position::new(1, 1)),
            ("at", Position::new(1, 2)),
            ("after", Position::new(1, 4)),
            ("below", Position::new(2, 1)),
        ]);

        table.adjust_for_insert(Position::new(1, 2), Position::new(1, 5));

        assert_mark(&table, "before", Position::new(1, 1));
        assert_mark(&table, "at", Position::new(1, 5));
        assert_mark(&table, "after", Position::new(1, 7));
        assert_mark(&table, "below", Position::new(2, 1));
    }

    #[test]
    fn test_insert_multi_line_adjustment() {
        let mut table = table(&[
            ("at", Position::new(2, 4)),
            ("after", Position::new(2, 8)),
            ("below", Position::new(3, 1)),
        ]);

        // "and\n" inserted at 2.4 ends at 3.0.
        table.adjust_for_insert(Position::new(2, 4), Position::new(3, 0));

        assert_mark(&table, "at", Position::new(3, 0));
        assert_mark(&table, "after", Position::new(3, 4));
        assert_mark(&table, "below", Position::new(4, 1));
    }

    #[test]
    fn test_left_gravity_stays_before_insert() {
        let mut table = table(&[("left", Position::new(1, 2))]);

        table.set_gravity("left", Gravity::Left).unwrap();
        table.adjust_for_insert(Position::new(1, 2), Position::new(1, 4));
        assert_mark(&table, "left", Position::new(1, 2));

        table.adjust_for_insert(Position::new(1, 2), Position::new(3, 1));
        assert_mark(&table, "left", Position::new(1, 2));
    }

    #[test]
    fn test_delete_collapses_and_shifts() {
        let mut table = table(&[
            ("before", Position::new(1, 1)),
            ("start", Position::new(1, 2)),
            ("inside", Position::new(2, 0)),
            ("end", Position::new(3, 1)),
            ("tail", Position::new(3, 4)),
            ("below", Position::new(4, 2)),
        ]);

        table.adjust_for_delete(Position::new(1, 2), Position::new(3, 1));

        assert_mark(&table, "before", Position::new(1, 1));
        assert_mark(&table, "start", Position::new(1, 2));
        assert_mark(&table, "inside", Position::new(1, 2));
        assert_mark(&table, "end", Position::new(1, 2));
        assert_mark(&table, "tail", Position::new(1, 5));
        assert_mark(&table, "below", Position::new(2, 2));
    }

    #[test]
    fn test_delete_single_line_shifts_column() {
        let mut table = table(&[("tail", Position::new(1, 8))]);

        table.adjust_for_delete(Position::new(1, 2), Position::new(1, 5));

        assert_mark(&table, "tail", Position::new(1, 5));
    }
}
