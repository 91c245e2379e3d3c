//! Fixed-capacity move ordering buffer.
//!
//! Holds at most one candidate per column, kept sorted by insertion so the
//! best remaining move pops off the end in O(1). Lives on the stack of each
//! search node; nothing here allocates.

use crate::game_state::board_rules::WIDTH;

#[derive(Debug, Clone, Copy)]
pub struct MoveSorter {
    len: usize,
    // Ascending by score; among equal scores the most recently added is last.
    entries: [(usize, u32); WIDTH],
}

impl MoveSorter {
    #[inline]
    pub const fn new() -> Self {
        Self {
            len: 0,
            entries: [(0, 0); WIDTH],
        }
    }

    /// Insert `column` with heuristic `score`.
    ///
    /// Equal scores pop in reverse insertion order, so callers add their
    /// least preferred columns first.
    pub fn add(&mut self, column: usize, score: u32) {
        debug_assert!(self.len < WIDTH, "more candidates than columns");
        let mut pos = self.len;
        self.len += 1;
        while pos > 0 && self.entries[pos - 1].1 > score {
            self.entries[pos] = self.entries[pos - 1];
            pos -= 1;
        }
        self.entries[pos] = (column, score);
    }

    /// Remove and return the highest-scored remaining column.
    #[inline]
    pub fn get_next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.entries[self.len].0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for MoveSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for MoveSorter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        self.get_next()
    }
}
