// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Generic undo/redo stack of whole-state snapshots.
//!
//! The caller owns the live value; `UndoState` only stores the values that
//! were live before each recorded change. `undo` and `redo` take the current
//! live value so it can be parked on the opposite stack.

use std::collections::VecDeque;

/// Bounded undo/redo history.
#[derive(Debug, Clone)]
pub struct UndoState<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    max_undo_count: usize,
}

impl<T> UndoState<T> {
    /// Create an empty history holding at most `max_undo_count` snapshots.
    pub fn new(max_undo_count: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo_count: max_undo_count.max(1),
        }
    }

    /// Record `previous` as the state to return to on the next undo.
    ///
    /// Any redo history is discarded. The oldest snapshot is dropped once
    /// the limit is reached.
    pub fn add_undo_group(&mut self, previous: T) {
        self.redo_stack.clear();
        if self.undo_stack.len() == self.max_undo_count {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(previous);
    }

    /// Step back. Returns the snapshot to make live, parking `current` for
    /// redo, or `None` (dropping nothing) when there is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots available to undo.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}
