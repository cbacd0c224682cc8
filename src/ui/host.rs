//! Terminal implementation of [`AlertHost`].
//!
//! Focus and detach requests are recorded here and applied by the event
//! loop on its next frame, which batches visual-tree writes.

use std::cell::{Cell, RefCell};

use crate::alert::AlertHost;

/// A queued visual-tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeWrite {
    Detach,
}

#[derive(Debug, Default)]
pub struct TerminalHost {
    focusable: Cell<usize>,
    focus_requested: Cell<bool>,
    pending: RefCell<Vec<TreeWrite>>,
    detached: Cell<bool>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update how many elements can take focus. Called by the loop before rendering.
    pub fn set_focusable(&self, count: usize) {
        self.focusable.set(count);
    }

    /// Consume a pending focus request.
    pub fn take_focus_request(&self) -> bool {
        self.focus_requested.replace(false)
    }

    /// Apply queued writes. Returns how many were applied.
    pub fn flush(&self) -> usize {
        let writes: Vec<TreeWrite> = self.pending.borrow_mut().drain(..).collect();
        for write in &writes {
            match write {
                TreeWrite::Detach => self.detached.set(true),
            }
        }
        writes.len()
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }
}

impl AlertHost for TerminalHost {
    fn focus_first(&self) -> bool {
        if self.focusable.get() == 0 {
            return false;
        }
        self.focus_requested.set(true);
        true
    }

    fn schedule_detach(&self) {
        self.pending.borrow_mut().push(TreeWrite::Detach);
    }
}
