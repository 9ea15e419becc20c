use std::collections::VecDeque;

use crate::windows::WindowId;

/// Deferred repaint requests, strictly first-in first-out.
///
/// Scheduling never checks whether the window is still open; the flush in
/// [`EventRouter::flush_redraws`](crate::router::EventRouter::flush_redraws)
/// skips entries whose window has closed in the meantime. Duplicates are
/// kept, so scheduling a window twice repaints it twice.
#[derive(Debug, Default)]
pub struct RedrawQueue {
    pending: VecDeque<WindowId>,
}

impl RedrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, id: WindowId) {
        self.pending.push_back(id);
    }

    pub fn pop(&mut self) -> Option<WindowId> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
