//! queue.rs
//! Plain FIFO of owned entries.
//!
//! Not internally synchronized: callers hold the mutex that guards it
//! (the per-stream submission mutex or the dispatcher's completion mutex).

use std::collections::VecDeque;

#[derive(Debug)]
pub struct Queue<T> {
    items: VecDeque<T>,
    limit: Option<usize>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self { items: VecDeque::new(), limit: None }
    }

    /// Queue whose node budget is `limit` entries; pushes beyond it fail as an
    /// allocation failure would.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { items: VecDeque::new(), limit }
    }

    /// Append at the back. On failure the entry is handed back untouched.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if matches!(self.limit, Some(limit) if self.items.len() >= limit) {
            return Err(item);
        }
        if self.items.try_reserve(1).is_err() {
            return Err(item);
        }
        self.items.push_back(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
