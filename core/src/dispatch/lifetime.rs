//! dispatch/lifetime.rs
//! Outstanding-work accounting.
//!
//! Every request carries a `LifetimeToken`. While it lives, the owning stream
//! cannot be released and the dispatcher reports outstanding work. The token
//! is released exactly once, on drop, whether the request was delivered,
//! rejected or discarded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::dispatch::dispatcher::DispatchShared;
use crate::stream::handle::StreamShared;

/// Dispatcher-wide count of live tokens.
#[derive(Debug, Default)]
pub struct KeepAlive {
    count: AtomicUsize,
}

impl KeepAlive {
    pub fn acquire(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    pub fn release(&self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

pub(crate) struct LifetimeToken {
    stream: Option<Arc<StreamShared>>,
    dispatch: Arc<DispatchShared>,
}

impl LifetimeToken {
    pub(crate) fn acquire(stream: &Arc<StreamShared>) -> Self {
        stream.retain();
        stream.dispatch.keep_alive.acquire();
        Self {
            stream: Some(Arc::clone(stream)),
            dispatch: Arc::clone(&stream.dispatch),
        }
    }

    pub(crate) fn stream(&self) -> Option<&Arc<StreamShared>> {
        self.stream.as_ref()
    }
}

impl Drop for LifetimeToken {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.release();
            // May be the last reference; the stream destroys its codec here.
            drop(stream);
        }
        self.dispatch.keep_alive.release();
    }
}
