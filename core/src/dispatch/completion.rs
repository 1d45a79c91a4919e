//! dispatch/completion.rs
//! Worker -> control thread handoff.
//!
//! Finished requests go into one process-wide queue; a level-triggered
//! notification (capacity-1 channel) wakes the control thread. Multiple
//! notifications before a drain coalesce into one wakeup, so the drain must
//! empty the queue.

use crossbeam::channel::Sender;
use parking_lot::Mutex;
use tracing::warn;

use crate::queue::Queue;
use crate::stream::request::Request;

pub(crate) struct CompletionBridge {
    queue: Mutex<Queue<Request>>,
    notify: Sender<()>,
}

impl CompletionBridge {
    pub(crate) fn new(limit: Option<usize>, notify: Sender<()>) -> Self {
        Self { queue: Mutex::new(Queue::with_limit(limit)), notify }
    }

    /// Hand a finished request to the control thread.
    ///
    /// If the queue cannot take it the request is discarded without a
    /// callback; its token is still released. The control thread is
    /// signalled either way.
    pub(crate) fn push(&self, request: Request) -> bool {
        let rejected = self.queue.lock().push(request).err();
        let accepted = rejected.is_none();

        if let Some(request) = rejected {
            if let Some(stream) = request.stream() {
                stream.counters.record_dropped();
                warn!(target: "completion", stream = stream.id, op = request.op.name(), "completion queue full; dropping result");
            }
            drop(request);
        }

        self.signal();
        accepted
    }

    pub(crate) fn pop(&self) -> Option<Request> {
        self.queue.lock().pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Coalescing wakeup; a pending signal already covers this one.
    pub(crate) fn signal(&self) {
        let _ = self.notify.try_send(());
    }
}
