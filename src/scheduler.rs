//! Cancellable timer for the ambient loop.
//!
//! The engine keeps at most one pending firing. Scheduling returns a
//! [`TaskHandle`]; cancelling a handle (or everything) makes the pending
//! firing disappear, so a stale timer can never fire after the engine
//! suspended or tore down.
//!
//! Time is whatever monotonically increasing seconds value the caller feeds
//! in. Nothing here sleeps or spawns.

/// Identifies one scheduled firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Clone, Copy, Debug)]
struct Pending {
    handle: TaskHandle,
    due: f64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: Option<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a firing `delay` seconds after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: f64, delay: f64) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(Pending {
            handle,
            due: now + delay.max(0.0),
        });
        handle
    }

    /// Cancel `handle` if it is still pending. Returns whether it was.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.pending {
            Some(p) if p.handle == handle => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.pending = None;
    }

    /// Take the pending firing if it is due at `now`.
    pub fn take_due(&mut self, now: f64) -> Option<TaskHandle> {
        match self.pending {
            Some(p) if p.due <= now => {
                self.pending = None;
                Some(p.handle)
            }
            _ => None,
        }
    }

    #[inline]
    pub fn next_due(&self) -> Option<f64> {
        self.pending.map(|p| p.due)
    }
}
