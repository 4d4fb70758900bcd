//! Frame scheduler
//!
//! A `requestAnimationFrame` stand-in. Callbacks are one-shot: each frame
//! runs the callbacks that were pending when it started, and anything
//! requested while a frame is running waits for the next one. Animations
//! that want to keep running re-request from inside their callback.
//!
//! The scheduler is a cheap, clonable handle; its lock is never held while
//! a callback runs, so callbacks may request or cancel frames freely.

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex, MutexGuard};

new_key_type! {
    /// Handle for a pending frame callback
    pub struct FrameId;
}

/// Frame callback; receives the frame delta in seconds
pub type FrameCallback = Box<dyn FnOnce(f32) + Send>;

#[derive(Default)]
struct SchedulerInner {
    callbacks: SlotMap<FrameId, FrameCallback>,
    /// Request order for the next frame
    queue: Vec<FrameId>,
    frame_count: u64,
    total_requested: u64,
    total_cancelled: u64,
}

/// Shared frame scheduler handle
#[derive(Clone, Default)]
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `callback` on the next frame
    pub fn request_frame<F>(&self, callback: F) -> FrameId
    where
        F: FnOnce(f32) + Send + 'static,
    {
        let mut inner = self.lock();
        let id = inner.callbacks.insert(Box::new(callback));
        inner.queue.push(id);
        inner.total_requested += 1;
        id
    }

    /// Cancel a pending callback. Returns false if it already ran or was cancelled.
    pub fn cancel_frame(&self, id: FrameId) -> bool {
        let mut inner = self.lock();
        if inner.callbacks.remove(id).is_some() {
            inner.queue.retain(|queued| *queued != id);
            inner.total_cancelled += 1;
            true
        } else {
            false
        }
    }

    /// Run one frame. Returns the number of callbacks invoked.
    pub fn run_frame(&self, dt: f32) -> usize {
        let queue = {
            let mut inner = self.lock();
            inner.frame_count += 1;
            std::mem::take(&mut inner.queue)
        };

        let mut ran = 0;
        for id in queue {
            // Taken one at a time so a callback cancelling a later one
            // in the same frame is honoured
            let callback = self.lock().callbacks.remove(id);
            if let Some(callback) = callback {
                callback(dt);
                ran += 1;
            }
        }
        ran
    }

    /// Callbacks waiting for a frame
    pub fn pending(&self) -> usize {
        self.lock().callbacks.len()
    }

    pub fn is_pending(&self, id: FrameId) -> bool {
        self.lock().callbacks.contains_key(id)
    }

    pub fn frame_count(&self) -> u64 {
        self.lock().frame_count
    }

    pub fn total_requested(&self) -> u64 {
        self.lock().total_requested
    }

    pub fn total_cancelled(&self) -> u64 {
        self.lock().total_cancelled
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("FrameScheduler")
            .field("pending", &inner.callbacks.len())
            .field("frame_count", &inner.frame_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn callbacks_are_one_shot() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        scheduler.request_frame(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scheduler.run_frame(0.016), 1);
        assert_eq!(scheduler.run_frame(0.016), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.frame_count(), 2);
    }

    #[test]
    fn requests_during_a_frame_wait_for_the_next() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_scheduler = scheduler.clone();
        let h = hits.clone();
        scheduler.request_frame(move |_| {
            let h2 = h.clone();
            inner_scheduler.request_frame(move |_| {
                h2.fetch_add(10, Ordering::SeqCst);
            });
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scheduler.run_frame(0.016), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.run_frame(0.016), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn cancel_before_and_during_frame() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let doomed = scheduler.request_frame(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(scheduler.cancel_frame(doomed));
        assert!(!scheduler.cancel_frame(doomed));

        // A callback that cancels one queued after it in the same frame
        let canceller = scheduler.clone();
        let victim = Arc::new(Mutex::new(None::<FrameId>));
        let v = victim.clone();
        scheduler.request_frame(move |_| {
            if let Some(id) = *v.lock().unwrap() {
                canceller.cancel_frame(id);
            }
        });
        let h = hits.clone();
        *victim.lock().unwrap() = Some(scheduler.request_frame(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(scheduler.run_frame(0.016), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.total_cancelled(), 2);
    }

    #[test]
    fn cancelled_requests_leave_the_queue() {
        let scheduler = FrameScheduler::new();
        for _ in 0..100 {
            let id = scheduler.request_frame(|_| {});
            assert!(scheduler.cancel_frame(id));
        }
        assert!(scheduler.lock().queue.is_empty());
        assert_eq!(scheduler.pending(), 0);

        let kept = scheduler.request_frame(|_| {});
        let dropped = scheduler.request_frame(|_| {});
        scheduler.cancel_frame(dropped);
        assert_eq!(scheduler.lock().queue, vec![kept]);
        assert_eq!(scheduler.run_frame(0.016), 1);
    }
}
