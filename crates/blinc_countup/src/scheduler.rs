//! Frame scheduling
//!
//! The engine asks for "a callback next display frame" through
//! [`FrameScheduler`] and receives the tick through `CountUp::on_frame`.
//! Handles are generational slotmap keys, so a cancelled or superseded
//! handle can never be mistaken for the current one.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a requested frame tick
    pub struct FrameHandle;
}

/// The host's per-frame callback primitive
pub trait FrameScheduler {
    /// Request one tick at the next display refresh
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending tick; unknown or already fired handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A scheduler the host pumps itself, once per display refresh
pub trait FrameSource: FrameScheduler {
    /// Remove and return every tick due this frame
    fn take_due(&mut self) -> SmallVec<[FrameHandle; 2]>;
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Box<S> {
    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }
}

/// In-process frame queue
///
/// Every request made before a call to [`FrameSource::take_due`] fires on
/// that call; requests made while ticks are being delivered wait for the
/// next one.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: SlotMap<FrameHandle, ()>,
    requested: u64,
    cancelled: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains_key(handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total ticks requested over the queue's lifetime
    pub fn requested_count(&self) -> u64 {
        self.requested
    }

    /// Total pending ticks cancelled over the queue's lifetime
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.requested += 1;
        self.pending.insert(())
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.remove(handle).is_some() {
            self.cancelled += 1;
        }
    }
}

impl FrameSource for FrameQueue {
    fn take_due(&mut self) -> SmallVec<[FrameHandle; 2]> {
        self.pending.drain().map(|(handle, ())| handle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_frames_never_fire() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        queue.cancel_frame(a);

        let due = queue.take_due();
        assert_eq!(due.as_slice(), &[b]);
        assert_eq!(queue.cancelled_count(), 1);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        queue.take_due();

        let b = queue.request_frame();
        queue.cancel_frame(a);
        assert!(queue.is_pending(b));
        assert!(!queue.is_pending(a));
        assert_eq!(queue.cancelled_count(), 0);
        assert_eq!(queue.requested_count(), 2);
    }
}
