use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Platform frame-callback abstraction. The driver calls
/// [`Engine::on_frame`](super::Engine::on_frame) with the handle it issued.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualQueue {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Single-slot scheduler driven by hand. Clones share the same queue, so a test
/// or the window runner can keep one clone while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.queue.borrow().pending
    }

    /// Removes and returns the pending frame, if any.
    pub fn take_pending(&self) -> Option<FrameHandle> {
        self.queue.borrow_mut().pending.take()
    }

    pub fn requested_count(&self) -> u64 {
        self.queue.borrow().requested
    }

    pub fn cancelled_count(&self) -> u64 {
        self.queue.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        queue.next_id = queue.next_id.wrapping_add(1);
        let handle = FrameHandle(queue.next_id);
        queue.pending = Some(handle);
        queue.requested = queue.requested.saturating_add(1);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut queue = self.queue.borrow_mut();
        if queue.pending == Some(handle) {
            queue.pending = None;
            queue.cancelled = queue.cancelled.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_queue() {
        let observer = ManualScheduler::new();
        let mut owner = observer.clone();
        let handle = owner.request_frame();
        assert_eq!(observer.pending(), Some(handle));
        assert_eq!(observer.take_pending(), Some(handle));
        assert_eq!(owner.pending(), None);
    }

    #[test]
    fn cancel_ignores_other_handles() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        assert_ne!(first, second);
        scheduler.cancel_frame(first);
        assert_eq!(scheduler.pending(), Some(second));
        scheduler.cancel_frame(second);
        assert_eq!(scheduler.pending(), None);
        assert_eq!(scheduler.cancelled_count(), 1);
    }
}
