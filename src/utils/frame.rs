//! Host frame scheduling boundary
//!
//! The scheduler never owns a render loop. It asks the host for "call me
//! again next frame" through [`FrameHost`], keeps the returned
//! [`FrameToken`], and cancels it through the same trait. Redraws are
//! requested by raising a shared [`RepaintFlag`] that the renderer polls.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Identifies one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// The host's frame scheduler.
pub trait FrameHost {
    /// Schedules one more tick on the next frame.
    fn request_frame(&mut self) -> FrameToken;

    /// Cancels a pending request. Unknown tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

#[derive(Debug, Default)]
struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameToken>,
    total_requested: u64,
}

/// A [`FrameHost`] that records requests for a host loop to drain.
///
/// Clones share the same queue, so the host keeps one clone and gives the
/// other to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct FrameRequests {
    queue: Rc<RefCell<FrameQueue>>,
}

impl FrameRequests {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens requested and not yet cancelled or drained.
    #[must_use]
    pub fn pending(&self) -> Vec<FrameToken> {
        self.queue.borrow().pending.clone()
    }

    /// Whether any frame is currently requested.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().pending.is_empty()
    }

    /// Number of requests ever made.
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.queue.borrow().total_requested
    }

    /// Removes and returns all pending tokens; the host then ticks once.
    pub fn drain(&self) -> Vec<FrameToken> {
        std::mem::take(&mut self.queue.borrow_mut().pending)
    }
}

impl FrameHost for FrameRequests {
    fn request_frame(&mut self) -> FrameToken {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        queue.total_requested += 1;
        let token = FrameToken(queue.next_id);
        queue.pending.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.queue.borrow_mut().pending.retain(|&t| t != token);
    }
}

/// Shared "redraw needed" flag between the scheduler and the renderer.
#[derive(Debug, Clone, Default)]
pub struct RepaintFlag {
    flag: Arc<AtomicBool>,
}

impl RepaintFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Reads and clears the flag; renderers call this once per draw.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }
}
