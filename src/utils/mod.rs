//! Utility Module
//!
//! Host-facing plumbing the scheduler depends on:
//!
//! - [`time`]: [`Clock`] trait with system and manual clocks
//! - [`frame`]: [`FrameHost`] trait, [`FrameToken`] and the shared [`RepaintFlag`]
//!
//! ```rust,ignore
//! use geomotion::utils::{FrameRequests, ManualClock};
//!
//! let clock = ManualClock::new(0.0);
//! let frames = FrameRequests::new();
//! let scheduler = AnimationScheduler::new(Box::new(clock.clone()), Box::new(frames.clone()));
//! ```

pub mod frame;
pub mod time;

pub use frame::{FrameHost, FrameRequests, FrameToken, RepaintFlag};
pub use time::{Clock, ManualClock, SystemClock};
