//! Error Types
//!
//! This module defines the error type returned by the scheduler's public
//! operations.
//!
//! # Overview
//!
//! [`GeoMotionError`] covers the configuration errors a caller can make when
//! issuing commands:
//! - Unknown or unenrolled object handles
//! - Commands without any target state
//! - Invalid durations and empty paths
//! - Clip playback requested on an object that has no clips
//!
//! Rejected commands are never enqueued. Geometric edge cases (poles,
//! degenerate paths) are not errors; they produce non-finite values instead.
//!
//! ```rust,ignore
//! use geomotion::errors::{GeoMotionError, Result};
//!
//! fn animate() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::ObjectHandle;

/// The main error type for the animation layer.
#[derive(Error, Debug)]
pub enum GeoMotionError {
    // ========================================================================
    // Object Errors
    // ========================================================================
    /// The handle does not refer to an enrolled object.
    #[error("Object is not enrolled: {0:?}")]
    NotEnrolled(ObjectHandle),

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// A `set` command carried no target field at all.
    #[error("Target state is empty: at least one of scale, position or rotation is required")]
    MissingTarget,

    /// Durations must be finite and non-negative.
    #[error("Invalid duration: {0} ms")]
    InvalidDuration(f64),

    /// A path needs at least one point to build a curve.
    #[error("Path must contain at least one coordinate")]
    EmptyPath,

    /// Clip playback was requested on an object enrolled without clips.
    #[error("Object has no animation clips: {0:?}")]
    NoAnimationClips(ObjectHandle),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, GeoMotionError>`.
pub type Result<T> = std::result::Result<T, GeoMotionError>;
