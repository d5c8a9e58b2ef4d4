//! Scheduler Settings
//!
//! Defaults applied when a command leaves an option unspecified, plus curve
//! sampling resolution.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use geomotion::SchedulerSettings;
//!
//! // Defaults
//! let settings = SchedulerSettings::default();
//!
//! // Partial JSON; missing fields keep their defaults
//! let settings = SchedulerSettings::from_json(r#"{ "default_clip_speed": 2.0 }"#)?;
//!
//! let scheduler = AnimationScheduler::default().with_settings(settings);
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::geo::curve::{DEFAULT_ARC_LENGTH_DIVISIONS, DEFAULT_TANGENT_DELTA};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Path duration when [`FollowPathOptions`](crate::animation::FollowPathOptions) gives none, ms.
    pub default_follow_duration_ms: f64,

    /// Playback rate when a clip command gives none.
    pub default_clip_speed: f64,

    /// Clip playback length when a clip command gives none, ms.
    /// `None` plays until stopped.
    pub default_clip_duration_ms: Option<f64>,

    /// Samples used for arc-length parameterization of path curves.
    pub arc_length_divisions: usize,

    /// Parameter step for finite-difference tangents.
    pub tangent_delta: f64,

    /// Axis rotated onto the path tangent when tracking heading.
    pub up_axis: DVec3,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            default_follow_duration_ms: 1000.0,
            default_clip_speed: 1.0,
            default_clip_duration_ms: None,
            arc_length_divisions: DEFAULT_ARC_LENGTH_DIVISIONS,
            tangent_delta: DEFAULT_TANGENT_DELTA,
            up_axis: DVec3::Y,
        }
    }
}

impl SchedulerSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
