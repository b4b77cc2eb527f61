//! Keyframe types for per-property segment animation.

use draftcut_common::Micros;
use serde::{Deserialize, Serialize};

/// Well-known animatable property names.
pub mod property {
    pub const POSITION_X: &str = "position_x";
    pub const POSITION_Y: &str = "position_y";
    pub const SCALE: &str = "scale";
    pub const ROTATION: &str = "rotation";
    pub const OPACITY: &str = "opacity";
    pub const VOLUME: &str = "volume";
}

/// One point on an animation curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Microseconds from the start of the owning segment.
    pub time: Micros,

    /// Property value at `time`.
    pub value: f64,

    /// Curve used from this keyframe to the next one.
    #[serde(default)]
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(time: Micros, value: f64, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

/// Easing curve between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map normalized progress `t` in `[0, 1]` through the curve.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

impl std::str::FromStr for Easing {
    type Err = draftcut_common::DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Easing::Linear),
            "ease_in" => Ok(Easing::EaseIn),
            "ease_out" => Ok(Easing::EaseOut),
            "ease_in_out" => Ok(Easing::EaseInOut),
            other => Err(draftcut_common::DraftError::invalid(format!(
                "unknown easing '{other}'"
            ))),
        }
    }
}
