//! Angular arc geometry for directional shields
//!
//! An arc is a facing angle plus a full angular width; it covers every
//! direction within half the width on either side of the facing.

use serde::{Deserialize, Serialize};

use crate::{angle_delta, normalize_angle, rotate_toward};

/// A frontal arc centred on `facing`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShieldArc {
    /// Centre of the arc (radians, normalized to [-π, π))
    pub facing: f32,
    /// Full angular width (radians)
    pub width: f32,
}

impl ShieldArc {
    pub fn new(facing: f32, width: f32) -> Self {
        Self {
            facing: normalize_angle(facing),
            width,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Check if an angle is within the arc's angular extent.
    ///
    /// Inclusive: an angle exactly `half_width` from the facing is covered.
    pub fn contains_angle(&self, theta: f32) -> bool {
        angle_delta(self.facing, theta).abs() <= self.half_width()
    }

    /// Rotate the facing toward `target` by at most `max_delta`
    pub fn turn_toward(&mut self, target: f32, max_delta: f32) {
        self.facing = rotate_toward(self.facing, target, max_delta);
    }
}
