//! Platter motion: tempo-scaled rotation while playing, a spring back to
//! the rest angle while paused.

use std::time::Duration;

use crate::config::MotionSettings;

/// Tempo at which a platter turns at exactly `base_rpm`.
const REFERENCE_BPM: f32 = 120.0;
/// Below this many degrees a returning platter snaps to rest.
const REST_SNAP_DEG: f32 = 0.5;

/// Revolutions per minute for a track at `bpm`.
///
/// The speed change is `(bpm - 120) / reference_span`, clamped to
/// `+/- max_speed_delta`.
pub fn rotation_rpm(bpm: f32, settings: &MotionSettings) -> f32 {
    let bpm = if bpm.is_finite() { bpm } else { REFERENCE_BPM };
    let limit = settings.max_speed_delta.abs();
    let factor = (bpm - REFERENCE_BPM) / settings.reference_span;
    let factor = if factor.is_finite() { factor.clamp(-limit, limit) } else { 0.0 };
    settings.base_rpm * (1.0 + factor)
}

/// Length of one revolution at `bpm`.
pub fn seconds_per_revolution(bpm: f32, settings: &MotionSettings) -> f32 {
    60.0 / rotation_rpm(bpm, settings)
}

/// Angle state for one platter, in degrees within `[0, 360)`.
#[derive(Debug, Clone, Default)]
pub struct Platter {
    angle: f32,
}

impl Platter {
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advance by one frame. Playing spins at the tempo-derived period;
    /// paused eases the platter back toward 0 along the shorter way round.
    pub fn on_frame(&mut self, dt: Duration, bpm: f32, playing: bool, settings: &MotionSettings) {
        if playing {
            let period = seconds_per_revolution(bpm, settings);
            let step = 360.0 * dt.as_secs_f32() / period;
            if step.is_finite() {
                self.angle = (self.angle + step).rem_euclid(360.0);
            }
            return;
        }

        let mut offset = self.angle;
        if offset > 180.0 {
            offset -= 360.0;
        }
        offset *= 1.0 - settings.spring_return.clamp(0.0, 1.0);
        if offset.abs() < REST_SNAP_DEG {
            offset = 0.0;
        }
        self.angle = offset.rem_euclid(360.0);
    }
}
