// Canvas tuning: dimensions, caps, timings, and animation ranges.
//
// All sizes are in canvas pixels and all durations in milliseconds. Ranges
// are `(low, high)` pairs fed straight to `SessionRng::range_f64` or
// `int_inclusive`, so `validate()` insists on `low <= high`.

use crate::geometry::Color;
use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// Placement keeps element centers at least this far from every edge.
    pub margin: f64,
    /// Live (non-fading) permanent elements allowed before the oldest fades.
    pub permanent_cap: usize,
    /// Animated elements allowed before the oldest is evicted outright.
    pub animated_cap: usize,
    pub fade_out_ms: f64,
    pub heartbeat_period_ms: f64,
    /// How long each heartbeat ring is visible.
    pub heartbeat_pulse_ms: f64,
    /// Most recent permanent elements that breathe and shimmer.
    pub breathing_window: usize,
    pub breathing_amplitude: f64,
    pub breathing_period_ms: f64,
    /// Peak hue shift of the shimmer, in degrees.
    pub shimmer_degrees: f64,
    pub shimmer_period_ms: f64,
    pub placement_attempts: usize,
    /// Most recent permanent elements a new position must keep clear of.
    pub placement_window: usize,
    pub stroke_history_cap: usize,
    pub stroke_thickness: (f64, f64),
    pub explode_duration_ms: f64,
    /// Duration range for non-explode animations.
    pub animation_duration_ms: (f64, f64),
    pub explode_particle_count: usize,
    pub particle_speed: (f64, f64),
    /// Downward acceleration on particles, in px/s².
    pub gravity: f64,
    /// Speed range for "move" animations, in px/s.
    pub move_speed: (f64, f64),
    /// Revolutions per second for "spin" animations.
    pub spin_rate: f64,
    /// Elements spawned per burst, inclusive.
    pub burst_count: (i64, i64),
    pub burst_attempts: usize,
    /// Exclusion radius around the canvas center, as a fraction of the
    /// smaller canvas dimension.
    pub burst_exclusion_fraction: f64,
    /// Distance range from the burst origin to each spawned element.
    pub burst_spread: (f64, f64),
    pub overlay_duration_ms: f64,
    pub overlay_text_size: f64,
    /// Element size range (diameter).
    pub element_size: (f64, f64),
    /// Hues (degrees) new colors are picked from. Empty means any hue.
    pub palette: Vec<f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CanvasConfigError {
    #[error("canvas must be at least {min}px on each side after margins, got {width}x{height} with margin {margin}")]
    TooSmall {
        width: f64,
        height: f64,
        margin: f64,
        min: f64,
    },
    #[error("{0} must be at least 1")]
    ZeroCap(&'static str),
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("range {name} has low > high or a non-finite end")]
    BadRange { name: &'static str },
    #[error("burst exclusion fraction must be in (0, 0.45], got {0}")]
    BadExclusion(f64),
    #[error("margin must be finite and non-negative, got {0}")]
    NegativeMargin(f64),
    #[error("a burst of up to {max} elements does not fit in animated cap {cap}")]
    BurstExceedsCap { max: i64, cap: usize },
    #[error("palette hue {0} is not finite")]
    BadHue(f64),
}

impl CanvasConfig {
    pub fn validate(&self) -> Result<(), CanvasConfigError> {
        const MIN_INNER: f64 = 1.0;
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(CanvasConfigError::NegativeMargin(self.margin));
        }
        if !(self.width - 2.0 * self.margin >= MIN_INNER && self.height - 2.0 * self.margin >= MIN_INNER)
        {
            return Err(CanvasConfigError::TooSmall {
                width: self.width,
                height: self.height,
                margin: self.margin,
                min: MIN_INNER,
            });
        }
        for (name, cap) in [
            ("permanent_cap", self.permanent_cap),
            ("animated_cap", self.animated_cap),
            ("stroke_history_cap", self.stroke_history_cap),
            ("placement_attempts", self.placement_attempts),
            ("burst_attempts", self.burst_attempts),
            ("explode_particle_count", self.explode_particle_count),
        ] {
            if cap == 0 {
                return Err(CanvasConfigError::ZeroCap(name));
            }
        }
        for (name, value) in [
            ("fade_out_ms", self.fade_out_ms),
            ("heartbeat_period_ms", self.heartbeat_period_ms),
            ("heartbeat_pulse_ms", self.heartbeat_pulse_ms),
            ("breathing_period_ms", self.breathing_period_ms),
            ("shimmer_period_ms", self.shimmer_period_ms),
            ("explode_duration_ms", self.explode_duration_ms),
            ("overlay_duration_ms", self.overlay_duration_ms),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CanvasConfigError::NotPositive { name, value });
            }
        }
        for (name, (low, high)) in [
            ("stroke_thickness", self.stroke_thickness),
            ("animation_duration_ms", self.animation_duration_ms),
            ("particle_speed", self.particle_speed),
            ("move_speed", self.move_speed),
            ("burst_spread", self.burst_spread),
            ("element_size", self.element_size),
        ] {
            if !(low.is_finite() && high.is_finite() && low <= high) {
                return Err(CanvasConfigError::BadRange { name });
            }
        }
        if self.burst_count.0 < 1 || self.burst_count.0 > self.burst_count.1 {
            return Err(CanvasConfigError::BadRange {
                name: "burst_count",
            });
        }
        if self.burst_count.1 as u64 > self.animated_cap as u64 {
            return Err(CanvasConfigError::BurstExceedsCap {
                max: self.burst_count.1,
                cap: self.animated_cap,
            });
        }
        if !(self.burst_exclusion_fraction > 0.0 && self.burst_exclusion_fraction <= 0.45) {
            return Err(CanvasConfigError::BadExclusion(
                self.burst_exclusion_fraction,
            ));
        }
        if let Some(&hue) = self.palette.iter().find(|h| !h.is_finite()) {
            return Err(CanvasConfigError::BadHue(hue));
        }
        Ok(())
    }

    /// One draw: a palette hue, or any hue when the palette is empty.
    pub fn draw_color(&self, rng: &mut SessionRng) -> Color {
        let hue = match rng.pick(&self.palette) {
            Some(&hue) => hue,
            None => rng.range_f64(0.0, 360.0),
        };
        Color::vivid(hue.rem_euclid(360.0))
    }

    /// Radius of the central zone burst origins avoid.
    pub fn exclusion_radius(&self) -> f64 {
        self.burst_exclusion_fraction * self.width.min(self.height)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            margin: 60.0,
            permanent_cap: 50,
            animated_cap: 30,
            fade_out_ms: 1000.0,
            heartbeat_period_ms: 4000.0,
            heartbeat_pulse_ms: 600.0,
            breathing_window: 10,
            breathing_amplitude: 0.05,
            breathing_period_ms: 3000.0,
            shimmer_degrees: 8.0,
            shimmer_period_ms: 5000.0,
            placement_attempts: 20,
            placement_window: 10,
            stroke_history_cap: 20,
            stroke_thickness: (3.0, 10.0),
            explode_duration_ms: 1200.0,
            animation_duration_ms: (1500.0, 3000.0),
            explode_particle_count: 16,
            particle_speed: (80.0, 240.0),
            gravity: 400.0,
            move_speed: (60.0, 200.0),
            spin_rate: 1.0,
            burst_count: (5, 10),
            burst_attempts: 10,
            burst_exclusion_fraction: 0.2,
            burst_spread: (20.0, 90.0),
            overlay_duration_ms: 2500.0,
            overlay_text_size: 64.0,
            element_size: (30.0, 80.0),
            palette: Vec::new(),
        }
    }
}
