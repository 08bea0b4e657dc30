// Mixer tuning: polyphony, layer clamp ranges, timing, and the root-note set.
//
// Every numeric constant the mixer uses lives here so that two sessions with
// different tuning can coexist. Loaded from JSON as part of `SessionConfig`
// or built from `Default`; `validate()` is called once before construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Maximum concurrently sounding capped voices (notes and chord notes).
    pub polyphony_ceiling: usize,
    /// Inclusive clamp range for a layer's pitch offset, in semitones.
    pub pitch_range: (i8, i8),
    /// Inclusive clamp range for a layer's tempo multiplier.
    pub tempo_range: (f64, f64),
    /// Delay between successive chord notes.
    pub arpeggio_offset_ms: f64,
    /// How long a one-shot effect voice lives before disposal.
    pub effect_lifetime_ms: f64,
    /// Tempo used to turn duration classes and pattern steps into millis.
    pub base_bpm: f64,
    /// Velocity range for triggered notes, `[low, high)`.
    pub velocity_range: (f32, f32),
    /// Detune is drawn uniformly from `[-detune_cents, detune_cents)`.
    pub detune_cents: f32,
    /// Candidate scale roots (MIDI note numbers).
    pub root_notes: Vec<u8>,
    /// Velocity of loop-layer steps.
    pub loop_velocity: f32,
    /// Most steps a single `pump_loops` call may fire per layer. A host that
    /// stalls for seconds gets its layers resynchronized instead of a flood.
    pub max_catch_up_steps: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum MixerConfigError {
    #[error("polyphony ceiling must be at least 1")]
    ZeroPolyphony,
    #[error("pitch range {0}..={1} is empty or does not contain 0")]
    BadPitchRange(i8, i8),
    #[error("tempo range {0}..={1} must be positive, finite and contain 1.0")]
    BadTempoRange(f64, f64),
    #[error("{name} must be finite and non-negative, got {value}")]
    BadDuration { name: &'static str, value: f64 },
    #[error("base bpm must be positive, got {0}")]
    BadBpm(f64),
    #[error("velocity range {0}..{1} must lie within [0, 1]")]
    BadVelocity(f32, f32),
    #[error("loop velocity must lie within [0, 1], got {0}")]
    BadLoopVelocity(f32),
    #[error("max catch-up steps must be at least 1")]
    ZeroCatchUp,
    #[error("root note set is empty")]
    NoRoots,
    #[error("root note {0} leaves no room for two octaves")]
    RootTooHigh(u8),
}

impl MixerConfig {
    pub fn validate(&self) -> Result<(), MixerConfigError> {
        if self.polyphony_ceiling == 0 {
            return Err(MixerConfigError::ZeroPolyphony);
        }
        let (lo, hi) = self.pitch_range;
        if lo > 0 || hi < 0 {
            return Err(MixerConfigError::BadPitchRange(lo, hi));
        }
        let (tlo, thi) = self.tempo_range;
        if !(tlo.is_finite() && thi.is_finite() && tlo > 0.0 && tlo <= 1.0 && thi >= 1.0) {
            return Err(MixerConfigError::BadTempoRange(tlo, thi));
        }
        for (name, value) in [
            ("arpeggio_offset_ms", self.arpeggio_offset_ms),
            ("effect_lifetime_ms", self.effect_lifetime_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MixerConfigError::BadDuration { name, value });
            }
        }
        if !self.base_bpm.is_finite() || self.base_bpm <= 0.0 {
            return Err(MixerConfigError::BadBpm(self.base_bpm));
        }
        let (vlo, vhi) = self.velocity_range;
        if !(0.0..=1.0).contains(&vlo) || !(0.0..=1.0).contains(&vhi) || vlo > vhi {
            return Err(MixerConfigError::BadVelocity(vlo, vhi));
        }
        if !(0.0..=1.0).contains(&self.loop_velocity) {
            return Err(MixerConfigError::BadLoopVelocity(self.loop_velocity));
        }
        if self.max_catch_up_steps == 0 {
            return Err(MixerConfigError::ZeroCatchUp);
        }
        if self.root_notes.is_empty() {
            return Err(MixerConfigError::NoRoots);
        }
        if let Some(&root) = self.root_notes.iter().find(|&&r| r > 103) {
            return Err(MixerConfigError::RootTooHigh(root));
        }
        Ok(())
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            polyphony_ceiling: 8,
            pitch_range: (-12, 12),
            tempo_range: (0.25, 4.0),
            arpeggio_offset_ms: 30.0,
            effect_lifetime_ms: 2000.0,
            base_bpm: 120.0,
            velocity_range: (0.5, 0.9),
            detune_cents: 10.0,
            // C4 D4 E4 F4 G4 A4
            root_notes: vec![60, 62, 64, 65, 67, 69],
            loop_velocity: 0.6,
            max_catch_up_steps: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(MixerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_polyphony() {
        let config = MixerConfig {
            polyphony_ceiling: 0,
            ..MixerConfig::default()
        };
        assert_eq!(config.validate(), Err(MixerConfigError::ZeroPolyphony));
    }

    #[test]
    fn rejects_tempo_range_excluding_unity() {
        let config = MixerConfig {
            tempo_range: (1.5, 4.0),
            ..MixerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(MixerConfigError::BadTempoRange(1.5, 4.0))
        );
    }

    #[test]
    fn rejects_zero_catch_up() {
        let config = MixerConfig {
            max_catch_up_steps: 0,
            ..MixerConfig::default()
        };
        assert_eq!(config.validate(), Err(MixerConfigError::ZeroCatchUp));
    }

    #[test]
    fn rejects_loop_velocity_outside_unit_range() {
        for v in [-0.1, 1.5, f32::NAN] {
            let config = MixerConfig {
                loop_velocity: v,
                ..MixerConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(MixerConfigError::BadLoopVelocity(_))
            ));
        }
    }

    #[test]
    fn rejects_empty_roots() {
        let config = MixerConfig {
            root_notes: vec![],
            ..MixerConfig::default()
        };
        assert_eq!(config.validate(), Err(MixerConfigError::NoRoots));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: MixerConfig = serde_json::from_str(r#"{"polyphony_ceiling": 3}"#).unwrap();
        assert_eq!(config.polyphony_ceiling, 3);
        assert_eq!(config.tempo_range, (0.25, 4.0));
    }
}
