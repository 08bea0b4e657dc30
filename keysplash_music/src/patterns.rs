// Loop pattern library.
//
// A pattern template is a short melodic cell written in scale degrees, so the
// same template sounds in whatever key the session drew. `None` steps are
// rests. Each template names a timbre family and a step duration class.
//
// `PatternTemplate::resolve` turns a template into a concrete `LoopPattern`
// (MIDI notes + step millis) against the session scale and base tempo. The
// layer's pitch offset and tempo multiplier are applied later, per step, by
// the mixer's loop transport.

use crate::backend::DurationClass;
use crate::scale::Scale;
use serde::{Deserialize, Serialize};

/// Timbre family a loop layer's voice is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    Pluck,
    Pad,
    Bell,
    Bass,
    Marimba,
}

impl Timbre {
    /// Octave shift applied when resolving notes for this timbre.
    pub fn octave_shift(self) -> i16 {
        match self {
            Timbre::Bass => -12,
            Timbre::Bell => 12,
            _ => 0,
        }
    }
}

/// A scale-degree loop, independent of key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternTemplate {
    pub name: String,
    pub degrees: Vec<Option<u8>>,
    pub step: DurationClass,
    pub timbre: Timbre,
}

/// A template resolved against the session scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopPattern {
    pub name: String,
    pub notes: Vec<Option<u8>>,
    pub step: DurationClass,
    /// Step length at tempo multiplier 1.0.
    pub step_ms: f64,
    pub timbre: Timbre,
}

impl PatternTemplate {
    fn new(name: &str, degrees: &[Option<u8>], step: DurationClass, timbre: Timbre) -> Self {
        Self {
            name: name.to_string(),
            degrees: degrees.to_vec(),
            step,
            timbre,
        }
    }

    pub fn resolve(&self, scale: &Scale, bpm: f64) -> LoopPattern {
        let shift = self.timbre.octave_shift();
        let notes = self
            .degrees
            .iter()
            .map(|step| {
                step.map(|degree| {
                    let pitch = scale.note_at(degree as usize) as i16 + shift;
                    pitch.clamp(0, 127) as u8
                })
            })
            .collect();
        LoopPattern {
            name: self.name.clone(),
            notes,
            step: self.step,
            step_ms: self.step.millis(bpm),
            timbre: self.timbre,
        }
    }
}

/// The fixed template library, in draw order.
pub fn default_library() -> Vec<PatternTemplate> {
    use DurationClass::{Eighth, Quarter, Sixteenth};
    const R: Option<u8> = None;
    vec![
        PatternTemplate::new(
            "rising",
            &[Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), R, R],
            Eighth,
            Timbre::Pluck,
        ),
        PatternTemplate::new(
            "falling",
            &[Some(7), Some(6), Some(5), Some(4), Some(3), Some(2), Some(1), R],
            Eighth,
            Timbre::Marimba,
        ),
        PatternTemplate::new(
            "bounce",
            &[Some(0), Some(4), Some(2), Some(4), Some(0), Some(4), Some(3), R],
            Sixteenth,
            Timbre::Pluck,
        ),
        PatternTemplate::new(
            "lullaby",
            &[Some(4), R, Some(3), Some(2), R, Some(0), R, R],
            Quarter,
            Timbre::Pad,
        ),
        PatternTemplate::new(
            "bassline",
            &[Some(0), R, Some(0), Some(2), R, Some(3), Some(2), R],
            Eighth,
            Timbre::Bass,
        ),
        PatternTemplate::new(
            "sparkle",
            &[Some(5), Some(7), Some(9), R, Some(8), R, Some(6), R],
            Sixteenth,
            Timbre::Bell,
        ),
        PatternTemplate::new(
            "march",
            &[Some(0), Some(0), Some(2), R, Some(4), Some(4), Some(2), R],
            Eighth,
            Timbre::Marimba,
        ),
        PatternTemplate::new(
            "echo",
            &[Some(2), R, Some(2), R, Some(5), R, Some(5), R],
            Eighth,
            Timbre::Bell,
        ),
    ]
}
