// Synthesis backend seam.
//
// The mixer decides what to play and when; a `SynthBackend` turns those
// decisions into sound on its own audio clock. The trait is note-level: the
// loop transport lives in the mixer (`pump_loops`), so a backend only needs
// to schedule single triggers relative to "now".
//
// `RecordingBackend` captures every call in order. Tests and the replay check
// in `keysplash_session` compare its log across runs.

use crate::effects::SoundEffect;
use crate::layers::LayerId;
use crate::patterns::Timbre;
use keysplash_keymap::SynthMode;
use serde::{Deserialize, Serialize};

/// Note-length classes, relative to the mixer's base tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    Sixteenth,
    Eighth,
    Quarter,
    Half,
}

impl DurationClass {
    /// Classes a single triggered note may draw from.
    pub const NOTE_CHOICES: [DurationClass; 3] = [
        DurationClass::Sixteenth,
        DurationClass::Eighth,
        DurationClass::Quarter,
    ];

    /// Length in beats (quarter note = 1).
    pub fn beats(self) -> f64 {
        match self {
            DurationClass::Sixteenth => 0.25,
            DurationClass::Eighth => 0.5,
            DurationClass::Quarter => 1.0,
            DurationClass::Half => 2.0,
        }
    }

    pub fn millis(self, bpm: f64) -> f64 {
        self.beats() * 60_000.0 / bpm
    }
}

/// Which backend sound generator a call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VoiceRef {
    /// One of the five persistent voices, reused across triggers.
    Named { mode: SynthMode },
    /// A transient one-shot voice. `id` is unique within the session.
    Effect { id: u64, effect: SoundEffect },
    /// The voice bound to one loop assignment. `slot` is fresh for every
    /// `start_loop`, so a replaced pattern never shares a voice with the old one.
    Layer { layer: LayerId, slot: u64, timbre: Timbre },
}

/// One scheduled sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// MIDI note, or `None` for unpitched effects.
    pub note: Option<u8>,
    pub duration: DurationClass,
    /// Delay from the moment of the call, in milliseconds.
    pub start_offset_ms: f64,
    pub velocity: f32,
}

/// The operations the mixer needs from an audio engine.
pub trait SynthBackend {
    fn trigger_voice(&mut self, voice: VoiceRef, trigger: Trigger);
    fn set_detune(&mut self, voice: VoiceRef, cents: f32);
    /// Silence a voice; it may be triggered again afterwards.
    fn stop(&mut self, voice: VoiceRef);
    /// Release a voice's resources. It is never addressed again.
    fn dispose(&mut self, voice: VoiceRef);
}

/// A backend call, as captured by `RecordingBackend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum BackendCall {
    Trigger { voice: VoiceRef, trigger: Trigger },
    SetDetune { voice: VoiceRef, cents: f32 },
    Stop { voice: VoiceRef },
    Dispose { voice: VoiceRef },
}

/// Backend that makes no sound and logs every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggers(&self) -> impl Iterator<Item = (&VoiceRef, &Trigger)> {
        self.calls.iter().filter_map(|call| match call {
            BackendCall::Trigger { voice, trigger } => Some((voice, trigger)),
            _ => None,
        })
    }
}

impl SynthBackend for RecordingBackend {
    fn trigger_voice(&mut self, voice: VoiceRef, trigger: Trigger) {
        self.calls.push(BackendCall::Trigger { voice, trigger });
    }

    fn set_detune(&mut self, voice: VoiceRef, cents: f32) {
        self.calls.push(BackendCall::SetDetune { voice, cents });
    }

    fn stop(&mut self, voice: VoiceRef) {
        self.calls.push(BackendCall::Stop { voice });
    }

    fn dispose(&mut self, voice: VoiceRef) {
        self.calls.push(BackendCall::Dispose { voice });
    }
}
