// Fixed library of short one-shot sound effects.
//
// Effects bypass the polyphony ceiling: each plays on its own transient
// voice, which the mixer disposes after `MixerConfig::effect_lifetime_ms`.

use crate::backend::DurationClass;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    Pop,
    Whoosh,
    Zap,
    Boing,
    Chirp,
    Thump,
    Chime,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 7] = [
        SoundEffect::Pop,
        SoundEffect::Whoosh,
        SoundEffect::Zap,
        SoundEffect::Boing,
        SoundEffect::Chirp,
        SoundEffect::Thump,
        SoundEffect::Chime,
    ];

    /// Pitch hint for the backend. Noise-based effects carry none.
    pub fn note(self) -> Option<u8> {
        match self {
            SoundEffect::Pop => Some(84),
            SoundEffect::Whoosh => None,
            SoundEffect::Zap => Some(96),
            SoundEffect::Boing => Some(55),
            SoundEffect::Chirp => Some(91),
            SoundEffect::Thump => Some(36),
            SoundEffect::Chime => Some(88),
        }
    }

    pub fn duration(self) -> DurationClass {
        match self {
            SoundEffect::Pop | SoundEffect::Zap | SoundEffect::Thump => DurationClass::Sixteenth,
            SoundEffect::Chirp | SoundEffect::Boing => DurationClass::Eighth,
            SoundEffect::Whoosh => DurationClass::Quarter,
            SoundEffect::Chime => DurationClass::Half,
        }
    }
}
