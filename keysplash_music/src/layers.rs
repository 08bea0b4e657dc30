// The four loop layers.
//
// Layers live in a fixed-size array indexed by `LayerId`, never a map, so a
// layer's index is stable for the whole session. Each layer carries its own
// pitch offset and tempo multiplier; the transport reads them at every step,
// so control changes affect subsequent steps only.

use crate::backend::VoiceRef;
use crate::patterns::LoopPattern;
use serde::{Deserialize, Serialize};

pub const LAYER_COUNT: usize = 4;

/// Stable loop-layer id, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LayerId(u8);

impl LayerId {
    pub const ALL: [LayerId; LAYER_COUNT] = [LayerId(1), LayerId(2), LayerId(3), LayerId(4)];

    pub fn new(id: u8) -> Option<Self> {
        (1..=LAYER_COUNT as u8).contains(&id).then_some(LayerId(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// The next id, wrapping 4 back to 1.
    pub fn next(self) -> Self {
        LayerId(self.0 % LAYER_COUNT as u8 + 1)
    }
}

impl TryFrom<u8> for LayerId {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        LayerId::new(id).ok_or_else(|| format!("layer id {id} out of range 1..=4"))
    }
}

impl From<LayerId> for u8 {
    fn from(id: LayerId) -> u8 {
        id.0
    }
}

/// One loop slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopLayer {
    pub id: LayerId,
    pub pattern: Option<LoopPattern>,
    pub pitch_offset: i8,
    pub tempo: f64,
    pub is_playing: bool,
    /// Backend voice slot of the current pattern.
    pub slot: u64,
    /// Index of the next step to fire.
    pub(crate) cursor: usize,
    /// When the next step is due. Meaningful only while playing.
    pub(crate) next_step_at_ms: f64,
}

impl LoopLayer {
    pub fn empty(id: LayerId) -> Self {
        Self {
            id,
            pattern: None,
            pitch_offset: 0,
            tempo: 1.0,
            is_playing: false,
            slot: 0,
            cursor: 0,
            next_step_at_ms: 0.0,
        }
    }

    /// The backend voice playing this layer's pattern, if it has one.
    pub fn voice(&self) -> Option<VoiceRef> {
        self.pattern.as_ref().map(|p| VoiceRef::Layer {
            layer: self.id,
            slot: self.slot,
            timbre: p.timbre,
        })
    }

    /// Current step length, taking the tempo multiplier into account.
    pub fn step_ms(&self) -> Option<f64> {
        self.pattern.as_ref().map(|p| p.step_ms / self.tempo)
    }
}
