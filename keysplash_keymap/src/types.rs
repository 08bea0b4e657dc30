// Shared vocabulary: element kinds, animation kinds, synth modes, and
// behavior tags.
//
// These types are consumed by the music crate (synth modes), the canvas
// crate (element and animation kinds), and the mapper in this crate
// (behavior tags and their derived parameters). Keeping them here gives all
// three a single source of truth.
//
// The type hierarchy is:
// - `ElementKind`: what a visual element depicts (shape, symbol, word, animal, number)
// - `AnimationKind`: motion profile for an animated element
// - `SynthMode`: one of the five persistent named voices
// - `BehaviorTag`: a weighted label in the distribution table
// - `Behavior`: a tag plus the parameters derived for it at session start
//
// Every `ALL` array lists variants in declaration order. Generator draws
// index into these arrays, so reordering variants changes every session.

use serde::{Deserialize, Serialize};

/// What a visual element depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Shape,
    Symbol,
    Word,
    Animal,
    Number,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Shape,
        ElementKind::Symbol,
        ElementKind::Word,
        ElementKind::Animal,
        ElementKind::Number,
    ];
}

/// Motion profile of an animated element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    /// Vertical bob around the spawn point.
    Bounce,
    /// Straight-line drift that bounces off canvas edges.
    Move,
    /// Rotation in place.
    Spin,
    /// Radial particle burst under gravity.
    Explode,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 4] = [
        AnimationKind::Bounce,
        AnimationKind::Move,
        AnimationKind::Spin,
        AnimationKind::Explode,
    ];
}

/// One of the five persistent synth voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthMode {
    Sine,
    Triangle,
    Square,
    Sawtooth,
    Fm,
}

impl SynthMode {
    pub const ALL: [SynthMode; 5] = [
        SynthMode::Sine,
        SynthMode::Triangle,
        SynthMode::Square,
        SynthMode::Sawtooth,
        SynthMode::Fm,
    ];
}

/// A label in the weighted behavior distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorTag {
    Shape,
    Symbol,
    Word,
    Animal,
    Number,
    Animation,
    Note,
    Chord,
    Effect,
    Loop,
    Burst,
    Flash,
}

impl BehaviorTag {
    pub const ALL: [BehaviorTag; 12] = [
        BehaviorTag::Shape,
        BehaviorTag::Symbol,
        BehaviorTag::Word,
        BehaviorTag::Animal,
        BehaviorTag::Number,
        BehaviorTag::Animation,
        BehaviorTag::Note,
        BehaviorTag::Chord,
        BehaviorTag::Effect,
        BehaviorTag::Loop,
        BehaviorTag::Burst,
        BehaviorTag::Flash,
    ];

    /// Tags a control symbol may receive. Visual only.
    pub const CONTROL: [BehaviorTag; 4] = [
        BehaviorTag::Animation,
        BehaviorTag::Shape,
        BehaviorTag::Symbol,
        BehaviorTag::Animal,
    ];

    /// True for tags that make sound.
    pub fn is_audio(self) -> bool {
        matches!(
            self,
            BehaviorTag::Note | BehaviorTag::Chord | BehaviorTag::Effect | BehaviorTag::Loop
        )
    }

    /// The element kind this tag spawns directly, if it names one.
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            BehaviorTag::Shape => Some(ElementKind::Shape),
            BehaviorTag::Symbol => Some(ElementKind::Symbol),
            BehaviorTag::Word => Some(ElementKind::Word),
            BehaviorTag::Animal => Some(ElementKind::Animal),
            BehaviorTag::Number => Some(ElementKind::Number),
            _ => None,
        }
    }
}

/// A behavior with its parameters resolved.
///
/// Built once per symbol at session start. The session controller dispatches
/// on this with an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Behavior {
    /// Place a permanent element of the given kind.
    Spawn { kind: ElementKind },
    /// Place an animated element with a fixed motion profile.
    Animate { animation: AnimationKind },
    /// Play one note on the given synth voice.
    Note { mode: SynthMode },
    /// Strum a chord from the session scale on the given synth voice.
    Chord { mode: SynthMode },
    /// Play a one-shot sound effect.
    Effect,
    /// Start a loop on a random layer.
    Loop,
    /// Scatter a themed particle burst.
    Burst,
    /// Flash an arithmetic overlay.
    Flash,
}

impl Behavior {
    /// The tag this behavior was derived from.
    pub fn tag(&self) -> BehaviorTag {
        match self {
            Behavior::Spawn { kind } => match kind {
                ElementKind::Shape => BehaviorTag::Shape,
                ElementKind::Symbol => BehaviorTag::Symbol,
                ElementKind::Word => BehaviorTag::Word,
                ElementKind::Animal => BehaviorTag::Animal,
                ElementKind::Number => BehaviorTag::Number,
            },
            Behavior::Animate { .. } => BehaviorTag::Animation,
            Behavior::Note { .. } => BehaviorTag::Note,
            Behavior::Chord { .. } => BehaviorTag::Chord,
            Behavior::Effect => BehaviorTag::Effect,
            Behavior::Loop => BehaviorTag::Loop,
            Behavior::Burst => BehaviorTag::Burst,
            Behavior::Flash => BehaviorTag::Flash,
        }
    }
}
