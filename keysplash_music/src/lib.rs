// Keysplash composition mixer.
//
// Turns "play something" requests from the session into concrete note,
// chord, effect and loop triggers on a pluggable synthesis backend, while
// keeping the number of sounding voices bounded.
//
// Architecture:
// - `config.rs`: `MixerConfig`: ceilings, clamp ranges, timing, root notes
// - `scale.rs`: `Scale`: session pentatonic scale (drawn once)
// - `backend.rs`: `SynthBackend` trait, `VoiceRef`, `Trigger`, `RecordingBackend`
// - `effects.rs`: `SoundEffect`: fixed one-shot library
// - `patterns.rs`: `PatternTemplate` library and resolved `LoopPattern`s
// - `layers.rs`: `LayerId`, `LoopLayer`: the four loop slots
// - `mixer.rs`: `CompositionMixer`: everything above wired together
//
// Depends on `keysplash_keymap` for `SynthMode` and `keysplash_prng` for
// `SessionRng`. See `keysplash_session` for the caller.

pub mod backend;
pub mod config;
pub mod effects;
pub mod layers;
pub mod mixer;
pub mod patterns;
pub mod scale;

pub use backend::{BackendCall, DurationClass, RecordingBackend, SynthBackend, Trigger, VoiceRef};
pub use config::{MixerConfig, MixerConfigError};
pub use effects::SoundEffect;
pub use layers::{LayerId, LoopLayer};
pub use mixer::{ActiveVoice, CompositionMixer};
pub use patterns::{LoopPattern, PatternTemplate, Timbre};
pub use scale::{Scale, ScaleKind};
