// Shared Keysplash vocabulary and the keyboard-to-behavior table.
//
// Provides the closed set of element kinds, animation kinds, synth modes and
// behavior tags used by both `keysplash_music` (synth modes) and
// `keysplash_canvas` (element and animation kinds), plus the seeded mapper
// that assigns behaviors to input symbols. No audio or drawing dependencies.
//
// Architecture:
// - `types.rs`: `ElementKind`, `AnimationKind`, `SynthMode`, `BehaviorTag`, `Behavior`
// - `config.rs`: `KeymapConfig`: alphabet, control subset, tag weights
// - `mapper.rs`: `KeyboardMapper`: builds and queries the behavior table
//
// Determinism constraint: all randomness goes through
// `keysplash_prng::SessionRng`; ordered collections are `BTreeMap`/`BTreeSet`.

pub mod config;
pub mod mapper;
pub mod types;

// Re-export key types at crate root for convenience.
pub use config::{KeymapConfig, KeymapConfigError};
pub use mapper::{BehaviorEntry, KeyboardMapper};
pub use types::{AnimationKind, Behavior, BehaviorTag, ElementKind, SynthMode};
