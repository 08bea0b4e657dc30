// Keysplash session controller.
//
// Glues the deterministic components together for one session: the keymap
// decides what a key does, the mixer plays it, the canvas shows it. The host
// supplies timestamped input events and, optionally, a synth backend and a
// painter; everything else is decided by the seed.
//
// Architecture:
// - `config.rs`: `SessionConfig`: all component configs plus control
//   actions and combo tuning, loaded from JSON
// - `input.rs`: `InputEvent`: the replayable input vocabulary
// - `session.rs`: `Session`: routing, surprise and combo state, replay log
//
// See also: `keysplash_keymap`, `keysplash_music`, `keysplash_canvas`.

pub mod config;
pub mod input;
pub mod session;

pub use config::{ControlAction, SessionConfig, SessionConfigError};
pub use input::{InputEvent, InputKind};
pub use session::{KeyReport, Session};
