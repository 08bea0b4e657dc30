// Session configuration: one struct aggregating every component's config
// plus the controller's own knobs (control-key actions, combo detection).
//
// Loaded from JSON with `SessionConfig::from_json`, which parses and
// validates in one step. Any field may be omitted; omitted fields take their
// `Default` values.
//
// See also: `keysplash_keymap::KeymapConfig`, `keysplash_music::MixerConfig`,
// `keysplash_canvas::CanvasConfig`.

use keysplash_canvas::{CanvasConfig, CanvasConfigError};
use keysplash_keymap::{KeymapConfig, KeymapConfigError};
use keysplash_music::{MixerConfig, MixerConfigError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// What a control symbol does to the loop layers, on top of its visual
/// behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Select the next layer (4 wraps to 1).
    CycleLayer,
    TogglePlayPause,
    PitchUp,
    PitchDown,
    TempoUp,
    TempoDown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub keymap: KeymapConfig,
    pub mixer: MixerConfig,
    pub canvas: CanvasConfig,
    /// Layer action per control symbol.
    pub controls: BTreeMap<char, ControlAction>,
    /// Semitones per pitch control press.
    pub pitch_step: i8,
    /// Tempo factor per tempo control press (divided for "down").
    pub tempo_step: f64,
    /// Max gap between consecutive keys that still extends a combo.
    pub combo_window_ms: f64,
    /// Keys in a row that trigger the combo bonus.
    pub combo_threshold: u32,
}

#[derive(Debug, Error)]
pub enum SessionConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("keymap: {0}")]
    Keymap(#[from] KeymapConfigError),
    #[error("mixer: {0}")]
    Mixer(#[from] MixerConfigError),
    #[error("canvas: {0}")]
    Canvas(#[from] CanvasConfigError),
    #[error("control action bound to {0:?}, which is not a control symbol")]
    UnboundControl(char),
    #[error("control symbol {0:?} is bound twice (bindings ignore case)")]
    DuplicateControl(char),
    #[error("tempo step must be finite and greater than 1, got {0}")]
    BadTempoStep(f64),
    #[error("combo threshold must be at least 2")]
    BadComboThreshold,
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, SessionConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The layer action bound to `symbol`, matching case-insensitively.
    pub fn control_action(&self, symbol: char) -> Option<ControlAction> {
        let lower = symbol.to_ascii_lowercase();
        self.controls
            .iter()
            .find(|(c, _)| c.to_ascii_lowercase() == lower)
            .map(|(_, action)| *action)
    }

    pub fn validate(&self) -> Result<(), SessionConfigError> {
        self.keymap.validate()?;
        self.mixer.validate()?;
        self.canvas.validate()?;
        let mut seen = BTreeSet::new();
        for &symbol in self.controls.keys() {
            let lower = symbol.to_ascii_lowercase();
            if !seen.insert(lower) {
                return Err(SessionConfigError::DuplicateControl(symbol));
            }
            let bound = self
                .keymap
                .control_symbols
                .iter()
                .any(|c| c.to_ascii_lowercase() == lower);
            if !bound {
                return Err(SessionConfigError::UnboundControl(symbol));
            }
        }
        if !(self.tempo_step.is_finite() && self.tempo_step > 1.0) {
            return Err(SessionConfigError::BadTempoStep(self.tempo_step));
        }
        if self.combo_threshold < 2 {
            return Err(SessionConfigError::BadComboThreshold);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let controls = BTreeMap::from([
            ('q', ControlAction::CycleLayer),
            ('w', ControlAction::TogglePlayPause),
            ('e', ControlAction::PitchUp),
            ('s', ControlAction::PitchDown),
            ('d', ControlAction::TempoUp),
            ('a', ControlAction::TempoDown),
        ]);
        Self {
            keymap: KeymapConfig::default(),
            mixer: MixerConfig::default(),
            canvas: CanvasConfig::default(),
            controls,
            pitch_step: 1,
            tempo_step: 1.25,
            combo_window_ms: 300.0,
            combo_threshold: 5,
        }
    }
}
