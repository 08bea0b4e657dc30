// Keymap configuration: the recognized alphabet, the reserved control
// subset, and the weighted behavior-tag distribution.
//
// Loaded from JSON as part of `SessionConfig` (see `keysplash_session`), or
// built from `Default`. The weight table is a `BTreeMap` so its iteration
// order (and therefore the item order fed to `weighted_pick`) is fixed by
// `BehaviorTag`'s declaration order.
//
// The default weights are percentages that sum to 95, not 100. The weighted
// pick normalizes by the total, so the relative weights are what matter;
// they are kept as-is rather than renormalized.

use crate::types::BehaviorTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Alphabet, control subset, and tag weights for a session's keymap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    /// Every recognized input symbol. Case-insensitive; duplicates collapse.
    pub alphabet: Vec<char>,
    /// Symbols reserved for loop-layer control. Must be a subset of `alphabet`.
    pub control_symbols: Vec<char>,
    /// Relative weight of each tag. Missing tags are never drawn.
    pub tag_weights: BTreeMap<BehaviorTag, f64>,
}

/// Reasons a `KeymapConfig` is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum KeymapConfigError {
    #[error("alphabet is empty")]
    EmptyAlphabet,
    #[error("control symbol {0:?} is not in the alphabet")]
    UnknownControlSymbol(char),
    #[error("weight for {tag:?} must be finite and non-negative, got {weight}")]
    InvalidWeight { tag: BehaviorTag, weight: f64 },
    #[error("tag weights sum to zero")]
    ZeroTotalWeight,
}

impl KeymapConfig {
    /// Check invariants the mapper relies on.
    pub fn validate(&self) -> Result<(), KeymapConfigError> {
        if self.alphabet.is_empty() {
            return Err(KeymapConfigError::EmptyAlphabet);
        }
        for &c in &self.control_symbols {
            let lower = c.to_ascii_lowercase();
            if !self
                .alphabet
                .iter()
                .any(|a| a.to_ascii_lowercase() == lower)
            {
                return Err(KeymapConfigError::UnknownControlSymbol(c));
            }
        }
        for (&tag, &weight) in &self.tag_weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(KeymapConfigError::InvalidWeight { tag, weight });
            }
        }
        if self.tag_weights.values().sum::<f64>() <= 0.0 {
            return Err(KeymapConfigError::ZeroTotalWeight);
        }
        Ok(())
    }
}

impl Default for KeymapConfig {
    fn default() -> Self {
        let alphabet = ('a'..='z').chain('0'..='9').collect();
        let control_symbols = vec!['q', 'w', 'e', 'a', 's', 'd'];

        let mut tag_weights = BTreeMap::new();
        tag_weights.insert(BehaviorTag::Shape, 15.0);
        tag_weights.insert(BehaviorTag::Symbol, 8.0);
        tag_weights.insert(BehaviorTag::Word, 5.0);
        tag_weights.insert(BehaviorTag::Animal, 10.0);
        tag_weights.insert(BehaviorTag::Number, 5.0);
        tag_weights.insert(BehaviorTag::Animation, 12.0);
        tag_weights.insert(BehaviorTag::Note, 15.0);
        tag_weights.insert(BehaviorTag::Chord, 5.0);
        tag_weights.insert(BehaviorTag::Effect, 8.0);
        tag_weights.insert(BehaviorTag::Loop, 4.0);
        tag_weights.insert(BehaviorTag::Burst, 5.0);
        tag_weights.insert(BehaviorTag::Flash, 3.0);

        Self {
            alphabet,
            control_symbols,
            tag_weights,
        }
    }
}
