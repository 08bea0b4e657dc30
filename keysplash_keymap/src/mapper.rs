// Keyboard mapper: builds the session's fixed symbol → behavior table.
//
// The table is built once, at construction, from a fresh `SessionRng` seeded
// with the session seed. Draw order:
//
//   1. Surprise symbol: one uniform pick over the non-control symbols.
//   2. Each non-control symbol, in ascending `char` order: a count in [1, 2],
//      then `count` weighted tag draws. A tag already chosen for the symbol is
//      skipped (so a symbol may end up with one tag even when two were
//      requested). Each accepted tag's parameters are drawn immediately.
//   3. Each control symbol, in ascending `char` order: one uniform pick from
//      the visual-only control tags, then its parameters.
//
// After construction the mapper is read-only. Whether the surprise symbol has
// already fired is the caller's state, not the mapper's.
//
// **Critical constraint: determinism.** The canonical order comes from
// `BTreeSet<char>`, never from the caller's alphabet order, so two callers
// passing the same symbols in different orders get the same table.

use crate::config::KeymapConfig;
use crate::types::{AnimationKind, Behavior, BehaviorTag, ElementKind, SynthMode};
use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// The behaviors assigned to one input symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorEntry {
    pub symbol: char,
    /// One or two behaviors, in the order they fire.
    pub behaviors: SmallVec<[Behavior; 2]>,
    /// True for the session's one surprise symbol.
    pub surprise: bool,
}

impl BehaviorEntry {
    /// Tags of this entry's behaviors, in firing order.
    pub fn tags(&self) -> impl Iterator<Item = BehaviorTag> + '_ {
        self.behaviors.iter().map(Behavior::tag)
    }
}

/// Seeded, immutable symbol → behavior table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyboardMapper {
    seed: u32,
    entries: BTreeMap<char, BehaviorEntry>,
    surprise: Option<char>,
    controls: BTreeSet<char>,
}

impl KeyboardMapper {
    /// Build the table for `seed` from the given alphabet, control subset and
    /// weights.
    pub fn new(seed: u32, config: &KeymapConfig) -> Self {
        let mut rng = SessionRng::new(seed);

        let alphabet: BTreeSet<char> = config
            .alphabet
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let controls: BTreeSet<char> = config
            .control_symbols
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| alphabet.contains(c))
            .collect();
        let regular: Vec<char> = alphabet
            .iter()
            .copied()
            .filter(|c| !controls.contains(c))
            .collect();

        let (tags, weights): (Vec<BehaviorTag>, Vec<f64>) = config
            .tag_weights
            .iter()
            .map(|(&tag, &weight)| (tag, weight))
            .unzip();

        let surprise = rng.pick(&regular).copied();

        let mut entries = BTreeMap::new();
        for &symbol in &regular {
            let count = rng.int_inclusive(1, 2);
            let mut behaviors: SmallVec<[Behavior; 2]> = SmallVec::new();
            for _ in 0..count {
                let Some(&tag) = rng.weighted_pick(&tags, &weights) else {
                    break;
                };
                if behaviors.iter().any(|b| b.tag() == tag) {
                    continue;
                }
                behaviors.push(derive_behavior(tag, &mut rng));
            }
            entries.insert(
                symbol,
                BehaviorEntry {
                    symbol,
                    behaviors,
                    surprise: surprise == Some(symbol),
                },
            );
        }

        for &symbol in &controls {
            let tag = rng
                .pick(&BehaviorTag::CONTROL)
                .copied()
                .unwrap_or(BehaviorTag::Shape);
            let mut behaviors: SmallVec<[Behavior; 2]> = SmallVec::new();
            behaviors.push(derive_behavior(tag, &mut rng));
            entries.insert(
                symbol,
                BehaviorEntry {
                    symbol,
                    behaviors,
                    surprise: false,
                },
            );
        }

        tracing::debug!(
            seed,
            symbols = entries.len(),
            surprise = ?surprise,
            "built behavior table"
        );

        Self {
            seed,
            entries,
            surprise,
            controls,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The entry for `symbol` (case-insensitive), or `None` if the symbol is
    /// not in the alphabet.
    pub fn lookup(&self, symbol: char) -> Option<&BehaviorEntry> {
        self.entries.get(&symbol.to_ascii_lowercase())
    }

    /// Whether `symbol` is the session's surprise symbol.
    ///
    /// Stateless: this answers the same way every time. The caller marks the
    /// surprise as consumed after it fires.
    pub fn is_surprise(&self, symbol: char) -> bool {
        self.surprise == Some(symbol.to_ascii_lowercase())
    }

    pub fn surprise_symbol(&self) -> Option<char> {
        self.surprise
    }

    /// Whether `symbol` belongs to the reserved control subset.
    pub fn is_control(&self, symbol: char) -> bool {
        self.controls.contains(&symbol.to_ascii_lowercase())
    }

    /// Every entry in canonical (ascending symbol) order.
    pub fn entries(&self) -> impl Iterator<Item = &BehaviorEntry> {
        self.entries.values()
    }
}

/// Draw the parameters a tag needs and wrap them in a `Behavior`.
fn derive_behavior(tag: BehaviorTag, rng: &mut SessionRng) -> Behavior {
    match tag {
        BehaviorTag::Shape => Behavior::Spawn {
            kind: ElementKind::Shape,
        },
        BehaviorTag::Symbol => Behavior::Spawn {
            kind: ElementKind::Symbol,
        },
        BehaviorTag::Word => Behavior::Spawn {
            kind: ElementKind::Word,
        },
        BehaviorTag::Animal => Behavior::Spawn {
            kind: ElementKind::Animal,
        },
        BehaviorTag::Number => Behavior::Spawn {
            kind: ElementKind::Number,
        },
        BehaviorTag::Animation => Behavior::Animate {
            animation: rng
                .pick(&AnimationKind::ALL)
                .copied()
                .unwrap_or(AnimationKind::Bounce),
        },
        BehaviorTag::Note => Behavior::Note {
            mode: pick_mode(rng),
        },
        BehaviorTag::Chord => Behavior::Chord {
            mode: pick_mode(rng),
        },
        BehaviorTag::Effect => Behavior::Effect,
        BehaviorTag::Loop => Behavior::Loop,
        BehaviorTag::Burst => Behavior::Burst,
        BehaviorTag::Flash => Behavior::Flash,
    }
}

fn pick_mode(rng: &mut SessionRng) -> SynthMode {
    rng.pick(&SynthMode::ALL).copied().unwrap_or(SynthMode::Sine)
}
