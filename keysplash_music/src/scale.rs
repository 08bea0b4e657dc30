// Pentatonic scale support for session-wide note selection.
//
// A session draws its scale once: a root from the configured root-note set,
// then major or minor pentatonic. Pentatonic scales have no semitone steps
// and no tritone, so any sequence of notes drawn from one stays consonant,
// which is what lets keystrokes pick notes blindly.
//
// This module provides:
// - Scale kinds with their interval patterns
// - A two-octave note table
// - Degree-to-pitch mapping that extends past the table by octaves
// - Triads built by skipping every other degree
//
// Used by mixer.rs for note and chord selection and by patterns.rs to
// resolve pattern degrees to pitches.

use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};

/// Degrees per octave in a pentatonic scale.
pub const DEGREES_PER_OCTAVE: usize = 5;

/// Octaves covered by the note table.
pub const OCTAVES: usize = 2;

/// The two pentatonic interval sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// C D E G A
    MajorPentatonic,
    /// C Eb F G Bb
    MinorPentatonic,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 2] = [ScaleKind::MajorPentatonic, ScaleKind::MinorPentatonic];

    /// Semitone intervals from the root to each degree.
    pub fn intervals(self) -> [u8; DEGREES_PER_OCTAVE] {
        match self {
            ScaleKind::MajorPentatonic => [0, 2, 4, 7, 9],
            ScaleKind::MinorPentatonic => [0, 3, 5, 7, 10],
        }
    }
}

/// A session's scale: root, kind, and the precomputed two-octave note table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub root: u8,
    pub kind: ScaleKind,
    notes: Vec<u8>,
}

impl Scale {
    pub fn new(root: u8, kind: ScaleKind) -> Self {
        let notes = (0..DEGREES_PER_OCTAVE * OCTAVES)
            .map(|degree| degree_pitch(root, kind, degree))
            .collect();
        Scale { root, kind, notes }
    }

    /// Draw a root from `roots`, then a scale kind. Falls back to middle C
    /// when `roots` is empty.
    pub fn draw(roots: &[u8], rng: &mut SessionRng) -> Self {
        let root = rng.pick(roots).copied().unwrap_or(60);
        let kind = rng
            .pick(&ScaleKind::ALL)
            .copied()
            .unwrap_or(ScaleKind::MajorPentatonic);
        Scale::new(root, kind)
    }

    /// The two-octave note table, lowest first.
    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    /// Pitch of `degree`, extending beyond the table by whole octaves.
    /// Clamped to the MIDI range.
    pub fn note_at(&self, degree: usize) -> u8 {
        degree_pitch(self.root, self.kind, degree)
    }

    /// Three notes stacked on every other degree starting at `degree`.
    pub fn triad(&self, degree: usize) -> [u8; 3] {
        [
            self.note_at(degree),
            self.note_at(degree + 2),
            self.note_at(degree + 4),
        ]
    }

    /// Whether a MIDI pitch belongs to this scale (any octave).
    pub fn contains(&self, pitch: u8) -> bool {
        let pc = (pitch as u16 + 12 - (self.root % 12) as u16) % 12;
        self.kind.intervals().contains(&(pc as u8))
    }
}

fn degree_pitch(root: u8, kind: ScaleKind, degree: usize) -> u8 {
    let octave = (degree / DEGREES_PER_OCTAVE) as u32;
    let interval = kind.intervals()[degree % DEGREES_PER_OCTAVE] as u32;
    (root as u32 + octave * 12 + interval).min(127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_pentatonic_table() {
        let scale = Scale::new(60, ScaleKind::MajorPentatonic);
        assert_eq!(
            scale.notes(),
            &[60, 62, 64, 67, 69, 72, 74, 76, 79, 81]
        );
    }

    #[test]
    fn note_at_extends_by_octave() {
        let scale = Scale::new(60, ScaleKind::MinorPentatonic);
        assert_eq!(scale.note_at(0), 60);
        assert_eq!(scale.note_at(10), 84);
        assert_eq!(scale.note_at(11), 87);
    }

    #[test]
    fn every_table_note_is_in_scale() {
        for kind in ScaleKind::ALL {
            for root in [60u8, 62, 65, 69] {
                let scale = Scale::new(root, kind);
                assert!(scale.notes().iter().all(|&n| scale.contains(n)));
                assert!(scale.triad(3).iter().all(|&n| scale.contains(n)));
            }
        }
    }

    #[test]
    fn no_semitone_steps() {
        for kind in ScaleKind::ALL {
            let scale = Scale::new(62, kind);
            for pair in scale.notes().windows(2) {
                assert!(pair[1] - pair[0] >= 2, "{kind:?}: {pair:?}");
            }
        }
    }

    #[test]
    fn pitch_clamped_to_midi_range() {
        let scale = Scale::new(120, ScaleKind::MajorPentatonic);
        assert_eq!(scale.note_at(9), 127);
    }

    #[test]
    fn draw_is_deterministic() {
        let roots = [60, 62, 64, 65, 67, 69];
        let a = Scale::draw(&roots, &mut SessionRng::new(42));
        let b = Scale::draw(&roots, &mut SessionRng::new(42));
        assert_eq!(a, b);
        assert!(roots.contains(&a.root));
    }
}
