// Timestamped input events: the session's only external input, and the unit
// of the replay log.
//
// A host translates raw key and pointer callbacks into `InputEvent`s stamped
// with its monotonic clock. Feeding the same events, in the same order, to a
// session built from the same seed and config reproduces it exactly.

use keysplash_canvas::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Host monotonic time in milliseconds.
    pub at_ms: f64,
    pub kind: InputKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    KeyDown { symbol: char },
    PointerDown { at: Point },
    PointerMove { at: Point },
    PointerUp,
    /// One render tick.
    Frame,
    /// Session end. Nothing after it is applied.
    End,
}

impl InputEvent {
    pub fn key(at_ms: f64, symbol: char) -> Self {
        Self {
            at_ms,
            kind: InputKind::KeyDown { symbol },
        }
    }

    pub fn pointer_down(at_ms: f64, x: f64, y: f64) -> Self {
        Self {
            at_ms,
            kind: InputKind::PointerDown {
                at: Point::new(x, y),
            },
        }
    }

    pub fn pointer_move(at_ms: f64, x: f64, y: f64) -> Self {
        Self {
            at_ms,
            kind: InputKind::PointerMove {
                at: Point::new(x, y),
            },
        }
    }

    pub fn pointer_up(at_ms: f64) -> Self {
        Self {
            at_ms,
            kind: InputKind::PointerUp,
        }
    }

    pub fn frame(at_ms: f64) -> Self {
        Self {
            at_ms,
            kind: InputKind::Frame,
        }
    }

    pub fn end(at_ms: f64) -> Self {
        Self {
            at_ms,
            kind: InputKind::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&InputEvent::key(12.0, 'k')).unwrap();
        assert_eq!(json, r#"{"at_ms":12.0,"kind":{"type":"key_down","symbol":"k"}}"#);
        let back: InputEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InputEvent::key(12.0, 'k'));
    }
}
