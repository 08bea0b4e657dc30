// 2D drawing seam.
//
// The manager never rasterizes anything itself. It issues immediate-mode
// calls on a `Painter`, which a host backs with a canvas, a GPU batcher, or
// nothing at all. Transform calls are scoped by `save`/`restore` pairs, and
// every draw pass leaves the painter at the depth it started.
//
// `RecordingPainter` logs every call; tests use it to check draw order and
// save/restore balance.

use crate::geometry::{Color, Point};
use serde::{Deserialize, Serialize};

pub trait Painter {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Point);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, factor: f64);

    /// Filled closed polygon in local coordinates.
    fn fill_polygon(&mut self, points: &[Point], color: Color);
    /// Circle. `fill` and `outline` may each be absent.
    fn circle(&mut self, center: Point, radius: f64, fill: Option<Color>, outline: Option<(Color, f64)>);
    /// Open polyline. An empty `dash` draws solid.
    fn polyline(&mut self, points: &[Point], color: Color, width: f64, dash: &[f64]);
    /// Text centered on `at`, optionally outlined with `(color, width)`.
    fn text(&mut self, text: &str, at: Point, size: f64, color: Color, outline: Option<(Color, f64)>);
}

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PaintOp {
    Save,
    Restore,
    Translate { offset: Point },
    Rotate { radians: f64 },
    Scale { factor: f64 },
    FillPolygon { points: Vec<Point>, color: Color },
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Color>,
        outline: Option<(Color, f64)>,
    },
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f64,
        dash: Vec<f64>,
    },
    Text {
        text: String,
        at: Point,
        size: f64,
        color: Color,
        outline: Option<(Color, f64)>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingPainter {
    pub ops: Vec<PaintOp>,
    depth: usize,
    unbalanced: bool,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every `restore` had a matching `save` and none are open.
    pub fn is_balanced(&self) -> bool {
        !self.unbalanced && self.depth == 0
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.depth = 0;
        self.unbalanced = false;
    }
}

impl Painter for RecordingPainter {
    fn save(&mut self) {
        self.depth += 1;
        self.ops.push(PaintOp::Save);
    }

    fn restore(&mut self) {
        match self.depth.checked_sub(1) {
            Some(depth) => self.depth = depth,
            None => self.unbalanced = true,
        }
        self.ops.push(PaintOp::Restore);
    }

    fn translate(&mut self, offset: Point) {
        self.ops.push(PaintOp::Translate { offset });
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(PaintOp::Rotate { radians });
    }

    fn scale(&mut self, factor: f64) {
        self.ops.push(PaintOp::Scale { factor });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.ops.push(PaintOp::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Option<Color>, outline: Option<(Color, f64)>) {
        self.ops.push(PaintOp::Circle {
            center,
            radius,
            fill,
            outline,
        });
    }

    fn polyline(&mut self, points: &[Point], color: Color, width: f64, dash: &[f64]) {
        self.ops.push(PaintOp::Polyline {
            points: points.to_vec(),
            color,
            width,
            dash: dash.to_vec(),
        });
    }

    fn text(&mut self, text: &str, at: Point, size: f64, color: Color, outline: Option<(Color, f64)>) {
        self.ops.push(PaintOp::Text {
            text: text.to_string(),
            at,
            size,
            color,
            outline,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_tracks_nesting() {
        let mut p = RecordingPainter::new();
        p.save();
        p.save();
        p.restore();
        assert!(!p.is_balanced());
        p.restore();
        assert!(p.is_balanced());
    }

    #[test]
    fn stray_restore_is_unbalanced() {
        let mut p = RecordingPainter::new();
        p.restore();
        p.save();
        assert!(!p.is_balanced());
        p.restore();
        assert!(!p.is_balanced());
    }
}
