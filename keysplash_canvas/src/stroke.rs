// Freehand strokes.
//
// `StrokeRecorder` is a two-state machine, Idle and Drawing. A stroke's
// style is drawn once when it starts and never changes. Ending a stroke with
// fewer than two points discards it; otherwise it joins a bounded history
// (oldest dropped first).

use crate::config::CanvasConfig;
use crate::geometry::{Color, Point};
use crate::painter::Painter;
use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokePattern {
    Solid,
    Dashed,
    Dotted,
    Wavy,
}

impl StrokePattern {
    pub const ALL: [StrokePattern; 4] = [
        StrokePattern::Solid,
        StrokePattern::Dashed,
        StrokePattern::Dotted,
        StrokePattern::Wavy,
    ];

    fn dash(self) -> &'static [f64] {
        match self {
            StrokePattern::Dashed => &[12.0, 8.0],
            StrokePattern::Dotted => &[2.0, 6.0],
            StrokePattern::Solid | StrokePattern::Wavy => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub thickness: f64,
    pub pattern: StrokePattern,
}

impl StrokeStyle {
    /// Draw order: hue, thickness, pattern.
    pub fn draw(config: &CanvasConfig, rng: &mut SessionRng) -> Self {
        let color = config.draw_color(rng);
        let thickness = rng.range_f64(config.stroke_thickness.0, config.stroke_thickness.1);
        let pattern = rng
            .pick(&StrokePattern::ALL)
            .copied()
            .unwrap_or(StrokePattern::Solid);
        Self {
            color,
            thickness,
            pattern,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub style: StrokeStyle,
    pub started_at: f64,
}

impl Stroke {
    pub fn paint(&self, painter: &mut dyn Painter) {
        if self.points.len() < 2 {
            return;
        }
        let style = &self.style;
        if style.pattern == StrokePattern::Wavy {
            let wavy = wave(&self.points, style.thickness * 1.5, 24.0);
            painter.polyline(&wavy, style.color, style.thickness, &[]);
        } else {
            painter.polyline(&self.points, style.color, style.thickness, style.pattern.dash());
        }
    }
}

/// Offset each point perpendicular to its segment by a sine of the distance
/// travelled so far.
fn wave(points: &[Point], amplitude: f64, wavelength: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(points.len());
    let mut travelled = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let (prev, next) = match i {
            0 => (p, points[1]),
            _ => (points[i - 1], p),
        };
        if i > 0 {
            travelled += prev.distance(p);
        }
        let seg = next - prev;
        let len = seg.length();
        let normal = if len > f64::EPSILON {
            Point::new(-seg.y / len, seg.x / len)
        } else {
            Point::default()
        };
        out.push(p + normal.scaled(amplitude * (travelled / wavelength * TAU).sin()));
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing(Stroke),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecorder {
    state: StrokeState,
    history: VecDeque<Stroke>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing(_))
    }

    pub fn current(&self) -> Option<&Stroke> {
        match &self.state {
            StrokeState::Drawing(stroke) => Some(stroke),
            StrokeState::Idle => None,
        }
    }

    /// Completed strokes, oldest first.
    pub fn history(&self) -> &VecDeque<Stroke> {
        &self.history
    }

    /// Begin a stroke at `at`. Ignored while already drawing.
    pub fn start(&mut self, at: Point, now: f64, config: &CanvasConfig, rng: &mut SessionRng) -> bool {
        if self.is_drawing() {
            return false;
        }
        self.state = StrokeState::Drawing(Stroke {
            points: vec![at],
            style: StrokeStyle::draw(config, rng),
            started_at: now,
        });
        true
    }

    /// Extend the current stroke. Ignored while idle.
    pub fn extend(&mut self, at: Point) -> bool {
        match &mut self.state {
            StrokeState::Drawing(stroke) => {
                stroke.points.push(at);
                true
            }
            StrokeState::Idle => false,
        }
    }

    /// Finish the current stroke. Returns whether it was committed.
    pub fn finish(&mut self, cap: usize) -> bool {
        let StrokeState::Drawing(stroke) = std::mem::take(&mut self.state) else {
            return false;
        };
        if stroke.points.len() < 2 {
            return false;
        }
        self.history.push_back(stroke);
        while self.history.len() > cap {
            self.history.pop_front();
        }
        true
    }

    /// History in creation order, then the stroke in progress.
    pub fn paint(&self, painter: &mut dyn Painter) {
        for stroke in &self.history {
            stroke.paint(painter);
        }
        if let Some(stroke) = self.current() {
            stroke.paint(painter);
        }
    }

    pub fn clear(&mut self) {
        self.state = StrokeState::Idle;
        self.history.clear();
    }
}
