// Visual elements: ids, glyphs, and the permanent and animated variants.
//
// An element's glyph is drawn from a small fixed table per `ElementKind`.
// Animated elements wrap the common fields with an animation kind, a start
// time, a duration, and optional motion state (a velocity for "move", a
// particle set for "explode").

use crate::geometry::{Color, Point, regular_polygon, star};
use crate::painter::Painter;
use keysplash_keymap::{AnimationKind, ElementKind};
use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};

/// Monotonic element id, unique across permanent and animated elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Triangle,
    Square,
    Pentagon,
    Hexagon,
    Star,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Square,
        ShapeKind::Pentagon,
        ShapeKind::Hexagon,
        ShapeKind::Star,
    ];
}

const SYMBOLS: [&str; 10] = ["★", "♥", "♦", "♣", "♠", "☀", "☂", "♪", "☺", "✿"];
const WORDS: [&str; 10] = [
    "sun", "moon", "star", "tree", "fish", "bird", "rain", "song", "play", "jump",
];
const ANIMALS: [&str; 10] = ["🐱", "🐶", "🐰", "🦊", "🐻", "🐼", "🐸", "🐵", "🦁", "🐧"];

/// What an element looks like.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Glyph {
    Shape(ShapeKind),
    Text(String),
}

impl Glyph {
    /// Exactly one draw for every kind.
    pub fn draw(kind: ElementKind, rng: &mut SessionRng) -> Self {
        match kind {
            ElementKind::Shape => Glyph::Shape(
                rng.pick(&ShapeKind::ALL)
                    .copied()
                    .unwrap_or(ShapeKind::Circle),
            ),
            ElementKind::Symbol => pick_text(&SYMBOLS, rng),
            ElementKind::Word => pick_text(&WORDS, rng),
            ElementKind::Animal => pick_text(&ANIMALS, rng),
            ElementKind::Number => Glyph::Text(rng.int_inclusive(0, 9).to_string()),
        }
    }

    /// Paint centered on the current origin.
    pub fn paint(&self, painter: &mut dyn Painter, size: f64, color: Color) {
        let radius = size / 2.0;
        match self {
            Glyph::Shape(ShapeKind::Circle) => {
                painter.circle(Point::default(), radius, Some(color), None);
            }
            Glyph::Shape(ShapeKind::Star) => painter.fill_polygon(&star(radius), color),
            Glyph::Shape(shape) => {
                let sides = match shape {
                    ShapeKind::Triangle => 3,
                    ShapeKind::Square => 4,
                    ShapeKind::Pentagon => 5,
                    _ => 6,
                };
                painter.fill_polygon(&regular_polygon(sides, radius), color);
            }
            Glyph::Text(text) => painter.text(text, Point::default(), size, color, None),
        }
    }
}

fn pick_text(table: &[&'static str], rng: &mut SessionRng) -> Glyph {
    Glyph::Text(rng.pick(table).copied().unwrap_or("?").to_string())
}

/// Fields shared by both element variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub glyph: Glyph,
    pub position: Point,
    pub color: Color,
    /// Diameter in pixels.
    pub size: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub scale: f64,
    pub created_at: f64,
}

impl Element {
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Paint at this element's transform, with an extra hue shift.
    pub fn paint(&self, painter: &mut dyn Painter, hue_shift: f64) {
        painter.save();
        painter.translate(self.position);
        painter.rotate(self.rotation);
        painter.scale(self.scale);
        self.glyph.paint(
            painter,
            self.size,
            self.color.shifted(hue_shift).with_alpha(self.opacity),
        );
        painter.restore();
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermanentElement {
    pub element: Element,
    /// Set once the element is past capacity; opacity then decays to zero.
    pub fading: bool,
}

/// One explode particle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Point,
    /// Pixels per second.
    pub velocity: Point,
    /// Remaining life in `[0, 1]`; doubles as opacity.
    pub life: f64,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatedElement {
    pub element: Element,
    pub animation: AnimationKind,
    pub started_at: f64,
    pub duration_ms: f64,
    /// Where the element was spawned; "bounce" bobs around it.
    pub origin: Point,
    /// Pixels per second, for "move".
    pub velocity: Option<Point>,
    /// For "explode".
    pub particles: Vec<Particle>,
}

impl AnimatedElement {
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.elapsed(now) >= self.duration_ms
    }
}
