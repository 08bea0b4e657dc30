// Self-expiring overlay effects. The only kind so far is the arithmetic
// flash: `a + b` appears, then `= c`, then everything fades.

use crate::config::CanvasConfig;
use crate::geometry::{Color, Point};
use crate::painter::Painter;
use crate::placement::random_point;
use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};

/// Dark rim that keeps the flash readable over bright elements.
const OUTLINE: Color = Color::hsl(0.0, 0.0, 0.1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPhase {
    FadeIn,
    SymbolReveal,
    ResultReveal,
    FadeOut,
}

impl OverlayPhase {
    /// Phase at elapsed fraction `f`, or `None` once `f >= 1`.
    pub fn at(f: f64) -> Option<Self> {
        match f {
            f if f < 0.2 => Some(OverlayPhase::FadeIn),
            f if f < 0.5 => Some(OverlayPhase::SymbolReveal),
            f if f < 0.8 => Some(OverlayPhase::ResultReveal),
            f if f < 1.0 => Some(OverlayPhase::FadeOut),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayEffect {
    /// Left operand, operator, right operand, e.g. `"3 + 4"`.
    pub equation: String,
    pub first: String,
    pub result: i64,
    pub position: Point,
    pub color: Color,
    pub started_at: f64,
    pub duration_ms: f64,
}

impl OverlayEffect {
    /// Draw order: a, b, position (x, y), hue.
    pub fn arithmetic_flash(config: &CanvasConfig, rng: &mut SessionRng, now: f64) -> Self {
        let a = rng.int_inclusive(1, 9);
        let b = rng.int_inclusive(1, 9);
        let position = random_point(config, rng);
        let color = config.draw_color(rng);
        Self {
            equation: format!("{a} + {b}"),
            first: a.to_string(),
            result: a + b,
            position,
            color,
            started_at: now,
            duration_ms: config.overlay_duration_ms,
        }
    }

    pub fn fraction(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0) / self.duration_ms
    }

    pub fn phase(&self, now: f64) -> Option<OverlayPhase> {
        OverlayPhase::at(self.fraction(now))
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.phase(now).is_none()
    }

    pub fn paint(&self, painter: &mut dyn Painter, now: f64, text_size: f64) {
        let f = self.fraction(now);
        let Some(phase) = OverlayPhase::at(f) else {
            return;
        };
        let full = format!("{} = {}", self.equation, self.result);
        let (text, alpha) = match phase {
            OverlayPhase::FadeIn => (self.first.clone(), f / 0.2),
            OverlayPhase::SymbolReveal => (self.equation.clone(), 1.0),
            OverlayPhase::ResultReveal => (full, 1.0),
            OverlayPhase::FadeOut => (full, (1.0 - f) / 0.2),
        };
        let outline = (OUTLINE.with_alpha(alpha), text_size / 16.0);
        painter.text(
            &text,
            self.position,
            text_size,
            self.color.with_alpha(alpha),
            Some(outline),
        );
    }
}
