// 2D points and HSL colors.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Add, Sub};

/// A position or vector in canvas pixels. Y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector at `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Hue/saturation/lightness color with alpha.
///
/// Hue is in degrees `[0, 360)`; saturation, lightness and alpha are in
/// `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::hsl(0.0, 0.0, 1.0);

    pub const fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l, a: 1.0 }
    }

    /// Toy palette: saturated, mid-light, hue as given.
    pub const fn vivid(h: f64) -> Self {
        Self::hsl(h, 0.8, 0.6)
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Rotate the hue, wrapping into `[0, 360)`.
    pub fn shifted(self, degrees: f64) -> Self {
        Self {
            h: (self.h + degrees).rem_euclid(360.0),
            ..self
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsla({:.0}, {:.0}%, {:.0}%, {:.2})",
            self.h,
            self.s * 100.0,
            self.l * 100.0,
            self.a
        )
    }
}

/// Vertices of a regular polygon of `sides` centered on the origin, first
/// vertex pointing up.
pub fn regular_polygon(sides: usize, radius: f64) -> SmallVec<[Point; 8]> {
    (0..sides)
        .map(|i| Point::from_angle(i as f64 * TAU / sides as f64 - TAU / 4.0).scaled(radius))
        .collect()
}

/// Vertices of a five-pointed star centered on the origin.
pub fn star(radius: f64) -> SmallVec<[Point; 10]> {
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { radius } else { radius * 0.45 };
            Point::from_angle(i as f64 * TAU / 10.0 - TAU / 4.0).scaled(r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn hue_shift_wraps() {
        let c = Color::vivid(350.0).shifted(20.0);
        assert!((c.h - 10.0).abs() < 1e-9);
        let c = Color::vivid(5.0).shifted(-10.0);
        assert!((c.h - 355.0).abs() < 1e-9);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Color::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Color::WHITE.with_alpha(-1.0).a, 0.0);
    }

    #[test]
    fn polygon_vertices_sit_on_radius() {
        for p in regular_polygon(6, 10.0) {
            assert!((p.length() - 10.0).abs() < 1e-9);
        }
        assert_eq!(star(5.0).len(), 10);
    }

    #[test]
    fn color_display_is_css() {
        assert_eq!(Color::hsl(120.0, 0.5, 0.25).to_string(), "hsla(120, 50%, 25%, 1.00)");
    }
}
