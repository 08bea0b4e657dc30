// Where new elements and bursts land.
//
// Both searches are bounded: a fixed number of candidate draws, then a
// deterministic fallback, so a crowded canvas costs the same as an empty one.

use crate::config::CanvasConfig;
use crate::geometry::Point;
use keysplash_prng::SessionRng;

/// Find a spot for an element of diameter `size`.
///
/// Draws up to `placement_attempts` candidates (x then y) inside the canvas
/// minus its margin and accepts the first one that does not overlap any of
/// `recent` (center, diameter) pairs. When every attempt collides, the last
/// candidate is used anyway.
pub fn find_position(
    config: &CanvasConfig,
    rng: &mut SessionRng,
    size: f64,
    recent: &[(Point, f64)],
) -> Point {
    let mut candidate = center(config);
    for _ in 0..config.placement_attempts {
        candidate = random_point(config, rng);
        let clear = recent
            .iter()
            .all(|&(pos, other)| pos.distance(candidate) > (size + other) / 2.0);
        if clear {
            return candidate;
        }
    }
    tracing::trace!(%candidate, "no clear spot; placing anyway");
    candidate
}

/// Pick a burst origin outside the central exclusion zone.
///
/// Retries up to `burst_attempts` times; if every draw lands inside the zone,
/// the last one is pushed radially out to just past its edge.
pub fn burst_origin(config: &CanvasConfig, rng: &mut SessionRng) -> Point {
    let c = center(config);
    let radius = config.exclusion_radius();
    let mut candidate = c;
    for _ in 0..config.burst_attempts {
        candidate = random_point(config, rng);
        if candidate.distance(c) > radius {
            return candidate;
        }
    }
    push_outside(candidate, c, radius)
}

pub fn center(config: &CanvasConfig) -> Point {
    Point::new(config.width / 2.0, config.height / 2.0)
}

/// Uniform point inside the margins. Two draws: x, then y.
pub fn random_point(config: &CanvasConfig, rng: &mut SessionRng) -> Point {
    let (x_lo, x_hi) = inner_span(config.width, config.margin);
    let (y_lo, y_hi) = inner_span(config.height, config.margin);
    Point::new(rng.range_f64(x_lo, x_hi), rng.range_f64(y_lo, y_hi))
}

fn inner_span(extent: f64, margin: f64) -> (f64, f64) {
    if extent - margin > margin {
        (margin, extent - margin)
    } else {
        (extent / 2.0, extent / 2.0)
    }
}

fn push_outside(point: Point, center: Point, radius: f64) -> Point {
    let offset = point - center;
    let len = offset.length();
    let direction = if len > f64::EPSILON {
        offset.scaled(1.0 / len)
    } else {
        Point::new(1.0, 0.0)
    };
    center + direction.scaled(radius + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_respect_margin() {
        let config = CanvasConfig::default();
        let mut rng = SessionRng::new(4);
        for _ in 0..500 {
            let p = find_position(&config, &mut rng, 40.0, &[]);
            assert!(p.x >= config.margin && p.x < config.width - config.margin);
            assert!(p.y >= config.margin && p.y < config.height - config.margin);
        }
    }

    #[test]
    fn empty_canvas_accepts_first_candidate() {
        let config = CanvasConfig::default();
        let mut a = SessionRng::new(17);
        let mut b = SessionRng::new(17);
        let placed = find_position(&config, &mut a, 50.0, &[]);
        assert_eq!(placed, random_point(&config, &mut b));
        assert_eq!(a, b);
    }

    #[test]
    fn avoids_recent_elements_when_possible() {
        let config = CanvasConfig::default();
        let mut rng = SessionRng::new(5);
        let recent = vec![(Point::new(640.0, 360.0), 60.0)];
        for _ in 0..200 {
            let p = find_position(&config, &mut rng, 40.0, &recent);
            assert!(p.distance(recent[0].0) > 50.0);
        }
    }

    #[test]
    fn saturated_canvas_falls_back_to_last_candidate() {
        let config = CanvasConfig::default();
        // One giant neighbor covering everything.
        let recent = vec![(center(&config), 10_000.0)];
        let mut rng = SessionRng::new(6);
        let mut shadow = rng.clone();
        let placed = find_position(&config, &mut rng, 40.0, &recent);
        let mut last = Point::default();
        for _ in 0..config.placement_attempts {
            last = random_point(&config, &mut shadow);
        }
        assert_eq!(placed, last);
        assert_eq!(rng, shadow);
    }

    #[test]
    fn burst_origin_is_outside_exclusion_zone() {
        let config = CanvasConfig::default();
        for seed in 0..300 {
            let mut rng = SessionRng::new(seed);
            let origin = burst_origin(&config, &mut rng);
            assert!(origin.distance(center(&config)) > config.exclusion_radius());
        }
    }

    #[test]
    fn burst_origin_pushed_out_when_canvas_is_all_zone() {
        // A canvas whose whole inner area lies within the exclusion radius.
        let config = CanvasConfig {
            width: 200.0,
            height: 200.0,
            margin: 80.0,
            burst_exclusion_fraction: 0.45,
            ..CanvasConfig::default()
        };
        let mut rng = SessionRng::new(1);
        let origin = burst_origin(&config, &mut rng);
        let d = origin.distance(center(&config));
        assert!(d > config.exclusion_radius());
        assert!(d < config.exclusion_radius() + 1.5);
    }
}
