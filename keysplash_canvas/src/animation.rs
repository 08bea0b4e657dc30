// Per-kind animation state: spawn parameters and per-frame advancement.
//
// `AnimationSetup::draw` consumes the generator for everything a new
// animated element needs beyond its common fields. `advance` integrates one
// frame of `dt` milliseconds; it never draws from the generator, so a frame
// is a pure function of state and time.

use crate::config::CanvasConfig;
use crate::element::{AnimatedElement, Particle};
use crate::geometry::Point;
use keysplash_keymap::AnimationKind;
use keysplash_prng::SessionRng;
use std::f64::consts::{PI, TAU};

/// Bob period for "bounce".
const BOUNCE_PERIOD_MS: f64 = 600.0;

/// Kind-specific spawn parameters.
pub struct AnimationSetup {
    pub duration_ms: f64,
    pub velocity: Option<Point>,
    pub particles: Vec<Particle>,
}

impl AnimationSetup {
    /// Draw order: duration (non-explode only), then velocity angle and
    /// speed for "move", or one speed per particle for "explode".
    pub fn draw(
        kind: AnimationKind,
        origin: Point,
        config: &CanvasConfig,
        rng: &mut SessionRng,
    ) -> Self {
        let duration_ms = match kind {
            AnimationKind::Explode => config.explode_duration_ms,
            _ => rng.range_f64(config.animation_duration_ms.0, config.animation_duration_ms.1),
        };
        let mut setup = Self {
            duration_ms,
            velocity: None,
            particles: Vec::new(),
        };
        match kind {
            AnimationKind::Move => {
                let angle = rng.range_f64(0.0, TAU);
                let speed = rng.range_f64(config.move_speed.0, config.move_speed.1);
                setup.velocity = Some(Point::from_angle(angle).scaled(speed));
            }
            AnimationKind::Explode => {
                let count = config.explode_particle_count;
                setup.particles = (0..count)
                    .map(|i| {
                        let angle = i as f64 * TAU / count as f64;
                        let speed =
                            rng.range_f64(config.particle_speed.0, config.particle_speed.1);
                        Particle {
                            position: origin,
                            velocity: Point::from_angle(angle).scaled(speed),
                            life: 1.0,
                            radius: 4.0,
                        }
                    })
                    .collect();
            }
            AnimationKind::Bounce | AnimationKind::Spin => {}
        }
        setup
    }
}

/// Advance one animated element by `dt` ms, ending at time `now`.
pub fn advance(anim: &mut AnimatedElement, config: &CanvasConfig, now: f64, dt: f64) {
    let secs = dt / 1000.0;
    let elapsed = anim.elapsed(now);
    match anim.animation {
        AnimationKind::Move => {
            if let Some(v) = anim.velocity.as_mut() {
                let e = &mut anim.element;
                let r = e.size / 2.0;
                e.position = e.position + v.scaled(secs);
                bounce_axis(&mut e.position.x, &mut v.x, r, config.width - r);
                bounce_axis(&mut e.position.y, &mut v.y, r, config.height - r);
            }
        }
        AnimationKind::Bounce => {
            let amplitude = anim.element.size * 0.6;
            let lift = (elapsed / BOUNCE_PERIOD_MS * PI).sin().abs() * amplitude;
            anim.element.position = Point::new(anim.origin.x, anim.origin.y - lift);
        }
        AnimationKind::Spin => {
            anim.element.rotation = (anim.element.rotation + secs * config.spin_rate * TAU) % TAU;
        }
        AnimationKind::Explode => {
            let progress = (elapsed / anim.duration_ms).min(1.0);
            anim.element.scale = 1.0 + progress;
            anim.element.opacity = 1.0 - progress;
            let decay = dt / anim.duration_ms;
            for p in &mut anim.particles {
                p.velocity.y += config.gravity * secs;
                p.position = p.position + p.velocity.scaled(secs);
                p.life = (p.life - decay).max(0.0);
            }
            anim.particles.retain(|p| p.life > 0.0);
        }
    }
}

/// Reflect a coordinate off `[low, high]`, flipping its velocity component.
fn bounce_axis(pos: &mut f64, vel: &mut f64, low: f64, high: f64) {
    if high <= low {
        return;
    }
    if *pos < low {
        *pos = low + (low - *pos);
        *vel = vel.abs();
    } else if *pos > high {
        *pos = high - (*pos - high);
        *vel = -vel.abs();
    }
    *pos = pos.clamp(low, high);
}
