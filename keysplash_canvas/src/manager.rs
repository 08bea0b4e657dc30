// Element lifecycle manager: everything on the canvas and the per-frame pass.
//
// `ElementManager` owns its `SessionRng` (seeded with the session seed), the
// permanent and animated element collections, the stroke recorder, and the
// live overlays. Trigger calls (`add_*`, `burst_particles`, strokes,
// `flash_overlay`) mutate state and consume the generator; the frame pass
// (`update`, `draw`, `render_tick`) never draws from it.
//
// ## Capacity
//
// - Permanent: when the live (non-fading) count reaches `permanent_cap`, the
//   oldest live element starts fading instead of vanishing. Its opacity drops
//   by `dt / fade_out_ms` per frame and it is removed at zero, before the
//   next draw.
// - Animated: at `animated_cap` the oldest is removed outright.
// - Strokes: bounded history, see `stroke.rs`.
//
// ## Frame pass
//
// `update(now)` advances fades, animations, and expiry, and applies breathing
// to the newest `breathing_window` permanent elements (everything older is
// reset to scale 1). `draw(now, painter)` paints, in order: heartbeat ring,
// permanent elements (newest window shimmering), animated elements and their
// particles, strokes, overlays. Every draw pass leaves the painter's
// save/restore depth where it found it.
//
// **Critical constraint: determinism.** Insertion-ordered `Vec`s only, ids
// from a counter, time only as elapsed comparisons against `now`.

use crate::animation::{AnimationSetup, advance};
use crate::config::CanvasConfig;
use crate::element::{AnimatedElement, Element, ElementId, Glyph, PermanentElement};
use crate::geometry::{Color, Point};
use crate::overlay::OverlayEffect;
use crate::painter::Painter;
use crate::placement::{burst_origin, find_position};
use crate::stroke::{Stroke, StrokeRecorder};
use keysplash_keymap::{AnimationKind, ElementKind};
use keysplash_prng::SessionRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::TAU;

/// Everything a burst spawned that is still on the canvas, for the caller's
/// bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub origin: Point,
    pub kind: ElementKind,
    pub ids: SmallVec<[ElementId; 16]>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementManager {
    config: CanvasConfig,
    rng: SessionRng,
    next_id: u64,
    permanent: Vec<PermanentElement>,
    animated: Vec<AnimatedElement>,
    strokes: StrokeRecorder,
    overlays: Vec<OverlayEffect>,
    last_frame_ms: Option<f64>,
}

impl ElementManager {
    pub fn new(seed: u32, config: CanvasConfig) -> Self {
        Self {
            config,
            rng: SessionRng::new(seed),
            next_id: 0,
            permanent: Vec::new(),
            animated: Vec::new(),
            strokes: StrokeRecorder::new(),
            overlays: Vec::new(),
            last_frame_ms: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn rng(&self) -> &SessionRng {
        &self.rng
    }

    /// Permanent elements, oldest first.
    pub fn permanent(&self) -> &[PermanentElement] {
        &self.permanent
    }

    /// Animated elements, oldest first.
    pub fn animated(&self) -> &[AnimatedElement] {
        &self.animated
    }

    pub fn strokes(&self) -> &StrokeRecorder {
        &self.strokes
    }

    pub fn overlays(&self) -> &[OverlayEffect] {
        &self.overlays
    }

    pub fn live_permanent_count(&self) -> usize {
        self.permanent.iter().filter(|p| !p.fading).count()
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    /// Add a permanent element, fading the oldest live one if at capacity.
    pub fn add_permanent_element(&mut self, kind: ElementKind, now: f64) -> ElementId {
        if self.live_permanent_count() >= self.config.permanent_cap {
            if let Some(oldest) = self.permanent.iter_mut().find(|p| !p.fading) {
                oldest.fading = true;
                oldest.element.opacity = 1.0;
                tracing::trace!(id = oldest.element.id.0, "permanent element fading out");
            }
        }
        let element = self.spawn_element(kind, None, now);
        let id = element.id;
        self.permanent.push(PermanentElement {
            element,
            fading: false,
        });
        id
    }

    /// Add an animated element at a free spot. A random animation kind is
    /// drawn when none is given.
    pub fn add_animated_element(
        &mut self,
        kind: ElementKind,
        animation: Option<AnimationKind>,
        now: f64,
    ) -> ElementId {
        let animation = self.resolve_animation(animation);
        self.push_animated(kind, animation, None, now)
    }

    /// Animate an element of a randomly drawn kind.
    pub fn animate_random_element(&mut self, animation: Option<AnimationKind>, now: f64) -> ElementId {
        let kind = self
            .rng
            .pick(&ElementKind::ALL)
            .copied()
            .unwrap_or(ElementKind::Shape);
        self.add_animated_element(kind, animation, now)
    }

    /// Spray animated elements of one kind around an origin outside the
    /// central zone.
    ///
    /// Draw order: origin, theme (if absent), count, then per element its
    /// angle jitter and distance followed by the element's own draws.
    pub fn burst_particles(&mut self, theme: Option<ElementKind>, now: f64) -> Burst {
        let origin = burst_origin(&self.config, &mut self.rng);
        let kind = match theme {
            Some(kind) => kind,
            None => self
                .rng
                .pick(&ElementKind::ALL)
                .copied()
                .unwrap_or(ElementKind::Shape),
        };
        let (lo, hi) = self.config.burst_count;
        let count = self.rng.int_inclusive(lo, hi).max(0) as usize;
        let mut ids = SmallVec::new();
        for i in 0..count {
            let jitter = self.rng.range_f64(-0.3, 0.3);
            let angle = i as f64 * TAU / count as f64 + jitter;
            let (dlo, dhi) = self.config.burst_spread;
            let distance = self.rng.range_f64(dlo, dhi);
            let at = origin + Point::from_angle(angle).scaled(distance);
            let animation = self.resolve_animation(None);
            ids.push(self.push_animated(kind, animation, Some(at), now));
        }
        // A burst bigger than the cap evicts its own first elements.
        ids.retain(|id| self.animated.iter().any(|a| a.element.id == *id));
        tracing::debug!(%origin, ?kind, count, "burst");
        Burst { origin, kind, ids }
    }

    /// Start the arithmetic flash overlay.
    pub fn flash_overlay(&mut self, now: f64) {
        let flash = OverlayEffect::arithmetic_flash(&self.config, &mut self.rng, now);
        self.overlays.push(flash);
    }

    // -----------------------------------------------------------------------
    // Strokes
    // -----------------------------------------------------------------------

    pub fn start_drawing(&mut self, at: Point, now: f64) -> bool {
        self.strokes.start(at, now, &self.config, &mut self.rng)
    }

    pub fn continue_drawing(&mut self, at: Point) -> bool {
        self.strokes.extend(at)
    }

    pub fn end_drawing(&mut self) -> bool {
        self.strokes.finish(self.config.stroke_history_cap)
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.strokes.current()
    }

    // -----------------------------------------------------------------------
    // Frame pass
    // -----------------------------------------------------------------------

    /// Advance every collection to `now`.
    pub fn update(&mut self, now: f64) {
        let dt = self.last_frame_ms.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame_ms = Some(now);

        let fade_step = dt / self.config.fade_out_ms;
        for p in self.permanent.iter_mut().filter(|p| p.fading) {
            p.element.opacity = (p.element.opacity - fade_step).max(0.0);
        }
        self.permanent
            .retain(|p| !(p.fading && p.element.opacity <= 0.0));

        let window_start = self
            .permanent
            .len()
            .saturating_sub(self.config.breathing_window);
        for (i, p) in self.permanent.iter_mut().enumerate() {
            p.element.scale = if i >= window_start {
                let phase = (now - p.element.created_at) / self.config.breathing_period_ms;
                1.0 + self.config.breathing_amplitude * (phase * TAU).sin()
            } else {
                1.0
            };
        }

        for anim in &mut self.animated {
            advance(anim, &self.config, now, dt);
        }
        self.animated.retain(|a| !a.is_expired(now));

        self.overlays.retain(|o| !o.is_expired(now));
    }

    /// Paint the current state. Call after `update` for the same `now`.
    pub fn draw(&self, now: f64, painter: &mut dyn Painter) {
        if let Some(progress) = self.heartbeat_progress(now) {
            let c = Point::new(self.config.width / 2.0, self.config.height / 2.0);
            let max_r = c.length();
            painter.circle(
                c,
                max_r * (0.1 + 0.9 * progress),
                None,
                Some((Color::WHITE.with_alpha(0.25 * (1.0 - progress)), 3.0)),
            );
        }

        let window_start = self
            .permanent
            .len()
            .saturating_sub(self.config.breathing_window);
        for (i, p) in self.permanent.iter().enumerate() {
            let shimmer = if i >= window_start {
                let phase = (now - p.element.created_at) / self.config.shimmer_period_ms;
                self.config.shimmer_degrees * (phase * TAU).sin()
            } else {
                0.0
            };
            p.element.paint(painter, shimmer);
        }

        for anim in &self.animated {
            anim.element.paint(painter, 0.0);
            for particle in &anim.particles {
                painter.circle(
                    particle.position,
                    particle.radius,
                    Some(anim.element.color.with_alpha(particle.life)),
                    None,
                );
            }
        }

        self.strokes.paint(painter);

        for overlay in &self.overlays {
            overlay.paint(painter, now, self.config.overlay_text_size);
        }
    }

    /// One frame: update, then draw if a painter is attached.
    pub fn render_tick(&mut self, now: f64, painter: Option<&mut dyn Painter>) {
        self.update(now);
        if let Some(painter) = painter {
            self.draw(now, painter);
        }
    }

    /// Fraction through the current heartbeat pulse, or `None` between pulses.
    pub fn heartbeat_progress(&self, now: f64) -> Option<f64> {
        let t = now.rem_euclid(self.config.heartbeat_period_ms);
        (t < self.config.heartbeat_pulse_ms).then(|| t / self.config.heartbeat_pulse_ms)
    }

    /// Session end: drop every element, stroke and overlay.
    pub fn clear(&mut self) {
        self.permanent.clear();
        self.animated.clear();
        self.strokes.clear();
        self.overlays.clear();
        tracing::debug!("canvas cleared");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn resolve_animation(&mut self, animation: Option<AnimationKind>) -> AnimationKind {
        match animation {
            Some(kind) => kind,
            None => self
                .rng
                .pick(&AnimationKind::ALL)
                .copied()
                .unwrap_or(AnimationKind::Bounce),
        }
    }

    fn push_animated(
        &mut self,
        kind: ElementKind,
        animation: AnimationKind,
        at: Option<Point>,
        now: f64,
    ) -> ElementId {
        if self.animated.len() >= self.config.animated_cap {
            let evicted = self.animated.remove(0);
            tracing::trace!(id = evicted.element.id.0, "animated element evicted");
        }
        let element = self.spawn_element(kind, at, now);
        let origin = element.position;
        let setup = AnimationSetup::draw(animation, origin, &self.config, &mut self.rng);
        let id = element.id;
        self.animated.push(AnimatedElement {
            element,
            animation,
            started_at: now,
            duration_ms: setup.duration_ms,
            origin,
            velocity: setup.velocity,
            particles: setup.particles,
        });
        id
    }

    /// Draw order: size, position (unless given), glyph, hue, rotation.
    fn spawn_element(&mut self, kind: ElementKind, at: Option<Point>, now: f64) -> Element {
        let (lo, hi) = self.config.element_size;
        let size = self.rng.range_f64(lo, hi);
        let position = match at {
            Some(at) => at,
            None => {
                let recent: SmallVec<[(Point, f64); 16]> = self
                    .permanent
                    .iter()
                    .rev()
                    .take(self.config.placement_window)
                    .map(|p| (p.element.position, p.element.size))
                    .collect();
                find_position(&self.config, &mut self.rng, size, &recent)
            }
        };
        let glyph = Glyph::draw(kind, &mut self.rng);
        let color = self.config.draw_color(&mut self.rng);
        let rotation = self.rng.range_f64(0.0, TAU);
        let id = ElementId(self.next_id);
        self.next_id += 1;
        Element {
            id,
            kind,
            glyph,
            position,
            color,
            size,
            rotation,
            opacity: 1.0,
            scale: 1.0,
            created_at: now,
        }
    }
}
