// Keysplash canvas: the element lifecycle manager and its drawing seam.
//
// Keeps every visual thing a session produces (permanent elements that fade
// when crowded out, short-lived animated elements, freehand strokes, and
// overlay flashes) and runs the per-frame update and draw pass. Pixels are
// the host's job: drawing goes through the `Painter` trait.
//
// Architecture:
// - `config.rs`: `CanvasConfig`: dimensions, caps, timings, ranges
// - `geometry.rs`: `Point`, HSL `Color`, polygon helpers
// - `painter.rs`: `Painter` trait and `RecordingPainter`
// - `element.rs`: `ElementId`, `Glyph`, permanent/animated element structs
// - `placement.rs`: overlap-avoiding placement and burst origins
// - `animation.rs`: spawn parameters and per-frame motion per animation kind
// - `stroke.rs`: `StrokeRecorder` (Idle/Drawing) with bounded history
// - `overlay.rs`: arithmetic flash with timed phases
// - `manager.rs`: `ElementManager`: owns all of the above
//
// Depends on `keysplash_keymap` for `ElementKind`/`AnimationKind` and on
// `keysplash_prng` for `SessionRng`.

pub mod animation;
pub mod config;
pub mod element;
pub mod geometry;
pub mod manager;
pub mod overlay;
pub mod painter;
pub mod placement;
pub mod stroke;

pub use config::{CanvasConfig, CanvasConfigError};
pub use element::{AnimatedElement, Element, ElementId, Glyph, Particle, PermanentElement, ShapeKind};
pub use geometry::{Color, Point};
pub use manager::{Burst, ElementManager};
pub use overlay::{OverlayEffect, OverlayPhase};
pub use painter::{PaintOp, Painter, RecordingPainter};
pub use stroke::{Stroke, StrokePattern, StrokeRecorder, StrokeStyle};
