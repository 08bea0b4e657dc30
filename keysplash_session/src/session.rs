// Session controller: one keymap, one mixer, one canvas, one replay log.
//
// `Session::handle` is the single entry point for input. Events are applied
// synchronously, in arrival order, and appended to the replay log. For a
// key press the order within the event is fixed:
//
//   1. Combo tracking (any mapped key counts).
//   2. Control action, if the symbol is a control symbol with an action bound.
//   3. The entry's behaviors, in declared order.
//   4. The surprise flourish, the first time the surprise symbol is pressed:
//      burst, scale chord, arithmetic flash.
//   5. The combo bonus, if this key completed a combo: effect, then burst.
//
// The keymap is stateless; "surprise fires once" and the selected layer are
// session state.
//
// Each component owns its own `SessionRng` seeded with the session seed, so
// audio draws never shift visual draws or the other way round. A session with
// no synth backend still draws identical visuals.
//
// **Critical constraint: determinism.** `Session::replay` with the recorded
// log rebuilds an identical session. Nothing here reads a clock.

use crate::config::{ControlAction, SessionConfig, SessionConfigError};
use crate::input::{InputEvent, InputKind};
use keysplash_canvas::{ElementManager, Painter};
use keysplash_keymap::{Behavior, KeyboardMapper, SynthMode};
use keysplash_music::{CompositionMixer, LayerId, SynthBackend};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Voice used for the surprise chord.
const SURPRISE_MODE: SynthMode = SynthMode::Fm;

/// What one key press did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyReport {
    pub symbol: char,
    pub control: Option<ControlAction>,
    pub behaviors: SmallVec<[Behavior; 2]>,
    pub surprise: bool,
    pub combo: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ComboTracker {
    count: u32,
    last_at_ms: Option<f64>,
}

impl ComboTracker {
    /// Register a key at `now`. Returns true when it completes a combo, and
    /// starts counting afresh.
    fn press(&mut self, now: f64, window_ms: f64, threshold: u32) -> bool {
        self.count = match self.last_at_ms {
            Some(last) if now - last <= window_ms => self.count + 1,
            _ => 1,
        };
        self.last_at_ms = Some(now);
        if self.count >= threshold {
            *self = ComboTracker::default();
            return true;
        }
        false
    }
}

pub struct Session<B: SynthBackend> {
    seed: u32,
    config: SessionConfig,
    mapper: KeyboardMapper,
    mixer: CompositionMixer<B>,
    canvas: ElementManager,
    selected_layer: LayerId,
    surprise_fired: bool,
    combo: ComboTracker,
    log: Vec<InputEvent>,
    ended: bool,
}

impl<B: SynthBackend> Session<B> {
    /// Validate `config` and build every component from `seed`.
    pub fn new(seed: u32, config: SessionConfig, backend: Option<B>) -> Result<Self, SessionConfigError> {
        config.validate()?;
        let mapper = KeyboardMapper::new(seed, &config.keymap);
        let mixer = CompositionMixer::new(seed, config.mixer.clone(), backend);
        let canvas = ElementManager::new(seed, config.canvas.clone());
        tracing::info!(seed, surprise = ?mapper.surprise_symbol(), "session started");
        Ok(Self {
            seed,
            config,
            mapper,
            mixer,
            canvas,
            selected_layer: LayerId::ALL[0],
            surprise_fired: false,
            combo: ComboTracker::default(),
            log: Vec::new(),
            ended: false,
        })
    }

    /// Rebuild a session by feeding `events` through a fresh one.
    pub fn replay(
        seed: u32,
        config: SessionConfig,
        backend: Option<B>,
        events: &[InputEvent],
    ) -> Result<Self, SessionConfigError> {
        let mut session = Self::new(seed, config, backend)?;
        for event in events {
            session.handle(event.clone());
        }
        Ok(session)
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mapper(&self) -> &KeyboardMapper {
        &self.mapper
    }

    pub fn mixer(&self) -> &CompositionMixer<B> {
        &self.mixer
    }

    pub fn canvas(&self) -> &ElementManager {
        &self.canvas
    }

    pub fn selected_layer(&self) -> LayerId {
        self.selected_layer
    }

    pub fn surprise_fired(&self) -> bool {
        self.surprise_fired
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Every event handled so far, in order.
    pub fn replay_log(&self) -> &[InputEvent] {
        &self.log
    }

    pub fn replay_log_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.log)
    }

    /// Apply one input event. Returns a report for key presses of mapped
    /// symbols. Ignored after `end`.
    pub fn handle(&mut self, event: InputEvent) -> Option<KeyReport> {
        self.dispatch(event, None)
    }

    /// A render tick with a painter attached. Logged as a `Frame` event.
    pub fn frame(&mut self, now: f64, painter: &mut dyn Painter) {
        self.dispatch(InputEvent::frame(now), Some(painter));
    }

    /// Dispose every voice, stop every layer, and clear the canvas. Logged as
    /// an `End` event stamped with the last event's time; further input is
    /// ignored.
    pub fn end(&mut self) {
        let at_ms = self.log.last().map_or(0.0, |e| e.at_ms);
        self.dispatch(InputEvent::end(at_ms), None);
    }

    fn shut_down(&mut self) {
        self.mixer.dispose_all();
        self.canvas.clear();
        self.ended = true;
        tracing::info!(seed = self.seed, events = self.log.len() + 1, "session ended");
    }

    fn dispatch(&mut self, event: InputEvent, painter: Option<&mut dyn Painter>) -> Option<KeyReport> {
        if self.ended {
            return None;
        }
        let now = event.at_ms;
        let report = match &event.kind {
            InputKind::KeyDown { symbol } => self.key_down(*symbol, now),
            InputKind::PointerDown { at } => {
                self.canvas.start_drawing(*at, now);
                None
            }
            InputKind::PointerMove { at } => {
                self.canvas.continue_drawing(*at);
                None
            }
            InputKind::PointerUp => {
                self.canvas.end_drawing();
                None
            }
            InputKind::Frame => {
                self.mixer.pump_loops(now);
                self.mixer.release_expired(now);
                self.canvas.render_tick(now, painter);
                None
            }
            InputKind::End => {
                self.shut_down();
                None
            }
        };
        self.log.push(event);
        report
    }

    fn key_down(&mut self, symbol: char, now: f64) -> Option<KeyReport> {
        let Some(entry) = self.mapper.lookup(symbol) else {
            tracing::trace!(?symbol, "unmapped key");
            return None;
        };
        let symbol = entry.symbol;
        let behaviors = entry.behaviors.clone();

        let combo = self
            .combo
            .press(now, self.config.combo_window_ms, self.config.combo_threshold);

        let control = if self.mapper.is_control(symbol) {
            let action = self.config.control_action(symbol);
            if let Some(action) = action {
                self.apply_control(action, now);
            }
            action
        } else {
            None
        };

        for behavior in &behaviors {
            self.apply_behavior(*behavior, now);
        }

        let surprise = self.mapper.is_surprise(symbol) && !self.surprise_fired;
        if surprise {
            self.surprise_fired = true;
            tracing::info!(?symbol, "surprise");
            self.canvas.burst_particles(None, now);
            self.mixer.play_scale_chord(SURPRISE_MODE, now);
            self.canvas.flash_overlay(now);
        }

        if combo {
            tracing::debug!(?symbol, "combo bonus");
            self.mixer.play_effect(now);
            self.canvas.burst_particles(None, now);
        }

        Some(KeyReport {
            symbol,
            control,
            behaviors,
            surprise,
            combo,
        })
    }

    fn apply_behavior(&mut self, behavior: Behavior, now: f64) {
        match behavior {
            Behavior::Spawn { kind } => {
                self.canvas.add_permanent_element(kind, now);
            }
            Behavior::Animate { animation } => {
                self.canvas.animate_random_element(Some(animation), now);
            }
            Behavior::Note { mode } => {
                self.mixer.play_note(mode, now);
            }
            Behavior::Chord { mode } => {
                self.mixer.play_scale_chord(mode, now);
            }
            Behavior::Effect => {
                self.mixer.play_effect(now);
            }
            Behavior::Loop => {
                self.mixer.start_loop(now);
            }
            Behavior::Burst => {
                self.canvas.burst_particles(None, now);
            }
            Behavior::Flash => self.canvas.flash_overlay(now),
        }
    }

    fn apply_control(&mut self, action: ControlAction, now: f64) {
        let layer = self.selected_layer;
        match action {
            ControlAction::CycleLayer => {
                self.selected_layer = layer.next();
                tracing::debug!(layer = self.selected_layer.get(), "layer selected");
            }
            ControlAction::TogglePlayPause => {
                self.mixer.toggle_play_pause(layer, now);
            }
            ControlAction::PitchUp => {
                self.mixer.adjust_pitch(layer, self.config.pitch_step);
            }
            ControlAction::PitchDown => {
                self.mixer.adjust_pitch(layer, self.config.pitch_step.saturating_neg());
            }
            ControlAction::TempoUp => {
                self.mixer.adjust_tempo(layer, self.config.tempo_step);
            }
            ControlAction::TempoDown => {
                self.mixer.adjust_tempo(layer, 1.0 / self.config.tempo_step);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keysplash_canvas::RecordingPainter;
    use keysplash_keymap::BehaviorTag;
    use keysplash_music::RecordingBackend;

    fn session(seed: u32) -> Session<RecordingBackend> {
        Session::new(seed, SessionConfig::default(), Some(RecordingBackend::new())).unwrap()
    }

    fn regular_symbol(s: &Session<RecordingBackend>, surprise: bool) -> char {
        s.mapper()
            .entries()
            .find(|e| !s.mapper().is_control(e.symbol) && e.surprise == surprise)
            .map(|e| e.symbol)
            .unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SessionConfig::default();
        config.combo_threshold = 0;
        assert!(Session::<RecordingBackend>::new(1, config, None).is_err());
    }

    #[test]
    fn unmapped_key_reports_nothing_but_is_logged() {
        let mut s = session(1);
        assert!(s.handle(InputEvent::key(0.0, '!')).is_none());
        assert_eq!(s.replay_log().len(), 1);
    }

    #[test]
    fn key_fires_its_behaviors_in_order() {
        let mut s = session(42);
        let symbol = regular_symbol(&s, false);
        let report = s.handle(InputEvent::key(0.0, symbol)).unwrap();
        let expected: Vec<Behavior> = s.mapper().lookup(symbol).unwrap().behaviors.to_vec();
        assert_eq!(report.behaviors.to_vec(), expected);
        assert!(!report.surprise);
    }

    #[test]
    fn uppercase_key_hits_same_entry() {
        let mut s = session(42);
        let symbol = regular_symbol(&s, false);
        let report = s.handle(InputEvent::key(0.0, symbol.to_ascii_uppercase())).unwrap();
        assert_eq!(report.symbol, symbol);
    }

    #[test]
    fn surprise_fires_once() {
        let mut s = session(42);
        let surprise = s.mapper().surprise_symbol().unwrap();
        let first = s.handle(InputEvent::key(0.0, surprise)).unwrap();
        assert!(first.surprise);
        assert!(s.surprise_fired());
        assert!(!s.canvas().overlays().is_empty());
        let second = s.handle(InputEvent::key(1000.0, surprise)).unwrap();
        assert!(!second.surprise);
        assert!(s.mapper().is_surprise(surprise));
    }

    #[test]
    fn combo_bonus_after_threshold_fast_keys() {
        let mut s = session(3);
        let symbol = regular_symbol(&s, false);
        let combos: Vec<bool> = (0..10)
            .map(|i| s.handle(InputEvent::key(i as f64 * 100.0, symbol)).unwrap().combo)
            .collect();
        assert_eq!(
            combos,
            vec![false, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn slow_keys_never_combo() {
        let mut s = session(3);
        let symbol = regular_symbol(&s, false);
        for i in 0..10 {
            let report = s.handle(InputEvent::key(i as f64 * 1000.0, symbol)).unwrap();
            assert!(!report.combo);
        }
    }

    #[test]
    fn control_keys_drive_selected_layer() {
        let mut s = session(5);
        assert_eq!(s.selected_layer().get(), 1);
        let report = s.handle(InputEvent::key(0.0, 'q')).unwrap();
        assert_eq!(report.control, Some(ControlAction::CycleLayer));
        assert_eq!(s.selected_layer().get(), 2);
        for i in 0..3 {
            s.handle(InputEvent::key(1000.0 * (i + 1) as f64, 'q'));
        }
        assert_eq!(s.selected_layer().get(), 1);
        let tags: Vec<BehaviorTag> = report.behaviors.iter().map(Behavior::tag).collect();
        assert!(tags.iter().all(|t| BehaviorTag::CONTROL.contains(t)));
    }

    #[test]
    fn pitch_control_on_loaded_layer() {
        let mut s = session(5);
        // Load every layer so the selected one is never empty.
        while s.mixer().layers().iter().any(|l| l.pattern.is_none()) {
            s.mixer.start_loop(0.0);
        }
        s.handle(InputEvent::key(0.0, 'e'));
        s.handle(InputEvent::key(1000.0, 'e'));
        assert_eq!(s.mixer().layer(s.selected_layer()).pitch_offset, 2);
        s.handle(InputEvent::key(2000.0, 's'));
        assert_eq!(s.mixer().layer(s.selected_layer()).pitch_offset, 1);
        s.handle(InputEvent::key(3000.0, 'd'));
        assert_eq!(s.mixer().layer(s.selected_layer()).tempo, 1.25);
    }

    #[test]
    fn pointer_events_make_strokes() {
        let mut s = session(6);
        s.handle(InputEvent::pointer_down(0.0, 10.0, 10.0));
        s.handle(InputEvent::pointer_move(16.0, 20.0, 20.0));
        s.handle(InputEvent::pointer_move(32.0, 30.0, 20.0));
        s.handle(InputEvent::pointer_up(48.0));
        assert_eq!(s.canvas().strokes().history().len(), 1);
        assert_eq!(s.canvas().strokes().history()[0].points.len(), 3);
    }

    #[test]
    fn frame_with_painter_is_balanced() {
        let mut s = session(7);
        for (i, c) in "hello123".chars().enumerate() {
            s.handle(InputEvent::key(i as f64 * 50.0, c));
        }
        let mut painter = RecordingPainter::new();
        s.frame(500.0, &mut painter);
        assert!(painter.is_balanced());
        assert!(matches!(s.replay_log().last().unwrap().kind, InputKind::Frame));
    }

    #[test]
    fn visuals_survive_missing_audio_backend() {
        let config = SessionConfig::default();
        let mut with = Session::new(9, config.clone(), Some(RecordingBackend::new())).unwrap();
        let mut without: Session<RecordingBackend> = Session::new(9, config, None).unwrap();
        for (i, c) in "the quick brown fox 0123456789".chars().enumerate() {
            with.handle(InputEvent::key(i as f64 * 40.0, c));
            without.handle(InputEvent::key(i as f64 * 40.0, c));
        }
        with.handle(InputEvent::frame(2000.0));
        without.handle(InputEvent::frame(2000.0));
        assert_eq!(with.canvas().permanent(), without.canvas().permanent());
        assert_eq!(with.canvas().animated(), without.canvas().animated());
        assert!(without.mixer().layers().iter().all(|l| l.pattern.is_none()));
    }

    #[test]
    fn end_disposes_and_ignores_later_input() {
        let mut s = session(10);
        for (i, c) in "abcdefghij".chars().enumerate() {
            s.handle(InputEvent::key(i as f64 * 10.0, c));
        }
        s.end();
        assert!(s.is_ended());
        assert!(s.canvas().permanent().is_empty());
        assert!(s.mixer().layers().iter().all(|l| !l.is_playing));
        let logged = s.replay_log().len();
        assert!(matches!(s.replay_log().last().unwrap().kind, InputKind::End));
        assert!(s.handle(InputEvent::key(999.0, 'k')).is_none());
        s.end();
        assert_eq!(s.replay_log().len(), logged);
    }

    #[test]
    fn uppercase_control_binding_fires() {
        let mut config = SessionConfig::default();
        config.controls.remove(&'q');
        config.controls.insert('Q', ControlAction::CycleLayer);
        let mut s = Session::new(5, config, Some(RecordingBackend::new())).unwrap();
        let lower = s.handle(InputEvent::key(0.0, 'q')).unwrap();
        assert_eq!(lower.control, Some(ControlAction::CycleLayer));
        assert_eq!(s.selected_layer().get(), 2);
        let upper = s.handle(InputEvent::key(1000.0, 'Q')).unwrap();
        assert_eq!(upper.control, Some(ControlAction::CycleLayer));
        assert_eq!(s.selected_layer().get(), 3);
    }
}
