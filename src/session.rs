use web_time::Instant;

use crate::config::RunnerConfig;
use crate::game::{GameState, Snapshot};
use crate::gesture::{Gesture, GestureClassifier};
use crate::landmark::{FrameThrottle, LandmarkSource};
use crate::schedule::Tick;
use crate::track::TrackGeometry;

/// One player's pipeline: landmark source, classifier and engine on a single tick.
pub struct Session<S: LandmarkSource> {
    pub game: GameState,
    pub classifier: GestureClassifier,
    source: S,
    throttle: FrameThrottle,
    source_failed: bool,
}

impl<S: LandmarkSource> Session<S> {
    pub fn new(config: &RunnerConfig, source: S) -> Self {
        let (width, height) = config.viewport;
        let game = GameState::with_seed(
            TrackGeometry::new(width, height),
            config.theme,
            config.game.clone(),
            config.seed,
        );
        Self {
            game,
            classifier: GestureClassifier::new(config.classifier.clone()),
            throttle: FrameThrottle::new(config.classifier.max_fps),
            source,
            source_failed: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_failed(&self) -> bool {
        self.source_failed
    }

    /// Deliver any due landmark frame, then advance the engine.
    pub fn tick(&mut self, tick: Tick) -> Option<Gesture> {
        let gesture = self.poll_source(tick.now);
        self.game.update(tick.dt);
        gesture
    }

    fn poll_source(&mut self, now: Instant) -> Option<Gesture> {
        if self.source_failed || !self.throttle.ready(now) {
            return None;
        }
        match self.source.poll(now) {
            Ok(Some(frame)) => self.classifier.process_frame(frame, now, &mut self.game),
            Ok(None) => None,
            Err(err) => {
                log::warn!("Landmark source failed: {}", err);
                self.classifier.mark_unavailable(&err);
                self.source_failed = true;
                None
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RunState;
    use crate::landmark::{
        HandStatus, ScriptedSource, Trace, TraceFrame, UnavailableSource, HAND_LANDMARKS,
    };
    use crate::schedule::FrameLoop;

    #[test]
    fn unavailable_source_leaves_game_playable() {
        let mut session = Session::new(&RunnerConfig::default(), UnavailableSource::unsupported());
        let mut frame_loop = FrameLoop::new(60.0, 0.034);
        let t0 = Instant::now();
        session.tick(frame_loop.tick_at(t0));
        assert!(session.source_failed());
        assert!(matches!(session.classifier.status(), HandStatus::Unavailable(_)));
        assert_eq!(session.game.state(), RunState::Waiting);

        session.game.start();
        session.tick(frame_loop.tick_at(t0 + std::time::Duration::from_millis(16)));
        assert_eq!(session.game.state(), RunState::Running);
        assert!(session.game.score() > 0.0);
    }

    #[test]
    fn demo_trace_starts_the_run() {
        let mut session = Session::new(&RunnerConfig::default(), ScriptedSource::new(Trace::demo()));
        let mut frame_loop = FrameLoop::new(60.0, 0.034);
        let cancel = frame_loop.cancel_handle();
        let mut started = false;
        frame_loop.run_simulated(Instant::now(), |tick| {
            session.tick(tick);
            started |= session.game.state() != RunState::Waiting;
            if started || tick.elapsed.as_secs() >= 3 {
                cancel.cancel();
            }
        });
        assert!(started);
    }

    /// Hand whose tracked landmark rises from y=0.6 to 0.4 while the rest stay put.
    fn raising_hand_trace(tracked: usize) -> Trace {
        let frames = (0..6)
            .map(|i| {
                let mut hand = vec![[0.5, 0.6]; HAND_LANDMARKS];
                let y = if i < 2 { 0.6 } else { 0.4 };
                hand[tracked] = [0.5, y];
                TraceFrame {
                    t_ms: 60 * i,
                    tip: None,
                    landmarks: Some(hand),
                }
            })
            .collect();
        Trace { frames }
    }

    fn state_after_replay(config: &RunnerConfig, trace: Trace) -> RunState {
        let source = ScriptedSource::new(trace).with_landmark_index(config.classifier.landmark_index);
        let mut session = Session::new(config, source);
        let mut frame_loop = FrameLoop::new(60.0, 0.034);
        let cancel = frame_loop.cancel_handle();
        frame_loop.run_simulated(Instant::now(), |tick| {
            session.tick(tick);
            if tick.elapsed.as_millis() >= 500 {
                cancel.cancel();
            }
        });
        session.game.state()
    }

    #[test]
    fn landmark_trace_follows_configured_index() {
        let mut config = RunnerConfig::default();
        config.classifier.landmark_index = 4;

        assert_eq!(state_after_replay(&config, raising_hand_trace(4)), RunState::Running);
        // Only the fingertip rises here; the configured landmark stays still
        assert_eq!(state_after_replay(&config, raising_hand_trace(8)), RunState::Waiting);
    }
}
