//! Gesture-controlled endless runner: a fingertip gesture classifier feeding a
//! deterministic three-lane runner simulation.
//!
//! Data flows one way: [`landmark::LandmarkSource`] →
//! [`gesture::GestureClassifier`] → [`gesture::GestureSink`] (the
//! [`game::GameState`]) → read-only [`game::Snapshot`] for a renderer.

pub mod config;
pub mod game;
pub mod gesture;
pub mod landmark;
pub mod obstacle;
pub mod player;
pub mod schedule;
pub mod session;
pub mod track;

pub use config::{ClassifierSettings, GameTuning, RunnerConfig};
pub use game::{GameState, RunState, Snapshot};
pub use gesture::{Gesture, GestureClassifier, GestureSink};
pub use landmark::{HandFrame, HandStatus, LandmarkSource, SourceError};
pub use obstacle::{ObstacleKind, Theme};
pub use schedule::{CancelHandle, FrameLoop, Tick};
pub use session::Session;
pub use track::TrackGeometry;
