//! Fingertip-motion gesture recognition.
//!
//! The classifier measures displacement of a smoothed fingertip from a slowly
//! drifting anchor, so slow deliberate swipes accumulate into a trigger while
//! frame-to-frame jitter does not. Recognised gestures are pushed into a
//! [`GestureSink`]; the classifier never touches game state directly.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::config::ClassifierSettings;
use crate::landmark::{HandFrame, HandStatus, SourceError};

/// Discrete command emitted by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    MoveLeft,
    MoveRight,
    Jump,
    Slide,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gesture::MoveLeft => "LEFT",
            Gesture::MoveRight => "RIGHT",
            Gesture::Jump => "JUMP",
            Gesture::Slide => "SLIDE",
        })
    }
}

/// Anything that accepts gestures, typically the game engine.
pub trait GestureSink {
    fn accept_gesture(&mut self, gesture: Gesture, now: Instant);
}

impl GestureSink for Vec<Gesture> {
    fn accept_gesture(&mut self, gesture: Gesture, _now: Instant) {
        self.push(gesture);
    }
}

/// Classify an anchor-relative displacement (already mirrored, y down).
///
/// A dominant axis wins first; otherwise any single axis past the threshold
/// triggers, horizontal before vertical.
pub fn classify_displacement(d: Vec2, threshold: f32, axis_bias: f32) -> Option<Gesture> {
    let ax = d.x.abs();
    let ay = d.y.abs();

    if ax > threshold && ax > ay * axis_bias {
        return Some(if d.x > 0.0 { Gesture::MoveRight } else { Gesture::MoveLeft });
    }
    if ay > threshold && ay > ax * axis_bias {
        return Some(if d.y < 0.0 { Gesture::Jump } else { Gesture::Slide });
    }

    if d.x > threshold {
        Some(Gesture::MoveRight)
    } else if d.x < -threshold {
        Some(Gesture::MoveLeft)
    } else if d.y < -threshold {
        Some(Gesture::Jump)
    } else if d.y > threshold {
        Some(Gesture::Slide)
    } else {
        None
    }
}

struct Tracking {
    smoothed: Vec2,
    previous: Vec2,
    anchor: Vec2,
    anchor_since: Instant,
}

pub struct GestureClassifier {
    settings: ClassifierSettings,
    tracking: Option<Tracking>,
    last_emit: Option<Instant>,
    last_gesture: Option<Gesture>,
    status: HandStatus,
}

impl GestureClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self {
            settings,
            tracking: None,
            last_emit: None,
            last_gesture: None,
            status: HandStatus::Idle,
        }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn status(&self) -> &HandStatus {
        &self.status
    }

    pub fn last_gesture(&self) -> Option<Gesture> {
        self.last_gesture
    }

    pub fn anchor(&self) -> Option<Vec2> {
        self.tracking.as_ref().map(|t| t.anchor)
    }

    pub fn smoothed(&self) -> Option<Vec2> {
        self.tracking.as_ref().map(|t| t.smoothed)
    }

    pub fn previous(&self) -> Option<Vec2> {
        self.tracking.as_ref().map(|t| t.previous)
    }

    fn set_status(&mut self, status: HandStatus) {
        if self.status != status {
            log::info!("Hand status: {}", status);
            self.status = status;
        }
    }

    /// Landmark source failed; drop tracking state and report why.
    pub fn mark_unavailable(&mut self, err: &SourceError) {
        self.tracking = None;
        self.set_status(HandStatus::Unavailable(err.to_string()));
    }

    /// Feed one landmark frame. Emits at most one gesture into `sink`.
    pub fn process_frame(
        &mut self,
        frame: HandFrame,
        now: Instant,
        sink: &mut dyn GestureSink,
    ) -> Option<Gesture> {
        let raw = match frame {
            HandFrame::NoHand => {
                self.tracking = None;
                self.set_status(HandStatus::NoHand);
                return None;
            }
            HandFrame::Fingertip(p) => p,
        };
        self.set_status(HandStatus::Tracking);

        let Some(tracking) = self.tracking.as_mut() else {
            self.tracking = Some(Tracking {
                smoothed: raw,
                previous: raw,
                anchor: raw,
                anchor_since: now,
            });
            return None;
        };

        let s = &self.settings;
        tracking.smoothed += (raw - tracking.smoothed) * s.alpha;

        // Preview is mirrored: flip x so the command follows the real hand
        let mut d = tracking.smoothed - tracking.anchor;
        d.x = -d.x;

        let mut emitted = None;
        match classify_displacement(d, s.threshold, s.axis_bias) {
            Some(gesture) => {
                let ready = self
                    .last_emit
                    .is_none_or(|last| now.saturating_duration_since(last) >= s.cooldown);
                if ready {
                    self.last_emit = Some(now);
                    self.last_gesture = Some(gesture);
                    tracking.anchor = tracking.smoothed;
                    tracking.anchor_since = now;
                    emitted = Some(gesture);
                }
            }
            None => {
                let idle = now.saturating_duration_since(tracking.anchor_since);
                let rate = if idle > s.anchor_idle {
                    s.recenter_fast
                } else {
                    s.recenter_slow
                };
                tracking.anchor += (tracking.smoothed - tracking.anchor) * rate;
            }
        }

        tracking.previous = tracking.smoothed;

        if let Some(gesture) = emitted {
            log::debug!("Gesture {}", gesture);
            sink.accept_gesture(gesture, now);
        }
        emitted
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierSettings::default())
    }
}
