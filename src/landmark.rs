//! Landmark sources: where fingertip positions come from.
//!
//! Real hand tracking lives outside this crate. A source only has to yield,
//! per frame, either "no hand" or the normalized (0..1) fingertip position.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;
use web_time::Instant;

use crate::config::FINGERTIP_LANDMARK;

/// Number of points in a full hand landmark set.
pub const HAND_LANDMARKS: usize = 21;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HandFrame {
    NoHand,
    Fingertip(Vec2),
}

impl HandFrame {
    /// Pick the tracked landmark out of a full hand; incomplete hands count as no hand.
    pub fn from_landmarks(landmarks: &[Vec2], index: usize) -> Self {
        if landmarks.len() < HAND_LANDMARKS {
            return HandFrame::NoHand;
        }
        landmarks
            .get(index)
            .map_or(HandFrame::NoHand, |p| HandFrame::Fingertip(*p))
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("hand tracking unsupported: {0}")]
    Unsupported(String),
    #[error("landmark source disconnected")]
    Disconnected,
}

/// What the classifier last knew about the hand, for status display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandStatus {
    Idle,
    NoHand,
    Tracking,
    Unavailable(String),
}

impl fmt::Display for HandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandStatus::Idle => f.write_str("Waiting for hand tracker"),
            HandStatus::NoHand => f.write_str("Show one hand (index finger)"),
            HandStatus::Tracking => f.write_str("Hand detected (index finger)"),
            HandStatus::Unavailable(reason) => write!(f, "Hand tracking unavailable: {}", reason),
        }
    }
}

pub trait LandmarkSource {
    /// Frame due at `now`, if any. `Ok(None)` means nothing new this tick.
    fn poll(&mut self, now: Instant) -> Result<Option<HandFrame>, SourceError>;
}

/// Drops frames arriving faster than the configured rate.
pub struct FrameThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameThrottle {
    pub fn new(max_fps: f32) -> Self {
        // A rate too small to express as an interval admits one frame only
        let interval = if max_fps > 0.0 {
            Duration::try_from_secs_f32(1.0 / max_fps).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TraceFrame {
    /// Offset from the start of playback.
    pub t_ms: u64,
    /// Normalized fingertip; null when no hand is visible.
    #[serde(default)]
    pub tip: Option<[f32; 2]>,
    /// Full hand as recorded by a tracker. Takes precedence over `tip`.
    #[serde(default)]
    pub landmarks: Option<Vec<[f32; 2]>>,
}

impl TraceFrame {
    fn hand_frame(&self, landmark_index: usize) -> HandFrame {
        if let Some(landmarks) = &self.landmarks {
            let points: Vec<Vec2> = landmarks.iter().map(|&[x, y]| Vec2::new(x, y)).collect();
            return HandFrame::from_landmarks(&points, landmark_index);
        }
        match self.tip {
            Some([x, y]) => HandFrame::Fingertip(Vec2::new(x, y)),
            None => HandFrame::NoHand,
        }
    }
}

/// Recorded fingertip trace, as stored in JSON.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Trace {
    pub frames: Vec<TraceFrame>,
}

impl Trace {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut trace: Trace = serde_json::from_str(text)?;
        trace.frames.sort_by_key(|f| f.t_ms);
        Ok(trace)
    }

    /// Short scripted session: raise to start, then dodge left, right, slide and jump.
    pub fn demo() -> Self {
        let keys: &[(u64, Option<[f32; 2]>)] = &[
            (0, None),
            (300, Some([0.5, 0.6])),
            (700, Some([0.5, 0.6])),
            (900, Some([0.5, 0.4])),
            (1600, Some([0.5, 0.5])),
            (2400, Some([0.5, 0.5])),
            (2600, Some([0.62, 0.5])),
            (3400, Some([0.5, 0.5])),
            (4200, Some([0.5, 0.5])),
            (4400, Some([0.38, 0.5])),
            (5200, Some([0.5, 0.5])),
            (6000, Some([0.5, 0.5])),
            (6200, Some([0.5, 0.65])),
            (7000, Some([0.5, 0.5])),
            (7800, Some([0.5, 0.5])),
            (8000, Some([0.5, 0.35])),
            (8800, Some([0.5, 0.5])),
            (9400, None),
        ];

        let step = 50;
        let mut frames = Vec::new();
        for pair in keys.windows(2) {
            let (t0, p0) = pair[0];
            let (t1, p1) = pair[1];
            let mut t = t0;
            while t < t1 {
                let tip = match (p0, p1) {
                    (Some(a), Some(b)) => {
                        let u = (t - t0) as f32 / (t1 - t0) as f32;
                        Some([a[0] + (b[0] - a[0]) * u, a[1] + (b[1] - a[1]) * u])
                    }
                    (a, _) => a,
                };
                frames.push(TraceFrame {
                    t_ms: t,
                    tip,
                    landmarks: None,
                });
                t += step;
            }
        }
        if let Some(&(t, tip)) = keys.last() {
            frames.push(TraceFrame {
                t_ms: t,
                tip,
                landmarks: None,
            });
        }
        Self { frames }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.frames.last().map_or(0, |f| f.t_ms))
    }
}

/// Replays a [`Trace`] against the caller's clock.
pub struct ScriptedSource {
    pending: VecDeque<TraceFrame>,
    started: Option<Instant>,
    landmark_index: usize,
}

impl ScriptedSource {
    pub fn new(trace: Trace) -> Self {
        Self {
            pending: trace.frames.into(),
            started: None,
            landmark_index: FINGERTIP_LANDMARK,
        }
    }

    /// Landmark picked out of full-hand frames.
    pub fn with_landmark_index(mut self, index: usize) -> Self {
        self.landmark_index = index;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

impl LandmarkSource for ScriptedSource {
    fn poll(&mut self, now: Instant) -> Result<Option<HandFrame>, SourceError> {
        let start = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start).as_millis() as u64;

        // Skip frames that were missed between polls; only the newest one matters
        let mut due = None;
        while self.pending.front().is_some_and(|f| f.t_ms <= elapsed) {
            due = self.pending.pop_front();
        }

        match due {
            Some(frame) => Ok(Some(frame.hand_frame(self.landmark_index))),
            None if self.pending.is_empty() => Err(SourceError::Disconnected),
            None => Ok(None),
        }
    }
}

/// A source that could not be acquired.
pub struct UnavailableSource {
    reason: fn() -> SourceError,
}

impl UnavailableSource {
    pub fn permission_denied() -> Self {
        Self {
            reason: || SourceError::PermissionDenied,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            reason: || SourceError::Unsupported("no camera capture available".to_string()),
        }
    }
}

impl LandmarkSource for UnavailableSource {
    fn poll(&mut self, _now: Instant) -> Result<Option<HandFrame>, SourceError> {
        Err((self.reason)())
    }
}
