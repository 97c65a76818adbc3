use glam::Vec2;
use serde::Serialize;
use web_time::Instant;

use crate::config::*;
use crate::track::{Rect, TrackGeometry, LANE_COUNT};

/// Scaled player dimensions for the current track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerSize {
    pub width: f32,
    pub stand_height: f32,
    pub slide_height: f32,
}

impl PlayerSize {
    pub fn for_track(track: &TrackGeometry) -> Self {
        Self {
            width: (PLAYER_WIDTH * track.scale).round(),
            stand_height: (PLAYER_HEIGHT_STAND * track.scale).round(),
            slide_height: (PLAYER_HEIGHT_SLIDE * track.scale).round(),
        }
    }
}

pub struct Player {
    /// Lane the player currently occupies (committed once lateral easing settles).
    pub lane: usize,
    pub lane_target: usize,
    /// x is the lateral center, y the feet line.
    pub position: Vec2,
    pub velocity_y: f32,
    pub on_ground: bool,
    pub sliding: bool,
    pub slide_remaining: f32,
    /// None means the player may act immediately.
    pub last_action: Option<Instant>,
    pub size: PlayerSize,
}

impl Player {
    pub fn new(track: &TrackGeometry) -> Self {
        let mut player = Self {
            lane: 1,
            lane_target: 1,
            position: Vec2::ZERO,
            velocity_y: 0.0,
            on_ground: true,
            sliding: false,
            slide_remaining: 0.0,
            last_action: None,
            size: PlayerSize::for_track(track),
        };
        player.respawn(track);
        player
    }

    pub fn respawn(&mut self, track: &TrackGeometry) {
        self.lane = 1;
        self.lane_target = 1;
        self.position = Vec2::new(track.lane_x(1), track.ground());
        self.velocity_y = 0.0;
        self.on_ground = true;
        self.sliding = false;
        self.slide_remaining = 0.0;
        self.last_action = None;
        self.size = PlayerSize::for_track(track);
    }

    /// Re-fit the player to a new track without teleporting through the ground.
    pub fn fit_to_track(&mut self, track: &TrackGeometry) {
        self.size = PlayerSize::for_track(track);
        if self.on_ground {
            self.position.y = track.ground();
            self.velocity_y = 0.0;
        } else {
            self.position.y = self.position.y.min(track.ground());
        }
        self.position.x = track.lane_x(self.lane_target);
    }

    pub fn update(&mut self, dt: f32, track: &TrackGeometry, tuning: &GameTuning) {
        // Lateral easing toward the target lane
        let target_x = track.lane_x(self.lane_target);
        let k = 1.0 - (-tuning.lane_lerp * dt).exp();
        self.position.x += (target_x - self.position.x) * k;
        if (self.position.x - target_x).abs() < LANE_SNAP_EPSILON {
            self.position.x = target_x;
            self.lane = self.lane_target;
        }

        // Vertical motion; y grows downward so gravity is positive
        self.velocity_y += tuning.gravity * track.scale * dt;
        self.position.y += self.velocity_y * dt;
        let ground = track.ground();
        if self.position.y >= ground {
            self.position.y = ground;
            self.velocity_y = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }

        if self.sliding {
            self.slide_remaining -= dt;
            if self.slide_remaining <= 0.0 {
                self.sliding = false;
                self.slide_remaining = 0.0;
            }
        }
    }

    fn can_act(&self, now: Instant, tuning: &GameTuning) -> bool {
        match self.last_action {
            None => true,
            Some(last) => {
                now.saturating_duration_since(last).as_secs_f32() >= tuning.min_action_interval
            }
        }
    }

    /// Shift the target lane by `dir`, clamped to the track. Returns false when debounced.
    pub fn move_lane(&mut self, dir: i32, now: Instant, tuning: &GameTuning) -> bool {
        if !self.can_act(now, tuning) {
            return false;
        }
        let target = (self.lane_target as i32 + dir).clamp(0, LANE_COUNT as i32 - 1);
        self.lane_target = target as usize;
        self.last_action = Some(now);
        true
    }

    pub fn jump(&mut self, now: Instant, track: &TrackGeometry, tuning: &GameTuning) -> bool {
        if !self.can_act(now, tuning) || !self.on_ground {
            return false;
        }
        self.velocity_y = -tuning.jump_velocity * track.scale;
        self.on_ground = false;
        self.sliding = false;
        self.slide_remaining = 0.0;
        self.last_action = Some(now);
        true
    }

    pub fn slide(&mut self, now: Instant, tuning: &GameTuning) -> bool {
        if !self.can_act(now, tuning) || !self.on_ground {
            return false;
        }
        self.sliding = true;
        self.slide_remaining = tuning.slide_duration;
        self.last_action = Some(now);
        true
    }

    pub fn height(&self) -> f32 {
        if self.sliding {
            self.size.slide_height
        } else {
            self.size.stand_height
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_bottom_center(self.position.x, self.position.y, self.size.width, self.height())
    }
}
