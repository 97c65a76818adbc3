use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use web_time::Instant;

use crate::config::*;
use crate::gesture::{Gesture, GestureSink};
use crate::obstacle::{Coin, Obstacle, Theme};
use crate::player::Player;
use crate::track::{Rect, TrackGeometry, LANE_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Waiting,
    Running,
    GameOver,
}

/// Read-only view handed to a renderer once per tick.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub state: RunState,
    pub theme: Theme,
    pub track: TrackGeometry,
    pub speed: f32,
    pub score: u32,
    pub coins_collected: u32,
    pub obstacles_passed: u32,
    pub player: PlayerPose,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerPose {
    pub lane: usize,
    pub lane_target: usize,
    pub x: f32,
    pub y: f32,
    pub on_ground: bool,
    pub sliding: bool,
    pub rect: Rect,
}

pub struct GameState {
    pub player: Player,
    pub track: TrackGeometry,
    pub tuning: GameTuning,
    theme: Theme,
    state: RunState,
    speed: f32,
    score: f32,
    coins_collected: u32,
    obstacles_passed: u32,
    spawn_timer: f32,
    next_spawn: f32,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    rng: SmallRng,
}

impl GameState {
    pub fn new(track: TrackGeometry, theme: Theme, tuning: GameTuning) -> Self {
        Self::with_rng(track, theme, tuning, SmallRng::from_os_rng())
    }

    /// Deterministic engine: the same seed and inputs give the same run.
    pub fn with_seed(track: TrackGeometry, theme: Theme, tuning: GameTuning, seed: u64) -> Self {
        Self::with_rng(track, theme, tuning, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(track: TrackGeometry, theme: Theme, tuning: GameTuning, rng: SmallRng) -> Self {
        let player = Player::new(&track);
        let speed = tuning.speed_start * track.scale;
        let mut game = Self {
            player,
            track,
            tuning,
            theme,
            state: RunState::Waiting,
            speed,
            score: 0.0,
            coins_collected: 0,
            obstacles_passed: 0,
            spawn_timer: 0.0,
            next_spawn: 0.0,
            obstacles: Vec::new(),
            coins: Vec::new(),
            rng,
        };
        game.reset();
        game
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Takes effect on the next reset.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn coins_collected(&self) -> u32 {
        self.coins_collected
    }

    pub fn obstacles_passed(&self) -> u32 {
        self.obstacles_passed
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn next_spawn(&self) -> f32 {
        self.next_spawn
    }

    fn random_spawn_interval(&mut self) -> f32 {
        let (lo, hi) = (self.tuning.spawn_min, self.tuning.spawn_max);
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }

    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.coins.clear();
        self.score = 0.0;
        self.coins_collected = 0;
        self.obstacles_passed = 0;
        self.speed = self.tuning.speed_start * self.track.scale;
        self.spawn_timer = 0.0;
        self.next_spawn = self.random_spawn_interval();
        self.player.respawn(&self.track);
    }

    pub fn start(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        self.reset();
        self.state = RunState::Running;
        log::info!("Run started ({} theme)", self.theme);
    }

    pub fn restart(&mut self) {
        self.reset();
        self.state = RunState::Running;
        log::info!("Run restarted ({} theme)", self.theme);
    }

    pub fn game_over(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.state = RunState::GameOver;
        log::info!(
            "Game over: score {}, coins {}",
            self.score.floor(),
            self.coins_collected
        );
    }

    /// Viewport changed. Geometry is recomputed; only a waiting run is reset.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.track = TrackGeometry::new(width, height);
        self.player.fit_to_track(&self.track);
        if self.state == RunState::Waiting {
            self.reset();
        }
    }

    pub fn handle_gesture(&mut self, gesture: Gesture, now: Instant) {
        match (self.state, gesture) {
            (RunState::Waiting, Gesture::Jump) => return self.start(),
            (RunState::GameOver, Gesture::Jump) => return self.restart(),
            (RunState::Running, _) => {}
            (state, _) => {
                log::debug!("Ignoring {} while {:?}", gesture, state);
                return;
            }
        }

        let accepted = match gesture {
            Gesture::MoveLeft => self.player.move_lane(-1, now, &self.tuning),
            Gesture::MoveRight => self.player.move_lane(1, now, &self.tuning),
            Gesture::Jump => self.player.jump(now, &self.track, &self.tuning),
            Gesture::Slide => self.player.slide(now, &self.tuning),
        };
        if !accepted {
            log::debug!("{} rejected", gesture);
        }
    }

    /// Advance the run by `dt` seconds (clamped). Does nothing unless running.
    pub fn update(&mut self, dt: f32) {
        if self.state != RunState::Running {
            return;
        }
        // Tuning built in code skips validation, so max_dt may be negative
        let dt = dt.max(0.0).min(self.tuning.max_dt.max(0.0));
        let scale = self.track.scale;

        self.speed = (self.speed + self.tuning.speed_ramp * scale * dt)
            .min(self.tuning.speed_max * scale);
        self.score += dt * self.tuning.score_per_second;

        self.player.update(dt, &self.track, &self.tuning);

        self.spawn_timer += dt;
        if self.spawn_timer >= self.next_spawn {
            self.spawn_timer = 0.0;
            self.next_spawn = self.random_spawn_interval();
            self.spawn_obstacle();
        }

        self.advance_entities(dt);
        self.check_collisions();
        self.collect_coins();
    }

    fn spawn_obstacle(&mut self) {
        let lane = self.rng.random_range(0..LANE_COUNT);
        let kind = self.theme.pick_kind(self.rng.random::<f32>());
        log::debug!("Spawn {:?} in lane {}", kind, lane);
        self.obstacles
            .push(Obstacle::new(lane, self.track.obstacle_spawn_y(), kind));

        if self.rng.random_bool(self.tuning.coin_chance.clamp(0.0, 1.0)) {
            let same_lane = self.tuning.coin_same_lane_chance.clamp(0.0, 1.0);
            let coin_lane = if self.rng.random_bool(same_lane) {
                lane
            } else {
                self.rng.random_range(0..LANE_COUNT)
            };
            self.coins.push(Coin::new(coin_lane, self.track.coin_spawn_y()));
        }
    }

    fn advance_entities(&mut self, dt: f32) {
        let step = self.speed * dt;
        let ground = self.track.ground();

        for obstacle in &mut self.obstacles {
            obstacle.y += step;
            if !obstacle.passed && obstacle.rect(&self.track).y > ground {
                obstacle.passed = true;
                self.obstacles_passed += 1;
            }
        }
        let exit = self.track.obstacle_exit_y();
        self.obstacles.retain(|o| o.y <= exit);

        for coin in &mut self.coins {
            coin.y += step;
        }
        let exit = self.track.coin_exit_y();
        self.coins.retain(|c| c.y <= exit);
    }

    fn check_collisions(&mut self) {
        let player_rect = self.player.rect();
        let hit = self
            .obstacles
            .iter()
            .find(|o| player_rect.overlaps(&o.rect(&self.track)));
        if let Some(obstacle) = hit {
            log::debug!("Hit {:?} in lane {}", obstacle.kind, obstacle.lane);
            self.game_over();
        }
    }

    fn collect_coins(&mut self) {
        let player_rect = self.player.rect();
        let radius = COIN_RADIUS * self.track.scale;
        let track = self.track;
        let before = self.coins.len();
        self.coins
            .retain(|c| !player_rect.intersects_circle(c.center(&track), radius));
        let collected = (before - self.coins.len()) as u32;
        if collected > 0 {
            self.coins_collected += collected;
            self.score += self.tuning.coin_bonus * collected as f32;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            theme: self.theme,
            track: self.track,
            speed: self.speed,
            score: self.score.floor() as u32,
            coins_collected: self.coins_collected,
            obstacles_passed: self.obstacles_passed,
            player: PlayerPose {
                lane: self.player.lane,
                lane_target: self.player.lane_target,
                x: self.player.position.x,
                y: self.player.position.y,
                on_ground: self.player.on_ground,
                sliding: self.player.sliding,
                rect: self.player.rect(),
            },
            obstacles: self.obstacles.clone(),
            coins: self.coins.clone(),
        }
    }
}

impl GestureSink for GameState {
    fn accept_gesture(&mut self, gesture: Gesture, now: Instant) {
        self.handle_gesture(gesture, now);
    }
}
