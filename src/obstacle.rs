use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::track::{Rect, TrackGeometry};

/// Obstacle/visual variant set chosen at game start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Normal,
    City,
    Forest,
}

#[derive(Debug, Error)]
#[error("unknown theme `{0}` (expected normal, city or forest)")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Theme::Normal),
            "city" => Ok(Theme::City),
            "forest" => Ok(Theme::Forest),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Normal => "normal",
            Theme::City => "city",
            Theme::Forest => "forest",
        })
    }
}

/// Cumulative probability upper bounds for the four kinds of a theme.
const KIND_WEIGHTS: [f32; 4] = [0.42, 0.64, 0.83, 1.0];

impl Theme {
    pub fn kinds(&self) -> [ObstacleKind; 4] {
        use ObstacleKind::*;
        match self {
            Theme::Normal | Theme::City => [Barrier, Cone, Overhead, Train],
            Theme::Forest => [Log, Rock, Vine, Boulder],
        }
    }

    /// Map a uniform sample in [0, 1) to a kind using the theme weights.
    pub fn pick_kind(&self, r: f32) -> ObstacleKind {
        let kinds = self.kinds();
        let idx = KIND_WEIGHTS
            .iter()
            .position(|&w| r < w)
            .unwrap_or(kinds.len() - 1);
        kinds[idx]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleKind {
    Barrier,
    Cone,
    Overhead,
    Train,
    Log,
    Rock,
    Vine,
    Boulder,
}

/// Unscaled footprint of an obstacle kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindShape {
    pub width: f32,
    pub height: f32,
    /// Gap between the ground line and the bottom edge. Lifted kinds only hit standing players.
    pub lift: f32,
}

impl ObstacleKind {
    pub fn shape(&self) -> KindShape {
        use ObstacleKind::*;
        let (width, height, lift) = match self {
            Barrier | Log => (84.0, 78.0, 0.0),
            Cone | Rock => (52.0, 62.0, 0.0),
            Overhead | Vine => (150.0, 26.0, 92.0),
            Train | Boulder => (122.0, 170.0, 0.0),
        };
        KindShape { width, height, lift }
    }

    pub fn is_lifted(&self) -> bool {
        self.shape().lift > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Obstacle {
    pub lane: usize,
    /// Progress down the screen; the obstacle's base line.
    pub y: f32,
    pub kind: ObstacleKind,
    pub passed: bool,
}

impl Obstacle {
    pub fn new(lane: usize, y: f32, kind: ObstacleKind) -> Self {
        Self {
            lane,
            y,
            kind,
            passed: false,
        }
    }

    pub fn rect(&self, track: &TrackGeometry) -> Rect {
        let shape = self.kind.shape();
        let s = track.scale;
        Rect::from_bottom_center(
            track.lane_x(self.lane),
            self.y - shape.lift * s,
            shape.width * s,
            shape.height * s,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Coin {
    pub lane: usize,
    pub y: f32,
}

impl Coin {
    pub fn new(lane: usize, y: f32) -> Self {
        Self { lane, y }
    }

    pub fn center(&self, track: &TrackGeometry) -> Vec2 {
        Vec2::new(track.lane_x(self.lane), self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_map_to_disjoint_kind_sets() {
        assert_eq!(Theme::Normal.kinds(), Theme::City.kinds());
        for kind in Theme::Forest.kinds() {
            assert!(!Theme::City.kinds().contains(&kind));
        }
    }

    #[test]
    fn weighted_pick_boundaries() {
        assert_eq!(Theme::City.pick_kind(0.0), ObstacleKind::Barrier);
        assert_eq!(Theme::City.pick_kind(0.42), ObstacleKind::Cone);
        assert_eq!(Theme::City.pick_kind(0.7), ObstacleKind::Overhead);
        assert_eq!(Theme::City.pick_kind(0.99), ObstacleKind::Train);
        assert_eq!(Theme::Forest.pick_kind(0.1), ObstacleKind::Log);
        assert_eq!(Theme::Forest.pick_kind(0.9), ObstacleKind::Boulder);
    }

    #[test]
    fn forest_kinds_share_city_geometry() {
        assert_eq!(ObstacleKind::Log.shape(), ObstacleKind::Barrier.shape());
        assert_eq!(ObstacleKind::Rock.shape(), ObstacleKind::Cone.shape());
        assert_eq!(ObstacleKind::Vine.shape(), ObstacleKind::Overhead.shape());
        assert_eq!(ObstacleKind::Boulder.shape(), ObstacleKind::Train.shape());
        assert!(ObstacleKind::Vine.is_lifted());
        assert!(!ObstacleKind::Rock.is_lifted());
    }

    #[test]
    fn lifted_rect_floats_above_base_line() {
        let track = TrackGeometry::new(1280.0, 720.0);
        let overhead = Obstacle::new(1, 500.0, ObstacleKind::Overhead).rect(&track);
        assert_eq!(overhead.bottom(), 500.0 - 92.0);
        assert_eq!(overhead.h, 26.0);
        let barrier = Obstacle::new(1, 500.0, ObstacleKind::Barrier).rect(&track);
        assert_eq!(barrier.bottom(), 500.0);
        assert_eq!(barrier.x + barrier.w / 2.0, track.lane_x(1));
    }

    #[test]
    fn theme_parsing() {
        assert_eq!("Forest".parse::<Theme>().unwrap(), Theme::Forest);
        assert!("desert".parse::<Theme>().is_err());
    }
}
