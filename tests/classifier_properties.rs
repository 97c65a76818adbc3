use std::time::Duration;

use glam::Vec2;
use gesture_runner::config::{GESTURE_COOLDOWN, GESTURE_THRESHOLD};
use gesture_runner::{Gesture, GestureClassifier, HandFrame};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use web_time::Instant;

/// Run a sequence of fingertip positions 50 ms apart, returning emission offsets.
fn run(points: &[Vec2]) -> Vec<(Duration, Gesture)> {
    let mut classifier = GestureClassifier::default();
    let mut sink: Vec<Gesture> = Vec::new();
    let start = Instant::now();
    let mut out = Vec::new();
    for (i, p) in points.iter().enumerate() {
        let offset = Duration::from_millis(50 * i as u64);
        if let Some(g) = classifier.process_frame(HandFrame::Fingertip(*p), start + offset, &mut sink) {
            out.push((offset, g));
        }
    }
    assert_eq!(sink, out.iter().map(|(_, g)| *g).collect::<Vec<_>>());
    out
}

#[test]
fn sub_threshold_motion_never_emits() {
    let mut rng = SmallRng::seed_from_u64(11);
    let span = GESTURE_THRESHOLD * 0.9;
    for _ in 0..50 {
        let points: Vec<_> = (0..120)
            .map(|_| Vec2::new(0.4 + rng.random::<f32>() * span, 0.4 + rng.random::<f32>() * span))
            .collect();
        assert!(run(&points).is_empty());
    }
}

#[test]
fn horizontal_swipes_follow_the_real_hand() {
    for (dx, expected) in [(-0.15, Gesture::MoveRight), (0.15, Gesture::MoveLeft)] {
        let mut points = vec![Vec2::new(0.5, 0.5); 3];
        for i in 1..=6 {
            points.push(Vec2::new(0.5 + dx * i as f32 / 6.0, 0.5 + 0.005 * i as f32));
        }
        let out = run(&points);
        assert_eq!(out.first().map(|(_, g)| *g), Some(expected), "dx {dx}");
    }
}

#[test]
fn vertical_swipes_map_to_jump_and_slide() {
    let up = run(&[Vec2::new(0.5, 0.6), Vec2::new(0.5, 0.45), Vec2::new(0.5, 0.4)]);
    assert_eq!(up.first().map(|(_, g)| *g), Some(Gesture::Jump));
    let down = run(&[Vec2::new(0.5, 0.4), Vec2::new(0.5, 0.55), Vec2::new(0.5, 0.6)]);
    assert_eq!(down.first().map(|(_, g)| *g), Some(Gesture::Slide));
}

#[test]
fn random_walks_respect_cooldown() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut total = 0;
    for _ in 0..30 {
        let mut p = Vec2::splat(0.5);
        let points: Vec<_> = (0..200)
            .map(|_| {
                p += Vec2::new(rng.random_range(-0.08..0.08), rng.random_range(-0.08..0.08));
                p = p.clamp(Vec2::ZERO, Vec2::ONE);
                p
            })
            .collect();
        let out = run(&points);
        total += out.len();
        for pair in out.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= GESTURE_COOLDOWN);
        }
    }
    assert!(total > 0);
}
