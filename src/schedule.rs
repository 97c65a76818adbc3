use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use web_time::Instant;

const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

/// Stops a [`FrameLoop`] before its next tick. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Tick {
    pub frame: u64,
    /// Seconds since the previous tick, clamped to the loop's maximum step.
    pub dt: f32,
    pub now: Instant,
    pub elapsed: Duration,
}

/// Periodic tick driver with an explicit elapsed-time input.
pub struct FrameLoop {
    interval: Duration,
    max_dt: f32,
    cancel: CancelHandle,
    started: Option<Instant>,
    last: Option<Instant>,
    frame: u64,
}

impl FrameLoop {
    pub fn new(fps: f32, max_dt: f32) -> Self {
        let interval = if fps > 0.0 {
            Duration::try_from_secs_f32(1.0 / fps).unwrap_or(DEFAULT_INTERVAL)
        } else {
            DEFAULT_INTERVAL
        };
        Self {
            interval,
            max_dt,
            cancel: CancelHandle::default(),
            started: None,
            last: None,
            frame: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Build the tick for `now`. The first tick has zero dt.
    pub fn tick_at(&mut self, now: Instant) -> Tick {
        let started = *self.started.get_or_insert(now);
        let dt = self
            .last
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32())
            .min(self.max_dt);
        self.last = Some(now);
        let tick = Tick {
            frame: self.frame,
            dt,
            now,
            elapsed: now.saturating_duration_since(started),
        };
        self.frame += 1;
        tick
    }

    /// Drive `f` against the wall clock until cancelled.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while !self.cancel.is_cancelled() {
            let frame_start = Instant::now();
            let tick = self.tick_at(frame_start);
            f(tick);
            let spent = frame_start.elapsed();
            if spent < self.interval {
                thread::sleep(self.interval - spent);
            }
        }
        log::debug!("Frame loop cancelled after {} ticks", self.frame);
    }

    /// Drive `f` on a virtual clock advancing one interval per tick, without sleeping.
    pub fn run_simulated(&mut self, start: Instant, mut f: impl FnMut(Tick)) {
        let mut now = start;
        while !self.cancel.is_cancelled() {
            let tick = self.tick_at(now);
            f(tick);
            now += self.interval;
        }
        log::debug!("Simulated loop cancelled after {} ticks", self.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_measured_and_clamped() {
        let mut frame_loop = FrameLoop::new(60.0, 0.034);
        let t0 = Instant::now();
        assert_eq!(frame_loop.tick_at(t0).dt, 0.0);
        let tick = frame_loop.tick_at(t0 + Duration::from_millis(20));
        assert!((tick.dt - 0.020).abs() < 1e-6);
        assert_eq!(tick.frame, 1);
        let stalled = frame_loop.tick_at(t0 + Duration::from_secs(2));
        assert_eq!(stalled.dt, 0.034);
        assert_eq!(stalled.elapsed, Duration::from_secs(2));
    }

    #[test]
    fn unusable_rates_fall_back_to_default_interval() {
        for fps in [0.0, -30.0, 1e-40, f32::NAN] {
            assert_eq!(FrameLoop::new(fps, 0.034).interval(), DEFAULT_INTERVAL, "fps {fps}");
        }
        let interval = FrameLoop::new(50.0, 0.034).interval();
        assert!((interval.as_secs_f32() - 0.020).abs() < 1e-6);
    }

    #[test]
    fn cancel_stops_simulated_loop() {
        let mut frame_loop = FrameLoop::new(50.0, 0.034);
        let cancel = frame_loop.cancel_handle();
        let mut ticks = 0;
        frame_loop.run_simulated(Instant::now(), |tick| {
            ticks += 1;
            if tick.frame == 9 {
                cancel.cancel();
            }
        });
        assert_eq!(ticks, 10);
    }

    #[test]
    fn cancel_stops_realtime_loop() {
        let mut frame_loop = FrameLoop::new(500.0, 0.034);
        let cancel = frame_loop.cancel_handle();
        let mut last = None;
        frame_loop.run(|tick| {
            last = Some(tick.frame);
            if tick.frame == 2 {
                cancel.cancel();
            }
        });
        assert_eq!(last, Some(2));
    }
}
