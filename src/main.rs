mod cli;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use web_time::Instant;

use gesture_runner::landmark::{ScriptedSource, Trace};
use gesture_runner::{FrameLoop, RunState, RunnerConfig, Session};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunnerConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive, got {}", args.fps);

    let trace = match &args.trace {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading trace {}", path.display()))?;
            Trace::from_json(&text).with_context(|| format!("parsing trace {}", path.display()))?
        }
        None => Trace::demo(),
    };
    let seconds = args
        .seconds
        .unwrap_or(trace.duration().as_secs_f32() + 2.0);

    log::info!(
        "Gesture runner: {} theme, seed {}, viewport {}x{}, {:.1}s",
        config.theme,
        config.seed,
        config.viewport.0,
        config.viewport.1,
        seconds
    );

    let source = ScriptedSource::new(trace).with_landmark_index(config.classifier.landmark_index);
    let mut session = Session::new(&config, source);
    let mut frame_loop = FrameLoop::new(args.fps, config.game.max_dt);
    let cancel = frame_loop.cancel_handle();
    let mut last_state = session.game.state();

    let body = |tick: gesture_runner::Tick| {
        if let Some(gesture) = session.tick(tick) {
            log::info!("[{:>6.2}s] gesture {}", tick.elapsed.as_secs_f32(), gesture);
        }

        let state = session.game.state();
        if state != last_state {
            log::info!("[{:>6.2}s] {:?} -> {:?}", tick.elapsed.as_secs_f32(), last_state, state);
            last_state = state;
        }

        if tick.elapsed.as_secs_f32() >= seconds {
            cancel.cancel();
        }
    };

    if args.realtime {
        frame_loop.run(body);
    } else {
        frame_loop.run_simulated(Instant::now(), body);
    }

    let snapshot = session.snapshot();
    if snapshot.state == RunState::GameOver {
        log::info!("Final: game over at score {}", snapshot.score);
    }
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
