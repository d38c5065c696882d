//! Headless demo: runs the try-on pipeline on a synthetic camera and writes a snapshot.

use std::time::Duration;

use tryon::app::{App, Command};
use tryon::config::Config;
use tryon::detector::FixedPose;
use tryon::frontend::LogFrontend;
use tryon::image::Color;
use tryon::landmark::{Landmark, LandmarkIdx, LandmarkSet, NUM_LANDMARKS};
use tryon::video::synthetic::SyntheticCamera;

const RUN_TIME: Duration = Duration::from_secs(3);

fn main() -> anyhow::Result<()> {
    tryon::init_logger!();

    let config = Config::from_env();
    let camera =
        SyntheticCamera::new(config.get_resolution(), 30).color(Color::from_rgb8(40, 44, 52));
    let estimator = FixedPose::new(standing_pose()?);
    let mut app = App::new(config, camera, estimator, LogFrontend::default())?;

    let handle = app.handle();
    handle.send(Command::Start);
    app.run_for(RUN_TIME / 2);

    handle.send(Command::Select(2));
    app.run_for(RUN_TIME / 2);

    match app.snapshot() {
        Ok(path) => log::info!("snapshot: {}", path.display()),
        Err(e) => log::error!("snapshot failed: {e}"),
    }

    handle.send(Command::Shutdown);
    app.run();
    Ok(())
}

/// A person standing in the middle of the frame, facing the camera.
fn standing_pose() -> anyhow::Result<LandmarkSet> {
    let mut landmarks = vec![Landmark::new(0.5, 0.3); NUM_LANDMARKS];
    for (idx, x, y) in [
        (LandmarkIdx::LeftShoulder, 0.42, 0.30),
        (LandmarkIdx::RightShoulder, 0.58, 0.31),
        (LandmarkIdx::LeftElbow, 0.38, 0.45),
        (LandmarkIdx::RightElbow, 0.62, 0.45),
        (LandmarkIdx::LeftHip, 0.44, 0.62),
        (LandmarkIdx::RightHip, 0.56, 0.62),
    ] {
        landmarks[idx as usize] = Landmark::new(x, y);
    }
    Ok(LandmarkSet::new(landmarks)?)
}
