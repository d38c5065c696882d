use std::{
    io::Cursor,
    time::{Duration, Instant},
};

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use tryon::app::{App, Command, Upload};
use tryon::config::Config;
use tryon::detector::FixedPose;
use tryon::frontend::{Frontend, Notification, Status};
use tryon::garment::Garment;
use tryon::image::{Image, Resolution};
use tryon::landmark::{Landmark, LandmarkIdx, LandmarkSet, NUM_LANDMARKS};
use tryon::lifecycle::State;
use tryon::video::{synthetic::SyntheticCamera, Camera};

const RES: Resolution = Resolution::new(320, 240);

#[derive(Default)]
struct Recorder {
    statuses: Vec<Status>,
    notifications: Vec<Notification>,
}

impl Frontend for Recorder {
    fn set_status(&mut self, status: Status) {
        self.statuses.push(status);
    }

    fn show_spinner(&mut self, _: bool) {}

    fn show_info(&mut self, _: bool) {}

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn update_thumbnail(&mut self, _: usize, _: &Garment) {}

    fn highlight(&mut self, _: usize) {}

    fn reset_upload(&mut self) {}
}

fn pose() -> LandmarkSet {
    let mut landmarks = vec![Landmark::new(0.5, 0.3); NUM_LANDMARKS];
    for (idx, x, y) in [
        (LandmarkIdx::LeftShoulder, 0.40, 0.30),
        (LandmarkIdx::RightShoulder, 0.60, 0.30),
        (LandmarkIdx::LeftElbow, 0.36, 0.45),
        (LandmarkIdx::RightElbow, 0.64, 0.45),
        (LandmarkIdx::LeftHip, 0.43, 0.60),
        (LandmarkIdx::RightHip, 0.57, 0.60),
    ] {
        landmarks[idx as usize] = Landmark::new(x, y);
    }
    LandmarkSet::new(landmarks).unwrap()
}

fn app<C: Camera>(camera: C, config: Config) -> App<C, Recorder> {
    App::new(
        config.resolution(RES).builtin_assets([]),
        camera,
        FixedPose::new(pose()),
        Recorder::default(),
    )
    .unwrap()
}

/// Runs `app` until `cond` holds. Panics after 10 seconds.
fn run_until<C: Camera>(app: &mut App<C, Recorder>, cond: impl Fn(&App<C, Recorder>) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond(app) {
        assert!(Instant::now() < deadline, "timed out, state {:?}", app.state());
        app.run_for(Duration::from_millis(10));
    }
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut data = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)
        .unwrap();
    data
}

#[test]
fn tracks_and_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(
        SyntheticCamera::new(RES, 60),
        Config::default().snapshot_dir(dir.path()),
    );

    app.handle().send(Command::Start);
    run_until(&mut app, |app| {
        app.state() == State::Tracking && !app.surface().is_blank()
    });
    assert_eq!(app.camera().acquisitions(), 1);
    assert_eq!(app.surface().resolution(), RES);
    assert_eq!(app.frontend().statuses.last(), Some(&Status::Tracking));

    let path = app.snapshot().unwrap();
    assert!(path.starts_with(dir.path()));
    let snapshot = Image::load(&path).unwrap();
    assert_eq!(snapshot.resolution(), RES);
    // The garment covers the torso, the corners show the camera frame.
    assert_ne!(snapshot.get(150, 110), app.frame().unwrap().get(150, 110));
    assert_eq!(snapshot.get(0, 0), app.frame().unwrap().get(0, 0));

    app.handle().send(Command::Shutdown);
    app.run();
    assert_eq!(app.state(), State::Idle);
    assert!(!app.camera().is_running());
    assert!(app.surface().is_blank());
}

#[test]
fn uploaded_garment_is_drawn() {
    let mut app = app(SyntheticCamera::new(RES, 60), Config::default());
    let handle = app.handle();

    handle.send(Command::Upload(vec![
        Upload {
            file_name: "sundress.png".into(),
            data: png(8, 8, [0, 0, 255, 255]),
        },
        Upload {
            file_name: "notes.txt".into(),
            data: b"not an image".to_vec(),
        },
    ]));
    run_until(&mut app, |app| app.frontend().notifications.len() == 2);

    let notifications = &app.frontend().notifications;
    assert!(notifications.contains(&Notification::garment_loaded("sundress")));
    assert!(notifications.contains(&Notification::garment_failed("notes.txt")));
    assert_eq!(app.registry().get(0).unwrap().name(), "sundress");
    assert!(app.registry().get(0).unwrap().image().is_some());
    assert!(app.registry().get(1).unwrap().image().is_none());

    handle.send(Command::Start);
    run_until(&mut app, |app| !app.surface().is_blank());

    // Image garments are drawn at 90% opacity.
    let pixel = app.surface().get(150, 110);
    assert_eq!((pixel.r(), pixel.g()), (0, 0));
    assert!(pixel.b() > 200);
    assert!((225..=232).contains(&pixel.a()), "{}", pixel.a());
}

#[test]
fn busy_camera_reports_error() {
    let mut app = app(SyntheticCamera::busy(), Config::default());

    app.handle().send(Command::Start);
    run_until(&mut app, |app| app.state() == State::Error);

    assert_eq!(app.frontend().statuses.last(), Some(&Status::CameraError));
    assert_eq!(app.frontend().notifications, [Notification::camera_busy()]);
    assert!(app.frame().is_none());
    assert!(app.surface().is_blank());

    // The user may retry.
    app.handle().send(Command::Toggle);
    run_until(&mut app, |app| app.frontend().notifications.len() == 2);
    assert_eq!(app.state(), State::Error);
}

#[test]
fn estimator_panic_does_not_stop_tracking() {
    let mut calls = 0;
    let estimator = move |_: &Image| -> anyhow::Result<LandmarkSet> {
        calls += 1;
        if calls == 1 {
            panic!("engine crashed on one frame");
        }
        Ok(pose())
    };
    let mut app = App::new(
        Config::default().resolution(RES).builtin_assets([]),
        SyntheticCamera::new(RES, 100),
        estimator,
        Recorder::default(),
    )
    .unwrap();

    app.handle().send(Command::Start);
    run_until(&mut app, |app| !app.surface().is_blank());
    assert_eq!(app.state(), State::Tracking);
}
