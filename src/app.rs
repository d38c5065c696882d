//! The event thread tying capture, detection and rendering together.
//!
//! All mutable application state lives in [`App`] and is only touched by [`App::dispatch`], which
//! handles one [`Event`] at a time. Camera threads, the detection worker and the asset worker
//! never touch that state. They report back by sending events into the queue.
//!
//! UI code sends [`Command`]s through an [`AppHandle`].

use std::{
    fmt,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::config::Config;
use crate::detector::{Detector, PoseEstimator};
use crate::frontend::{Frontend, Notification, Status};
use crate::garment::{AssetError, Registry};
use crate::image::{Color, Image};
use crate::landmark::LandmarkSet;
use crate::lifecycle::{FrameTicket, Lifecycle, Session, State};
use crate::placement::Placement;
use crate::render::render;
use crate::snapshot::{self, SnapshotError};
use crate::timer::{FpsCounter, Timer};
use crate::video::{Camera, FrameGate, FrameSink};
use crate::watchdog::Watchdog;
use crate::worker::Worker;

/// A user request.
#[derive(Debug)]
pub enum Command {
    Start,
    Stop,
    /// Starts capture if it is not running, stops it otherwise.
    Toggle,
    Select(usize),
    ClearAll,
    /// Uploads a batch of files. The i-th file goes to slot i.
    Upload(Vec<Upload>),
    Snapshot,
    ToggleHelp,
    /// Stops capture and makes [`App::run`] return.
    Shutdown,
}

/// A garment image file picked by the user.
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Upload({}, {} bytes)", self.file_name, self.data.len())
    }
}

/// Everything the event thread reacts to.
#[derive(Debug)]
pub enum Event {
    /// The camera of `session` was acquired and delivered its first frame.
    CameraReady { session: Session, frame: Image },
    CameraFailed { session: Session, error: String },
    Frame { session: Session, frame: Image },
    Detection {
        ticket: FrameTicket,
        landmarks: LandmarkSet,
    },
    UploadDecoded {
        slot: usize,
        file_name: String,
        result: Result<Image, AssetError>,
    },
    Command(Command),
}

struct DecodeJob {
    slot: usize,
    upload: Upload,
}

/// Sends [`Command`]s to a running [`App`].
#[derive(Clone)]
pub struct AppHandle {
    events: Sender<Event>,
}

impl AppHandle {
    /// Queues a command.
    ///
    /// Returns `false` if the [`App`] no longer exists.
    pub fn send(&self, command: Command) -> bool {
        self.events.send(Event::Command(command)).is_ok()
    }
}

/// The application: garment registry, capture lifecycle and overlay surface.
pub struct App<C: Camera, F: Frontend> {
    config: Config,
    lifecycle: Lifecycle,
    watchdog: Watchdog,
    registry: Registry,
    surface: Image,
    frame: Option<Arc<Image>>,
    info_visible: bool,
    shutdown: bool,
    camera: C,
    frontend: F,
    detector: Detector,
    decoder: Worker<DecodeJob>,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    frame_gate: FrameGate,
    fps: FpsCounter,
    t_render: Timer,
}

impl<C: Camera, F: Frontend> App<C, F> {
    /// Creates the application and spawns its worker threads.
    ///
    /// The built-in garment images named in `config` are loaded right away. Missing or broken
    /// files leave their slot with the procedural look.
    pub fn new<E: PoseEstimator>(
        config: Config,
        camera: C,
        estimator: E,
        frontend: F,
    ) -> anyhow::Result<Self> {
        let (sender, receiver) = channel::unbounded();
        let detector = Detector::spawn(estimator, config.get_detector().clone(), sender.clone())?;

        let decoder = {
            let events = sender.clone();
            Worker::builder()
                .name("garment decoder")
                .capacity(16)
                .spawn(move |DecodeJob { slot, upload }: DecodeJob| {
                    let result = Image::decode(&upload.data).map_err(AssetError::from);
                    events
                        .send(Event::UploadDecoded {
                            slot,
                            file_name: upload.file_name,
                            result,
                        })
                        .ok();
                })?
        };

        let mut registry = Registry::builtin();
        for (slot, path) in config.get_builtin_assets().iter().enumerate() {
            if slot >= registry.len() {
                log::debug!("ignoring extra built-in asset {}", path.display());
                continue;
            }
            registry.load_builtin(slot, path);
        }

        let res = config.get_resolution();
        let mut app = Self {
            watchdog: Watchdog::new(config.get_staleness_timeout()),
            config,
            lifecycle: Lifecycle::new(),
            registry,
            surface: Image::new(res.width(), res.height()),
            frame: None,
            info_visible: true,
            shutdown: false,
            camera,
            frontend,
            detector,
            decoder,
            sender,
            receiver,
            frame_gate: FrameGate::default(),
            fps: FpsCounter::new("overlay"),
            t_render: Timer::new("render"),
        };

        app.frontend.set_status(Status::Ready);
        app.frontend.show_info(true);
        for (slot, garment) in app.registry.iter().enumerate() {
            app.frontend.update_thumbnail(slot, garment);
        }
        app.frontend.highlight(app.registry.active_index());

        Ok(app)
    }

    /// Returns a handle for sending commands to this app.
    pub fn handle(&self) -> AppHandle {
        AppHandle {
            events: self.sender.clone(),
        }
    }

    pub fn state(&self) -> State {
        self.lifecycle.state()
    }

    pub fn session(&self) -> Session {
        self.lifecycle.session()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the overlay drawing surface.
    pub fn surface(&self) -> &Image {
        &self.surface
    }

    /// Returns the most recent camera frame of the running session.
    pub fn frame(&self) -> Option<&Image> {
        self.frame.as_deref()
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown
    }

    /// Processes events until a [`Command::Shutdown`] is received.
    pub fn run(&mut self) {
        while !self.shutdown {
            self.step(None);
        }
    }

    /// Processes events until `duration` has passed or the app is shut down.
    pub fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.shutdown && Instant::now() < deadline {
            self.step(Some(deadline));
        }
    }

    /// Waits for and processes a single event, or a timer expiry.
    ///
    /// Waiting ends at `limit` at the latest.
    pub fn step(&mut self, limit: Option<Instant>) {
        self.poll_timers(Instant::now());

        let wake = match (self.watchdog.deadline(), limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let event = match wake {
            Some(wake) => match self.receiver.recv_deadline(wake) {
                Ok(event) => Some(event),
                Err(RecvTimeoutError::Timeout) => None,
                // We hold a sender ourselves, so this can't happen.
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => self.receiver.recv().ok(),
        };

        if let Some(event) = event {
            self.dispatch(event, Instant::now());
        }
        self.poll_timers(Instant::now());
    }

    /// Fires expired timers.
    pub fn poll_timers(&mut self, now: Instant) {
        if self.watchdog.poll(now) && self.lifecycle.state() == State::Tracking {
            log::warn!("no person detected for {:?}", self.watchdog.timeout());
            self.frontend.notify(Notification::person_not_detected());
        }
    }

    /// Handles a single event. `now` is the time the event is handled at.
    pub fn dispatch(&mut self, event: Event, now: Instant) {
        match event {
            Event::CameraReady { session, frame } => {
                if self.lifecycle.camera_ready(session) {
                    self.frontend.show_spinner(false);
                    self.frontend.set_status(Status::Tracking);
                    self.watchdog.arm(now);
                }
                self.on_frame(session, frame);
            }
            Event::CameraFailed { session, error } => self.on_camera_failed(session, &error),
            Event::Frame { session, frame } => {
                self.frame_gate.release();
                self.on_frame(session, frame);
            }
            Event::Detection { ticket, landmarks } => self.on_detection(ticket, &landmarks, now),
            Event::UploadDecoded {
                slot,
                file_name,
                result,
            } => self.on_upload_decoded(slot, &file_name, result),
            Event::Command(command) => self.on_command(command),
        }
    }

    /// Starts capturing, unless capture is already running.
    pub fn start(&mut self) {
        let Some(session) = self.lifecycle.request_start() else {
            return;
        };

        self.frontend.show_spinner(true);
        self.frontend.set_status(Status::Initializing);
        self.set_info(false);

        let sink = FrameSink::new(session, self.sender.clone(), self.frame_gate.clone());
        if let Err(e) = self.camera.start(sink) {
            self.on_camera_failed(session, &format!("{e:#}"));
        }
    }

    /// Stops capturing and clears the overlay. Does nothing if capture is not running.
    pub fn stop(&mut self) {
        if !self.lifecycle.request_stop() {
            return;
        }

        self.camera.stop();
        self.watchdog.cancel();
        self.surface.clear(Color::NONE);
        self.frame = None;

        self.frontend.show_spinner(false);
        self.frontend.set_status(Status::Ready);
        self.set_info(true);
        self.frontend.present(None, &self.surface);
    }

    pub fn toggle(&mut self) {
        if self.lifecycle.state().is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Selects the garment drawn from now on.
    pub fn select(&mut self, slot: usize) -> Result<(), AssetError> {
        self.registry.select(slot)?;
        self.frontend.highlight(slot);
        Ok(())
    }

    /// Removes all garment images.
    pub fn clear_all(&mut self) {
        self.registry.clear_all();
        for (slot, garment) in self.registry.iter().enumerate() {
            self.frontend.update_thumbnail(slot, garment);
        }
        self.frontend.reset_upload();
        self.frontend.notify(Notification::garments_cleared());
    }

    /// Queues uploaded files for decoding. The i-th file goes to slot i, files beyond the last
    /// slot are dropped.
    pub fn upload(&mut self, files: Vec<Upload>) {
        for (slot, upload) in files.into_iter().enumerate() {
            if self.registry.check_slot(slot).is_err() {
                log::debug!(
                    "dropping upload '{}', only {} slots",
                    upload.file_name,
                    self.registry.len()
                );
                continue;
            }
            self.decoder.send(DecodeJob { slot, upload });
        }
    }

    /// Writes the current frame with its overlay to the snapshot directory.
    pub fn snapshot(&mut self) -> Result<PathBuf, SnapshotError> {
        let result = match &self.frame {
            Some(frame) => snapshot::save(
                frame,
                &self.surface,
                self.config.get_snapshot_dir(),
                SystemTime::now(),
            ),
            None => Err(SnapshotError::NotReady),
        };
        match &result {
            Ok(_) => {}
            Err(SnapshotError::NotReady) => {
                self.frontend.notify(Notification::camera_not_ready());
            }
            Err(e) => {
                log::error!("{e}");
                self.frontend.notify(Notification::snapshot_failed());
            }
        }
        result
    }

    pub fn toggle_help(&mut self) {
        self.set_info(!self.info_visible);
    }

    fn set_info(&mut self, visible: bool) {
        self.info_visible = visible;
        self.frontend.show_info(visible);
    }

    fn on_command(&mut self, command: Command) {
        log::trace!("command {command:?}");
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Toggle => self.toggle(),
            Command::Select(slot) => {
                if let Err(e) = self.select(slot) {
                    log::warn!("{e}");
                }
            }
            Command::ClearAll => self.clear_all(),
            Command::Upload(files) => self.upload(files),
            Command::Snapshot => {
                self.snapshot().ok();
            }
            Command::ToggleHelp => self.toggle_help(),
            Command::Shutdown => {
                self.stop();
                self.shutdown = true;
            }
        }
    }

    fn on_camera_failed(&mut self, session: Session, error: &str) {
        if !self.lifecycle.camera_failed(session) {
            return;
        }
        log::error!("camera error: {error}");
        self.camera.stop();
        self.frontend.show_spinner(false);
        self.frontend.set_status(Status::CameraError);
        self.frontend.notify(Notification::camera_busy());
    }

    fn on_frame(&mut self, session: Session, frame: Image) {
        let Some(ticket) = self.lifecycle.next_frame(session) else {
            log::trace!("dropping frame of inactive session {session}");
            return;
        };

        if frame.resolution() != self.surface.resolution() {
            log::debug!(
                "resizing overlay {} -> {}",
                self.surface.resolution(),
                frame.resolution()
            );
            self.surface = Image::new(frame.width(), frame.height());
        }

        let frame = Arc::new(frame);
        self.frame = Some(frame.clone());
        self.detector.submit(ticket, frame);
    }

    fn on_detection(&mut self, ticket: FrameTicket, landmarks: &LandmarkSet, now: Instant) {
        if !self.lifecycle.accept_result(ticket) {
            return;
        }

        self.surface.clear(Color::NONE);
        if !landmarks.is_empty() {
            self.watchdog.arm(now);
            let res = self.surface.resolution();
            if let Some(placement) = Placement::compute(landmarks.as_slice(), res) {
                let garment = self.registry.active();
                let surface = &mut self.surface;
                self.t_render.time(|| render(surface, &placement, garment));
            }
        }

        self.frontend.present(self.frame.as_deref(), &self.surface);
        self.fps.tick_with([&self.t_render]);
    }

    fn on_upload_decoded(
        &mut self,
        slot: usize,
        file_name: &str,
        result: Result<Image, AssetError>,
    ) {
        let installed =
            result.and_then(|image| self.registry.install_upload(slot, file_name, image));
        match installed {
            Ok(garment) => {
                let message = Notification::garment_loaded(garment.name());
                self.frontend.update_thumbnail(slot, garment);
                self.frontend.notify(message);
            }
            Err(e) => {
                log::warn!("failed to load '{file_name}': {e}");
                self.frontend.notify(Notification::garment_failed(file_name));
            }
        }
    }
}

impl<C: Camera, F: Frontend> Drop for App<C, F> {
    fn drop(&mut self) {
        self.camera.stop();
    }
}
