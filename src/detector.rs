//! Pose estimation on a background thread.
//!
//! The estimation engine itself is a black box implementing [`PoseEstimator`]. A [`Detector`]
//! runs it on a [`Worker`] and reports results back to the event thread as
//! [`Event::Detection`]s.
//!
//! The detector analyzes at most one frame at a time. Frames arriving while it is busy are
//! dropped, so a slow estimator lowers the analysis rate instead of building up latency.

use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crossbeam::channel::Sender;

use crate::app::Event;
use crate::config::DetectorConfig;
use crate::image::Image;
use crate::landmark::LandmarkSet;
use crate::lifecycle::FrameTicket;
use crate::timer::{FpsCounter, Timer};
use crate::worker::Worker;

/// A pose estimation engine.
///
/// Closures of type `FnMut(&Image) -> anyhow::Result<LandmarkSet>` implement this trait.
pub trait PoseEstimator: Send + 'static {
    /// Applies detector settings. Called once, before the first frame is analyzed.
    fn configure(&mut self, config: &DetectorConfig) {
        let _ = config;
    }

    /// Analyzes a single frame.
    ///
    /// Returns an empty [`LandmarkSet`] when no person is visible.
    fn estimate(&mut self, frame: &Image) -> anyhow::Result<LandmarkSet>;
}

impl<F> PoseEstimator for F
where
    F: FnMut(&Image) -> anyhow::Result<LandmarkSet> + Send + 'static,
{
    fn estimate(&mut self, frame: &Image) -> anyhow::Result<LandmarkSet> {
        self(frame)
    }
}

/// A [`PoseEstimator`] that reports the same landmarks for every frame.
#[derive(Debug, Clone)]
pub struct FixedPose {
    landmarks: LandmarkSet,
}

impl FixedPose {
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self { landmarks }
    }

    /// An estimator that never sees anyone.
    pub fn nobody() -> Self {
        Self::new(LandmarkSet::empty())
    }
}

impl PoseEstimator for FixedPose {
    fn estimate(&mut self, _frame: &Image) -> anyhow::Result<LandmarkSet> {
        Ok(self.landmarks.clone())
    }
}

struct Request {
    ticket: FrameTicket,
    frame: Arc<Image>,
}

/// Runs a [`PoseEstimator`] on its own thread.
pub struct Detector {
    worker: Worker<Request>,
}

impl Detector {
    /// Spawns the detection thread.
    ///
    /// `estimator` is configured with `config` on the new thread, then every accepted frame's
    /// result is sent to `events`.
    pub fn spawn<E: PoseEstimator>(
        mut estimator: E,
        config: DetectorConfig,
        events: Sender<Event>,
    ) -> io::Result<Self> {
        let mut configured = false;
        let mut t_estimate = Timer::new("estimate");
        let mut fps = FpsCounter::new("detector");
        let worker = Worker::builder()
            .name("pose detector")
            .spawn(move |Request { ticket, frame }: Request| {
                if !configured {
                    log::debug!("configuring pose estimator: {config:?}");
                    estimator.configure(&config);
                    configured = true;
                }

                // A panicking engine only costs us this frame.
                let result = t_estimate
                    .time(|| panic::catch_unwind(AssertUnwindSafe(|| estimator.estimate(&frame))));
                match result {
                    Ok(Ok(landmarks)) => {
                        events
                            .send(Event::Detection { ticket, landmarks })
                            .ok();
                    }
                    Ok(Err(e)) => {
                        log::error!("pose estimation failed on frame {}: {e:#}", ticket.seq);
                    }
                    Err(payload) => {
                        log::error!(
                            "pose estimator panicked on frame {}: {}",
                            ticket.seq,
                            panic_message(&*payload)
                        );
                    }
                }

                fps.tick_with([&t_estimate]);
            })?;

        Ok(Self { worker })
    }

    /// Submits a frame for analysis.
    ///
    /// Returns `false` if the detector is still busy with a previous frame, in which case this
    /// frame is dropped.
    pub fn submit(&mut self, ticket: FrameTicket, frame: Arc<Image>) -> bool {
        match self.worker.try_send(Request { ticket, frame }) {
            Ok(()) => true,
            Err(_) => {
                log::trace!("detector busy, dropping frame {}", ticket.seq);
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string payload>"
    }
}
