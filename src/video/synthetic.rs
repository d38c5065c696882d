//! A camera that generates frames instead of reading a device.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context};

use super::{Camera, FrameSink};
use crate::drop::defer;
use crate::image::{Color, Image, Resolution};

/// Generates solid frames at a fixed rate.
///
/// Useful for running the pipeline without capture hardware, in combination with a
/// [`FixedPose`](crate::detector::FixedPose) estimator.
pub struct SyntheticCamera {
    resolution: Resolution,
    interval: Duration,
    color: Color,
    busy: bool,
    acquisitions: Arc<AtomicUsize>,
    running: Option<Running>,
}

struct Running {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SyntheticCamera {
    /// Creates a camera producing `fps` frames per second at `resolution`.
    pub fn new(resolution: Resolution, fps: u32) -> Self {
        Self {
            resolution,
            interval: Duration::from_secs(1) / fps.max(1),
            color: Color::from_rgb8(0x20, 0x20, 0x20),
            busy: false,
            acquisitions: Arc::new(AtomicUsize::new(0)),
            running: None,
        }
    }

    /// Creates a camera whose device is always in use by another application.
    pub fn busy() -> Self {
        let mut camera = Self::new(Resolution::RES_720P, 30);
        camera.busy = true;
        camera
    }

    /// Sets the color of the generated frames.
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Returns how many times the device was acquired.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Returns whether frames are currently being produced.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Camera for SyntheticCamera {
    fn start(&mut self, mut sink: FrameSink) -> anyhow::Result<()> {
        self.stop();

        let session = sink.session();
        if self.busy {
            // Acquisition outcome is reported asynchronously, as with a real device.
            sink.fail(anyhow!("device or resource busy"));
            return Ok(());
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        log::info!(
            "acquired synthetic camera, {} @ {:.1}Hz",
            self.resolution,
            1.0 / self.interval.as_secs_f32()
        );

        let stop = Arc::new(AtomicBool::new(false));
        let (resolution, interval, color) = (self.resolution, self.interval, self.color);
        let handle = thread::Builder::new()
            .name(format!("synthetic camera {session}"))
            .spawn({
                let stop = stop.clone();
                move || {
                    let _guard = defer(move || log::trace!("camera session {session} exiting"));
                    let mut frame = Image::new(resolution.width(), resolution.height());
                    frame.clear(color);
                    while !stop.load(Ordering::SeqCst) {
                        if !sink.send(frame.clone()) {
                            break;
                        }
                        thread::sleep(interval);
                    }
                }
            })
            .context("failed to spawn camera thread")?;

        self.running = Some(Running { stop, handle });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(Running { stop, handle }) = self.running.take() {
            stop.store(true, Ordering::SeqCst);
            if handle.join().is_err() {
                log::error!("synthetic camera thread panicked");
            }
            log::info!("released synthetic camera");
        }
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        self.stop();
    }
}
