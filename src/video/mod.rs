//! Video capture.
//!
//! A [`Camera`] delivers frames to the event thread through a [`FrameSink`]. Acquiring a device
//! can take a long time, so [`Camera::start`] only begins acquisition; its outcome is reported
//! through the sink as [`Event::CameraReady`] (with the first frame) or
//! [`Event::CameraFailed`].
//!
//! At most one regular frame is waiting in the event queue at any time. Frames captured while the
//! event thread has not picked up the previous one are dropped at the source.

pub mod synthetic;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crossbeam::channel::Sender;

use crate::app::Event;
use crate::image::Image;
use crate::lifecycle::Session;

/// A video capture device.
pub trait Camera {
    /// Begins acquiring the device and streaming frames into `sink`.
    ///
    /// Returns an error if acquisition fails right away. Later failures are reported through
    /// [`FrameSink::fail`].
    fn start(&mut self, sink: FrameSink) -> anyhow::Result<()>;

    /// Stops streaming and releases the device.
    ///
    /// Once this returns, no more frames are delivered. Calling this on a stopped camera does
    /// nothing.
    fn stop(&mut self);
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn start(&mut self, sink: FrameSink) -> anyhow::Result<()> {
        (**self).start(sink)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Tracks whether a frame is waiting in the event queue.
///
/// Shared between the event thread, which releases it when it dequeues a frame, and the
/// [`FrameSink`]s, which acquire it before queueing one.
#[derive(Debug, Clone, Default)]
pub(crate) struct FrameGate(Arc<AtomicBool>);

impl FrameGate {
    fn try_acquire(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Delivers the frames of one capture session to the event thread.
#[derive(Clone)]
pub struct FrameSink {
    session: Session,
    events: Sender<Event>,
    gate: FrameGate,
    ready: bool,
}

impl FrameSink {
    pub(crate) fn new(session: Session, events: Sender<Event>, gate: FrameGate) -> Self {
        Self {
            session,
            events,
            gate,
            ready: false,
        }
    }

    /// Returns the capture session this sink belongs to.
    #[inline]
    pub fn session(&self) -> Session {
        self.session
    }

    /// Delivers a frame.
    ///
    /// The first frame delivered through a sink also reports the camera as ready. Later frames
    /// are dropped while the previous one has not been picked up by the event thread.
    ///
    /// Returns `false` if the receiving end is gone, in which case the camera should stop.
    pub fn send(&mut self, frame: Image) -> bool {
        let event = if self.ready {
            if !self.gate.try_acquire() {
                log::trace!("event thread busy, dropping frame of session {}", self.session);
                return true;
            }
            Event::Frame {
                session: self.session,
                frame,
            }
        } else {
            self.ready = true;
            Event::CameraReady {
                session: self.session,
                frame,
            }
        };
        self.events.send(event).is_ok()
    }

    /// Reports that the device could not be acquired.
    pub fn fail(&self, error: anyhow::Error) {
        self.events
            .send(Event::CameraFailed {
                session: self.session,
                error: error.to_string(),
            })
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use crossbeam::channel;

    use super::*;
    use crate::lifecycle::Lifecycle;

    #[test]
    fn one_frame_in_flight() {
        let (tx, rx) = channel::unbounded();
        let gate = FrameGate::default();
        let session = Lifecycle::new().request_start().unwrap();
        let mut sink = FrameSink::new(session, tx, gate.clone());

        for _ in 0..5 {
            assert!(sink.send(Image::new(2, 2)));
        }
        assert!(matches!(rx.try_recv(), Ok(Event::CameraReady { .. })));
        assert!(matches!(rx.try_recv(), Ok(Event::Frame { .. })));
        assert!(rx.try_recv().is_err());

        gate.release();
        assert!(sink.send(Image::new(2, 2)));
        assert!(sink.send(Image::new(2, 2)));
        assert!(matches!(rx.try_recv(), Ok(Event::Frame { .. })));
        assert!(rx.try_recv().is_err());
    }
}
