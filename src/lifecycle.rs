//! Capture and detection lifecycle state machine.
//!
//! [`Lifecycle`] only decides *whether* a transition happens. The side effects (opening the
//! camera, updating the UI, arming the staleness watchdog) are performed by the owner, typically
//! [`App`](crate::app::App), based on the returned values.
//!
//! Transitions:
//!
//! - `Idle | Error` → `Initializing` on start
//! - `Initializing` → `Tracking` when the camera delivers its first frame
//! - `Initializing` → `Error` when the camera cannot be acquired
//! - `Initializing | Tracking` → `Idle` on stop

use std::fmt;

/// The current phase of the capture pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not capturing.
    Idle,
    /// Waiting for the camera to deliver its first frame.
    Initializing,
    /// Frames are analyzed and garments drawn.
    Tracking,
    /// Camera acquisition failed. Starting again is allowed.
    Error,
}

impl State {
    /// Returns whether a start request is honored in this state.
    #[inline]
    pub fn can_start(self) -> bool {
        matches!(self, State::Idle | State::Error)
    }

    /// Returns whether the camera is (being) held in this state.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, State::Initializing | State::Tracking)
    }
}

/// Identifies one start/stop cycle of the camera.
///
/// Events tagged with an older session are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Session(u64);

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tags a frame submitted for detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    pub session: Session,
    pub seq: u64,
}

/// Tracks the lifecycle state, the current session and the ordering of detection results.
#[derive(Debug)]
pub struct Lifecycle {
    state: State,
    session: Session,
    next_seq: u64,
    applied_seq: Option<u64>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            session: Session(0),
            next_seq: 0,
            applied_seq: None,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn session(&self) -> Session {
        self.session
    }

    /// Requests starting the camera.
    ///
    /// Returns the new session if the request moves the lifecycle to [`State::Initializing`], and
    /// `None` if it is ignored because capture is already running.
    pub fn request_start(&mut self) -> Option<Session> {
        if !self.state.can_start() {
            log::debug!("ignoring start request in state {:?}", self.state);
            return None;
        }
        self.session = Session(self.session.0 + 1);
        self.next_seq = 0;
        self.applied_seq = None;
        self.transition(State::Initializing);
        Some(self.session)
    }

    /// Requests stopping the camera.
    ///
    /// Returns `true` if the lifecycle moved to [`State::Idle`]. All events of the stopped session
    /// become stale.
    pub fn request_stop(&mut self) -> bool {
        if !self.state.is_running() {
            log::debug!("ignoring stop request in state {:?}", self.state);
            return false;
        }
        self.session = Session(self.session.0 + 1);
        self.transition(State::Idle);
        true
    }

    /// The camera of `session` delivered its first frame.
    ///
    /// Returns `true` if the lifecycle moved to [`State::Tracking`].
    pub fn camera_ready(&mut self, session: Session) -> bool {
        if !self.is_current(session, State::Initializing) {
            return false;
        }
        self.transition(State::Tracking);
        true
    }

    /// The camera of `session` could not be acquired.
    ///
    /// Returns `true` if the lifecycle moved to [`State::Error`].
    pub fn camera_failed(&mut self, session: Session) -> bool {
        if !self.is_current(session, State::Initializing) {
            return false;
        }
        self.transition(State::Error);
        true
    }

    /// Assigns a ticket to a frame of `session`, if frames of that session are being analyzed.
    pub fn next_frame(&mut self, session: Session) -> Option<FrameTicket> {
        if !self.is_current(session, State::Tracking) {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(FrameTicket { session, seq })
    }

    /// Decides whether the detection result for `ticket` should be applied.
    ///
    /// Results from other sessions, results arriving outside of [`State::Tracking`] and results
    /// older than the newest applied one are rejected.
    pub fn accept_result(&mut self, ticket: FrameTicket) -> bool {
        if !self.is_current(ticket.session, State::Tracking) {
            log::trace!("discarding result of stale session {}", ticket.session);
            return false;
        }
        if self.applied_seq.map_or(false, |applied| ticket.seq <= applied) {
            log::trace!("discarding out-of-order result for frame {}", ticket.seq);
            return false;
        }
        self.applied_seq = Some(ticket.seq);
        true
    }

    fn is_current(&self, session: Session, state: State) -> bool {
        self.session == session && self.state == state
    }

    fn transition(&mut self, to: State) {
        log::debug!("{:?} -> {:?} (session {})", self.state, to, self.session);
        self.state = to;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
