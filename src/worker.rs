//! Named background threads fed through a bounded channel.
//!
//! Pose estimation and garment decoding both run on [`Worker`]s so that the event thread never
//! blocks on them. Results travel back to the event thread through its event queue, not through
//! the worker.

use std::{
    io,
    panic::resume_unwind,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{self, Sender, TrySendError};

use crate::drop::defer;

/// Configures and spawns a [`Worker`].
#[derive(Debug, Clone)]
pub struct WorkerBuilder {
    name: String,
    capacity: usize,
}

impl WorkerBuilder {
    /// Sets the thread name. Also used in log messages.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets how many messages may queue up in front of the worker.
    ///
    /// The default is 0: [`Worker::send`] blocks until the worker has finished processing any
    /// preceding message, and [`Worker::try_send`] only succeeds while the worker is idle.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Spawns the thread, which calls `handler` for every message it receives.
    pub fn spawn<I, F>(self, mut handler: F) -> io::Result<Worker<I>>
    where
        I: Send + 'static,
        F: FnMut(I) + Send + 'static,
    {
        let (sender, recv) = channel::bounded(self.capacity);
        let name = self.name.clone();
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let mut handled = 0usize;
                log::trace!("worker '{name}' starting");
                let _guard = defer(|| log::trace!("worker '{name}' exiting"));
                for message in recv {
                    handler(message);
                    handled += 1;
                }
                log::debug!("worker '{name}' handled {handled} messages");
            })?;

        Ok(Worker {
            name: self.name,
            running: Some(Running { sender, handle }),
        })
    }
}

struct Running<I> {
    sender: Sender<I>,
    handle: JoinHandle<()>,
}

/// A thread processing messages of type `I`.
///
/// Dropping the `Worker` closes its channel and joins the thread. A panic on the worker thread is
/// re-raised on the thread that drops the `Worker` or next sends a message to it.
pub struct Worker<I: Send + 'static> {
    name: String,
    running: Option<Running<I>>,
}

impl Worker<()> {
    /// Returns a builder for an unnamed worker with capacity 0.
    #[inline]
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder {
            name: "worker".into(),
            capacity: 0,
        }
    }
}

impl<I: Send + 'static> Worker<I> {
    /// Sends a message, blocking until the worker can take it.
    ///
    /// Does nothing if the worker has exited. If it exited by panicking, the panic is propagated
    /// to the caller.
    pub fn send(&mut self, msg: I) {
        let Some(running) = &self.running else { return };
        if running.sender.send(msg).is_err() {
            self.join();
        }
    }

    /// Sends a message if the worker can accept it without blocking.
    ///
    /// Hands `msg` back if the channel is full or the worker has exited. Panics of the worker
    /// thread are propagated like in [`Worker::send`].
    pub fn try_send(&mut self, msg: I) -> Result<(), I> {
        let Some(running) = &self.running else {
            return Err(msg);
        };
        match running.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(msg)) => Err(msg),
            Err(TrySendError::Disconnected(msg)) => {
                self.join();
                Err(msg)
            }
        }
    }

    fn join(&mut self) {
        let Some(Running { sender, handle }) = self.running.take() else {
            return;
        };
        drop(sender);
        if let Err(payload) = handle.join() {
            log::error!("worker '{}' panicked", self.name);
            if !thread::panicking() {
                resume_unwind(payload);
            }
        }
    }
}

impl<I: Send + 'static> Drop for Worker<I> {
    fn drop(&mut self) {
        self.join();
    }
}
