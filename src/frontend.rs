//! User interface glue.
//!
//! The [`App`](crate::app::App) reports everything the user should see through a [`Frontend`].
//! [`LogFrontend`] writes it all to the log, for headless operation.

use std::{fmt, time::Duration};

use crate::garment::Garment;
use crate::image::Image;

/// Status line shown next to the start/stop control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Initializing,
    Tracking,
    CameraError,
}

impl Status {
    /// Returns whether the status indicator should show capture as active.
    pub fn is_active(self) -> bool {
        self == Status::Tracking
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Ready => "Ready",
            Status::Initializing => "Initializing...",
            Status::Tracking => "Tracking...",
            Status::CameraError => "Camera Error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Warning,
    Success,
}

impl NotificationKind {
    /// Returns how long notifications of this kind stay visible.
    pub fn duration(self) -> Duration {
        match self {
            NotificationKind::Error | NotificationKind::Warning => Duration::from_millis(3000),
            NotificationKind::Success => Duration::from_millis(2000),
        }
    }
}

/// A transient message banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    kind: NotificationKind,
    message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn camera_busy() -> Self {
        Self::new(
            NotificationKind::Error,
            "Camera is already in use. Close other apps using camera & refresh.",
        )
    }

    pub fn person_not_detected() -> Self {
        Self::new(
            NotificationKind::Warning,
            "Person not detected. Please face the camera.",
        )
    }

    pub fn garment_loaded(name: &str) -> Self {
        Self::new(NotificationKind::Success, format!("✓ {name} loaded!"))
    }

    pub fn garment_failed(file_name: &str) -> Self {
        Self::new(NotificationKind::Error, format!("✗ Failed to load {file_name}"))
    }

    pub fn garments_cleared() -> Self {
        Self::new(NotificationKind::Success, "✓ All outfits cleared!")
    }

    pub fn camera_not_ready() -> Self {
        Self::new(NotificationKind::Error, "Camera not ready!")
    }

    pub fn snapshot_failed() -> Self {
        Self::new(NotificationKind::Error, "✗ Failed to save snapshot")
    }

    #[inline]
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.kind.duration()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives user-visible updates from the application.
///
/// All methods are called from the event thread.
pub trait Frontend {
    fn set_status(&mut self, status: Status);

    /// Shows or hides the loading indicator.
    fn show_spinner(&mut self, visible: bool);

    /// Shows or hides the info/help panel.
    fn show_info(&mut self, visible: bool);

    fn notify(&mut self, notification: Notification);

    /// Refreshes the picker entry of `slot`. Slots without an image show their emoji.
    fn update_thumbnail(&mut self, slot: usize, garment: &Garment);

    /// Marks `slot` as the selected garment in the picker.
    fn highlight(&mut self, slot: usize);

    /// Clears the file selection of the upload control.
    fn reset_upload(&mut self);

    /// Presents a freshly drawn overlay. `frame` is the camera frame it belongs to, if any.
    fn present(&mut self, frame: Option<&Image>, overlay: &Image) {
        let _ = (frame, overlay);
    }
}

/// A [`Frontend`] that logs every update.
#[derive(Debug, Default)]
pub struct LogFrontend {
    info_visible: bool,
}

impl Frontend for LogFrontend {
    fn set_status(&mut self, status: Status) {
        log::info!("status: {status}");
    }

    fn show_spinner(&mut self, visible: bool) {
        log::debug!("spinner {}", if visible { "shown" } else { "hidden" });
    }

    fn show_info(&mut self, visible: bool) {
        if visible != self.info_visible {
            log::debug!("info panel {}", if visible { "shown" } else { "hidden" });
        }
        self.info_visible = visible;
    }

    fn notify(&mut self, notification: Notification) {
        match notification.kind() {
            NotificationKind::Error => log::error!("{notification}"),
            NotificationKind::Warning => log::warn!("{notification}"),
            NotificationKind::Success => log::info!("{notification}"),
        }
    }

    fn update_thumbnail(&mut self, slot: usize, garment: &Garment) {
        match garment.image() {
            Some(image) => log::debug!("slot {slot}: {} ({image:?})", garment.name()),
            None => log::debug!("slot {slot}: {} {}", garment.emoji(), garment.name()),
        }
    }

    fn highlight(&mut self, slot: usize) {
        log::debug!("selected slot {slot}");
    }

    fn reset_upload(&mut self) {
        log::trace!("upload control reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text() {
        assert_eq!(Status::Ready.to_string(), "Ready");
        assert_eq!(Status::Initializing.to_string(), "Initializing...");
        assert_eq!(Status::Tracking.to_string(), "Tracking...");
        assert_eq!(Status::CameraError.to_string(), "Camera Error");
        assert!(Status::Tracking.is_active());
        assert!(!Status::Initializing.is_active());
    }

    #[test]
    fn notification_durations() {
        assert_eq!(
            Notification::person_not_detected().duration(),
            Duration::from_millis(3000)
        );
        assert_eq!(
            Notification::garment_failed("x.png").duration(),
            Duration::from_millis(3000)
        );
        assert_eq!(
            Notification::garments_cleared().duration(),
            Duration::from_millis(2000)
        );
        assert_eq!(
            Notification::garment_loaded("Gown").message(),
            "✓ Gown loaded!"
        );
    }
}
