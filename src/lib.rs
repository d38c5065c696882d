//! Real-time garment try-on.
//!
//! Camera frames are analyzed by a body pose estimator, and the selected garment is drawn onto a
//! transparent overlay aligned with the wearer's shoulders, elbows and hips.
//!
//! The [`app::App`] owns all state and runs the event loop. Capture devices implement
//! [`video::Camera`], pose estimation engines implement [`detector::PoseEstimator`], and the user
//! interface implements [`frontend::Frontend`].
//!
//! # Coordinates
//!
//! Landmarks use normalized image coordinates: X points to the right, Y points *down*, and both
//! range from 0.0 to 1.0 across the frame. Everything drawn on the overlay uses pixel coordinates
//! of the current frame.
//!
//! # Environment Variables
//!
//! [`config::Config::from_env`] reads the following variables:
//!
//! * `TRYON_ASSET_DIR`: Directory containing the built-in garment images `dress1.png` through
//!   `dress5.png`. Defaults to `assets`.
//! * `TRYON_SNAPSHOT_DIR`: Directory snapshots are written to. Defaults to the current directory.
//!
//! Logging is configured through `RUST_LOG` (see [`init_logger!`]).

use log::LevelFilter;

pub mod app;
pub mod config;
pub mod detector;
pub mod drop;
pub mod frontend;
pub mod garment;
pub mod image;
pub mod landmark;
pub mod lifecycle;
pub mod placement;
pub mod render;
pub mod snapshot;
pub mod timer;
pub mod video;
pub mod watchdog;
pub mod worker;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library will log at *debug* level. `RUST_LOG` overrides this.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
