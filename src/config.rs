//! Application and detector configuration.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::image::Resolution;

/// Default delay after which a missing person is reported.
pub const DEFAULT_STALENESS_TIMEOUT: Duration = Duration::from_millis(2000);

/// Settings handed to the pose estimator once, when the detection worker starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    model_complexity: u8,
    smooth_landmarks: bool,
    enable_segmentation: bool,
    min_detection_confidence: f32,
    min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_complexity: 1,
            smooth_landmarks: true,
            enable_segmentation: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl DetectorConfig {
    /// Sets the model complexity (0, 1 or 2). Higher values are more accurate but slower.
    #[inline]
    pub fn model_complexity(self, model_complexity: u8) -> Self {
        Self {
            model_complexity: model_complexity.min(2),
            ..self
        }
    }

    /// Enables or disables temporal landmark smoothing.
    #[inline]
    pub fn smooth_landmarks(self, smooth_landmarks: bool) -> Self {
        Self {
            smooth_landmarks,
            ..self
        }
    }

    #[inline]
    pub fn enable_segmentation(self, enable_segmentation: bool) -> Self {
        Self {
            enable_segmentation,
            ..self
        }
    }

    /// Sets the minimum confidence for a person detection to be reported.
    #[inline]
    pub fn min_detection_confidence(self, confidence: f32) -> Self {
        Self {
            min_detection_confidence: confidence.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Sets the minimum confidence for a tracked person to be kept between frames.
    #[inline]
    pub fn min_tracking_confidence(self, confidence: f32) -> Self {
        Self {
            min_tracking_confidence: confidence.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn get_model_complexity(&self) -> u8 {
        self.model_complexity
    }

    pub fn is_smoothing(&self) -> bool {
        self.smooth_landmarks
    }

    pub fn is_segmenting(&self) -> bool {
        self.enable_segmentation
    }

    pub fn get_min_detection_confidence(&self) -> f32 {
        self.min_detection_confidence
    }

    pub fn get_min_tracking_confidence(&self) -> f32 {
        self.min_tracking_confidence
    }
}

/// Application configuration.
///
/// [`Config::default`] uses built-in defaults only. [`Config::from_env`] additionally applies the
/// `TRYON_ASSET_DIR` and `TRYON_SNAPSHOT_DIR` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    resolution: Resolution,
    staleness_timeout: Duration,
    snapshot_dir: PathBuf,
    builtin_assets: Vec<PathBuf>,
    detector: DetectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: Resolution::RES_720P,
            staleness_timeout: DEFAULT_STALENESS_TIMEOUT,
            snapshot_dir: PathBuf::from("."),
            builtin_assets: builtin_asset_paths(Path::new("assets")),
            detector: DetectorConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default configuration, overridden by environment variables where set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os("TRYON_ASSET_DIR") {
            log::debug!("using garment assets from {}", Path::new(&dir).display());
            config.builtin_assets = builtin_asset_paths(Path::new(&dir));
        }
        if let Some(dir) = env::var_os("TRYON_SNAPSHOT_DIR") {
            config.snapshot_dir = PathBuf::from(dir);
        }
        config
    }

    /// Sets the desired capture resolution.
    #[inline]
    pub fn resolution(self, resolution: Resolution) -> Self {
        Self { resolution, ..self }
    }

    /// Sets how long tracking may go without seeing a person before a warning is shown.
    #[inline]
    pub fn staleness_timeout(self, staleness_timeout: Duration) -> Self {
        Self {
            staleness_timeout,
            ..self
        }
    }

    /// Sets the directory snapshots are written to.
    #[inline]
    pub fn snapshot_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_dir: dir.into(),
            ..self
        }
    }

    /// Sets the image files loaded into the garment slots at startup, in slot order.
    ///
    /// Paths beyond the number of slots are ignored.
    #[inline]
    pub fn builtin_assets<I: IntoIterator<Item = PathBuf>>(self, paths: I) -> Self {
        Self {
            builtin_assets: paths.into_iter().collect(),
            ..self
        }
    }

    #[inline]
    pub fn detector(self, detector: DetectorConfig) -> Self {
        Self { detector, ..self }
    }

    pub fn get_resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn get_staleness_timeout(&self) -> Duration {
        self.staleness_timeout
    }

    pub fn get_snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    pub fn get_builtin_assets(&self) -> &[PathBuf] {
        &self.builtin_assets
    }

    pub fn get_detector(&self) -> &DetectorConfig {
        &self.detector
    }
}

fn builtin_asset_paths(dir: &Path) -> Vec<PathBuf> {
    (1..=5)
        .map(|i| dir.join(format!("dress{i}.png")))
        .collect()
}
