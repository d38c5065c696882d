//! Exports the camera frame with the garment overlay as a PNG file.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use image::{ImageError, ImageFormat};

use crate::image::Image;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// There is no camera frame with usable dimensions yet.
    #[error("camera not ready")]
    NotReady,
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] ImageError),
    #[error("failed to write snapshot: {0}")]
    Io(#[from] io::Error),
}

/// Composites `overlay` on top of `frame`.
///
/// The overlay is scaled to the frame's size if they differ.
pub fn compose(frame: &Image, overlay: &Image) -> Result<Image, SnapshotError> {
    if frame.resolution().is_empty() {
        return Err(SnapshotError::NotReady);
    }
    let mut out = frame.clone();
    out.blend_from(overlay);
    Ok(out)
}

/// Returns the snapshot file name for the given capture time.
pub fn file_name(time: SystemTime) -> String {
    let millis = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("ar-tryon-{millis}.png")
}

/// Composites `frame` and `overlay` and writes the result into `dir`.
///
/// Returns the path of the written file.
pub fn save(
    frame: &Image,
    overlay: &Image,
    dir: &Path,
    time: SystemTime,
) -> Result<PathBuf, SnapshotError> {
    let image = compose(frame, overlay)?;
    let name = file_name(time);
    let path = dir.join(&name);

    // Encode next to the target and rename, so a failed write never leaves a partial file
    // under the final name.
    let partial = dir.join(format!(".{name}.partial"));
    let written = image
        .buf
        .save_with_format(&partial, ImageFormat::Png)
        .map_err(SnapshotError::from)
        .and_then(|()| fs::rename(&partial, &path).map_err(SnapshotError::from));
    if let Err(e) = written {
        fs::remove_file(&partial).ok();
        return Err(e);
    }

    log::info!("wrote snapshot to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::image::Color;

    #[test]
    fn file_name_uses_epoch_millis() {
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(file_name(time), "ar-tryon-1700000000123.png");
    }

    #[test]
    fn overlay_is_scaled_to_frame() {
        let mut frame = Image::new(8, 8);
        frame.clear(Color::BLACK);
        let mut overlay = Image::new(4, 4);
        overlay.set(3, 3, Color::RED);

        let out = compose(&frame, &overlay).unwrap();
        assert_eq!(out.resolution(), frame.resolution());
        assert_eq!(out.get(0, 0), Color::BLACK);
        assert_eq!(out.get(6, 6), Color::RED);
        assert_eq!(out.get(7, 7), Color::RED);
        assert_eq!(out.get(5, 5), Color::BLACK);
    }

    #[test]
    fn empty_frame_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Image::new(0, 0);
        let overlay = Image::new(4, 4);
        assert!(matches!(
            save(&frame, &overlay, dir.path(), SystemTime::now()),
            Err(SnapshotError::NotReady)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut frame = Image::new(6, 4);
        frame.clear(Color::WHITE);
        let overlay = Image::new(6, 4);

        let time = UNIX_EPOCH + Duration::from_millis(42);
        let path = save(&frame, &overlay, dir.path(), time).unwrap();
        assert_eq!(path, dir.path().join("ar-tryon-42.png"));
        assert_eq!(Image::load(&path).unwrap(), frame);
    }

    #[test]
    fn missing_directory_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let frame = Image::new(6, 4);
        let overlay = Image::new(6, 4);

        let err = save(&frame, &overlay, &missing, SystemTime::now()).unwrap_err();
        assert!(
            matches!(err, SnapshotError::Encode(_) | SnapshotError::Io(_)),
            "{err:?}"
        );
        assert!(!missing.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn no_partial_file_remains() {
        let dir = tempfile::tempdir().unwrap();
        let mut frame = Image::new(6, 4);
        frame.clear(Color::BLACK);
        let overlay = Image::new(6, 4);

        let time = UNIX_EPOCH + Duration::from_millis(7);
        save(&frame, &overlay, dir.path(), time).unwrap();
        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, ["ar-tryon-7.png"]);
    }
}
