use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};

use crate::image::{Color, Image};
use crate::landmark::{Landmark, LandmarkIdx, LandmarkSet, NUM_LANDMARKS};

/// Encodes a solid 4x8 PNG image of `color`.
pub fn png(color: Color) -> Vec<u8> {
    let mut image = Image::new(4, 8);
    image.clear(color);
    let mut data = Vec::new();
    DynamicImage::ImageRgba8(image.buf)
        .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)
        .unwrap();
    data
}

/// A person standing upright, facing the camera.
///
/// On a 1000x1000 surface the shoulders are at (400,200) and (600,200), the elbows at (350,350)
/// and (650,350), and the hips at (420,500) and (580,500).
pub fn upright_pose() -> LandmarkSet {
    let mut landmarks = vec![Landmark::new(0.5, 0.5); NUM_LANDMARKS];
    for (idx, x, y) in [
        (LandmarkIdx::LeftShoulder, 0.40, 0.20),
        (LandmarkIdx::RightShoulder, 0.60, 0.20),
        (LandmarkIdx::LeftElbow, 0.35, 0.35),
        (LandmarkIdx::RightElbow, 0.65, 0.35),
        (LandmarkIdx::LeftHip, 0.42, 0.50),
        (LandmarkIdx::RightHip, 0.58, 0.50),
    ] {
        landmarks[idx as usize] = Landmark::new(x, y);
    }
    LandmarkSet::new(landmarks).unwrap()
}
