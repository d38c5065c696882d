//! Body pose landmarks.
//!
//! A pose estimation engine reports one [`LandmarkSet`] per analyzed frame. Landmark indices follow
//! the 33-point body topology described by [`LandmarkIdx`].

use nalgebra::Point2;

use crate::image::Resolution;

/// Number of landmarks in a non-empty [`LandmarkSet`].
pub const NUM_LANDMARKS: usize = 33;

/// A body keypoint in normalized coordinates.
///
/// `(0.0, 0.0)` is the top left corner of the analyzed frame, `(1.0, 1.0)` the bottom right
/// corner. Landmarks of body parts just outside of the frame may lie slightly outside of that
/// range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    x: f32,
    y: f32,
}

impl Landmark {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Converts this landmark to pixel coordinates on a surface of size `res`.
    #[inline]
    pub fn to_pixel(&self, res: Resolution) -> Point2<f32> {
        Point2::new(self.x * res.width() as f32, self.y * res.height() as f32)
    }
}

/// The landmarks reported for a single detected body.
///
/// A set is either empty (nobody detected) or contains exactly [`NUM_LANDMARKS`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

/// Error returned by [`LandmarkSet::new`] when given a partial list of landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected 0 or {NUM_LANDMARKS} landmarks, got {0}")]
pub struct LandmarkCountError(pub usize);

impl LandmarkSet {
    /// Returns a set indicating that no body was detected.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a landmark set from a list of landmarks in [`LandmarkIdx`] order.
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self, LandmarkCountError> {
        match landmarks.len() {
            0 | NUM_LANDMARKS => Ok(Self { landmarks }),
            n => Err(LandmarkCountError(n)),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Returns the landmark at `idx`, or `None` if the set is empty.
    pub fn get(&self, idx: LandmarkIdx) -> Option<Landmark> {
        self.landmarks.get(idx as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sets_are_rejected() {
        assert!(LandmarkSet::new(Vec::new()).unwrap().is_empty());
        assert_eq!(
            LandmarkSet::new(vec![Landmark::new(0.5, 0.5); 25]),
            Err(LandmarkCountError(25))
        );
        let full = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); NUM_LANDMARKS]).unwrap();
        assert_eq!(full.len(), NUM_LANDMARKS);
        assert_eq!(
            full.get(LandmarkIdx::RightFootIndex),
            Some(Landmark::new(0.5, 0.5))
        );
        assert_eq!(LandmarkSet::empty().get(LandmarkIdx::Nose), None);
    }

    #[test]
    fn pixel_conversion_scales_each_axis() {
        let p = Landmark::new(0.25, 0.5).to_pixel(Resolution::new(640, 480));
        assert_eq!(p, Point2::new(160.0, 240.0));
    }
}
