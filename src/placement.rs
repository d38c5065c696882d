//! Maps body landmarks to the rectangle a garment is drawn into.
//!
//! The garment box hangs from a *neck anchor* slightly above the shoulder line and extends down
//! to below the hips:
//!
//! - the neck anchor sits horizontally between the shoulders, [`NECK_OFFSET`] pixels above the
//!   higher shoulder;
//! - the box is [`GARMENT_SCALE`] times as wide as the shoulders are apart, and [`GARMENT_SCALE`]
//!   times as tall as the distance from the neck anchor to the center between the hips;
//! - the box is centered horizontally on the neck anchor, with its top edge at the anchor.
//!
//! Garments are stretched to fill the box; their native aspect ratio is not preserved.

use nalgebra::Point2;

use crate::image::{Rect, Resolution};
use crate::landmark::{Landmark, LandmarkIdx};

/// Minimum number of landmarks required to place a garment (the hips are landmarks 23 and 24).
pub const MIN_LANDMARKS: usize = 25;

/// Distance (in pixels) between the higher shoulder and the neck anchor.
pub const NECK_OFFSET: f32 = 55.0;

/// Ratio between the garment box and the torso skeleton it covers.
pub const GARMENT_SCALE: f32 = 1.6;

/// Garment placement derived from one set of landmarks.
///
/// Besides the garment rectangle this carries the pixel-space anchor points it was derived from,
/// which the procedural garment renderer uses to draw sleeves and fold lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    rect: Rect,
    neck: Point2<f32>,
    hip: Point2<f32>,
    left_shoulder: Point2<f32>,
    right_shoulder: Point2<f32>,
    left_elbow: Point2<f32>,
    right_elbow: Point2<f32>,
}

impl Placement {
    /// Computes the garment placement for `landmarks` on a surface of size `surface`.
    ///
    /// Returns `None` if fewer than [`MIN_LANDMARKS`] landmarks are given.
    pub fn compute(landmarks: &[Landmark], surface: Resolution) -> Option<Self> {
        if landmarks.len() < MIN_LANDMARKS {
            return None;
        }
        let px = |idx: LandmarkIdx| landmarks[idx as usize].to_pixel(surface);

        let left_shoulder = px(LandmarkIdx::LeftShoulder);
        let right_shoulder = px(LandmarkIdx::RightShoulder);
        let left_hip = px(LandmarkIdx::LeftHip);
        let right_hip = px(LandmarkIdx::RightHip);

        let neck = Point2::new(
            (left_shoulder.x + right_shoulder.x) / 2.0,
            left_shoulder.y.min(right_shoulder.y) - NECK_OFFSET,
        );
        let hip = nalgebra::center(&left_hip, &right_hip);

        let shoulder_width = nalgebra::distance(&left_shoulder, &right_shoulder);
        let torso_height = nalgebra::distance(&neck, &hip);

        let width = shoulder_width * GARMENT_SCALE;
        let height = torso_height * GARMENT_SCALE;

        Some(Self {
            rect: Rect::from_top_left(neck.x - width / 2.0, neck.y, width, height),
            neck,
            hip,
            left_shoulder,
            right_shoulder,
            left_elbow: px(LandmarkIdx::LeftElbow),
            right_elbow: px(LandmarkIdx::RightElbow),
        })
    }

    /// Returns the rectangle the garment is drawn into, in surface pixel coordinates.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Returns the neck anchor (the top center of [`Placement::rect`]).
    #[inline]
    pub fn neck(&self) -> Point2<f32> {
        self.neck
    }

    /// Returns the point halfway between both hips.
    #[inline]
    pub fn hip(&self) -> Point2<f32> {
        self.hip
    }

    /// Returns the `(left, right)` shoulder positions.
    #[inline]
    pub fn shoulders(&self) -> (Point2<f32>, Point2<f32>) {
        (self.left_shoulder, self.right_shoulder)
    }

    /// Returns the `(left, right)` elbow positions.
    #[inline]
    pub fn elbows(&self) -> (Point2<f32>, Point2<f32>) {
        (self.left_elbow, self.right_elbow)
    }
}

/// Computes the rectangle to draw a garment into, or `None` if `landmarks` is too short to
/// locate the torso.
pub fn compute_placement(landmarks: &[Landmark], surface: Resolution) -> Option<Rect> {
    Placement::compute(landmarks, surface).map(|placement| placement.rect())
}
