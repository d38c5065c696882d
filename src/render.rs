//! Draws garments onto the overlay surface.
//!
//! The renderer never clears the surface. Callers clear it once per detection result, before
//! drawing, so that an empty result leaves a blank overlay.

use nalgebra::{Point2, Vector2};

use crate::garment::{Garment, GarmentLook};
use crate::image::{draw, Color, Image, Outline, Rect};
use crate::placement::Placement;

/// Opacity of image garments.
pub const IMAGE_OPACITY: f32 = 0.9;

const BODY_ALPHA: u8 = 0x60;
const SLEEVE_ALPHA: u8 = 0x40;
const GUIDE_ALPHA: u8 = 0x80;
const OUTLINE_WIDTH: f32 = 2.5;

/// Draws `garment` onto `surface` at `placement`.
///
/// Placements without a positive, finite area draw nothing.
pub fn render(surface: &mut Image, placement: &Placement, garment: &Garment) {
    if !placement.rect().has_area() {
        log::trace!("skipping garment draw for empty rect {:?}", placement.rect());
        return;
    }

    match garment.look() {
        GarmentLook::Image(image) => render_image(surface, placement.rect(), image),
        GarmentLook::Procedural { color } => render_procedural(surface, placement, color),
    }
}

/// Blends `image` into `rect`, stretched to fill it exactly.
pub fn render_image(surface: &mut Image, rect: Rect, image: &Image) {
    surface
        .blend_from(image)
        .dest_rect(rect)
        .opacity(IMAGE_OPACITY);
}

/// Draws a dress silhouette in `color`: a flared body panel, two sleeves and a dashed center
/// line.
pub fn render_procedural(surface: &mut Image, placement: &Placement, color: Color) {
    let rect = placement.rect();

    let body = Outline::new(rect.at(0.1, 0.0))
        .line_to(rect.at(0.9, 0.0))
        .quad_to(rect.at(1.0, 0.3), rect.at(0.95, 1.0))
        .line_to(rect.at(0.05, 1.0))
        .quad_to(rect.at(0.0, 0.3), rect.at(0.1, 0.0))
        .close();
    draw::fill(surface, &body).color(color.with_alpha(BODY_ALPHA));
    draw::stroke(surface, &body)
        .color(color)
        .stroke_width(OUTLINE_WIDTH);

    let (left_shoulder, right_shoulder) = placement.shoulders();
    let (left_elbow, right_elbow) = placement.elbows();
    for (shoulder, elbow, outward) in [
        (left_shoulder, left_elbow, -1.0),
        (right_shoulder, right_elbow, 1.0),
    ] {
        let sleeve = sleeve(shoulder, elbow, outward);
        draw::fill(surface, &sleeve).color(color.with_alpha(SLEEVE_ALPHA));
        draw::stroke(surface, &sleeve)
            .color(color)
            .stroke_width(OUTLINE_WIDTH);
    }

    draw::line(surface, placement.neck(), placement.hip())
        .color(color.with_alpha(GUIDE_ALPHA))
        .stroke_width(1.0)
        .dash(5.0, 5.0);
}

/// Builds the quadrilateral of one sleeve. `outward` is -1 for the left sleeve and 1 for the
/// right one.
fn sleeve(shoulder: Point2<f32>, elbow: Point2<f32>, outward: f32) -> Outline {
    Outline::polygon([
        shoulder,
        elbow,
        elbow + Vector2::new(15.0 * outward, 10.0),
        shoulder + Vector2::new(20.0 * outward, 10.0),
    ])
}
