use std::thread;

use super::{Color, Image, Rect};

/// Composites a scaled source image onto a destination image when dropped.
///
/// Returned by [`Image::blend_from`].
pub struct Blend<'a> {
    dest: &'a mut Image,
    src: &'a Image,
    rect: Rect,
    opacity: f32,
}

impl<'a> Blend<'a> {
    pub(super) fn new(dest: &'a mut Image, src: &'a Image) -> Self {
        Self {
            rect: dest.rect(),
            dest,
            src,
            opacity: 1.0,
        }
    }

    /// Sets the destination rectangle the source image is stretched to fill.
    ///
    /// Only destination pixels whose centers lie inside `rect` are written. Parts of `rect` outside
    /// of the destination image are clipped. An empty `rect` makes the operation a no-op.
    pub fn dest_rect(&mut self, rect: Rect) -> &mut Self {
        self.rect = rect;
        self
    }

    /// Multiplies the alpha of every source pixel by `opacity` (clamped to `0.0..=1.0`).
    pub fn opacity(&mut self, opacity: f32) -> &mut Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    fn sample(&self, dest_x: u32, dest_y: u32) -> Color {
        // Nearest neighbor, measured from pixel centers.
        let (w, h) = (self.src.width(), self.src.height());
        let u = (dest_x as f32 + 0.5 - self.rect.x()) / self.rect.width();
        let v = (dest_y as f32 + 0.5 - self.rect.y()) / self.rect.height();
        let x = ((u * w as f32) as u32).min(w - 1);
        let y = ((v * h as f32) as u32).min(h - 1);
        let pix = self.src.get(x, y);
        pix.with_alpha((f32::from(pix.a()) * self.opacity).round() as u8)
    }
}

impl Drop for Blend<'_> {
    fn drop(&mut self) {
        if thread::panicking() || self.src.resolution().is_empty() {
            return;
        }

        let (xs, ys) = self
            .rect
            .pixel_ranges(self.dest.width(), self.dest.height());
        for y in ys {
            for x in xs.clone() {
                let src = self.sample(x, y);
                let blended = blend_alpha(self.dest.get(x, y), src);
                self.dest.set(x, y, blended);
            }
        }
    }
}

/// Composites `src` over `dest`, mixing color channels in linear light.
pub(crate) fn blend_alpha(dest: Color, src: Color) -> Color {
    match src.a() {
        0 => return dest,
        255 => return src,
        _ => {}
    }

    let src_a = unorm(src.a());
    let dest_a = unorm(dest.a());
    let out_a = src_a + dest_a * (1.0 - src_a);

    let mut out = [0; 4];
    for (c, out) in out.iter_mut().take(3).enumerate() {
        let s = srgb_to_linear(unorm(src.0[c]));
        let d = srgb_to_linear(unorm(dest.0[c]));
        let mixed = (s * src_a + d * dest_a * (1.0 - src_a)) / out_a;
        *out = to_u8(linear_to_srgb(mixed));
    }
    out[3] = to_u8(out_a);
    Color(out)
}

fn unorm(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}
