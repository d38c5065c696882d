//! Image manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA image. It is used for camera frames, garment assets and the
//!   overlay drawing surface alike.
//! - [`Color`], an 8-bit sRGB color with alpha channel.
//! - [`Rect`], a rectangle in floating-point pixel coordinates.
//! - A variety of [`draw`] functions and the [`Outline`] path type to draw vector shapes.
//! - Scaled alpha blending of one image onto another via [`Image::blend_from`].

mod blend;
pub mod draw;
mod outline;
mod rect;
mod resolution;


use std::{fmt, path::Path};

use anyhow::Context;
use embedded_graphics::{pixelcolor::raw::RawU32, prelude::PixelColor};
use image::{ImageBuffer, ImageError, Rgba, RgbaImage};

pub use blend::*;
pub use outline::Outline;
pub use rect::Rect;
pub use resolution::Resolution;

/// An owned RGBA image with 8 bits per channel.
///
/// Used for camera frames, garment pictures and the overlay surface.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pub(crate) buf: RgbaImage,
}

impl Image {
    /// Creates a `width` x `height` image with every pixel set to [`Color::NONE`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Decodes an encoded image (PNG, JPEG or GIF) from a byte slice.
    pub fn decode(data: &[u8]) -> Result<Self, ImageError> {
        let buf = image::load_from_memory(data)?.to_rgba8();
        Ok(Self { buf })
    }

    /// Loads and decodes an image from the filesystem.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::decode(&data).with_context(|| format!("failed to decode {}", path.display()))
    }

    /// Wraps tightly packed RGBA pixel data, as delivered by capture devices.
    ///
    /// # Panics
    ///
    /// Panics if `buf` does not hold exactly 4 bytes for every pixel of `res`.
    pub fn from_rgba8(res: Resolution, buf: &[u8]) -> Self {
        match ImageBuffer::from_vec(res.width(), res.height(), buf.to_vec()) {
            Some(buf) => Self { buf },
            None => panic!("{} bytes of pixel data do not fit a {res} image", buf.len()),
        }
    }

    /// Encodes the image into `path`, in the format named by its extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageError> {
        self.buf.save(path)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns the rectangle spanning the whole image, starting at `(0, 0)`.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        Color(self.buf[(x, y)].0)
    }

    /// Overwrites the pixel at `(x, y)`, ignoring alpha.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Alpha-blends `color` onto the pixel at `(x, y)`.
    ///
    /// Coordinates outside of the image are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let blended = blend::blend_alpha(self.get(x, y), color);
        self.set(x, y, blended);
    }

    /// Blends `src` onto `self`, stretching or shrinking `src` as necessary.
    ///
    /// By default, the entire `src` is blended onto the entire destination image. The destination
    /// area can be narrowed with [`Blend::dest_rect`].
    pub fn blend_from<'a>(&'a mut self, src: &'a Image) -> Blend<'a> {
        Blend::new(self, src)
    }

    /// Fills the whole image with `color`.
    pub fn clear(&mut self, color: Color) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = color.0);
    }

    /// Returns whether every pixel in the image is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.buf.pixels().all(|pix| pix.0[3] == 0)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({})", self.resolution())
    }
}

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Transparent. Cleared overlays are filled with this.
    pub const NONE: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);
    pub const YELLOW: Self = Self([255, 255, 0, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Parses a `#rrggbb` or `#rrggbbaa` color token.
    pub fn from_hex(token: &str) -> Option<Self> {
        let hex = token.strip_prefix('#')?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok();
        let a = if hex.len() == 8 { channel(3)? } else { 255 };
        Some(Self([channel(0)?, channel(1)?, channel(2)?, a]))
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }

    pub fn with_alpha(mut self, a: u8) -> Color {
        self.0[3] = a;
        self
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

// Lets `draw` render embedded-graphics primitives straight onto an `Image`.
impl PixelColor for Color {
    type Raw = RawU32;
}
