//! Selectable garments and the registry that owns them.

use std::{io, path::Path};

use crate::image::{Color, Image};

/// A selectable garment.
///
/// Every garment has a display identity (name, color, emoji). It may additionally carry a raster
/// image; without one it is drawn as a procedural silhouette in its color.
#[derive(Debug, Clone)]
pub struct Garment {
    name: String,
    color: Color,
    emoji: &'static str,
    image: Option<Image>,
}

/// How a [`Garment`] is drawn onto the overlay.
#[derive(Debug, Clone, Copy)]
pub enum GarmentLook<'a> {
    /// Draw the raster image, stretched to the placement rectangle.
    Image(&'a Image),
    /// Draw a vector dress silhouette in the given color.
    Procedural { color: Color },
}

impl Garment {
    pub fn new(name: impl Into<String>, color: Color, emoji: &'static str) -> Self {
        Self {
            name: name.into(),
            color,
            emoji,
            image: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn emoji(&self) -> &'static str {
        self.emoji
    }

    #[inline]
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn look(&self) -> GarmentLook<'_> {
        match &self.image {
            Some(image) => GarmentLook::Image(image),
            None => GarmentLook::Procedural { color: self.color },
        }
    }
}

const BUILTIN: &[(&str, Color, &str)] = &[
    ("Red Dress", Color::from_rgb8(0xef, 0x44, 0x44), "👗"),
    ("Blue Dress", Color::from_rgb8(0x3b, 0x82, 0xf6), "💙"),
    ("Green Dress", Color::from_rgb8(0x10, 0xb9, 0x81), "💚"),
    ("Purple Dress", Color::from_rgb8(0xa8, 0x55, 0xf7), "💜"),
    ("Black Dress", Color::from_rgb8(0x1f, 0x29, 0x37), "🖤"),
];

/// Errors returned by [`Registry`] operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("no garment slot {slot} (registry has {len} slots)")]
    NoSuchSlot { slot: usize, len: usize },
    #[error("failed to decode garment image")]
    Decode(#[from] image::ImageError),
    #[error("failed to read garment image")]
    Io(#[from] io::Error),
}

/// Owns the fixed list of garment slots and tracks which one is active.
///
/// The slot count is fixed when the registry is created. Exactly one slot is active at any time,
/// initially slot 0.
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<Garment>,
    active: usize,
}

impl Registry {
    /// Creates a registry holding `garments`, with the first one active.
    ///
    /// # Panics
    ///
    /// Panics if `garments` is empty.
    pub fn new(garments: Vec<Garment>) -> Self {
        assert!(!garments.is_empty(), "garment registry needs at least one slot");
        Self {
            slots: garments,
            active: 0,
        }
    }

    /// Creates a registry with the five built-in dresses, none of which has an image yet.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|&(name, color, emoji)| Garment::new(name, color, emoji))
                .collect(),
        )
    }

    /// Returns the number of garment slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&Garment> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Garment> + '_ {
        self.slots.iter()
    }

    #[inline]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn active(&self) -> &Garment {
        &self.slots[self.active]
    }

    /// Makes `slot` the active garment.
    pub fn select(&mut self, slot: usize) -> Result<(), AssetError> {
        self.check_slot(slot)?;
        self.active = slot;
        Ok(())
    }

    /// Loads the image at `path` into `slot`.
    ///
    /// Failures are logged and otherwise ignored; the slot keeps its previous look. Returns
    /// whether the image was loaded.
    pub fn load_builtin(&mut self, slot: usize, path: &Path) -> bool {
        let result = self.check_slot(slot).and_then(|_| {
            let data = std::fs::read(path)?;
            Ok(Image::decode(&data)?)
        });
        match result {
            Ok(image) => {
                self.slots[slot].image = Some(image);
                true
            }
            Err(e) => {
                log::debug!("built-in garment {} not loaded: {e}", path.display());
                false
            }
        }
    }

    /// Replaces the image of `slot`, keeping its name.
    pub fn assign_image(&mut self, slot: usize, image: Image) -> Result<&Garment, AssetError> {
        self.check_slot(slot)?;
        let garment = &mut self.slots[slot];
        garment.image = Some(image);
        Ok(garment)
    }

    /// Decodes an uploaded file and assigns it to `slot`.
    ///
    /// The slot is renamed after the file, without its extension. On error the registry is left
    /// unchanged.
    pub fn upload_to_slot(
        &mut self,
        slot: usize,
        file_name: &str,
        data: &[u8],
    ) -> Result<&Garment, AssetError> {
        self.check_slot(slot)?;
        let image = Image::decode(data)?;
        self.install_upload(slot, file_name, image)
    }

    /// Assigns an already decoded upload to `slot` and renames the slot after `file_name`.
    pub fn install_upload(
        &mut self,
        slot: usize,
        file_name: &str,
        image: Image,
    ) -> Result<&Garment, AssetError> {
        self.check_slot(slot)?;
        let garment = &mut self.slots[slot];
        garment.image = Some(image);
        garment.name = display_name(file_name).to_string();
        Ok(garment)
    }

    /// Removes every garment's image, reverting all slots to their procedural look.
    pub fn clear_all(&mut self) {
        for garment in &mut self.slots {
            garment.image = None;
        }
    }

    pub(crate) fn check_slot(&self, slot: usize) -> Result<(), AssetError> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(AssetError::NoSuchSlot {
                slot,
                len: self.slots.len(),
            })
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Derives a garment's display name from an uploaded file name by stripping its extension.
pub fn display_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::png;

    #[test]
    fn builtin_catalogue() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.active_index(), 0);
        assert_eq!(registry.active().name(), "Red Dress");
        assert_eq!(Color::from_hex("#ef4444"), Some(registry.active().color()));
        assert_eq!(Color::from_hex("#1f2937"), Some(registry.get(4).unwrap().color()));
        assert!(registry.iter().all(|g| g.image().is_none()));
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut registry = Registry::builtin();
        registry.select(3).unwrap();
        assert_eq!(registry.active().name(), "Purple Dress");

        assert!(matches!(
            registry.select(5),
            Err(AssetError::NoSuchSlot { slot: 5, len: 5 })
        ));
        assert_eq!(registry.active_index(), 3);
    }

    #[test]
    fn upload_renames_slot() {
        let mut registry = Registry::builtin();
        let garment = registry
            .upload_to_slot(1, "summer.dress.png", &png(Color::GREEN))
            .unwrap();
        assert_eq!(garment.name(), "summer.dress");
        assert!(matches!(garment.look(), GarmentLook::Image(_)));
    }

    #[test]
    fn upload_beyond_capacity_changes_nothing() {
        let mut registry = Registry::builtin();
        let before = format!("{registry:?}");
        assert!(matches!(
            registry.upload_to_slot(5, "extra.png", &png(Color::RED)),
            Err(AssetError::NoSuchSlot { .. })
        ));
        assert_eq!(format!("{registry:?}"), before);
    }

    #[test]
    fn upload_garbage_is_decode_error() {
        let mut registry = Registry::builtin();
        assert!(matches!(
            registry.upload_to_slot(0, "notes.png", b"hello"),
            Err(AssetError::Decode(_))
        ));
        assert_eq!(registry.active().name(), "Red Dress");
        assert!(registry.active().image().is_none());
    }

    #[test]
    fn clear_all_removes_images() {
        let mut registry = Registry::builtin();
        for slot in 0..registry.len() {
            registry.upload_to_slot(slot, "x.png", &png(Color::BLUE)).unwrap();
        }
        registry.clear_all();
        assert!(registry.iter().all(|g| g.image().is_none()));
        assert!(matches!(
            registry.active().look(),
            GarmentLook::Procedural { .. }
        ));
        // Names from uploads are kept.
        assert_eq!(registry.active().name(), "x");
    }

    #[test]
    fn builtin_load_failure_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = Registry::builtin();
        assert!(!registry.load_builtin(0, &dir.path().join("missing.png")));
        assert!(registry.active().image().is_none());

        let path = dir.path().join("dress.png");
        std::fs::write(&path, png(Color::RED)).unwrap();
        assert!(registry.load_builtin(0, &path));
        assert!(!registry.load_builtin(7, &path));
        assert_eq!(registry.active().image().unwrap().width(), 4);
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("dress.png"), "dress");
        assert_eq!(display_name("my.fancy.dress.jpeg"), "my.fancy.dress");
        assert_eq!(display_name("noext"), "noext");
        assert_eq!(display_name("dir.d/file"), "dir.d/file");
        assert_eq!(display_name("trailing."), "trailing.");
    }
}
