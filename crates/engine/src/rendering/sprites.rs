use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

use super::canvas::Rgba;
use crate::sprite_keys::{sprite_image_path, validate_sprite_id};

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    /// `None` when the buffer does not hold `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if rgba.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let slice = self.rgba.get(offset..offset + 4)?;
        Some([slice[0], slice[1], slice[2], slice[3]])
    }
}

/// What a sprite id resolves to this frame. A placeholder is a valid texture, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texture<'a> {
    Image(&'a SpriteImage),
    Placeholder,
}

/// Load-once cache of sprite images keyed by id.
///
/// Failed loads are remembered as `None` so the disk is hit at most once per id, and
/// each failing id is warned about once.
#[derive(Debug, Default)]
pub struct SpriteCache {
    sprite_root: Option<PathBuf>,
    images: HashMap<String, Option<SpriteImage>>,
    warned_ids: HashSet<String>,
}

impl SpriteCache {
    /// With no root every id renders as a placeholder, silently.
    pub fn new(sprite_root: Option<PathBuf>) -> Self {
        Self {
            sprite_root,
            images: HashMap::new(),
            warned_ids: HashSet::new(),
        }
    }

    pub fn sprite_root(&self) -> Option<&Path> {
        self.sprite_root.as_deref()
    }

    pub fn insert(&mut self, id: &str, image: SpriteImage) {
        self.images.insert(id.to_string(), Some(image));
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    pub fn texture(&mut self, id: &str) -> Texture<'_> {
        if !self.images.contains_key(id) {
            let loaded = self.load(id);
            self.images.insert(id.to_string(), loaded);
        }
        match self.images.get(id) {
            Some(Some(image)) => Texture::Image(image),
            _ => Texture::Placeholder,
        }
    }

    /// First id in `candidates` that resolves to an image.
    pub fn first_available<'s>(&mut self, candidates: &[&'s str]) -> Option<&'s str> {
        candidates
            .iter()
            .copied()
            .find(|id| matches!(self.texture(id), Texture::Image(_)))
    }

    fn load(&mut self, id: &str) -> Option<SpriteImage> {
        let root = self.sprite_root.as_deref()?;
        if let Err(error) = validate_sprite_id(id) {
            let reason = error.to_string();
            warn_sprite_load_once(&mut self.warned_ids, id, None, &reason);
            return None;
        }
        let path = sprite_image_path(root, id);
        match load_sprite_rgba(&path) {
            Ok(image) => Some(image),
            Err(reason) => {
                warn_sprite_load_once(&mut self.warned_ids, id, Some(&path), &reason);
                None
            }
        }
    }
}

fn load_sprite_rgba(path: &Path) -> Result<SpriteImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    let (width, height) = image.dimensions();
    SpriteImage::from_rgba(width, height, image.into_raw())
        .ok_or_else(|| "unexpected_buffer_size".to_string())
}

fn warn_sprite_load_once(
    warned_ids: &mut HashSet<String>,
    id: &str,
    path: Option<&Path>,
    reason: &str,
) {
    if !warned_ids.insert(id.to_string()) {
        return;
    }
    let path_display = path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_id = id,
        path = %path_display,
        reason = reason,
        "sprite_load_failed_using_placeholder"
    );
}
