use std::collections::{HashMap, HashSet};

use egui::{ColorImage, Pos2, Rect, TextureHandle, TextureOptions, Vec2};
use story_deck_protocol::ElementKey;

/// Decode fetched bytes (JPEG or PNG) into an egui image.
pub fn decode(bytes: &[u8]) -> Result<ColorImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// UV sub-rect that scales an image of `image` size to fill `target`,
/// cropping the overflowing axis around the center.
pub fn cover_uv(image: Vec2, target: Vec2) -> Rect {
    let full = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    if image.x <= 0.0 || image.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return full;
    }
    let scale = (target.x / image.x).max(target.y / image.y);
    let u = (target.x / scale / image.x).min(1.0);
    let v = (target.y / scale / image.y).min(1.0);
    Rect::from_center_size(Pos2::new(0.5, 0.5), Vec2::new(u, v))
}

/// Thumbnail textures keyed by the element that shows them.
#[derive(Default)]
pub struct ImageStore {
    textures: HashMap<ElementKey, TextureHandle>,
    failed: HashSet<ElementKey>,
    /// Encoded size of everything loaded, for the status bar.
    source_bytes: usize,
}

impl ImageStore {
    /// Decode `bytes` and upload them as the texture for `key`. Undecodable
    /// bodies mark the key failed so it is not fetched again.
    pub fn insert(&mut self, ctx: &egui::Context, key: ElementKey, bytes: &[u8]) {
        match decode(bytes) {
            Ok(image) => {
                let texture = ctx.load_texture(key.as_str(), image, TextureOptions::LINEAR);
                self.source_bytes += bytes.len();
                self.textures.insert(key, texture);
            }
            Err(err) => {
                tracing::warn!(%key, %err, "thumbnail could not be decoded");
                self.failed.insert(key);
            }
        }
    }

    pub fn mark_failed(&mut self, key: ElementKey) {
        self.failed.insert(key);
    }

    pub fn get(&self, key: &ElementKey) -> Option<&TextureHandle> {
        self.textures.get(key)
    }

    /// Neither loaded nor known to fail.
    pub fn wants(&self, key: &ElementKey) -> bool {
        !self.textures.contains_key(key) && !self.failed.contains(key)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn source_bytes(&self) -> usize {
        self.source_bytes
    }
}
