//! Resource-id → texture lookup
//!
//! Loaders decode images elsewhere and hand finished textures in here.
//! Lookups of unknown ids fall back to a generated checkerboard so a
//! missing asset shows up on screen instead of stopping the frame.

use std::collections::HashMap;

use super::pixel::Rgba;
use super::texture::Texture;

/// Edge length of the fallback texture
const NOT_FOUND_SIZE: u32 = 40;

/// Black and magenta quadrants, 40x40
pub fn not_found_texture() -> Texture {
    let half = NOT_FOUND_SIZE / 2;
    let pixels = (0..NOT_FOUND_SIZE * NOT_FOUND_SIZE)
        .map(|i| {
            let (x, y) = (i % NOT_FOUND_SIZE, i / NOT_FOUND_SIZE);
            if (x < half) == (y < half) {
                Rgba::BLACK
            } else {
                Rgba::MISSING
            }
        })
        .collect();
    Texture::from_raw(NOT_FOUND_SIZE, NOT_FOUND_SIZE, pixels)
}

#[derive(Debug, Clone)]
pub struct TextureRegistry {
    textures: HashMap<String, Texture>,
    not_found: Texture,
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            not_found: not_found_texture(),
        }
    }

    /// Store a texture, returning the one it replaced
    pub fn insert(&mut self, id: impl Into<String>, texture: Texture) -> Option<Texture> {
        let id = id.into();
        log::debug!("Registered texture '{id}' ({}x{})", texture.width(), texture.height());
        self.textures.insert(id, texture)
    }

    /// Texture for `id`, or the fallback texture when it is unknown
    pub fn get(&self, id: &str) -> Texture {
        match self.textures.get(id) {
            Some(texture) => texture.clone(),
            None => {
                log::warn!("Texture '{id}' not found, using placeholder");
                self.not_found.clone()
            }
        }
    }

    pub fn try_get(&self, id: &str) -> Option<&Texture> {
        self.textures.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Texture> {
        self.textures.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.textures.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn not_found(&self) -> &Texture {
        &self.not_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_quadrants() {
        let tex = not_found_texture();
        assert_eq!(tex.size(), (40, 40));
        assert_eq!(tex.get(0, 0), Some(Rgba::BLACK));
        assert_eq!(tex.get(19, 19), Some(Rgba::BLACK));
        assert_eq!(tex.get(20, 0), Some(Rgba::MISSING));
        assert_eq!(tex.get(0, 39), Some(Rgba::MISSING));
        assert_eq!(tex.get(39, 39), Some(Rgba::BLACK));
    }

    #[test]
    fn test_lookup_falls_back() {
        let mut registry = TextureRegistry::new();
        let ship = Texture::filled(4, 4, Rgba::WHITE).unwrap();
        assert!(registry.insert("ship", ship.clone()).is_none());

        assert!(registry.get("ship").shares_pixels(&ship));
        assert!(registry.get("boss").shares_pixels(registry.not_found()));
        assert!(registry.try_get("boss").is_none());

        assert_eq!(registry.len(), 1);
        assert!(registry.remove("ship").is_some());
        assert!(!registry.contains("ship"));
        assert!(registry.is_empty());
    }
}
