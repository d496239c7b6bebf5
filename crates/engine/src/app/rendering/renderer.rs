use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::assets::{load_sprite_surface, resolve_sprite_path, AssetError};

use super::raster::{blit_region_clipped, clear_frame, fill_rect_clipped, Surface};
use super::{Rect, RenderError, Renderer, Rgba, TextureId};

/// Software renderer drawing into a fixed logical framebuffer that `pixels`
/// scales onto the window surface.
pub struct PixelsRenderer {
    pixels: Pixels<'static>,
    logical_width: u32,
    logical_height: u32,
    asset_root: PathBuf,
    textures: Vec<Surface>,
    texture_by_key: HashMap<String, TextureId>,
    warned_missing_keys: HashSet<String>,
    target: Option<TextureId>,
}

impl PixelsRenderer {
    pub fn new(
        window: Arc<Window>,
        logical_width: u32,
        logical_height: u32,
        asset_root: PathBuf,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(logical_width, logical_height, surface)?;
        Ok(Self {
            pixels,
            logical_width,
            logical_height,
            asset_root,
            textures: Vec::new(),
            texture_by_key: HashMap::new(),
            warned_missing_keys: HashSet::new(),
            target: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels
            .resize_surface(width, height)
            .map_err(|error| RenderError::Resize {
                width,
                height,
                reason: error.to_string(),
            })
    }

    fn texture_index(&self, texture: TextureId) -> Option<usize> {
        let index = texture.0 as usize;
        (index < self.textures.len()).then_some(index)
    }

    fn warn_texture_load_once(&mut self, key: &str, error: &AssetError) {
        if !self.warned_missing_keys.insert(key.to_string()) {
            return;
        }
        warn!(
            texture_key = key,
            error = %error,
            "renderer_texture_load_failed_using_placeholder"
        );
    }
}

impl Renderer for PixelsRenderer {
    fn screen_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    fn clear(&mut self, color: Rgba) {
        match self.target.and_then(|id| self.texture_index(id)) {
            Some(index) => clear_frame(&mut self.textures[index].rgba, color),
            None => clear_frame(self.pixels.frame_mut(), color),
        }
    }

    fn draw_filled_rect(&mut self, rect: Rect, color: Rgba) {
        match self.target.and_then(|id| self.texture_index(id)) {
            Some(index) => {
                let surface = &mut self.textures[index];
                fill_rect_clipped(&mut surface.rgba, surface.width, surface.height, rect, color);
            }
            None => fill_rect_clipped(
                self.pixels.frame_mut(),
                self.logical_width,
                self.logical_height,
                rect,
                color,
            ),
        }
    }

    fn draw_texture_region(&mut self, texture: TextureId, src: Rect, dst: Rect) {
        let Some(src_index) = self.texture_index(texture) else {
            return;
        };
        match self.target.and_then(|id| self.texture_index(id)) {
            Some(dst_index) if dst_index == src_index => {
                warn!(texture = texture.0, "renderer_self_blit_ignored");
            }
            Some(dst_index) => {
                let (target, sprite) = split_target_and_source(&mut self.textures, dst_index, src_index);
                blit_region_clipped(&mut target.rgba, target.width, target.height, sprite, src, dst);
            }
            None => blit_region_clipped(
                self.pixels.frame_mut(),
                self.logical_width,
                self.logical_height,
                &self.textures[src_index],
                src,
                dst,
            ),
        }
    }

    fn create_target_texture(&mut self, width: u32, height: u32) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Surface::new(width, height));
        id
    }

    fn set_render_target(&mut self, target: Option<TextureId>) {
        self.target = target.filter(|id| self.texture_index(*id).is_some());
    }

    fn load_texture(&mut self, key: &str) -> Result<TextureId, AssetError> {
        if let Some(id) = self.texture_by_key.get(key) {
            return Ok(*id);
        }
        let loaded = resolve_sprite_path(&self.asset_root, key)
            .and_then(|path| load_sprite_surface(&path));
        match loaded {
            Ok(surface) => {
                let id = TextureId(self.textures.len() as u32);
                self.textures.push(surface);
                self.texture_by_key.insert(key.to_string(), id);
                Ok(id)
            }
            Err(error) => {
                self.warn_texture_load_once(key, &error);
                Err(error)
            }
        }
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.texture_index(texture)
            .map(|index| (self.textures[index].width, self.textures[index].height))
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.target = None;
        self.pixels
            .render()
            .map_err(|error| RenderError::Present(error.to_string()))
    }
}

fn split_target_and_source(
    textures: &mut [Surface],
    target: usize,
    source: usize,
) -> (&mut Surface, &Surface) {
    if target < source {
        let (head, tail) = textures.split_at_mut(source);
        (&mut head[target], &tail[0])
    } else {
        let (head, tail) = textures.split_at_mut(target);
        (&mut tail[0], &head[source])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_type_is_non_generic() {
        let _renderer: Option<PixelsRenderer> = None;
    }

    #[test]
    fn split_returns_distinct_surfaces_in_either_order() {
        let mut textures = vec![Surface::new(1, 1), Surface::new(2, 2), Surface::new(3, 3)];

        let (target, source) = split_target_and_source(&mut textures, 0, 2);
        assert_eq!((target.width, source.width), (1, 3));

        let (target, source) = split_target_and_source(&mut textures, 2, 1);
        assert_eq!((target.width, source.width), (3, 2));
    }
}
