mod raster;
mod renderer;

use thiserror::Error;

use crate::assets::AssetError;

pub use raster::Surface;
pub use renderer::PixelsRenderer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

/// Opaque handle to a texture owned by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to present frame: {0}")]
    Present(String),
    #[error("failed to resize surface to {width}x{height}: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Drawing capability handed to scenes.
///
/// Coordinates are logical pixels of the current render target: the screen
/// framebuffer by default, or an off-screen texture selected with
/// [`Renderer::set_render_target`].
pub trait Renderer {
    fn screen_size(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgba);
    fn draw_filled_rect(&mut self, rect: Rect, color: Rgba);
    fn draw_texture_region(&mut self, texture: TextureId, src: Rect, dst: Rect);
    fn create_target_texture(&mut self, width: u32, height: u32) -> TextureId;
    fn set_render_target(&mut self, target: Option<TextureId>);
    fn load_texture(&mut self, key: &str) -> Result<TextureId, AssetError>;
    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)>;
    fn present(&mut self) -> Result<(), RenderError>;
}
