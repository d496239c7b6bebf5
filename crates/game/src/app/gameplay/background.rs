use engine::{Rect, Renderer, Rgba, TextureId};

use super::direction::Axis;

const CHECKER_TILE_PX: i32 = 64;
const CHECKER_LIGHT: Rgba = Rgba::new(196, 206, 186, 255);
const CHECKER_DARK: Rgba = Rgba::new(170, 182, 160, 255);

/// A screen-sized viewport over a larger scrolling world.
///
/// The viewport starts centred in the world. Only player movement resolution
/// moves it, through the crate-private scroll methods.
#[derive(Debug, Clone)]
pub(crate) struct Background {
    texture: Option<TextureId>,
    world_width: i32,
    world_height: i32,
    viewport: Rect,
}

impl Background {
    pub(crate) fn new(texture: Option<TextureId>, world_size: (u32, u32), view_size: (u32, u32)) -> Self {
        let view_w = view_size.0 as i32;
        let view_h = view_size.1 as i32;
        let world_width = (world_size.0 as i32).max(view_w);
        let world_height = (world_size.1 as i32).max(view_h);
        Self {
            texture,
            world_width,
            world_height,
            viewport: Rect::new(
                (world_width - view_w) / 2,
                (world_height - view_h) / 2,
                view_w,
                view_h,
            ),
        }
    }

    pub(crate) fn viewport(&self) -> Rect {
        self.viewport
    }

    pub(crate) fn world_size(&self) -> (i32, i32) {
        (self.world_width, self.world_height)
    }

    pub(crate) fn world_bounds(&self) -> Rect {
        Rect::new(0, 0, self.world_width, self.world_height)
    }

    pub(crate) fn is_left_edge(&self) -> bool {
        self.viewport.x <= 0
    }

    pub(crate) fn is_right_edge(&self) -> bool {
        self.viewport.x >= self.world_width - self.viewport.w
    }

    pub(crate) fn is_up_edge(&self) -> bool {
        self.viewport.y <= 0
    }

    pub(crate) fn is_down_edge(&self) -> bool {
        self.viewport.y >= self.world_height - self.viewport.h
    }

    pub(crate) fn can_scroll(&self, axis: Axis) -> bool {
        match axis {
            Axis::Left => !self.is_left_edge(),
            Axis::Right => !self.is_right_edge(),
            Axis::Up => !self.is_up_edge(),
            Axis::Down => !self.is_down_edge(),
        }
    }

    /// Moves the viewport by up to `delta` pixels along one axis, clamped to
    /// the world. Returns the distance actually scrolled.
    pub(crate) fn scroll(&mut self, horizontal: bool, delta: i32) -> i32 {
        let (position, max) = if horizontal {
            (&mut self.viewport.x, self.world_width - self.viewport.w)
        } else {
            (&mut self.viewport.y, self.world_height - self.viewport.h)
        };
        let next = (*position + delta).clamp(0, max.max(0));
        let applied = next - *position;
        *position = next;
        applied
    }

    #[cfg(test)]
    pub(crate) fn set_viewport_origin(&mut self, x: i32, y: i32) {
        self.viewport.x = x.clamp(0, self.world_width - self.viewport.w);
        self.viewport.y = y.clamp(0, self.world_height - self.viewport.h);
    }

    pub(crate) fn render(&self, renderer: &mut dyn Renderer) {
        let screen = Rect::new(0, 0, self.viewport.w, self.viewport.h);
        match self.texture {
            Some(texture) => renderer.draw_texture_region(texture, self.viewport, screen),
            None => self.render_checkerboard(renderer),
        }
    }

    fn render_checkerboard(&self, renderer: &mut dyn Renderer) {
        let first_col = self.viewport.x.div_euclid(CHECKER_TILE_PX);
        let first_row = self.viewport.y.div_euclid(CHECKER_TILE_PX);
        let last_col = (self.viewport.right() - 1).div_euclid(CHECKER_TILE_PX);
        let last_row = (self.viewport.bottom() - 1).div_euclid(CHECKER_TILE_PX);

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let color = if (row + col) % 2 == 0 {
                    CHECKER_LIGHT
                } else {
                    CHECKER_DARK
                };
                let tile = Rect::new(
                    col * CHECKER_TILE_PX - self.viewport.x,
                    row * CHECKER_TILE_PX - self.viewport.y,
                    CHECKER_TILE_PX,
                    CHECKER_TILE_PX,
                );
                renderer.draw_filled_rect(tile, color);
            }
        }
    }
}
