use engine::{Rect, Renderer, Rgba, TextureId};

use super::bullet::Bullet;
use super::draw_outline;
use super::enemy::EnemyHandle;

pub(crate) const MINIMAP_DIMENSION: i32 = 150;
pub(crate) const MINIMAP_ALLOWANCE: i32 = 15;
const BORDER_THICKNESS: i32 = 2;

const BACKGROUND_COLOR: Rgba = Rgba::new(255, 255, 255, 75);
const BORDER_COLOR: Rgba = Rgba::new(10, 10, 10, 120);
const PLAYER_COLOR: Rgba = Rgba::new(0, 0, 0, 170);
const BULLET_COLOR: Rgba = Rgba::new(70, 70, 70, 150);
const ENEMY_COLOR: Rgba = Rgba::new(150, 50, 50, 120);
const PLAYER_DOT_PX: i32 = 4;
const BULLET_DOT_PX: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MinimapDot {
    pub(crate) rect: Rect,
    pub(crate) color: Rgba,
}

/// Read-only overlay that projects live entity positions into a fixed
/// 150x150 square in the top-right corner.
#[derive(Debug)]
pub(crate) struct Minimap {
    texture: Option<TextureId>,
    destination: Rect,
    scale: (f32, f32),
    dots: Vec<MinimapDot>,
}

impl Minimap {
    pub(crate) fn new(world_size: (i32, i32), screen_width: i32) -> Self {
        let world_w = world_size.0.max(1) as f32;
        let world_h = world_size.1.max(1) as f32;
        Self {
            texture: None,
            destination: Rect::new(
                screen_width - MINIMAP_DIMENSION - MINIMAP_ALLOWANCE,
                MINIMAP_ALLOWANCE,
                MINIMAP_DIMENSION,
                MINIMAP_DIMENSION,
            ),
            scale: (
                MINIMAP_DIMENSION as f32 / world_w,
                MINIMAP_DIMENSION as f32 / world_h,
            ),
            dots: Vec::new(),
        }
    }

    pub(crate) fn load(&mut self, renderer: &mut dyn Renderer) {
        self.texture = Some(
            renderer.create_target_texture(MINIMAP_DIMENSION as u32, MINIMAP_DIMENSION as u32),
        );
    }

    #[cfg(test)]
    pub(crate) fn destination(&self) -> Rect {
        self.destination
    }

    #[cfg(test)]
    pub(crate) fn dots(&self) -> &[MinimapDot] {
        &self.dots
    }

    /// Replaces last frame's dots with the given world-space entities.
    pub(crate) fn sample(&mut self, players: &[(f32, f32)], bullets: &[Bullet], enemies: &[EnemyHandle]) {
        self.dots.clear();
        for center in players {
            self.push_dot(*center, PLAYER_DOT_PX, PLAYER_COLOR);
        }
        for bullet in bullets.iter().filter(|bullet| bullet.is_alive()) {
            self.push_dot(bullet.center(), BULLET_DOT_PX, BULLET_COLOR);
        }
        for enemy in enemies {
            let enemy = enemy.borrow();
            let size = enemy.minimap_pixel_size();
            if size > 0 && !enemy.is_dead() {
                self.push_dot(enemy.position(), size, ENEMY_COLOR);
            }
        }
    }

    fn push_dot(&mut self, world_center: (f32, f32), size: i32, color: Rgba) {
        let x = (world_center.0 * self.scale.0) as i32 - size / 2;
        let y = (world_center.1 * self.scale.1) as i32 - size / 2;
        self.dots.push(MinimapDot {
            rect: Rect::new(x, y, size, size),
            color,
        });
    }

    pub(crate) fn render(&self, renderer: &mut dyn Renderer) {
        let Some(texture) = self.texture else {
            return;
        };
        renderer.set_render_target(Some(texture));
        renderer.clear(BACKGROUND_COLOR);
        for dot in &self.dots {
            renderer.draw_filled_rect(dot.rect, dot.color);
        }
        renderer.set_render_target(None);

        draw_outline(renderer, self.destination, BORDER_THICKNESS, BORDER_COLOR);
        renderer.draw_texture_region(
            texture,
            Rect::new(0, 0, MINIMAP_DIMENSION, MINIMAP_DIMENSION),
            self.destination,
        );
    }
}
