use engine::{Rect, Renderer, Rgba, Scene};

use crate::app::tuning::GameTuning;

mod background;
mod bullet;
mod command;
mod decorator;
mod direction;
mod enemy;
mod invoker;
mod minimap;
mod player;
mod playing;
mod prototype;
mod wave;

#[cfg(test)]
mod test_support;

pub(crate) const SCREEN_WIDTH: u32 = 1280;
pub(crate) const SCREEN_HEIGHT: u32 = 720;

/// Player sprite cell and collision box.
pub(crate) const ENTITY_WIDTH: i32 = 45;
pub(crate) const ENTITY_HEIGHT: i32 = 65;
/// Closest a player may walk to the screen edge.
pub(crate) const BORDER_ALLOWANCE: i32 = 12;
pub(crate) const FRAME_DURATION_MS: u64 = 100;
pub(crate) const SPRITE_COLUMNS: u32 = 4;

pub(crate) fn build_playing_scene(tuning: GameTuning) -> Box<dyn Scene> {
    Box::new(playing::PlayingScene::new(tuning))
}

/// Draws a `thickness`-wide frame just outside `rect`.
pub(crate) fn draw_outline(renderer: &mut dyn Renderer, rect: Rect, thickness: i32, color: Rgba) {
    let outer = Rect::new(
        rect.x - thickness,
        rect.y - thickness,
        rect.w + thickness * 2,
        rect.h + thickness * 2,
    );
    renderer.draw_filled_rect(Rect::new(outer.x, outer.y, outer.w, thickness), color);
    renderer.draw_filled_rect(
        Rect::new(outer.x, outer.bottom() - thickness, outer.w, thickness),
        color,
    );
    renderer.draw_filled_rect(Rect::new(outer.x, rect.y, thickness, rect.h), color);
    renderer.draw_filled_rect(
        Rect::new(outer.right() - thickness, rect.y, thickness, rect.h),
        color,
    );
}
