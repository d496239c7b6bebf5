use std::collections::HashMap;

use engine::{AssetError, Rect, RenderError, Renderer, Rgba, TextureId};

use super::background::Background;
use super::bullet::Bullet;
use super::direction::Direction;
use super::player::Player;
use super::prototype::{EntityId, Prototype, Spawned};
use super::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::app::tuning::GameTuning;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCall {
    Clear(Rgba),
    Fill { rect: Rect, color: Rgba },
    Texture { texture: TextureId, src: Rect, dst: Rect },
    Target(Option<TextureId>),
    Present,
}

/// Renderer fake that records every call and serves textures for the keys
/// registered in `loadable`.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) calls: Vec<DrawCall>,
    pub(crate) loadable: HashMap<String, (u32, u32)>,
    textures: Vec<(u32, u32)>,
}

impl RecordingRenderer {
    pub(crate) fn with_texture(mut self, key: &str, size: (u32, u32)) -> Self {
        self.loadable.insert(key.to_string(), size);
        self
    }

    pub(crate) fn fills(&self) -> Vec<(Rect, Rgba)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Fill { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn screen_size(&self) -> (u32, u32) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn draw_filled_rect(&mut self, rect: Rect, color: Rgba) {
        self.calls.push(DrawCall::Fill { rect, color });
    }

    fn draw_texture_region(&mut self, texture: TextureId, src: Rect, dst: Rect) {
        self.calls.push(DrawCall::Texture { texture, src, dst });
    }

    fn create_target_texture(&mut self, width: u32, height: u32) -> TextureId {
        self.textures.push((width, height));
        TextureId(self.textures.len() as u32 - 1)
    }

    fn set_render_target(&mut self, target: Option<TextureId>) {
        self.calls.push(DrawCall::Target(target));
    }

    fn load_texture(&mut self, key: &str) -> Result<TextureId, AssetError> {
        match self.loadable.get(key) {
            Some(size) => {
                self.textures.push(*size);
                Ok(TextureId(self.textures.len() as u32 - 1))
            }
            None => Err(AssetError::Open {
                path: format!("{key}.png").into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(texture.0 as usize).copied()
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Present);
        Ok(())
    }
}

pub(crate) fn test_tuning() -> GameTuning {
    GameTuning::default()
}

pub(crate) fn test_player_prototype(tuning: &GameTuning) -> Player {
    Player::prototype(tuning, None, (SCREEN_WIDTH, SCREEN_HEIGHT))
}

pub(crate) fn test_player(tuning: &GameTuning) -> Player {
    test_player_prototype(tuning).clone_with_id(EntityId(1))
}

pub(crate) fn test_background() -> Background {
    Background::new(None, (2560, 1440), (SCREEN_WIDTH, SCREEN_HEIGHT))
}

pub(crate) fn bullet_at(center: (f32, f32), facing: Direction) -> Bullet {
    match Bullet::prototype(10.0, 500.0).spawn(EntityId(99)) {
        Spawned::Bullet(mut bullet) => {
            bullet.launch(center, facing);
            bullet
        }
        other => panic!("bullet prototype spawned {other:?}"),
    }
}
