use std::collections::VecDeque;

use engine::{Point, Rect, Renderer, Rgba, TextureId};
use tracing::{debug, info};

use super::background::Background;
use super::command::{Command, CommandCategory, CommandContext, SpawnRequest};
use super::direction::{Axis, Direction};
use super::prototype::{EntityId, Prototype, Spawned};
use super::{BORDER_ALLOWANCE, ENTITY_HEIGHT, ENTITY_WIDTH, FRAME_DURATION_MS, SPRITE_COLUMNS};
use crate::app::tuning::GameTuning;

const PLACEHOLDER_BODY: Rgba = Rgba::new(40, 90, 200, 255);
const PLACEHOLDER_FACING: Rgba = Rgba::new(250, 250, 250, 255);
const FACING_MARK_PX: i32 = 8;

#[derive(Debug, Clone)]
pub(crate) struct Player {
    id: EntityId,
    texture: Option<TextureId>,
    hearts: u32,
    position: Point,
    speed: f32,
    speed_decay: f32,
    sprint_bonus: f32,
    damage_cooldown_ms: u64,
    cooldown_until_ms: Option<u64>,
    sprinting: bool,
    moving: bool,
    move_flags: [bool; 8],
    facing: Direction,
    frame: u32,
    last_frame_ms: Option<u64>,
    queue: VecDeque<Command>,
}

/// Mutable world state a player touches during its update.
pub(crate) struct PlayerUpdateContext<'a> {
    pub(crate) background: &'a mut Background,
    pub(crate) spawn_requests: &'a mut Vec<SpawnRequest>,
}

impl Player {
    /// Canonical player registered under the PLAYER tag, standing on the
    /// screen centre line.
    pub(crate) fn prototype(tuning: &GameTuning, texture: Option<TextureId>, screen: (u32, u32)) -> Self {
        Self {
            id: EntityId::PROTOTYPE,
            texture,
            hearts: tuning.player_hearts,
            position: Point::new(screen.0 as i32 / 2, screen.1 as i32 / 2),
            speed: tuning.player_speed,
            speed_decay: tuning.player_speed_decay,
            sprint_bonus: tuning.sprint_bonus,
            damage_cooldown_ms: tuning.damage_cooldown_ms,
            cooldown_until_ms: None,
            sprinting: false,
            moving: false,
            move_flags: [false; 8],
            facing: Direction::Down,
            frame: 0,
            last_frame_ms: None,
            queue: VecDeque::new(),
        }
    }

    /// Copies configuration and damage cooldown; every transient field starts
    /// fresh.
    pub(crate) fn clone_with_id(&self, id: EntityId) -> Self {
        Self {
            id,
            texture: self.texture,
            hearts: self.hearts,
            position: self.position,
            speed: self.speed,
            speed_decay: self.speed_decay,
            sprint_bonus: self.sprint_bonus,
            damage_cooldown_ms: self.damage_cooldown_ms,
            cooldown_until_ms: self.cooldown_until_ms,
            sprinting: false,
            moving: false,
            move_flags: [false; 8],
            facing: Direction::Down,
            frame: 0,
            last_frame_ms: None,
            queue: VecDeque::new(),
        }
    }

    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn hearts(&self) -> u32 {
        self.hearts
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.hearts > 0
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> Point {
        self.position
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn speed_decay(&self) -> f32 {
        self.speed_decay
    }

    pub(crate) fn facing(&self) -> Direction {
        self.facing
    }

    #[cfg(test)]
    pub(crate) fn is_moving(&self) -> bool {
        self.moving
    }

    #[cfg(test)]
    pub(crate) fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub(crate) fn move_flag(&self, direction: Direction) -> bool {
        self.move_flags[direction.index()]
    }

    #[cfg(test)]
    pub(crate) fn frame(&self) -> u32 {
        self.frame
    }

    #[cfg(test)]
    pub(crate) fn queued_commands(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn set_move_flag(&mut self, direction: Direction, value: bool) {
        self.move_flags[direction.index()] = value;
    }

    pub(crate) fn set_facing(&mut self, direction: Direction) {
        self.facing = direction;
    }

    pub(crate) fn set_sprinting(&mut self, value: bool) {
        self.sprinting = value;
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Queues `command` for the next update. A player with no hearts left
    /// accepts nothing.
    pub(crate) fn enqueue(&mut self, command: Command) {
        if !self.is_alive() {
            debug!(entity_id = self.id.0, "command_dropped_player_dead");
            return;
        }
        self.queue.push_back(command);
    }

    pub(crate) fn world_bounds(&self, viewport: Rect) -> Rect {
        Rect::new(
            viewport.x + self.position.x,
            viewport.y + self.position.y,
            ENTITY_WIDTH,
            ENTITY_HEIGHT,
        )
    }

    pub(crate) fn world_center(&self, viewport: Rect) -> (f32, f32) {
        let bounds = self.world_bounds(viewport);
        (
            bounds.x as f32 + bounds.w as f32 / 2.0,
            bounds.y as f32 + bounds.h as f32 / 2.0,
        )
    }

    pub(crate) fn in_damage_cooldown(&self, now_ms: u64) -> bool {
        self.cooldown_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Applies one heart of contact damage unless the cooldown is running.
    /// Returns whether a heart was lost.
    pub(crate) fn take_contact_damage(&mut self, now_ms: u64) -> bool {
        if !self.is_alive() || self.in_damage_cooldown(now_ms) {
            return false;
        }
        self.hearts -= 1;
        self.cooldown_until_ms = Some(now_ms.saturating_add(self.damage_cooldown_ms));
        info!(entity_id = self.id.0, hearts = self.hearts, "player_damaged");
        if !self.is_alive() {
            self.queue.clear();
            self.move_flags = [false; 8];
            self.sprinting = false;
        }
        true
    }

    pub(crate) fn update(&mut self, now_ms: u64, ctx: &mut PlayerUpdateContext<'_>) {
        self.moving = false;

        while let Some(command) = self.queue.pop_front() {
            let mut command_ctx = CommandContext {
                viewport: ctx.background.viewport(),
                spawn_requests: &mut *ctx.spawn_requests,
            };
            command.apply(self, &mut command_ctx);
            if command.category() == CommandCategory::Move {
                self.moving = true;
            }
        }

        let step = self.step_pixels();
        for axis in Axis::ALL {
            if self.axis_active(axis) {
                self.resolve_axis(axis, step, ctx.background);
            }
        }

        self.advance_animation(now_ms);
    }

    fn axis_active(&self, axis: Axis) -> bool {
        Direction::ALL
            .iter()
            .any(|direction| self.move_flag(*direction) && direction.contains(axis))
    }

    fn step_pixels(&self) -> i32 {
        let bonus = if self.sprinting { self.sprint_bonus } else { 0.0 };
        (self.speed + bonus) as i32
    }

    /// Moves `step` pixels along `axis`: walk back to the screen centre line
    /// first, then scroll the world, and move the player with whatever the
    /// world could not absorb.
    fn resolve_axis(&mut self, axis: Axis, step: i32, background: &mut Background) {
        let viewport = background.viewport();
        let horizontal = axis.is_horizontal();
        let (coord, center, max) = if horizontal {
            (
                &mut self.position.x,
                viewport.w / 2,
                viewport.w - BORDER_ALLOWANCE - ENTITY_WIDTH,
            )
        } else {
            (
                &mut self.position.y,
                viewport.h / 2,
                viewport.h - BORDER_ALLOWANCE - ENTITY_HEIGHT,
            )
        };
        let min = BORDER_ALLOWANCE;
        let delta = axis.sign() * step;

        if !background.can_scroll(axis) {
            *coord = (*coord + delta).clamp(min, max.max(min));
            return;
        }

        let mut remaining = delta;
        let to_center = center - *coord;
        if to_center != 0 && to_center.signum() == delta.signum() {
            let walk = if delta.abs() <= to_center.abs() {
                delta
            } else {
                to_center
            };
            *coord += walk;
            remaining -= walk;
        }
        if remaining != 0 {
            remaining -= background.scroll(horizontal, remaining);
        }
        if remaining != 0 {
            *coord = (*coord + remaining).clamp(min, max.max(min));
        }
    }

    fn advance_animation(&mut self, now_ms: u64) {
        if !self.moving {
            self.frame = 0;
            self.last_frame_ms = Some(now_ms);
            return;
        }
        match self.last_frame_ms {
            Some(last) if now_ms.saturating_sub(last) >= FRAME_DURATION_MS => {
                self.frame = (self.frame + 1) % SPRITE_COLUMNS;
                self.last_frame_ms = Some(now_ms);
            }
            Some(_) => {}
            None => self.last_frame_ms = Some(now_ms),
        }
    }

    pub(crate) fn sprite_source(&self) -> Rect {
        Rect::new(
            self.frame as i32 * ENTITY_WIDTH,
            self.facing.sprite_row() * ENTITY_HEIGHT,
            ENTITY_WIDTH,
            ENTITY_HEIGHT,
        )
    }

    pub(crate) fn render(&self, renderer: &mut dyn Renderer) {
        let dst = Rect::new(self.position.x, self.position.y, ENTITY_WIDTH, ENTITY_HEIGHT);
        match self.texture {
            Some(texture) => renderer.draw_texture_region(texture, self.sprite_source(), dst),
            None => {
                renderer.draw_filled_rect(dst, PLACEHOLDER_BODY);
                let (dx, dy) = self.facing.unit_vector();
                let mark = Rect::new(
                    dst.x + dst.w / 2 + (dx * (dst.w / 2) as f32) as i32 - FACING_MARK_PX / 2,
                    dst.y + dst.h / 2 + (dy * (dst.h / 2) as f32) as i32 - FACING_MARK_PX / 2,
                    FACING_MARK_PX,
                    FACING_MARK_PX,
                );
                renderer.draw_filled_rect(mark, PLACEHOLDER_FACING);
            }
        }
    }
}

impl Prototype for Player {
    fn spawn(&self, id: EntityId) -> Spawned {
        Spawned::Player(self.clone_with_id(id))
    }
}
