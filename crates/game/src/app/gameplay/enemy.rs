use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use engine::{Rect, Renderer, Rgba, TextureId};
use rand::{Rng, RngCore};
use tracing::debug;

use super::bullet::Bullet;
use super::prototype::{EntityId, Prototype, Spawned};

/// What an enemy sees of the world while updating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EnemyUpdateContext {
    pub(crate) target: Option<(f32, f32)>,
}

/// Contract shared by basic enemies and decorated ones.
pub(crate) trait Enemy {
    fn id(&self) -> EntityId;
    /// Restores the position held before the most recent update.
    fn undo_move(&mut self);
    /// Resolves hits from live bullets, killing the bullets that connect.
    fn check_collision(&mut self, bullets: &mut [Bullet]);
    /// Places the enemy just inside a random world edge.
    fn init_position(&mut self, world: Rect, rng: &mut dyn RngCore);
    fn update(&mut self, ctx: &EnemyUpdateContext);
    fn render(&self, renderer: &mut dyn Renderer, viewport: Rect);
    fn is_dead(&self) -> bool;
    /// World-space centre.
    fn position(&self) -> (f32, f32);
    fn bounds(&self) -> Rect;
    /// Dot size on the minimap; 0 hides the enemy there.
    fn minimap_pixel_size(&self) -> i32;
    fn clone_enemy(&self, id: EntityId) -> EnemyHandle;
}

/// Shared, interior-mutable handle to any enemy.
///
/// Cloning the handle shares the enemy; use [`Enemy::clone_enemy`] for an
/// independent copy.
#[derive(Clone)]
pub(crate) struct EnemyHandle(Rc<RefCell<dyn Enemy>>);

impl EnemyHandle {
    pub(crate) fn new(enemy: impl Enemy + 'static) -> Self {
        Self(Rc::new(RefCell::new(enemy)))
    }

    pub(crate) fn borrow(&self) -> Ref<'_, dyn Enemy> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, dyn Enemy> {
        self.0.borrow_mut()
    }

    pub(crate) fn id(&self) -> EntityId {
        self.borrow().id()
    }

    #[cfg(test)]
    pub(crate) fn ptr_eq(&self, other: &EnemyHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EnemyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(enemy) => f
                .debug_struct("EnemyHandle")
                .field("id", &enemy.id())
                .field("position", &enemy.position())
                .field("dead", &enemy.is_dead())
                .finish(),
            Err(_) => f.write_str("EnemyHandle(<borrowed>)"),
        }
    }
}

impl Prototype for EnemyHandle {
    fn spawn(&self, id: EntityId) -> Spawned {
        Spawned::Enemy(self.borrow().clone_enemy(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EnemyKind {
    Small,
    Fast,
}

impl EnemyKind {
    fn size(self) -> i32 {
        match self {
            Self::Small => 36,
            Self::Fast => 26,
        }
    }

    fn health(self) -> u32 {
        match self {
            Self::Small => 3,
            Self::Fast => 1,
        }
    }

    fn minimap_pixel_size(self) -> i32 {
        match self {
            Self::Small => 4,
            Self::Fast => 3,
        }
    }

    fn color(self) -> Rgba {
        match self {
            Self::Small => Rgba::new(170, 40, 40, 255),
            Self::Fast => Rgba::new(220, 110, 30, 255),
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Fast => "fast",
        }
    }
}

/// A chaser that walks straight toward its target.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BasicEnemy {
    id: EntityId,
    kind: EnemyKind,
    texture: Option<TextureId>,
    center: (f32, f32),
    previous_center: (f32, f32),
    speed: f32,
    health: u32,
}

impl BasicEnemy {
    pub(crate) fn prototype(kind: EnemyKind, speed: f32, texture: Option<TextureId>) -> Self {
        Self {
            id: EntityId::PROTOTYPE,
            kind,
            texture,
            center: (0.0, 0.0),
            previous_center: (0.0, 0.0),
            speed,
            health: kind.health(),
        }
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> EnemyKind {
        self.kind
    }

    #[cfg(test)]
    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn place_at(&mut self, center: (f32, f32)) {
        self.center = center;
        self.previous_center = center;
    }

    fn take_hit(&mut self) {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            debug!(entity_id = self.id.0, kind = self.kind.as_str(), "enemy_killed");
        }
    }
}

impl Enemy for BasicEnemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn undo_move(&mut self) {
        self.center = self.previous_center;
    }

    fn check_collision(&mut self, bullets: &mut [Bullet]) {
        if self.is_dead() {
            return;
        }
        let bounds = self.bounds();
        for bullet in bullets.iter_mut().filter(|bullet| bullet.is_alive()) {
            if bullet.bounds().intersects(&bounds) {
                bullet.kill();
                self.take_hit();
                if self.is_dead() {
                    return;
                }
            }
        }
    }

    fn init_position(&mut self, world: Rect, rng: &mut dyn RngCore) {
        let half = self.kind.size() as f32 / 2.0;
        let min_x = world.x as f32 + half;
        let min_y = world.y as f32 + half;
        let max_x = (world.right() as f32 - half).max(min_x);
        let max_y = (world.bottom() as f32 - half).max(min_y);
        let center = match rng.gen_range(0..4) {
            0 => (min_x, rng.gen_range(min_y..=max_y)),
            1 => (max_x, rng.gen_range(min_y..=max_y)),
            2 => (rng.gen_range(min_x..=max_x), min_y),
            _ => (rng.gen_range(min_x..=max_x), max_y),
        };
        self.place_at(center);
    }

    fn update(&mut self, ctx: &EnemyUpdateContext) {
        self.previous_center = self.center;
        let Some(target) = ctx.target else {
            return;
        };
        let dx = target.0 - self.center.0;
        let dy = target.1 - self.center.1;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= f32::EPSILON {
            return;
        }
        let step = self.speed.min(distance);
        self.center.0 += dx / distance * step;
        self.center.1 += dy / distance * step;
    }

    fn render(&self, renderer: &mut dyn Renderer, viewport: Rect) {
        let dst = self.bounds().translated(-viewport.x, -viewport.y);
        if !dst.intersects(&Rect::new(0, 0, viewport.w, viewport.h)) {
            return;
        }
        match self.texture {
            Some(texture) => {
                let size = self.kind.size();
                renderer.draw_texture_region(texture, Rect::new(0, 0, size, size), dst);
            }
            None => renderer.draw_filled_rect(dst, self.kind.color()),
        }
    }

    fn is_dead(&self) -> bool {
        self.health == 0
    }

    fn position(&self) -> (f32, f32) {
        self.center
    }

    fn bounds(&self) -> Rect {
        let size = self.kind.size();
        Rect::new(
            self.center.0 as i32 - size / 2,
            self.center.1 as i32 - size / 2,
            size,
            size,
        )
    }

    fn minimap_pixel_size(&self) -> i32 {
        self.kind.minimap_pixel_size()
    }

    fn clone_enemy(&self, id: EntityId) -> EnemyHandle {
        EnemyHandle::new(Self {
            id,
            kind: self.kind,
            texture: self.texture,
            center: self.center,
            previous_center: self.center,
            speed: self.speed,
            health: self.kind.health(),
        })
    }
}
