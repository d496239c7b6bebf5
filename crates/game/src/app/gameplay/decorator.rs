use engine::{Rect, Renderer, Rgba};
use rand::RngCore;
use tracing::debug;

use super::bullet::Bullet;
use super::enemy::{Enemy, EnemyHandle, EnemyUpdateContext};
use super::draw_outline;
use super::prototype::EntityId;

const SHIELD_OUTLINE: Rgba = Rgba::new(80, 170, 255, 200);
const SHIELD_OUTLINE_PX: i32 = 3;

/// Behaviour layered on top of a wrapped enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoration {
    /// Absorbs this many bullet hits before the wrapped enemy takes damage.
    Shield { hits_left: u32, max_hits: u32 },
    /// Runs the wrapped update twice per tick.
    Haste,
}

impl Decoration {
    pub(crate) fn shield(hits: u32) -> Self {
        Self::Shield {
            hits_left: hits,
            max_hits: hits,
        }
    }

    fn fresh(self) -> Self {
        match self {
            Self::Shield { max_hits, .. } => Self::shield(max_hits),
            Self::Haste => Self::Haste,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Shield { .. } => "shield",
            Self::Haste => "haste",
        }
    }
}

/// Wraps a shared enemy and forwards every capability to it except the one
/// its decoration overrides. Identity is the wrapped enemy's.
#[derive(Debug)]
pub(crate) struct EnemyDecorator {
    inner: EnemyHandle,
    decoration: Decoration,
}

impl EnemyDecorator {
    pub(crate) fn new(inner: EnemyHandle, decoration: Decoration) -> Self {
        Self { inner, decoration }
    }

    pub(crate) fn wrap(inner: EnemyHandle, decoration: Decoration) -> EnemyHandle {
        EnemyHandle::new(Self::new(inner, decoration))
    }

    #[cfg(test)]
    pub(crate) fn decoration(&self) -> Decoration {
        self.decoration
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &EnemyHandle {
        &self.inner
    }

    fn absorb_hits(&mut self, bullets: &mut [Bullet]) {
        let Decoration::Shield { hits_left, .. } = &mut self.decoration else {
            return;
        };
        if *hits_left == 0 {
            return;
        }
        let bounds = self.inner.borrow().bounds();
        for bullet in bullets.iter_mut().filter(|bullet| bullet.is_alive()) {
            if *hits_left == 0 {
                break;
            }
            if bullet.bounds().intersects(&bounds) {
                bullet.kill();
                *hits_left -= 1;
                if *hits_left == 0 {
                    debug!(entity_id = self.inner.id().0, "enemy_shield_broken");
                }
            }
        }
    }
}

impl Enemy for EnemyDecorator {
    fn id(&self) -> EntityId {
        self.inner.id()
    }

    fn undo_move(&mut self) {
        self.inner.borrow_mut().undo_move();
    }

    fn check_collision(&mut self, bullets: &mut [Bullet]) {
        self.absorb_hits(bullets);
        self.inner.borrow_mut().check_collision(bullets);
    }

    fn init_position(&mut self, world: Rect, rng: &mut dyn RngCore) {
        self.inner.borrow_mut().init_position(world, rng);
    }

    fn update(&mut self, ctx: &EnemyUpdateContext) {
        let mut inner = self.inner.borrow_mut();
        inner.update(ctx);
        if self.decoration == Decoration::Haste {
            inner.update(ctx);
        }
    }

    fn render(&self, renderer: &mut dyn Renderer, viewport: Rect) {
        self.inner.borrow().render(renderer, viewport);
        if let Decoration::Shield { hits_left, .. } = self.decoration {
            if hits_left > 0 {
                let bounds = self.inner.borrow().bounds().translated(-viewport.x, -viewport.y);
                draw_outline(renderer, bounds, SHIELD_OUTLINE_PX, SHIELD_OUTLINE);
            }
        }
    }

    fn is_dead(&self) -> bool {
        self.inner.borrow().is_dead()
    }

    fn position(&self) -> (f32, f32) {
        self.inner.borrow().position()
    }

    fn bounds(&self) -> Rect {
        self.inner.borrow().bounds()
    }

    fn minimap_pixel_size(&self) -> i32 {
        self.inner.borrow().minimap_pixel_size()
    }

    fn clone_enemy(&self, id: EntityId) -> EnemyHandle {
        let inner = self.inner.borrow().clone_enemy(id);
        Self::wrap(inner, self.decoration.fresh())
    }
}
