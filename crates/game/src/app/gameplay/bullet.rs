use engine::{Rect, Renderer, Rgba};

use super::direction::Direction;
use super::prototype::{EntityId, Prototype, Spawned};

pub(crate) const BULLET_SIZE: i32 = 8;
const BULLET_COLOR: Rgba = Rgba::new(250, 200, 40, 255);

/// A projectile travelling in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bullet {
    id: EntityId,
    center: (f32, f32),
    velocity: (f32, f32),
    speed: f32,
    range_left: f32,
    alive: bool,
}

impl Bullet {
    pub(crate) fn prototype(speed: f32, range: f32) -> Self {
        Self {
            id: EntityId::PROTOTYPE,
            center: (0.0, 0.0),
            velocity: (0.0, 0.0),
            speed,
            range_left: range,
            alive: true,
        }
    }

    /// Places a freshly spawned bullet at `origin`, heading along `facing`.
    pub(crate) fn launch(&mut self, origin: (f32, f32), facing: Direction) {
        let (dx, dy) = facing.unit_vector();
        self.center = origin;
        self.velocity = (dx * self.speed, dy * self.speed);
    }

    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn center(&self) -> (f32, f32) {
        self.center
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    pub(crate) fn bounds(&self) -> Rect {
        Rect::new(
            self.center.0 as i32 - BULLET_SIZE / 2,
            self.center.1 as i32 - BULLET_SIZE / 2,
            BULLET_SIZE,
            BULLET_SIZE,
        )
    }

    pub(crate) fn update(&mut self, world: Rect) {
        if !self.alive {
            return;
        }
        self.center.0 += self.velocity.0;
        self.center.1 += self.velocity.1;
        self.range_left -= self.speed;

        let inside = self.center.0 >= world.x as f32
            && self.center.1 >= world.y as f32
            && self.center.0 < world.right() as f32
            && self.center.1 < world.bottom() as f32;
        if !inside || self.range_left <= 0.0 {
            self.alive = false;
        }
    }

    pub(crate) fn render(&self, renderer: &mut dyn Renderer, viewport: Rect) {
        if !self.alive {
            return;
        }
        let rect = self.bounds().translated(-viewport.x, -viewport.y);
        if rect.intersects(&Rect::new(0, 0, viewport.w, viewport.h)) {
            renderer.draw_filled_rect(rect, BULLET_COLOR);
        }
    }
}

impl Prototype for Bullet {
    fn spawn(&self, id: EntityId) -> Spawned {
        Spawned::Bullet(Self {
            id,
            center: self.center,
            velocity: (0.0, 0.0),
            speed: self.speed,
            range_left: self.range_left,
            alive: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Rect = Rect::new(0, 0, 2560, 1440);

    fn launched(origin: (f32, f32), facing: Direction) -> Bullet {
        let Spawned::Bullet(mut bullet) = Bullet::prototype(10.0, 35.0).spawn(EntityId(9)) else {
            panic!("bullet prototype must spawn a bullet");
        };
        bullet.launch(origin, facing);
        bullet
    }

    #[test]
    fn travels_along_facing() {
        let mut bullet = launched((100.0, 100.0), Direction::Left);
        bullet.update(WORLD);
        assert_eq!(bullet.center(), (90.0, 100.0));
        assert!(bullet.is_alive());
    }

    #[test]
    fn dies_when_range_is_spent() {
        let mut bullet = launched((500.0, 500.0), Direction::Down);
        for _ in 0..3 {
            bullet.update(WORLD);
        }
        assert!(bullet.is_alive());
        bullet.update(WORLD);
        assert!(!bullet.is_alive());
    }

    #[test]
    fn dies_on_leaving_world() {
        let mut bullet = launched((5.0, 100.0), Direction::Left);
        bullet.update(WORLD);
        assert!(!bullet.is_alive());
    }

    #[test]
    fn spawned_bullet_has_new_identity() {
        let prototype = Bullet::prototype(10.0, 35.0);
        let spawned = prototype.spawn(EntityId(3));
        assert_eq!(spawned.id(), EntityId(3));
        assert_eq!(prototype.id(), EntityId::PROTOTYPE);
    }
}
