use engine::{Rect, Renderer};
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, info};

use super::bullet::Bullet;
use super::decorator::{Decoration, EnemyDecorator};
use super::enemy::{EnemyHandle, EnemyUpdateContext};
use super::prototype::{PrototypeRegistry, PrototypeTag, Spawned};
use crate::app::tuning::GameTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WaveSettings {
    pub(crate) base_count: u32,
    pub(crate) growth: u32,
    pub(crate) delay_ms: u64,
    pub(crate) fast_share: f64,
    pub(crate) shield_chance: f64,
    pub(crate) shield_hits: u32,
    pub(crate) haste_chance: f64,
}

impl WaveSettings {
    pub(crate) fn from_tuning(tuning: &GameTuning) -> Self {
        Self {
            base_count: tuning.wave_base_count,
            growth: tuning.wave_growth,
            delay_ms: tuning.wave_delay_ms,
            fast_share: tuning.fast_enemy_share,
            shield_chance: tuning.shield_chance,
            shield_hits: tuning.shield_hits,
            haste_chance: tuning.haste_chance,
        }
    }

    pub(crate) fn wave_size(&self, wave: u32) -> u32 {
        self.base_count
            .saturating_add(wave.saturating_sub(1).saturating_mul(self.growth))
    }
}

/// Owns the live enemies and paces waves of them.
#[derive(Debug)]
pub(crate) struct WaveManager {
    settings: WaveSettings,
    wave: u32,
    enemies: Vec<EnemyHandle>,
    next_wave_at_ms: Option<u64>,
}

impl WaveManager {
    pub(crate) fn new(settings: WaveSettings) -> Self {
        Self {
            settings,
            wave: 0,
            enemies: Vec::new(),
            next_wave_at_ms: None,
        }
    }

    pub(crate) fn wave(&self) -> u32 {
        self.wave
    }

    pub(crate) fn enemies(&self) -> &[EnemyHandle] {
        &self.enemies
    }

    pub(crate) fn start_next_wave(
        &mut self,
        registry: &mut PrototypeRegistry,
        world: Rect,
        rng: &mut SmallRng,
    ) {
        self.wave = self.wave.saturating_add(1);
        self.next_wave_at_ms = None;
        let count = self.settings.wave_size(self.wave);

        for _ in 0..count {
            let tag = if rng.gen_bool(self.settings.fast_share) {
                PrototypeTag::FastEnemy
            } else {
                PrototypeTag::SmallEnemy
            };
            let enemy = match registry.spawn(tag) {
                Ok(Spawned::Enemy(enemy)) => enemy,
                Ok(other) => {
                    debug!(tag = tag.as_str(), entity_id = other.id().0, "wave_spawn_not_an_enemy");
                    continue;
                }
                Err(error) => {
                    debug!(error = %error, "wave_spawn_skipped");
                    continue;
                }
            };
            enemy.borrow_mut().init_position(world, rng);
            let enemy = self.maybe_decorate(enemy, rng);
            self.enemies.push(enemy);
        }

        info!(
            wave = self.wave,
            requested = count,
            spawned = self.enemies.len(),
            "wave_started"
        );
    }

    fn maybe_decorate(&self, enemy: EnemyHandle, rng: &mut SmallRng) -> EnemyHandle {
        let roll: f64 = rng.gen();
        let decoration = if roll < self.settings.shield_chance {
            Some(Decoration::shield(self.settings.shield_hits))
        } else if roll < self.settings.shield_chance + self.settings.haste_chance {
            Some(Decoration::Haste)
        } else {
            None
        };
        match decoration {
            Some(decoration) => {
                debug!(
                    entity_id = enemy.id().0,
                    decoration = decoration.as_str(),
                    "enemy_decorated"
                );
                EnemyDecorator::wrap(enemy, decoration)
            }
            None => enemy,
        }
    }

    /// Moves every enemy, pulls back the ones that left the world, resolves
    /// bullet hits and drops the dead.
    pub(crate) fn update(&mut self, ctx: &EnemyUpdateContext, bullets: &mut [Bullet], world: Rect) {
        for enemy in &self.enemies {
            let mut enemy = enemy.borrow_mut();
            enemy.update(ctx);
            if !rect_within(enemy.bounds(), world) {
                enemy.undo_move();
            }
            enemy.check_collision(bullets);
        }

        let before = self.enemies.len();
        self.enemies.retain(|enemy| !enemy.borrow().is_dead());
        let removed = before - self.enemies.len();
        if removed > 0 {
            debug!(removed, remaining = self.enemies.len(), "enemies_removed");
        }
    }

    /// Starts the next wave once the current one has been cleared for the
    /// configured delay.
    pub(crate) fn schedule(
        &mut self,
        now_ms: u64,
        registry: &mut PrototypeRegistry,
        world: Rect,
        rng: &mut SmallRng,
    ) {
        if !self.enemies.is_empty() {
            return;
        }
        match self.next_wave_at_ms {
            None => {
                let at = now_ms.saturating_add(self.settings.delay_ms);
                self.next_wave_at_ms = Some(at);
                info!(wave = self.wave, next_wave_at_ms = at, "wave_cleared");
            }
            Some(at) if now_ms >= at => self.start_next_wave(registry, world, rng),
            Some(_) => {}
        }
    }

    pub(crate) fn render(&self, renderer: &mut dyn Renderer, viewport: Rect) {
        for enemy in &self.enemies {
            enemy.borrow().render(renderer, viewport);
        }
    }
}

fn rect_within(inner: Rect, outer: Rect) -> bool {
    inner.x >= outer.x
        && inner.y >= outer.y
        && inner.right() <= outer.right()
        && inner.bottom() <= outer.bottom()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::app::gameplay::direction::Direction;
    use crate::app::gameplay::enemy::{BasicEnemy, EnemyKind};
    use crate::app::gameplay::test_support::bullet_at;

    const WORLD: Rect = Rect::new(0, 0, 2560, 1440);

    fn settings() -> WaveSettings {
        WaveSettings {
            base_count: 3,
            growth: 2,
            delay_ms: 500,
            fast_share: 0.5,
            shield_chance: 0.0,
            shield_hits: 1,
            haste_chance: 0.0,
        }
    }

    fn registry() -> PrototypeRegistry {
        let mut registry = PrototypeRegistry::new();
        registry.register(
            PrototypeTag::SmallEnemy,
            Box::new(EnemyHandle::new(BasicEnemy::prototype(EnemyKind::Small, 1.0, None))),
        );
        registry.register(
            PrototypeTag::FastEnemy,
            Box::new(EnemyHandle::new(BasicEnemy::prototype(EnemyKind::Fast, 2.0, None))),
        );
        registry
    }

    #[test]
    fn wave_size_grows_linearly() {
        let settings = settings();
        assert_eq!(settings.wave_size(1), 3);
        assert_eq!(settings.wave_size(2), 5);
        assert_eq!(settings.wave_size(4), 9);
    }

    #[test]
    fn start_spawns_distinct_enemies_inside_world() {
        let mut waves = WaveManager::new(settings());
        let mut registry = registry();
        let mut rng = SmallRng::seed_from_u64(1);
        waves.start_next_wave(&mut registry, WORLD, &mut rng);

        assert_eq!(waves.wave(), 1);
        assert_eq!(waves.enemies().len(), 3);
        let mut ids: Vec<_> = waves.enemies().iter().map(|enemy| enemy.id()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        for enemy in waves.enemies() {
            assert!(rect_within(enemy.borrow().bounds(), WORLD));
        }
    }

    #[test]
    fn missing_prototypes_spawn_nothing() {
        let mut waves = WaveManager::new(settings());
        let mut registry = PrototypeRegistry::new();
        let mut rng = SmallRng::seed_from_u64(1);
        waves.start_next_wave(&mut registry, WORLD, &mut rng);
        assert!(waves.enemies().is_empty());
    }

    #[test]
    fn certain_shield_chance_decorates_every_enemy() {
        let mut waves = WaveManager::new(WaveSettings {
            shield_chance: 1.0,
            ..settings()
        });
        let mut registry = registry();
        let mut rng = SmallRng::seed_from_u64(3);
        waves.start_next_wave(&mut registry, WORLD, &mut rng);

        let enemy = &waves.enemies()[0];
        let position = enemy.borrow().position();
        let mut bullets = vec![bullet_at(position, Direction::Up)];
        enemy.borrow_mut().check_collision(&mut bullets);
        assert!(!bullets[0].is_alive());
        assert!(!enemy.borrow().is_dead());
    }

    #[test]
    fn dead_enemies_are_removed() {
        let mut waves = WaveManager::new(settings());
        let mut target = BasicEnemy::prototype(EnemyKind::Fast, 0.0, None);
        target.place_at((300.0, 300.0));
        waves.enemies.push(EnemyHandle::new(target));

        let mut bullets = vec![bullet_at((300.0, 300.0), Direction::Up)];
        waves.update(&EnemyUpdateContext { target: None }, &mut bullets, WORLD);
        assert!(waves.enemies().is_empty());
    }

    #[test]
    fn enemy_leaving_world_is_pulled_back() {
        let mut waves = WaveManager::new(settings());
        let mut runner = BasicEnemy::prototype(EnemyKind::Small, 5.0, None);
        runner.place_at((18.0, 300.0));
        waves.enemies.push(EnemyHandle::new(runner));

        waves.update(
            &EnemyUpdateContext {
                target: Some((-100.0, 300.0)),
            },
            &mut [],
            WORLD,
        );
        assert_eq!(waves.enemies()[0].borrow().position(), (18.0, 300.0));
    }

    #[test]
    fn next_wave_waits_for_delay_after_clear() {
        let mut waves = WaveManager::new(settings());
        let mut registry = registry();
        let mut rng = SmallRng::seed_from_u64(9);

        waves.schedule(1000, &mut registry, WORLD, &mut rng);
        assert_eq!(waves.wave(), 0);
        waves.schedule(1499, &mut registry, WORLD, &mut rng);
        assert_eq!(waves.wave(), 0);
        waves.schedule(1500, &mut registry, WORLD, &mut rng);
        assert_eq!(waves.wave(), 1);
        assert_eq!(waves.enemies().len(), 3);
    }
}
