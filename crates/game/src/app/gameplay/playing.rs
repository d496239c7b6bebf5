use engine::{InputEvent, KeyPhase, Rect, Renderer, Rgba, Scene, TextureId};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::background::Background;
use super::bullet::Bullet;
use super::command::SpawnRequest;
use super::enemy::{BasicEnemy, EnemyHandle, EnemyKind, EnemyUpdateContext};
use super::invoker::Invoker;
use super::minimap::Minimap;
use super::player::{Player, PlayerUpdateContext};
use super::prototype::{EntityId, PrototypeRegistry, PrototypeTag, Spawned};
use super::wave::{WaveManager, WaveSettings};
use crate::app::tuning::GameTuning;

const PLAYER_SPRITE_KEY: &str = "player";
const BACKGROUND_SPRITE_KEY: &str = "background";
const SMALL_ENEMY_SPRITE_KEY: &str = "enemy_small";
const FAST_ENEMY_SPRITE_KEY: &str = "enemy_fast";

const HEART_SIZE_PX: i32 = 14;
const HEART_GAP_PX: i32 = 6;
const HEART_MARGIN_PX: i32 = 15;
const HEART_COLOR: Rgba = Rgba::new(210, 30, 50, 255);
const HEART_EMPTY_COLOR: Rgba = Rgba::new(60, 60, 60, 140);

/// Everything the running game owns: prototypes, the invoker and its
/// players, the scrolling background, enemies, bullets and the minimap.
pub(crate) struct PlayingScene {
    tuning: GameTuning,
    registry: PrototypeRegistry,
    invoker: Invoker,
    background: Background,
    minimap: Minimap,
    waves: WaveManager,
    bullets: Vec<Bullet>,
    spawn_requests: Vec<SpawnRequest>,
    rng: SmallRng,
    game_over: bool,
}

impl PlayingScene {
    pub(crate) fn new(tuning: GameTuning) -> Self {
        let world = (tuning.fallback_world_width, tuning.fallback_world_height);
        let background = Background::new(None, world, (super::SCREEN_WIDTH, super::SCREEN_HEIGHT));
        let minimap = Minimap::new(background.world_size(), super::SCREEN_WIDTH as i32);
        Self {
            registry: PrototypeRegistry::new(),
            invoker: Invoker::new(),
            background,
            minimap,
            waves: WaveManager::new(WaveSettings::from_tuning(&tuning)),
            bullets: Vec::new(),
            spawn_requests: Vec::new(),
            rng: SmallRng::seed_from_u64(tuning.rng_seed),
            game_over: false,
            tuning,
        }
    }

    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut PrototypeRegistry {
        &mut self.registry
    }

    #[cfg(test)]
    pub(crate) fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    #[cfg(test)]
    pub(crate) fn background(&self) -> &Background {
        &self.background
    }

    #[cfg(test)]
    pub(crate) fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    #[cfg(test)]
    pub(crate) fn waves(&self) -> &WaveManager {
        &self.waves
    }

    #[cfg(test)]
    pub(crate) fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn register_prototypes(&mut self, renderer: &mut dyn Renderer) {
        let screen = renderer.screen_size();
        let player_texture = load_optional_texture(renderer, PLAYER_SPRITE_KEY);
        self.registry.register(
            PrototypeTag::Player,
            Box::new(Player::prototype(&self.tuning, player_texture, screen)),
        );
        self.registry.register(
            PrototypeTag::Bullet,
            Box::new(Bullet::prototype(
                self.tuning.bullet_speed,
                self.tuning.bullet_range,
            )),
        );
        for (tag, kind, speed, key) in [
            (
                PrototypeTag::SmallEnemy,
                EnemyKind::Small,
                self.tuning.small_enemy_speed,
                SMALL_ENEMY_SPRITE_KEY,
            ),
            (
                PrototypeTag::FastEnemy,
                EnemyKind::Fast,
                self.tuning.fast_enemy_speed,
                FAST_ENEMY_SPRITE_KEY,
            ),
        ] {
            let texture = load_optional_texture(renderer, key);
            self.registry.register(
                tag,
                Box::new(EnemyHandle::new(BasicEnemy::prototype(kind, speed, texture))),
            );
        }
    }

    fn spawn_player(&mut self) {
        match self.registry.spawn(PrototypeTag::Player) {
            Ok(Spawned::Player(player)) => {
                let id = player.id();
                info!(
                    entity_id = id.0,
                    hearts = player.hearts(),
                    speed = player.speed(),
                    speed_decay = player.speed_decay(),
                    "player_spawned"
                );
                self.invoker.add_player(player);
                self.invoker.bind_default_controls(id);
            }
            Ok(other) => warn!(entity_id = other.id().0, "player_prototype_spawned_wrong_kind"),
            Err(error) => warn!(error = %error, "player_spawn_failed"),
        }
    }

    fn resolve_spawn_requests(&mut self) {
        for request in self.spawn_requests.drain(..) {
            match self.registry.spawn(request.tag) {
                Ok(Spawned::Bullet(mut bullet)) => {
                    bullet.launch(request.origin, request.facing);
                    debug!(
                        entity_id = bullet.id().0,
                        owner = request.owner.0,
                        facing = request.facing.as_str(),
                        "bullet_spawned"
                    );
                    self.bullets.push(bullet);
                }
                Ok(other) => {
                    debug!(tag = request.tag.as_str(), entity_id = other.id().0, "spawn_request_ignored");
                }
                Err(error) => debug!(error = %error, owner = request.owner.0, "spawn_request_dropped"),
            }
        }
    }

    fn apply_contact_damage(&mut self, now_ms: u64) {
        let viewport = self.background.viewport();
        for player in self.invoker.players_mut() {
            let bounds = player.world_bounds(viewport);
            let touched = self
                .waves
                .enemies()
                .iter()
                .any(|enemy| enemy.borrow().bounds().intersects(&bounds));
            if touched {
                player.take_contact_damage(now_ms);
            }
        }
    }

    fn release_dead_players(&mut self) {
        let dead: Vec<EntityId> = self
            .invoker
            .players()
            .iter()
            .filter(|player| !player.is_alive())
            .map(Player::id)
            .collect();
        for id in dead {
            if self.invoker.unbind_target(id) > 0 {
                info!(entity_id = id.0, "player_controls_released");
            }
        }
    }

    fn render_hearts(&self, renderer: &mut dyn Renderer) {
        let Some(player) = self.invoker.players().first() else {
            return;
        };
        for slot in 0..self.tuning.player_hearts {
            let color = if slot < player.hearts() {
                HEART_COLOR
            } else {
                HEART_EMPTY_COLOR
            };
            let x = HEART_MARGIN_PX + slot as i32 * (HEART_SIZE_PX + HEART_GAP_PX);
            renderer.draw_filled_rect(
                Rect::new(x, HEART_MARGIN_PX, HEART_SIZE_PX, HEART_SIZE_PX),
                color,
            );
        }
    }
}

fn load_optional_texture(renderer: &mut dyn Renderer, key: &str) -> Option<TextureId> {
    match renderer.load_texture(key) {
        Ok(texture) => Some(texture),
        Err(error) => {
            warn!(key, error = %error, "sprite_missing_using_placeholder");
            None
        }
    }
}

impl Scene for PlayingScene {
    fn load(&mut self, renderer: &mut dyn Renderer) {
        self.register_prototypes(renderer);

        let background_texture = load_optional_texture(renderer, BACKGROUND_SPRITE_KEY);
        let world_size = background_texture
            .and_then(|texture| renderer.texture_size(texture))
            .unwrap_or((
                self.tuning.fallback_world_width,
                self.tuning.fallback_world_height,
            ));
        let screen = renderer.screen_size();
        self.background = Background::new(background_texture, world_size, screen);
        self.minimap = Minimap::new(self.background.world_size(), screen.0 as i32);
        self.minimap.load(renderer);

        self.spawn_player();
        let world = self.background.world_bounds();
        self.waves
            .start_next_wave(&mut self.registry, world, &mut self.rng);

        let (world_w, world_h) = self.background.world_size();
        info!(world_w, world_h, "playing_scene_loaded");
    }

    fn handle_input(&mut self, event: InputEvent) {
        let handled = match event.phase {
            KeyPhase::Down => self.invoker.dispatch(event.code),
            KeyPhase::Up => self.invoker.dispatch_release(event.code),
        };
        if !handled {
            debug!(key = ?event.code, phase = ?event.phase, "input_unbound");
        }
    }

    fn update(&mut self, now_millis: u64) {
        self.invoker.update_players(
            now_millis,
            &mut PlayerUpdateContext {
                background: &mut self.background,
                spawn_requests: &mut self.spawn_requests,
            },
        );
        self.resolve_spawn_requests();

        let world = self.background.world_bounds();
        for bullet in &mut self.bullets {
            bullet.update(world);
        }

        let viewport = self.background.viewport();
        let target = self
            .invoker
            .players()
            .iter()
            .find(|player| player.is_alive())
            .map(|player| player.world_center(viewport));
        self.waves
            .update(&EnemyUpdateContext { target }, &mut self.bullets, world);
        self.bullets.retain(Bullet::is_alive);

        self.apply_contact_damage(now_millis);
        self.release_dead_players();
        self.waves
            .schedule(now_millis, &mut self.registry, world, &mut self.rng);

        let player_centers: Vec<(f32, f32)> = self
            .invoker
            .players()
            .iter()
            .filter(|player| player.is_alive())
            .map(|player| player.world_center(viewport))
            .collect();
        self.minimap
            .sample(&player_centers, &self.bullets, self.waves.enemies());

        if !self.game_over
            && !self.invoker.players().is_empty()
            && self.invoker.players().iter().all(|player| !player.is_alive())
        {
            self.game_over = true;
            info!(wave = self.waves.wave(), "game_over");
        }
    }

    fn render(&mut self, renderer: &mut dyn Renderer) {
        let viewport = self.background.viewport();
        self.background.render(renderer);
        self.waves.render(renderer, viewport);
        for bullet in &self.bullets {
            bullet.render(renderer, viewport);
        }
        self.invoker.render_players(renderer);
        self.render_hearts(renderer);
        self.minimap.render(renderer);
    }

    fn unload(&mut self) {
        info!(
            wave = self.waves.wave(),
            enemies = self.waves.enemies().len(),
            bullets = self.bullets.len(),
            "playing_scene_unloaded"
        );
    }

    fn entity_count(&self) -> usize {
        self.invoker.players().len() + self.waves.enemies().len() + self.bullets.len()
    }

    fn debug_title(&self) -> Option<String> {
        let hearts = self
            .invoker
            .players()
            .first()
            .map(Player::hearts)
            .unwrap_or(0);
        Some(format!(
            "Scrollfire | wave {} | hearts {} | enemies {}",
            self.waves.wave(),
            hearts,
            self.waves.enemies().len()
        ))
    }
}
