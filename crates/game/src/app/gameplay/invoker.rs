use std::collections::{HashMap, HashSet};

use engine::{KeyCode, Renderer};
use tracing::debug;

use super::command::Command;
use super::direction::Direction;
use super::player::{Player, PlayerUpdateContext};
use super::prototype::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) command: Command,
    pub(crate) target: EntityId,
}

const MOVE_KEYS: [(KeyCode, Direction); 8] = [
    (KeyCode::KeyW, Direction::Up),
    (KeyCode::KeyA, Direction::Left),
    (KeyCode::KeyS, Direction::Down),
    (KeyCode::KeyD, Direction::Right),
    (KeyCode::KeyQ, Direction::UpLeft),
    (KeyCode::KeyE, Direction::UpRight),
    (KeyCode::KeyZ, Direction::DownLeft),
    (KeyCode::KeyC, Direction::DownRight),
];

const FACE_KEYS: [(KeyCode, Direction); 8] = [
    (KeyCode::KeyF, Direction::Left),
    (KeyCode::KeyR, Direction::UpLeft),
    (KeyCode::KeyT, Direction::Up),
    (KeyCode::KeyY, Direction::UpRight),
    (KeyCode::KeyH, Direction::Right),
    (KeyCode::KeyN, Direction::DownRight),
    (KeyCode::KeyB, Direction::Down),
    (KeyCode::KeyV, Direction::DownLeft),
];

/// Routes key transitions to commands on the players it owns.
///
/// Players are kept in insertion order; that order is also update and draw
/// order.
#[derive(Debug, Default)]
pub(crate) struct Invoker {
    players: Vec<Player>,
    press_bindings: HashMap<KeyCode, Binding>,
    release_bindings: HashMap<KeyCode, Binding>,
}

impl Invoker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_player(&mut self, player: Player) {
        debug!(entity_id = player.id().0, "invoker_player_added");
        self.players.push(player);
    }

    pub(crate) fn players(&self) -> &[Player] {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    #[cfg(test)]
    pub(crate) fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    /// Binds `code` on key-down. Rebinding replaces the previous pair.
    pub(crate) fn bind(&mut self, code: KeyCode, command: Command, target: EntityId) {
        self.press_bindings.insert(code, Binding { command, target });
    }

    /// Binds `code` on key-up. Rebinding replaces the previous pair.
    pub(crate) fn bind_release(&mut self, code: KeyCode, command: Command, target: EntityId) {
        self.release_bindings.insert(code, Binding { command, target });
    }

    pub(crate) fn unbind(&mut self, code: KeyCode) {
        self.press_bindings.remove(&code);
        self.release_bindings.remove(&code);
    }

    /// Drops every key bound to `target`. Returns how many keys were freed.
    pub(crate) fn unbind_target(&mut self, target: EntityId) -> usize {
        let codes: HashSet<KeyCode> = self
            .press_bindings
            .iter()
            .chain(self.release_bindings.iter())
            .filter(|(_, binding)| binding.target == target)
            .map(|(code, _)| *code)
            .collect();
        for code in &codes {
            self.unbind(*code);
        }
        debug!(entity_id = target.0, keys = codes.len(), "invoker_target_unbound");
        codes.len()
    }

    #[cfg(test)]
    pub(crate) fn binding(&self, code: KeyCode) -> Option<Binding> {
        self.press_bindings.get(&code).copied()
    }

    #[cfg(test)]
    pub(crate) fn release_binding(&self, code: KeyCode) -> Option<Binding> {
        self.release_bindings.get(&code).copied()
    }

    pub(crate) fn dispatch(&mut self, code: KeyCode) -> bool {
        let binding = self.press_bindings.get(&code).copied();
        self.enqueue_binding(code, binding)
    }

    pub(crate) fn dispatch_release(&mut self, code: KeyCode) -> bool {
        let binding = self.release_bindings.get(&code).copied();
        self.enqueue_binding(code, binding)
    }

    fn enqueue_binding(&mut self, code: KeyCode, binding: Option<Binding>) -> bool {
        let Some(binding) = binding else {
            return false;
        };
        match self
            .players
            .iter_mut()
            .find(|player| player.id() == binding.target)
        {
            Some(player) => {
                player.enqueue(binding.command);
                true
            }
            None => {
                debug!(
                    key = ?code,
                    target = binding.target.0,
                    "dispatch_target_missing"
                );
                false
            }
        }
    }

    /// Installs the standard keyboard layout for `target`.
    pub(crate) fn bind_default_controls(&mut self, target: EntityId) {
        for (code, direction) in MOVE_KEYS {
            self.bind(code, Command::Move(direction), target);
            self.bind_release(code, Command::StopMove(direction), target);
        }
        for (code, direction) in FACE_KEYS {
            self.bind(code, Command::Face(direction), target);
        }
        self.bind(KeyCode::ShiftLeft, Command::SprintStart, target);
        self.bind_release(KeyCode::ShiftLeft, Command::SprintStop, target);
        self.bind(KeyCode::CapsLock, Command::SprintStop, target);
        self.bind(KeyCode::KeyX, Command::Fire, target);
    }

    pub(crate) fn update_players(&mut self, now_ms: u64, ctx: &mut PlayerUpdateContext<'_>) {
        for player in &mut self.players {
            player.update(now_ms, ctx);
        }
    }

    pub(crate) fn render_players(&self, renderer: &mut dyn Renderer) {
        for player in &self.players {
            player.render(renderer);
        }
    }
}
