use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::bullet::Bullet;
use super::enemy::EnemyHandle;
use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EntityId(pub(crate) u64);

impl EntityId {
    /// Identity carried by registered prototypes; never handed to a clone.
    pub(crate) const PROTOTYPE: EntityId = EntityId(0);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) struct EntityIdAllocator {
    next_id: u64,
}

impl EntityIdAllocator {
    pub(crate) fn new() -> Self {
        Self { next_id: 1 }
    }

    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PrototypeTag {
    Player,
    Bullet,
    SmallEnemy,
    FastEnemy,
}

impl PrototypeTag {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Bullet => "bullet",
            Self::SmallEnemy => "small_enemy",
            Self::FastEnemy => "fast_enemy",
        }
    }
}

impl fmt::Display for PrototypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fresh, independently owned entity produced by a prototype.
#[derive(Debug)]
pub(crate) enum Spawned {
    Player(Player),
    Bullet(Bullet),
    Enemy(EnemyHandle),
}

impl Spawned {
    pub(crate) fn id(&self) -> EntityId {
        match self {
            Self::Player(player) => player.id(),
            Self::Bullet(bullet) => bullet.id(),
            Self::Enemy(enemy) => enemy.id(),
        }
    }
}

/// Clone-on-spawn capability shared by every spawnable entity type.
///
/// The returned entity copies configuration (speed, appearance, base stats,
/// position) and starts with reset transient state under the given identity.
pub(crate) trait Prototype {
    fn spawn(&self, id: EntityId) -> Spawned;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SpawnError {
    #[error("no prototype registered for tag {0}")]
    UnknownTag(PrototypeTag),
}

/// One canonical prototype per tag plus the identity counter for clones.
pub(crate) struct PrototypeRegistry {
    prototypes: HashMap<PrototypeTag, Box<dyn Prototype>>,
    ids: EntityIdAllocator,
}

impl PrototypeRegistry {
    pub(crate) fn new() -> Self {
        Self {
            prototypes: HashMap::new(),
            ids: EntityIdAllocator::new(),
        }
    }

    /// Stores `prototype` under `tag`, returning whatever it replaced.
    pub(crate) fn register(
        &mut self,
        tag: PrototypeTag,
        prototype: Box<dyn Prototype>,
    ) -> Option<Box<dyn Prototype>> {
        let replaced = self.prototypes.insert(tag, prototype);
        debug!(
            tag = tag.as_str(),
            replaced = replaced.is_some(),
            "prototype_registered"
        );
        replaced
    }

    #[cfg(test)]
    pub(crate) fn unregister(&mut self, tag: PrototypeTag) -> Option<Box<dyn Prototype>> {
        self.prototypes.remove(&tag)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, tag: PrototypeTag) -> bool {
        self.prototypes.contains_key(&tag)
    }

    pub(crate) fn spawn(&mut self, tag: PrototypeTag) -> Result<Spawned, SpawnError> {
        let prototype = self
            .prototypes
            .get(&tag)
            .ok_or(SpawnError::UnknownTag(tag))?;
        let id = self.ids.allocate();
        Ok(prototype.spawn(id))
    }
}

impl Default for PrototypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
