//! Entity store
//!
//! Typed pools in insertion order. Entities are soft-deleted by clearing
//! their `active` flag and only physically removed by `purge_inactive`,
//! so ids held during a tick never dangle mid-iteration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{
    Boss, Enemy, EntityId, FloatingText, Particle, Player, PlayerRole, PowerUp,
};

/// Common surface of every pooled entity
pub trait Entity {
    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn is_active(&self) -> bool;
    fn deactivate(&mut self);
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> EntityId {
                    self.id
                }
                fn set_id(&mut self, id: EntityId) {
                    self.id = id;
                }
                fn is_active(&self) -> bool {
                    self.active
                }
                fn deactivate(&mut self) {
                    self.active = false;
                }
            }
        )*
    };
}

impl_entity!(Player, Enemy, Boss, Particle, PowerUp, FloatingText);

/// Entity categories addressable through the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
    Particle,
    PowerUp,
    FloatingText,
}

/// Insertion-ordered collection of one entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    items: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Pool<T> {
    fn push(&mut self, mut item: T, id: EntityId) -> EntityId {
        item.set_id(id);
        self.items.push(item);
        id
    }

    /// Active entities in insertion order
    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|e| e.is_active())
    }

    /// Mutable active entities in insertion order
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter(|e| e.is_active())
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|e| e.id() == id)
    }

    /// Soft-delete by id; returns true if an active entity was found
    pub fn deactivate(&mut self, id: EntityId) -> bool {
        match self.items.iter_mut().find(|e| e.id() == id && e.is_active()) {
            Some(entity) => {
                entity.deactivate();
                true
            }
            None => false,
        }
    }

    pub fn deactivate_all(&mut self) {
        for entity in &mut self.items {
            entity.deactivate();
        }
    }

    /// Drop inactive entities, returning how many were removed
    pub fn purge(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|e| e.is_active());
        before - self.items.len()
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// Every stored entity, including ones awaiting purge
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// All entities of one world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    /// Anchor first, follower second
    pub players: [Player; 2],
    pub enemies: Pool<Enemy>,
    pub bosses: Pool<Boss>,
    pub particles: Pool<Particle>,
    pub power_ups: Pool<PowerUp>,
    pub texts: Pool<FloatingText>,
    next_id: EntityId,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            players: [
                Player::new(1, PlayerRole::Anchor, Vec2::ZERO),
                Player::new(2, PlayerRole::Follower, Vec2::ZERO),
            ],
            enemies: Pool::default(),
            bosses: Pool::default(),
            particles: Pool::default(),
            power_ups: Pool::default(),
            texts: Pool::default(),
            next_id: 3,
        }
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place both cores, discarding any trails
    pub fn spawn_players(&mut self, anchor: Vec2, follower: Vec2) {
        self.players = [
            Player::new(1, PlayerRole::Anchor, anchor),
            Player::new(2, PlayerRole::Follower, follower),
        ];
    }

    /// Each spawn stamps a fresh id over whatever the entity carried and
    /// appends it; existing entities are never touched.
    pub fn spawn_enemy(&mut self, enemy: Enemy) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(enemy, id)
    }

    pub fn spawn_boss(&mut self, boss: Boss) -> EntityId {
        let id = self.next_entity_id();
        self.bosses.push(boss, id)
    }

    pub fn spawn_particle(&mut self, particle: Particle) -> EntityId {
        let id = self.next_entity_id();
        self.particles.push(particle, id)
    }

    pub fn spawn_power_up(&mut self, power_up: PowerUp) -> EntityId {
        let id = self.next_entity_id();
        self.power_ups.push(power_up, id)
    }

    pub fn spawn_floating_text(&mut self, text: FloatingText) -> EntityId {
        let id = self.next_entity_id();
        self.texts.push(text, id)
    }

    /// The boss currently alive, if any
    pub fn active_boss(&self) -> Option<&Boss> {
        self.bosses.iter_active().next()
    }

    pub fn active_boss_mut(&mut self) -> Option<&mut Boss> {
        self.bosses.iter_active_mut().next()
    }

    /// Soft-delete any non-player entity by id
    pub fn deactivate(&mut self, id: EntityId) -> bool {
        self.enemies.deactivate(id)
            || self.bosses.deactivate(id)
            || self.particles.deactivate(id)
            || self.power_ups.deactivate(id)
            || self.texts.deactivate(id)
    }

    /// Which pool an id lives in
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.players.iter().any(|p| p.id == id) {
            Some(EntityKind::Player)
        } else if self.enemies.get(id).is_some() {
            Some(EntityKind::Enemy)
        } else if self.bosses.get(id).is_some() {
            Some(EntityKind::Boss)
        } else if self.particles.get(id).is_some() {
            Some(EntityKind::Particle)
        } else if self.power_ups.get(id).is_some() {
            Some(EntityKind::PowerUp)
        } else if self.texts.get(id).is_some() {
            Some(EntityKind::FloatingText)
        } else {
            None
        }
    }

    /// Ids of active entities of `kind` in iteration order
    pub fn active_ids(&self, kind: EntityKind) -> Vec<EntityId> {
        match kind {
            EntityKind::Player => self.players.iter().filter(|p| p.active).map(|p| p.id).collect(),
            EntityKind::Enemy => self.enemies.iter_active().map(|e| e.id).collect(),
            EntityKind::Boss => self.bosses.iter_active().map(|e| e.id).collect(),
            EntityKind::Particle => self.particles.iter_active().map(|e| e.id).collect(),
            EntityKind::PowerUp => self.power_ups.iter_active().map(|e| e.id).collect(),
            EntityKind::FloatingText => self.texts.iter_active().map(|e| e.id).collect(),
        }
    }

    /// Remove soft-deleted entities from every pool
    pub fn purge_inactive(&mut self) -> usize {
        self.enemies.purge()
            + self.bosses.purge()
            + self.particles.purge()
            + self.power_ups.purge()
            + self.texts.purge()
    }
}
