//! World and entity state tracked on behalf of the connected player.

use std::collections::HashMap;

use glam::{DVec3, Vec2};

use crate::chunk::ChunkColumn;
use crate::item::Slot;


/// Level type sent by vanilla servers for default terrain.
pub const DEFAULT_LEVEL_TYPE: &str = "default";
/// Level type sent for superflat worlds.
pub const FLAT_LEVEL_TYPE: &str = "flat";
/// Level type sent for large biomes worlds.
pub const LARGE_BIOMES_LEVEL_TYPE: &str = "largeBiomes";


/// The game mode the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
}

impl GameMode {

    /// Decode the raw wire value, the hardcore bit is ignored.
    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw & 0x3 {
            0 => Some(Self::Survival),
            1 => Some(Self::Creative),
            2 => Some(Self::Adventure),
            _ => None,
        }
    }

    /// Return true if the raw wire value carries the hardcore flag.
    pub fn is_raw_hardcore(raw: i8) -> bool {
        raw & 0x8 != 0
    }

}

/// The dimension a world is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimension {
    Nether,
    #[default]
    Overworld,
    End,
}

impl Dimension {

    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Self::Nether),
            0 => Some(Self::Overworld),
            1 => Some(Self::End),
            _ => None,
        }
    }

}

/// The difficulty of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Peaceful,
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {

    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(Self::Peaceful),
            1 => Some(Self::Easy),
            2 => Some(Self::Normal),
            3 => Some(Self::Hard),
            _ => None,
        }
    }

}


/// An entity tracked in the world.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    /// The entity id given by the server.
    pub id: i32,
    /// Raw object or mob kind this entity was spawned with.
    pub kind: i8,
    /// The entity id of the owner for projectile-like entities, zero when
    /// not owned.
    pub owner_id: i32,
    /// Last known position.
    pub pos: DVec3,
    /// Last known velocity, in blocks per tick.
    pub vel: DVec3,
    /// Last known look (yaw, pitch), in degrees.
    pub look: Vec2,
}

/// An entry of the server's player list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub name: String,
    pub online: bool,
    pub ping: i16,
}

/// State of the player driven by this client.
#[derive(Debug, Default)]
pub struct LocalPlayer {
    /// The entity id of the player in the world, known after login.
    pub entity_id: Option<i32>,
    /// Head height above the feet position.
    pub stance: f64,
    /// Currently held hotbar slot.
    pub held_slot: i16,
    /// Main inventory content, as last pushed by the server.
    pub inventory: Vec<Slot>,
    pub flying_speed: f32,
    pub walking_speed: f32,
    /// Invulnerability flag of the abilities packet.
    pub god: bool,
    /// Flying flag of the abilities packet.
    pub ghost: bool,
    /// True while the server reports the player off the ground.
    pub airborne: bool,
    pub difficulty: Difficulty,
}

/// Whole-world state rebuilt from the packets the server sends.
#[derive(Default)]
pub struct World {
    /// The player this client is driving.
    pub player: LocalPlayer,
    /// Server player list, keyed by player name.
    pub players: HashMap<String, PlayerEntry>,
    /// Every entity known to the client, keyed by entity id.
    pub entities: HashMap<i32, Entity>,
    /// Decoded chunk columns, keyed by chunk coordinates.
    pub columns: HashMap<(i32, i32), ChunkColumn>,
    /// Age of the world, in ticks.
    pub age: i64,
    /// Current time of day, in ticks.
    pub time_of_day: i64,
    pub level_type: String,
    pub game_mode: GameMode,
    pub dimension: Dimension,
    pub difficulty: Difficulty,
    pub raining: bool,
    pub showing_credits: bool,
}

impl World {

    pub fn new() -> Self {
        Self {
            level_type: DEFAULT_LEVEL_TYPE.to_string(),
            ..Default::default()
        }
    }

    /// Get or create the entity with the given id.
    pub fn spawn_entity(&mut self, id: i32) -> &mut Entity {
        self.entities.entry(id).or_insert_with(|| Entity { id, ..Default::default() })
    }

    pub fn entity(&self, id: i32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// The entity currently controlled by the local player, if logged in.
    pub fn player_entity(&self) -> Option<&Entity> {
        self.entities.get(&self.player.entity_id?)
    }

    pub fn player_entity_mut(&mut self) -> Option<&mut Entity> {
        self.entities.get_mut(&self.player.entity_id?)
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn raw_game_values() {
        assert_eq!(GameMode::from_raw(0), Some(GameMode::Survival));
        assert_eq!(GameMode::from_raw(1), Some(GameMode::Creative));
        // The hardcore flag keeps the mode decodable.
        assert_eq!(GameMode::from_raw(0x8 | 1), Some(GameMode::Creative));
        assert!(GameMode::is_raw_hardcore(0x8));
        assert_eq!(Dimension::from_raw(-1), Some(Dimension::Nether));
        assert_eq!(Dimension::from_raw(2), None);
        assert_eq!(Difficulty::from_raw(3), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_raw(4), None);
    }

    #[test]
    fn spawn_entity_is_idempotent() {
        let mut world = World::new();
        world.spawn_entity(12).pos.x = 4.5;
        assert_eq!(world.spawn_entity(12).pos.x, 4.5);
        assert_eq!(world.entities.len(), 1);
    }

}
