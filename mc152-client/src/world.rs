//! World simulation: applies the packets decoded off the connection to an
//! in-memory world state.

use glam::{DVec3, Vec2};
use tracing::trace;

use mc152::world::{Difficulty, Dimension, GameMode, PlayerEntry, World};

use crate::chunk::read_chunk_bulk;
use crate::proto::{game_state, Packet, INVENTORY_WINDOW_ID};


/// Scale of the absolute integer positions carried by spawn and teleport
/// packets, in fixed-point 1/32 of a block.
const POS_SCALE: f64 = 32.0;
/// Scale of the velocity shorts, in 1/8000 of a block per tick.
const VEL_SCALE: f64 = 8000.0;
/// Scale of the angle bytes, 256 steps for a full turn.
const ANGLE_SCALE: f32 = 360.0 / 256.0;

/// Errors of the packet consumption.
#[derive(thiserror::Error, Debug)]
pub enum SimulatorError {
    /// The server pushed window content for a window this client does not
    /// know about.
    #[error("unknown window id: {0}")]
    UnknownWindow(i8),
    /// The bulk chunk payload failed to decompress or decode.
    #[error("chunk data: {0}")]
    Chunk(#[from] std::io::Error),
}

/// Pure consumer of decoded packets, maintaining the current player and the
/// world entities. Packet variants without a counterpart in the world state
/// are ignored.
#[derive(Default)]
pub struct Simulator {
    pub world: World,
}

impl Simulator {

    pub fn new() -> Self {
        Self { world: World::new() }
    }

    /// Apply one decoded packet to the world state.
    pub fn handle(&mut self, packet: &Packet) -> Result<(), SimulatorError> {
        match packet {

            Packet::LoginRequest(p) => {
                trace!("login, entity #{}", p.entity_id);
                self.world.spawn_entity(p.entity_id);
                self.world.player.entity_id = Some(p.entity_id);
                self.world.level_type = p.level_type.clone();
                if let Some(mode) = GameMode::from_raw(p.game_mode) {
                    self.world.game_mode = mode;
                }
                if let Some(dimension) = Dimension::from_raw(p.dimension) {
                    self.world.dimension = dimension;
                }
                if let Some(difficulty) = Difficulty::from_raw(p.difficulty) {
                    self.world.difficulty = difficulty;
                    self.world.player.difficulty = difficulty;
                }
            }

            Packet::SpawnPosition(p) => {
                let pos = DVec3::new(p.x as f64, p.y as f64, p.z as f64);
                if let Some(entity) = self.world.player_entity_mut() {
                    entity.pos = pos;
                }
            }

            Packet::PlayerAbilities(p) => {
                let player = &mut self.world.player;
                player.god = p.is_god();
                player.ghost = p.is_ghost();
                player.flying_speed = p.flying_speed as f32;
                player.walking_speed = p.walking_speed as f32;
            }

            Packet::TimeUpdate(p) => {
                self.world.age = p.world_age;
                self.world.time_of_day = p.time_of_day;
            }

            Packet::ChangeGameState(p) => match p.state {
                game_state::BEGIN_RAIN => self.world.raining = true,
                game_state::END_RAIN => self.world.raining = false,
                game_state::CHANGE_GAME_MODE => {
                    if let Some(mode) = GameMode::from_raw(p.game_mode) {
                        self.world.game_mode = mode;
                    }
                }
                game_state::ENTER_CREDITS => self.world.showing_credits = true,
                _ => {}
            },

            Packet::HeldItemChange(p) => {
                self.world.player.held_slot = p.slot_id;
            }

            Packet::PlayerListItem(p) => {
                self.world.players.insert(p.name.clone(), PlayerEntry {
                    name: p.name.clone(),
                    online: p.online,
                    ping: p.ping,
                });
            }

            Packet::PlayerPositionLookClient(p) => {
                let player = &mut self.world.player;
                player.stance = p.stance;
                player.airborne = !p.on_ground;
                if let Some(entity) = self.world.player_entity_mut() {
                    entity.pos = DVec3::new(p.x, p.y, p.z);
                    entity.look = Vec2::new(p.yaw, p.pitch);
                }
            }

            Packet::SetWindowItems(p) => {
                if p.window_id != INVENTORY_WINDOW_ID {
                    return Err(SimulatorError::UnknownWindow(p.window_id));
                }
                self.world.player.inventory = p.slots.clone();
            }

            Packet::MapChunkBulk(p) => {
                for column in read_chunk_bulk(p)? {
                    let meta = column.metadata;
                    trace!("chunk column {}/{}", meta.cx, meta.cz);
                    self.world.columns.insert((meta.cx, meta.cz), column);
                }
            }

            Packet::SpawnObject(p) => {
                let entity = self.world.spawn_entity(p.entity_id);
                entity.kind = p.kind;
                entity.owner_id = p.owner_id;
                entity.pos = DVec3::new(p.x as f64, p.y as f64, p.z as f64) / POS_SCALE;
                if p.has_velocity() {
                    entity.vel = DVec3::new(p.vx as f64, p.vy as f64, p.vz as f64) / VEL_SCALE;
                }
                entity.look = Vec2::new(p.yaw as f32, p.pitch as f32) * ANGLE_SCALE;
            }

            _ => {}

        }
        Ok(())
    }

}


#[cfg(test)]
mod tests {

    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use mc152::chunk::{ColumnMetadata, BIOME_COUNT, SECTION_BLOCK_COUNT, SECTION_NIBBLE_COUNT};
    use mc152::item::Slot;

    use crate::proto::*;

    use super::*;

    fn login() -> Packet {
        Packet::LoginRequest(LoginRequestPacket {
            entity_id: 4052,
            level_type: "flat".to_string(),
            game_mode: 1,
            dimension: -1,
            difficulty: 3,
            unused: 0,
            max_players: 8,
        })
    }

    #[test]
    fn login_creates_the_player_entity() {

        let mut sim = Simulator::new();
        sim.handle(&login()).unwrap();

        let world = &sim.world;
        assert_eq!(world.player.entity_id, Some(4052));
        assert!(world.entity(4052).is_some());
        assert_eq!(world.level_type, "flat");
        assert_eq!(world.game_mode, GameMode::Creative);
        assert_eq!(world.dimension, Dimension::Nether);
        assert_eq!(world.difficulty, Difficulty::Hard);
        assert_eq!(world.player.difficulty, Difficulty::Hard);

    }

    #[test]
    fn spawn_position_moves_the_player_entity() {
        let mut sim = Simulator::new();
        sim.handle(&login()).unwrap();
        sim.handle(&Packet::SpawnPosition(SpawnPositionPacket { x: 8, y: 65, z: -8 })).unwrap();
        let entity = sim.world.player_entity().unwrap();
        assert_eq!(entity.pos, DVec3::new(8.0, 65.0, -8.0));
    }

    #[test]
    fn abilities_set_the_player_flags() {
        let mut sim = Simulator::new();
        sim.handle(&Packet::PlayerAbilities(PlayerAbilitiesPacket {
            flags: 0x3,
            flying_speed: 12,
            walking_speed: 25,
        })).unwrap();
        assert!(sim.world.player.god);
        assert!(sim.world.player.ghost);
        assert_eq!(sim.world.player.flying_speed, 12.0);
        assert_eq!(sim.world.player.walking_speed, 25.0);
    }

    #[test]
    fn time_update_sets_age_and_time() {
        let mut sim = Simulator::new();
        sim.handle(&Packet::TimeUpdate(TimeUpdatePacket {
            world_age: 8_640_000,
            time_of_day: 18_000,
        })).unwrap();
        assert_eq!(sim.world.age, 8_640_000);
        assert_eq!(sim.world.time_of_day, 18_000);
    }

    #[test]
    fn game_state_switches() {

        let mut sim = Simulator::new();

        sim.handle(&Packet::ChangeGameState(ChangeGameStatePacket {
            state: game_state::BEGIN_RAIN, game_mode: 0,
        })).unwrap();
        assert!(sim.world.raining);

        sim.handle(&Packet::ChangeGameState(ChangeGameStatePacket {
            state: game_state::END_RAIN, game_mode: 0,
        })).unwrap();
        assert!(!sim.world.raining);

        sim.handle(&Packet::ChangeGameState(ChangeGameStatePacket {
            state: game_state::CHANGE_GAME_MODE, game_mode: 2,
        })).unwrap();
        assert_eq!(sim.world.game_mode, GameMode::Adventure);

        sim.handle(&Packet::ChangeGameState(ChangeGameStatePacket {
            state: game_state::ENTER_CREDITS, game_mode: 0,
        })).unwrap();
        assert!(sim.world.showing_credits);

    }

    #[test]
    fn held_item_change_updates_the_slot() {
        let mut sim = Simulator::new();
        sim.handle(&Packet::HeldItemChange(HeldItemChangePacket { slot_id: 7 })).unwrap();
        assert_eq!(sim.world.player.held_slot, 7);
    }

    #[test]
    fn player_list_upserts_by_name() {

        let mut sim = Simulator::new();
        sim.handle(&Packet::PlayerListItem(PlayerListItemPacket {
            name: "Notch".to_string(), online: true, ping: 30,
        })).unwrap();
        sim.handle(&Packet::PlayerListItem(PlayerListItemPacket {
            name: "Notch".to_string(), online: true, ping: 55,
        })).unwrap();

        assert_eq!(sim.world.players.len(), 1);
        assert_eq!(sim.world.players["Notch"].ping, 55);

    }

    #[test]
    fn forced_position_look_updates_the_player() {

        let mut sim = Simulator::new();
        sim.handle(&login()).unwrap();
        sim.handle(&Packet::PlayerPositionLookClient(PlayerPositionLookClientPacket {
            x: 100.5, stance: 66.62, y: 65.0, z: -8.5,
            yaw: 90.0, pitch: 10.0, on_ground: false,
        })).unwrap();

        let world = &sim.world;
        assert_eq!(world.player.stance, 66.62);
        assert!(world.player.airborne);
        let entity = world.player_entity().unwrap();
        assert_eq!(entity.pos, DVec3::new(100.5, 65.0, -8.5));
        assert_eq!(entity.look, Vec2::new(90.0, 10.0));

    }

    #[test]
    fn window_items_replace_the_inventory() {

        let mut sim = Simulator::new();
        let slots = vec![Slot::EMPTY, Slot::new(276, 1, 0)];
        sim.handle(&Packet::SetWindowItems(SetWindowItemsPacket {
            window_id: INVENTORY_WINDOW_ID,
            slots: slots.clone(),
        })).unwrap();
        assert_eq!(sim.world.player.inventory, slots);

        match sim.handle(&Packet::SetWindowItems(SetWindowItemsPacket {
            window_id: 3,
            slots: Vec::new(),
        })) {
            Err(SimulatorError::UnknownWindow(3)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        // The failed update left the inventory untouched.
        assert_eq!(sim.world.player.inventory, slots);

    }

    #[test]
    fn chunk_bulk_stores_decoded_columns() {

        let mut raw = Vec::new();
        raw.extend(std::iter::repeat(1u8).take(SECTION_BLOCK_COUNT));
        raw.extend(std::iter::repeat(0u8).take(SECTION_NIBBLE_COUNT * 3));
        raw.extend(std::iter::repeat(0u8).take(BIOME_COUNT));

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();

        let mut sim = Simulator::new();
        sim.handle(&Packet::MapChunkBulk(MapChunkBulkPacket {
            sky_light: true,
            compressed_data: encoder.finish().unwrap(),
            metadata: vec![ColumnMetadata { cx: 5, cz: -1, primary_bitmap: 0b1, add_bitmap: 0 }],
        })).unwrap();

        let column = &sim.world.columns[&(5, -1)];
        assert_eq!(column.block(3, 2, 7), 1);
        assert_eq!(column.block(3, 200, 7), 0);

    }

    #[test]
    fn spawn_object_effects() {

        let mut sim = Simulator::new();

        // No velocity without the flag.
        sim.handle(&Packet::SpawnObject(SpawnObjectPacket {
            entity_id: 7,
            kind: object::BOAT,
            x: 100 * 32, y: 64 * 32, z: -16 * 32,
            yaw: 64, pitch: 0,
            flag: 0,
            ..Default::default()
        })).unwrap();

        let entity = sim.world.entity(7).unwrap();
        assert_eq!(entity.kind, object::BOAT);
        assert_eq!(entity.pos, DVec3::new(100.0, 64.0, -16.0));
        assert_eq!(entity.vel, DVec3::ZERO);
        assert_eq!(entity.look.x, 90.0);

        sim.handle(&Packet::SpawnObject(SpawnObjectPacket {
            entity_id: 8,
            kind: object::ARROW,
            x: 0, y: 0, z: 0,
            owner_id: 7,
            flag: 1, vx: 8000, vy: -4000, vz: 0,
            ..Default::default()
        })).unwrap();

        let entity = sim.world.entity(8).unwrap();
        assert_eq!(entity.owner_id, 7);
        assert_eq!(entity.vel, DVec3::new(1.0, -0.5, 0.0));

    }

    #[test]
    fn unrelated_packets_are_ignored() {
        let mut sim = Simulator::new();
        sim.handle(&Packet::KeepAlive(KeepAlivePacket { id: 1 })).unwrap();
        sim.handle(&Packet::Effect(EffectPacket {
            effect_id: 1003, x: 0, y: 0, z: 0, data: 0, no_volume_decrease: false,
        })).unwrap();
        assert!(sim.world.entities.is_empty());
    }

}
