//! Minecraft protocol v60 definition: every packet exchanged with a Notchian
//! 1.5.2 server and its big-endian wire codec. A packet is framed as a single
//! opcode byte followed by its fields in declared order, there is no length
//! prefix.

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, BE};

use mc152::chunk::ColumnMetadata;
use mc152::io::{ReadJavaExt, WriteJavaExt};
use mc152::item::Slot;


/// Protocol version spoken by this implementation (release 1.5.2).
pub const VERSION: u8 = 60;

/// Window id of the player's own inventory.
pub const INVENTORY_WINDOW_ID: i8 = 0;


/// Direction a packet travels on the wire. The opcode space is shared by
/// both directions, except opcode 0x0D whose field order depends on who
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Packets produced by the server, consumed by the client.
    Clientbound,
    /// Packets produced by the client, consumed by the server.
    Serverbound,
}

/// Errors of the packet codec.
#[derive(thiserror::Error, Debug)]
pub enum ProtoError {
    /// The stream closed in the middle of a packet.
    #[error("unexpected end of stream")]
    UnexpectedEof,
    /// A wire-format violation: bad UTF-16, negative count, unknown metadata
    /// kind, inconsistent sizes.
    #[error("malformed packet: {0}")]
    Malformed(String),
    /// The opcode has no packet mapped in the direction it was read from.
    #[error("unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),
    /// The packet has no opcode in the direction it should be written to.
    #[error("packet cannot be written {0:?}")]
    UnregisteredType(Direction),
    #[error("io: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ProtoError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            io::ErrorKind::InvalidData => Self::Malformed(e.to_string()),
            _ => Self::Io(e),
        }
    }
}

fn malformed(message: impl Into<String>) -> ProtoError {
    ProtoError::Malformed(message.into())
}


/// Values of [`ChangeGameStatePacket::state`].
pub mod game_state {
    pub const INVALID_BED: i8 = 0;
    pub const BEGIN_RAIN: i8 = 1;
    pub const END_RAIN: i8 = 2;
    pub const CHANGE_GAME_MODE: i8 = 3;
    pub const ENTER_CREDITS: i8 = 4;
}

/// Object kinds carried by [`SpawnObjectPacket::kind`].
pub mod object {

    pub const BOAT: i8 = 1;
    pub const MINECART: i8 = 10;
    pub const MINECART_STORAGE: i8 = 11;
    pub const MINECART_POWERED: i8 = 12;
    pub const ACTIVE_TNT: i8 = 50;
    pub const ENDER_CRYSTAL: i8 = 51;
    pub const ARROW: i8 = 60;
    pub const SNOWBALL: i8 = 61;
    pub const EGG: i8 = 62;
    pub const ENDER_PEARL: i8 = 65;
    pub const WITHER_SKULL: i8 = 66;
    pub const FALLING_OBJECT: i8 = 70;
    pub const ITEM_FRAME: i8 = 71;
    pub const EYE_OF_ENDER: i8 = 72;
    pub const THROWN_POTION: i8 = 73;
    pub const FALLING_DRAGON_EGG: i8 = 74;
    pub const THROWN_EXP_BOTTLE: i8 = 75;
    pub const FISHING_FLOAT: i8 = 90;

    /// Return true for object kinds spawned with an owner entity id.
    pub fn is_projectile(kind: i8) -> bool {
        matches!(
            kind,
            ARROW | SNOWBALL | EGG | ENDER_PEARL | WITHER_SKULL | EYE_OF_ENDER
                | THROWN_POTION | THROWN_EXP_BOTTLE | FISHING_FLOAT
        )
    }

}


/// A metadata entry for an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Metadata index, stored in the low 5 bits of the key byte.
    pub id: u8,
    pub kind: MetadataKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataKind {
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    String(String),
    Slot(Slot),
    Position(i32, i32, i32),
}

/// A single attribute of an entity properties packet.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityProperty {
    pub key: String,
    pub value: f64,
    pub modifiers: Vec<AttributeModifier>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeModifier {
    pub uuid_high: i64,
    pub uuid_low: i64,
    pub amount: f64,
    pub operation: i8,
}


/// A packet exchanged with the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Used for TCP keep alive, the id must be echoed back.
    KeepAlive(KeepAlivePacket),
    /// Answered by the server to a successful handshake, describes the world
    /// the player spawns into.
    LoginRequest(LoginRequestPacket),
    /// Sent by the client to initiate the login sequence.
    Handshake(HandshakePacket),
    /// A chat message.
    ChatMessage(ChatMessagePacket),
    /// Update the world's age and time of day.
    TimeUpdate(TimeUpdatePacket),
    /// Change the equipment visible on an entity.
    EntityEquipment(EntityEquipmentPacket),
    /// The compass spawn position.
    SpawnPosition(SpawnPositionPacket),
    /// The client's player interacts with an entity.
    UseEntity(UseEntityPacket),
    /// Update the client's player health, food and saturation.
    UpdateHealth(UpdateHealthPacket),
    /// Sent after the player died and wants to respawn.
    Respawn(RespawnPacket),
    /// The client's player is not moving nor rotating.
    Player(PlayerPacket),
    /// The client's player is moving but not rotating.
    PlayerPosition(PlayerPositionPacket),
    /// The client's player is rotating but not moving.
    PlayerLook(PlayerLookPacket),
    /// The client's player moved and rotated, as produced by the client.
    PlayerPositionLookServer(PlayerPositionLookServerPacket),
    /// A forced position and look, as produced by the server. The same
    /// opcode as the client-produced packet but the stance is at a
    /// different place in the payload.
    PlayerPositionLookClient(PlayerPositionLookClientPacket),
    /// The client's player digs a block.
    PlayerDigging(PlayerDiggingPacket),
    /// The client's player places a block.
    PlayerBlockPlacement(PlayerBlockPlacementPacket),
    /// The client's player changed the held hotbar slot.
    HeldItemChange(HeldItemChangePacket),
    /// A player entity lies in a bed.
    UseBed(UseBedPacket),
    /// An entity plays an animation.
    Animation(AnimationPacket),
    /// The player starts or stops an action such as crouching.
    EntityAction(EntityActionPacket),
    /// A named player entity to spawn.
    SpawnNamedEntity(SpawnNamedEntityPacket),
    /// A dropped item stack entity to spawn.
    SpawnDroppedItem(SpawnDroppedItemPacket),
    /// An entity picked up an item on the ground.
    CollectItem(CollectItemPacket),
    /// An object or vehicle entity to spawn.
    SpawnObject(SpawnObjectPacket),
    /// A mob entity to spawn.
    SpawnMob(SpawnMobPacket),
    /// A painting entity to spawn.
    SpawnPainting(SpawnPaintingPacket),
    /// An experience orb entity to spawn.
    SpawnExperienceOrb(SpawnExperienceOrbPacket),
    /// Update an entity velocity.
    EntityVelocity(EntityVelocityPacket),
    /// Remove a batch of entities.
    DestroyEntity(DestroyEntityPacket),
    /// Base packet creating an entity without any state.
    CreateEntity(CreateEntityPacket),
    /// Move an entity by a fixed-point offset.
    EntityRelativeMove(EntityRelativeMovePacket),
    /// Set an entity's look.
    EntityLook(EntityLookPacket),
    /// Move an entity by a fixed-point offset and set its look.
    EntityLookRelativeMove(EntityLookRelativeMovePacket),
    /// Teleport an entity to an absolute fixed-point position.
    EntityTeleport(EntityTeleportPacket),
    /// Set the head orientation of an entity.
    EntityHeadLook(EntityHeadLookPacket),
    EntityStatus(EntityStatusPacket),
    /// Make an entity ride another one.
    AttachEntity(AttachEntityPacket),
    /// Modify an entity's metadata.
    SetEntityMetadata(SetEntityMetadataPacket),
    /// Apply a potion effect to an entity.
    EntityEffect(EntityEffectPacket),
    RemoveEntityEffect(RemoveEntityEffectPacket),
    /// Update the experience bar of the client's player.
    SetExperience(SetExperiencePacket),
    /// Attribute key/value pairs attached to an entity.
    EntityProperties(EntityPropertiesPacket),
    /// A single compressed chunk column.
    ChunkData(ChunkDataPacket),
    /// Several blocks changed in the same chunk.
    MultiBlockChange(MultiBlockChangePacket),
    /// A single block changed.
    BlockChange(BlockChangePacket),
    /// An action on a block, note blocks and pistons.
    BlockAction(BlockActionPacket),
    /// Block breaking progress of an entity.
    BlockBreakAnimation(BlockBreakAnimationPacket),
    /// A bulk transfer of compressed chunk columns.
    MapChunkBulk(MapChunkBulkPacket),
    /// An explosion with affected block offsets.
    Explosion(ExplosionPacket),
    /// Play a sound or visual effect at a block position.
    Effect(EffectPacket),
    /// Play a named sound effect.
    NamedSoundEffect(NamedSoundEffectPacket),
    /// Various state notifications, such as rain and game mode changes.
    ChangeGameState(ChangeGameStatePacket),
    /// Spawn a global entity, only thunderbolts in practice.
    GlobalEntity(GlobalEntityPacket),
    /// Force the client to open a window.
    OpenWindow(OpenWindowPacket),
    /// Close a window.
    CloseWindow(CloseWindowPacket),
    /// The client clicked a window slot.
    ClickWindow(ClickWindowPacket),
    /// Change a single slot of a window.
    SetSlot(SetSlotPacket),
    /// Set every slot of a window at once.
    SetWindowItems(SetWindowItemsPacket),
    /// Set a progress bar of a window.
    UpdateWindowProperty(UpdateWindowPropertyPacket),
    /// Accept or reject a window transaction.
    ConfirmTransaction(ConfirmTransactionPacket),
    /// The client sets a creative inventory slot.
    CreativeInventoryAction(CreativeInventoryActionPacket),
    /// The client picks an enchantment.
    EnchantItem(EnchantItemPacket),
    /// The text of a sign changed.
    UpdateSign(UpdateSignPacket),
    /// Complex item payload, maps in practice.
    ItemData(ItemDataPacket),
    /// NBT payload of a block entity.
    UpdateTileEntity(UpdateTileEntityPacket),
    /// Increment a statistic by a given amount.
    IncrementStatistic(IncrementStatisticPacket),
    /// Upsert an entry of the player list.
    PlayerListItem(PlayerListItemPacket),
    /// Update the client's player abilities and speeds.
    PlayerAbilities(PlayerAbilitiesPacket),
    /// Ask for or answer a chat completion.
    TabComplete(TabCompletePacket),
    /// Locale and rendering settings of the client.
    ClientSettings(ClientSettingsPacket),
    /// Initial spawn or respawn request.
    ClientStatus(ClientStatusPacket),
    /// Create or remove a scoreboard objective.
    ScoreboardObjective(ScoreboardObjectivePacket),
    /// Create, update or remove a score.
    UpdateScore(UpdateScorePacket),
    /// Select the displayed scoreboard.
    DisplayScoreboard(DisplayScoreboardPacket),
    /// Create, update or remove a team.
    Teams(TeamsPacket),
    /// A custom payload on a named channel.
    PluginMessage(PluginMessagePacket),
    /// Second half of the encryption exchange; also echoed empty by the
    /// server to commit it.
    EncryptionKeyResponse(EncryptionKeyResponsePacket),
    /// First half of the encryption exchange, carries the server's public
    /// key.
    EncryptionKeyRequest(EncryptionKeyRequestPacket),
    /// Legacy server list ping.
    ServerListPing(ServerListPingPacket),
    /// Sent by either side before closing the connection.
    Disconnect(DisconnectPacket),
}

/// Packet 0x00.
#[derive(Debug, Clone, PartialEq)]
pub struct KeepAlivePacket {
    /// Random id generated by the server, must be echoed back.
    pub id: i32,
}

/// Packet 0x01.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequestPacket {
    /// The entity id given to the client's player.
    pub entity_id: i32,
    /// The level type, "default", "flat" or "largeBiomes".
    pub level_type: String,
    /// Raw game mode, possibly carrying the hardcore flag.
    pub game_mode: i8,
    pub dimension: i8,
    pub difficulty: i8,
    /// Was the world height, always zero.
    pub unused: i8,
    pub max_players: i8,
}

/// Packet 0x02.
#[derive(Debug, Clone, PartialEq)]
pub struct HandshakePacket {
    /// Protocol version, 60 for this implementation.
    pub version: u8,
    pub username: String,
    pub hostname: String,
    pub port: i32,
}

/// Packet 0x03.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessagePacket {
    pub message: String,
}

/// Packet 0x04.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUpdatePacket {
    /// Age of the world, in ticks, not affected by commands.
    pub world_age: i64,
    pub time_of_day: i64,
}

/// Packet 0x05.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEquipmentPacket {
    pub entity_id: i32,
    /// 0 for the held item, 1 to 4 for armor.
    pub slot: i16,
    pub item: Slot,
}

/// Packet 0x06.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPositionPacket {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Packet 0x07.
#[derive(Debug, Clone, PartialEq)]
pub struct UseEntityPacket {
    pub user_id: i32,
    pub target_id: i32,
    pub left_click: bool,
}

/// Packet 0x08.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateHealthPacket {
    pub health: f32,
    pub food: i16,
    pub saturation: f32,
}

/// Packet 0x09.
#[derive(Debug, Clone, PartialEq)]
pub struct RespawnPacket {
    pub dimension: i32,
    pub difficulty: i8,
    pub game_mode: i8,
    pub world_height: i16,
    pub level_type: String,
}

/// Packet 0x0A.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPacket {
    pub on_ground: bool,
}

/// Packet 0x0B.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionPacket {
    pub x: f64,
    pub y: f64,
    /// Head height above the feet position.
    pub stance: f64,
    pub z: f64,
    pub on_ground: bool,
}

/// Packet 0x0C.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLookPacket {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Packet 0x0D as produced by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionLookServerPacket {
    pub x: f64,
    pub y: f64,
    pub stance: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Packet 0x0D as produced by the server, the stance swaps place with Y.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPositionLookClientPacket {
    pub x: f64,
    pub stance: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Packet 0x0E.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDiggingPacket {
    pub status: i8,
    pub x: i32,
    pub y: i8,
    pub z: i32,
    pub face: i8,
}

/// Packet 0x0F.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBlockPlacementPacket {
    pub x: i32,
    pub y: u8,
    pub z: i32,
    pub direction: i8,
    pub held_item: Slot,
    pub cursor_x: i8,
    pub cursor_y: i8,
    pub cursor_z: i8,
}

/// Packet 0x10.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldItemChangePacket {
    /// Hotbar slot in range 0..9.
    pub slot_id: i16,
}

/// Packet 0x11.
#[derive(Debug, Clone, PartialEq)]
pub struct UseBedPacket {
    pub entity_id: i32,
    /// Always zero.
    pub unknown: i8,
    pub x: i32,
    pub y: i8,
    pub z: i32,
}

/// Packet 0x12.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPacket {
    pub entity_id: i32,
    pub animation: i8,
}

/// Packet 0x13.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityActionPacket {
    pub entity_id: i32,
    pub action_id: i8,
}

/// Packet 0x14.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnNamedEntityPacket {
    pub entity_id: i32,
    pub player_name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    pub current_item: i16,
    pub metadata: Vec<Metadata>,
}

/// Packet 0x15.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnDroppedItemPacket {
    pub entity_id: i32,
    pub item: Slot,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rotation: i8,
    pub pitch: i8,
    pub roll: i8,
}

/// Packet 0x16.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectItemPacket {
    pub collected_id: i32,
    pub collector_id: i32,
}

/// Packet 0x17. The payload between the flag and the velocity depends on the
/// object kind: item frames carry an orientation, falling objects a block
/// type and projectiles their owner entity id. The velocity is present only
/// when the flag is non-zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpawnObjectPacket {
    pub entity_id: i32,
    pub kind: i8,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub pitch: i8,
    pub yaw: i8,
    pub flag: i32,
    pub orientation: i32,
    pub block_type: i32,
    pub owner_id: i32,
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
}

impl SpawnObjectPacket {

    #[inline]
    pub fn has_velocity(&self) -> bool {
        self.flag != 0
    }

}

/// Packet 0x18.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnMobPacket {
    pub entity_id: i32,
    pub kind: i8,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
    pub head_yaw: i8,
    pub vz: i16,
    pub vx: i16,
    pub vy: i16,
    pub metadata: Vec<Metadata>,
}

/// Packet 0x19.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPaintingPacket {
    pub entity_id: i32,
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: i32,
}

/// Packet 0x1A.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnExperienceOrbPacket {
    pub entity_id: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub count: i16,
}

/// Packet 0x1C.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityVelocityPacket {
    pub entity_id: i32,
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
}

/// Packet 0x1D. The entity id count is a single unsigned byte.
#[derive(Debug, Clone, PartialEq)]
pub struct DestroyEntityPacket {
    pub entity_ids: Vec<i32>,
}

/// Packet 0x1E.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateEntityPacket {
    pub entity_id: i32,
}

/// Packet 0x1F.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRelativeMovePacket {
    pub entity_id: i32,
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
}

/// Packet 0x20.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityLookPacket {
    pub entity_id: i32,
    pub yaw: i8,
    pub pitch: i8,
}

/// Packet 0x21.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityLookRelativeMovePacket {
    pub entity_id: i32,
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
    pub yaw: i8,
    pub pitch: i8,
}

/// Packet 0x22.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTeleportPacket {
    pub entity_id: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub yaw: i8,
    pub pitch: i8,
}

/// Packet 0x23.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityHeadLookPacket {
    pub entity_id: i32,
    pub head_yaw: i8,
}

/// Packet 0x26.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStatusPacket {
    pub entity_id: i32,
    pub status: i8,
}

/// Packet 0x27.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachEntityPacket {
    pub entity_id: i32,
    pub vehicle_id: i32,
}

/// Packet 0x28.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEntityMetadataPacket {
    pub entity_id: i32,
    pub metadata: Vec<Metadata>,
}

/// Packet 0x29.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEffectPacket {
    pub entity_id: i32,
    pub effect_id: i8,
    pub amplifier: i8,
    pub duration: i16,
}

/// Packet 0x2A.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveEntityEffectPacket {
    pub entity_id: i32,
    pub effect_id: i8,
}

/// Packet 0x2B.
#[derive(Debug, Clone, PartialEq)]
pub struct SetExperiencePacket {
    /// Progress of the experience bar, between 0 and 1.
    pub progress: f32,
    pub level: i16,
    pub total: i16,
}

/// Packet 0x2C.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPropertiesPacket {
    pub entity_id: i32,
    pub properties: Vec<EntityProperty>,
}

/// Packet 0x33.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDataPacket {
    pub x: i32,
    pub z: i32,
    /// True when the payload carries the whole column including biomes.
    pub ground_up: bool,
    pub primary_bitmap: u16,
    pub add_bitmap: u16,
    /// Zlib-compressed column payload, compression is the caller's concern.
    pub compressed_data: Vec<u8>,
}

/// Packet 0x34.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiBlockChangePacket {
    pub cx: i32,
    pub cz: i32,
    /// One packed record per changed block.
    pub records: Vec<i32>,
}

/// Packet 0x35.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockChangePacket {
    pub x: i32,
    pub y: i8,
    pub z: i32,
    pub block_type: i16,
    pub metadata: i8,
}

/// Packet 0x36.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockActionPacket {
    pub x: i32,
    pub y: i16,
    pub z: i32,
    pub instrument_type: i8,
    pub instrument_pitch: i8,
    pub block_id: i16,
}

/// Packet 0x37.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockBreakAnimationPacket {
    pub entity_id: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub stage: i8,
}

/// Packet 0x38. On the wire: column count, payload size, sky light flag, the
/// compressed payload, then the per-column metadata. The payload compression
/// is the caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct MapChunkBulkPacket {
    pub sky_light: bool,
    pub compressed_data: Vec<u8>,
    pub metadata: Vec<ColumnMetadata>,
}

/// Packet 0x3C.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionPacket {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f32,
    /// Offsets of affected blocks, relative to the explosion center.
    pub blocks: Vec<(i8, i8, i8)>,
    pub push_x: f32,
    pub push_y: f32,
    pub push_z: f32,
}

/// Packet 0x3D.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectPacket {
    pub effect_id: i32,
    pub x: i32,
    pub y: i8,
    pub z: i32,
    pub data: i32,
    pub no_volume_decrease: bool,
}

/// Packet 0x3E.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSoundEffectPacket {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub volume: f32,
    pub pitch: i8,
}

/// Packet 0x46.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeGameStatePacket {
    /// One of the [`game_state`] values.
    pub state: i8,
    /// Raw game mode, meaningful when the state switches it.
    pub game_mode: i8,
}

/// Packet 0x47.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEntityPacket {
    pub entity_id: i32,
    /// Always 1 for a thunderbolt.
    pub kind: i8,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Packet 0x64.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenWindowPacket {
    pub window_id: i8,
    pub inventory_type: i8,
    pub title: String,
    pub slot_count: i8,
}

/// Packet 0x65.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseWindowPacket {
    pub window_id: i8,
}

/// Packet 0x66.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickWindowPacket {
    pub window_id: i8,
    pub slot: i16,
    pub mouse_button: i8,
    pub action_number: i16,
    pub shift: bool,
    pub clicked_item: Slot,
}

/// Packet 0x67.
#[derive(Debug, Clone, PartialEq)]
pub struct SetSlotPacket {
    pub window_id: i8,
    pub slot: i16,
    pub data: Slot,
}

/// Packet 0x68.
#[derive(Debug, Clone, PartialEq)]
pub struct SetWindowItemsPacket {
    pub window_id: i8,
    pub slots: Vec<Slot>,
}

/// Packet 0x69.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWindowPropertyPacket {
    pub window_id: i8,
    pub property: i16,
    pub value: i16,
}

/// Packet 0x6A.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmTransactionPacket {
    pub window_id: i8,
    pub action_number: i16,
    pub accepted: bool,
}

/// Packet 0x6B.
#[derive(Debug, Clone, PartialEq)]
pub struct CreativeInventoryActionPacket {
    pub slot: i16,
    pub clicked_item: Slot,
}

/// Packet 0x6C.
#[derive(Debug, Clone, PartialEq)]
pub struct EnchantItemPacket {
    pub window_id: i8,
    pub enchantment: i8,
}

/// Packet 0x82.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSignPacket {
    pub x: i32,
    pub y: i16,
    pub z: i32,
    pub lines: Box<[String; 4]>,
}

/// Packet 0x83.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDataPacket {
    pub item_type: i16,
    pub item_id: i16,
    /// Raw payload, prefixed on the wire by a single unsigned length byte.
    pub data: Vec<u8>,
}

/// Packet 0x84.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTileEntityPacket {
    pub x: i32,
    pub y: i16,
    pub z: i32,
    pub action: i8,
    /// Raw gzipped NBT payload, kept opaque.
    pub nbt: Vec<u8>,
}

/// Packet 0xC8.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementStatisticPacket {
    pub statistic_id: i32,
    pub amount: i8,
}

/// Packet 0xC9.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerListItemPacket {
    pub name: String,
    pub online: bool,
    pub ping: i16,
}

/// Packet 0xCA.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAbilitiesPacket {
    pub flags: i8,
    pub flying_speed: i8,
    pub walking_speed: i8,
}

impl PlayerAbilitiesPacket {

    /// Invulnerability bit.
    #[inline]
    pub fn is_god(&self) -> bool {
        self.flags & 0x1 != 0
    }

    /// Flying bit.
    #[inline]
    pub fn is_ghost(&self) -> bool {
        self.flags & 0x2 != 0
    }

}

/// Packet 0xCB.
#[derive(Debug, Clone, PartialEq)]
pub struct TabCompletePacket {
    pub text: String,
}

/// Packet 0xCC.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettingsPacket {
    pub locale: String,
    pub view_distance: i8,
    pub chat_flags: i8,
    pub difficulty: i8,
    pub show_cape: bool,
}

/// Packet 0xCD.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientStatusPacket {
    /// 0 for the initial spawn, 1 for a respawn.
    pub payload: i8,
}

/// Packet 0xCE.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardObjectivePacket {
    pub name: String,
    pub display_name: String,
    /// 0 to create, 1 to remove, 2 to update the display name.
    pub action: i8,
}

/// Packet 0xCF. The score name and value are only on the wire when the
/// action is not a removal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateScorePacket {
    pub item_name: String,
    /// 0 to create or update, 1 to remove.
    pub action: i8,
    pub score_name: String,
    pub value: i32,
}

/// Packet 0xD0.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayScoreboardPacket {
    /// 0 in the list, 1 in the sidebar, 2 below the name.
    pub position: i8,
    pub score_name: String,
}

/// Packet 0xD1. The field groups on the wire depend on the mode: creation
/// and info updates carry the display strings and the friendly fire flag,
/// creation and player add/remove carry the player list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamsPacket {
    pub name: String,
    /// 0 create, 1 remove, 2 update info, 3 add players, 4 remove players.
    pub mode: i8,
    pub display_name: String,
    pub prefix: String,
    pub suffix: String,
    pub friendly_fire: i8,
    pub players: Vec<String>,
}

/// Packet 0xFA.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginMessagePacket {
    pub channel: String,
    pub data: Vec<u8>,
}

/// Packet 0xFC.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncryptionKeyResponsePacket {
    /// The shared secret, RSA-encrypted under the server's public key. Empty
    /// in the server's committing echo.
    pub shared_secret: Vec<u8>,
    /// The server's verify token, RSA-encrypted. Empty in the echo.
    pub verify_token: Vec<u8>,
}

/// Packet 0xFD.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionKeyRequestPacket {
    /// The server identifier, "-" for servers in offline mode.
    pub server_id: String,
    /// PKIX-encoded RSA public key of the server.
    pub public_key: Vec<u8>,
    pub verify_token: Vec<u8>,
}

/// Packet 0xFE.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerListPingPacket {
    /// Should always equal 1.
    pub magic: i8,
}

/// Packet 0xFF.
#[derive(Debug, Clone, PartialEq)]
pub struct DisconnectPacket {
    /// The reason for the kick or disconnection.
    pub reason: String,
}


impl Packet {

    /// Read one framed packet, an opcode byte then the body, arriving in the
    /// given direction.
    pub fn read(read: &mut impl Read, dir: Direction) -> Result<Self, ProtoError> {
        let opcode = read.read_u8()?;
        Self::read_body(read, dir, opcode)
    }

    fn read_body(r: &mut impl Read, dir: Direction, opcode: u8) -> Result<Self, ProtoError> {
        Ok(match opcode {
            0x00 => Packet::KeepAlive(KeepAlivePacket {
                id: r.read_java_int()?,
            }),
            0x01 => Packet::LoginRequest(LoginRequestPacket {
                entity_id: r.read_java_int()?,
                level_type: r.read_java_string16()?,
                game_mode: r.read_java_byte()?,
                dimension: r.read_java_byte()?,
                difficulty: r.read_java_byte()?,
                unused: r.read_java_byte()?,
                max_players: r.read_java_byte()?,
            }),
            0x02 => Packet::Handshake(HandshakePacket {
                version: r.read_u8()?,
                username: r.read_java_string16()?,
                hostname: r.read_java_string16()?,
                port: r.read_java_int()?,
            }),
            0x03 => Packet::ChatMessage(ChatMessagePacket {
                message: r.read_java_string16()?,
            }),
            0x04 => Packet::TimeUpdate(TimeUpdatePacket {
                world_age: r.read_java_long()?,
                time_of_day: r.read_java_long()?,
            }),
            0x05 => Packet::EntityEquipment(EntityEquipmentPacket {
                entity_id: r.read_java_int()?,
                slot: r.read_java_short()?,
                item: read_slot(r)?,
            }),
            0x06 => Packet::SpawnPosition(SpawnPositionPacket {
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
            }),
            0x07 => Packet::UseEntity(UseEntityPacket {
                user_id: r.read_java_int()?,
                target_id: r.read_java_int()?,
                left_click: r.read_java_boolean()?,
            }),
            0x08 => Packet::UpdateHealth(UpdateHealthPacket {
                health: r.read_java_float()?,
                food: r.read_java_short()?,
                saturation: r.read_java_float()?,
            }),
            0x09 => Packet::Respawn(RespawnPacket {
                dimension: r.read_java_int()?,
                difficulty: r.read_java_byte()?,
                game_mode: r.read_java_byte()?,
                world_height: r.read_java_short()?,
                level_type: r.read_java_string16()?,
            }),
            0x0A => Packet::Player(PlayerPacket {
                on_ground: r.read_java_boolean()?,
            }),
            0x0B => Packet::PlayerPosition(PlayerPositionPacket {
                x: r.read_java_double()?,
                y: r.read_java_double()?,
                stance: r.read_java_double()?,
                z: r.read_java_double()?,
                on_ground: r.read_java_boolean()?,
            }),
            0x0C => Packet::PlayerLook(PlayerLookPacket {
                yaw: r.read_java_float()?,
                pitch: r.read_java_float()?,
                on_ground: r.read_java_boolean()?,
            }),
            0x0D => match dir {
                Direction::Serverbound => {
                    Packet::PlayerPositionLookServer(PlayerPositionLookServerPacket {
                        x: r.read_java_double()?,
                        y: r.read_java_double()?,
                        stance: r.read_java_double()?,
                        z: r.read_java_double()?,
                        yaw: r.read_java_float()?,
                        pitch: r.read_java_float()?,
                        on_ground: r.read_java_boolean()?,
                    })
                }
                Direction::Clientbound => {
                    Packet::PlayerPositionLookClient(PlayerPositionLookClientPacket {
                        x: r.read_java_double()?,
                        stance: r.read_java_double()?,
                        y: r.read_java_double()?,
                        z: r.read_java_double()?,
                        yaw: r.read_java_float()?,
                        pitch: r.read_java_float()?,
                        on_ground: r.read_java_boolean()?,
                    })
                }
            },
            0x0E => Packet::PlayerDigging(PlayerDiggingPacket {
                status: r.read_java_byte()?,
                x: r.read_java_int()?,
                y: r.read_java_byte()?,
                z: r.read_java_int()?,
                face: r.read_java_byte()?,
            }),
            0x0F => Packet::PlayerBlockPlacement(PlayerBlockPlacementPacket {
                x: r.read_java_int()?,
                y: r.read_u8()?,
                z: r.read_java_int()?,
                direction: r.read_java_byte()?,
                held_item: read_slot(r)?,
                cursor_x: r.read_java_byte()?,
                cursor_y: r.read_java_byte()?,
                cursor_z: r.read_java_byte()?,
            }),
            0x10 => Packet::HeldItemChange(HeldItemChangePacket {
                slot_id: r.read_java_short()?,
            }),
            0x11 => Packet::UseBed(UseBedPacket {
                entity_id: r.read_java_int()?,
                unknown: r.read_java_byte()?,
                x: r.read_java_int()?,
                y: r.read_java_byte()?,
                z: r.read_java_int()?,
            }),
            0x12 => Packet::Animation(AnimationPacket {
                entity_id: r.read_java_int()?,
                animation: r.read_java_byte()?,
            }),
            0x13 => Packet::EntityAction(EntityActionPacket {
                entity_id: r.read_java_int()?,
                action_id: r.read_java_byte()?,
            }),
            0x14 => Packet::SpawnNamedEntity(SpawnNamedEntityPacket {
                entity_id: r.read_java_int()?,
                player_name: r.read_java_string16()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                yaw: r.read_java_byte()?,
                pitch: r.read_java_byte()?,
                current_item: r.read_java_short()?,
                metadata: read_metadata_list(r)?,
            }),
            0x15 => Packet::SpawnDroppedItem(SpawnDroppedItemPacket {
                entity_id: r.read_java_int()?,
                item: read_slot(r)?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                rotation: r.read_java_byte()?,
                pitch: r.read_java_byte()?,
                roll: r.read_java_byte()?,
            }),
            0x16 => Packet::CollectItem(CollectItemPacket {
                collected_id: r.read_java_int()?,
                collector_id: r.read_java_int()?,
            }),
            0x17 => {
                let mut packet = SpawnObjectPacket {
                    entity_id: r.read_java_int()?,
                    kind: r.read_java_byte()?,
                    x: r.read_java_int()?,
                    y: r.read_java_int()?,
                    z: r.read_java_int()?,
                    pitch: r.read_java_byte()?,
                    yaw: r.read_java_byte()?,
                    flag: r.read_java_int()?,
                    ..Default::default()
                };
                match packet.kind {
                    object::ITEM_FRAME => packet.orientation = r.read_java_int()?,
                    object::FALLING_OBJECT => packet.block_type = r.read_java_int()?,
                    kind if object::is_projectile(kind) => packet.owner_id = r.read_java_int()?,
                    _ => {}
                }
                if packet.flag != 0 {
                    packet.vx = r.read_java_short()?;
                    packet.vy = r.read_java_short()?;
                    packet.vz = r.read_java_short()?;
                }
                Packet::SpawnObject(packet)
            }
            0x18 => Packet::SpawnMob(SpawnMobPacket {
                entity_id: r.read_java_int()?,
                kind: r.read_java_byte()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                yaw: r.read_java_byte()?,
                pitch: r.read_java_byte()?,
                head_yaw: r.read_java_byte()?,
                vz: r.read_java_short()?,
                vx: r.read_java_short()?,
                vy: r.read_java_short()?,
                metadata: read_metadata_list(r)?,
            }),
            0x19 => Packet::SpawnPainting(SpawnPaintingPacket {
                entity_id: r.read_java_int()?,
                title: r.read_java_string16()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                direction: r.read_java_int()?,
            }),
            0x1A => Packet::SpawnExperienceOrb(SpawnExperienceOrbPacket {
                entity_id: r.read_java_int()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                count: r.read_java_short()?,
            }),
            0x1C => Packet::EntityVelocity(EntityVelocityPacket {
                entity_id: r.read_java_int()?,
                vx: r.read_java_short()?,
                vy: r.read_java_short()?,
                vz: r.read_java_short()?,
            }),
            0x1D => {
                let count = r.read_u8()?;
                let mut entity_ids = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    entity_ids.push(r.read_java_int()?);
                }
                Packet::DestroyEntity(DestroyEntityPacket { entity_ids })
            }
            0x1E => Packet::CreateEntity(CreateEntityPacket {
                entity_id: r.read_java_int()?,
            }),
            0x1F => Packet::EntityRelativeMove(EntityRelativeMovePacket {
                entity_id: r.read_java_int()?,
                dx: r.read_java_byte()?,
                dy: r.read_java_byte()?,
                dz: r.read_java_byte()?,
            }),
            0x20 => Packet::EntityLook(EntityLookPacket {
                entity_id: r.read_java_int()?,
                yaw: r.read_java_byte()?,
                pitch: r.read_java_byte()?,
            }),
            0x21 => Packet::EntityLookRelativeMove(EntityLookRelativeMovePacket {
                entity_id: r.read_java_int()?,
                dx: r.read_java_byte()?,
                dy: r.read_java_byte()?,
                dz: r.read_java_byte()?,
                yaw: r.read_java_byte()?,
                pitch: r.read_java_byte()?,
            }),
            0x22 => Packet::EntityTeleport(EntityTeleportPacket {
                entity_id: r.read_java_int()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                yaw: r.read_java_byte()?,
                pitch: r.read_java_byte()?,
            }),
            0x23 => Packet::EntityHeadLook(EntityHeadLookPacket {
                entity_id: r.read_java_int()?,
                head_yaw: r.read_java_byte()?,
            }),
            0x26 => Packet::EntityStatus(EntityStatusPacket {
                entity_id: r.read_java_int()?,
                status: r.read_java_byte()?,
            }),
            0x27 => Packet::AttachEntity(AttachEntityPacket {
                entity_id: r.read_java_int()?,
                vehicle_id: r.read_java_int()?,
            }),
            0x28 => Packet::SetEntityMetadata(SetEntityMetadataPacket {
                entity_id: r.read_java_int()?,
                metadata: read_metadata_list(r)?,
            }),
            0x29 => Packet::EntityEffect(EntityEffectPacket {
                entity_id: r.read_java_int()?,
                effect_id: r.read_java_byte()?,
                amplifier: r.read_java_byte()?,
                duration: r.read_java_short()?,
            }),
            0x2A => Packet::RemoveEntityEffect(RemoveEntityEffectPacket {
                entity_id: r.read_java_int()?,
                effect_id: r.read_java_byte()?,
            }),
            0x2B => Packet::SetExperience(SetExperiencePacket {
                progress: r.read_java_float()?,
                level: r.read_java_short()?,
                total: r.read_java_short()?,
            }),
            0x2C => {
                let entity_id = r.read_java_int()?;
                let count = r.read_java_int()?;
                if count < 0 {
                    return Err(malformed("negative entity property count"));
                }
                let mut properties = Vec::with_capacity(count.min(64) as usize);
                for _ in 0..count {
                    let key = r.read_java_string16()?;
                    let value = r.read_java_double()?;
                    let attr_count = r.read_java_short()?;
                    if attr_count < 0 {
                        return Err(malformed("negative attribute modifier count"));
                    }
                    let mut modifiers = Vec::with_capacity(attr_count as usize);
                    for _ in 0..attr_count {
                        modifiers.push(AttributeModifier {
                            uuid_high: r.read_java_long()?,
                            uuid_low: r.read_java_long()?,
                            amount: r.read_java_double()?,
                            operation: r.read_java_byte()?,
                        });
                    }
                    properties.push(EntityProperty { key, value, modifiers });
                }
                Packet::EntityProperties(EntityPropertiesPacket { entity_id, properties })
            }
            0x33 => Packet::ChunkData(ChunkDataPacket {
                x: r.read_java_int()?,
                z: r.read_java_int()?,
                ground_up: r.read_java_boolean()?,
                primary_bitmap: r.read_u16::<BE>()?,
                add_bitmap: r.read_u16::<BE>()?,
                compressed_data: read_int_bytes(r)?,
            }),
            0x34 => {
                let cx = r.read_java_int()?;
                let cz = r.read_java_int()?;
                let count = r.read_java_short()?;
                if count < 0 {
                    return Err(malformed("negative block change record count"));
                }
                let size = r.read_java_int()?;
                if size != count as i32 * 4 {
                    return Err(malformed("block change record size mismatch"));
                }
                let mut records = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    records.push(r.read_java_int()?);
                }
                Packet::MultiBlockChange(MultiBlockChangePacket { cx, cz, records })
            }
            0x35 => Packet::BlockChange(BlockChangePacket {
                x: r.read_java_int()?,
                y: r.read_java_byte()?,
                z: r.read_java_int()?,
                block_type: r.read_java_short()?,
                metadata: r.read_java_byte()?,
            }),
            0x36 => Packet::BlockAction(BlockActionPacket {
                x: r.read_java_int()?,
                y: r.read_java_short()?,
                z: r.read_java_int()?,
                instrument_type: r.read_java_byte()?,
                instrument_pitch: r.read_java_byte()?,
                block_id: r.read_java_short()?,
            }),
            0x37 => Packet::BlockBreakAnimation(BlockBreakAnimationPacket {
                entity_id: r.read_java_int()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                stage: r.read_java_byte()?,
            }),
            0x38 => {
                let count = r.read_java_short()?;
                if count < 0 {
                    return Err(malformed("negative chunk column count"));
                }
                let size = r.read_java_int()?;
                if size < 0 {
                    return Err(malformed("negative chunk payload size"));
                }
                let sky_light = r.read_java_boolean()?;
                let mut compressed_data = vec![0; size as usize];
                r.read_exact(&mut compressed_data)?;
                let mut metadata = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    metadata.push(ColumnMetadata {
                        cx: r.read_java_int()?,
                        cz: r.read_java_int()?,
                        primary_bitmap: r.read_u16::<BE>()?,
                        add_bitmap: r.read_u16::<BE>()?,
                    });
                }
                Packet::MapChunkBulk(MapChunkBulkPacket { sky_light, compressed_data, metadata })
            }
            0x3C => {
                let x = r.read_java_double()?;
                let y = r.read_java_double()?;
                let z = r.read_java_double()?;
                let radius = r.read_java_float()?;
                let count = r.read_java_int()?;
                if count < 0 {
                    return Err(malformed("negative explosion record count"));
                }
                let mut blocks = Vec::with_capacity(count.min(1024) as usize);
                for _ in 0..count {
                    blocks.push((r.read_java_byte()?, r.read_java_byte()?, r.read_java_byte()?));
                }
                Packet::Explosion(ExplosionPacket {
                    x, y, z, radius, blocks,
                    push_x: r.read_java_float()?,
                    push_y: r.read_java_float()?,
                    push_z: r.read_java_float()?,
                })
            }
            0x3D => Packet::Effect(EffectPacket {
                effect_id: r.read_java_int()?,
                x: r.read_java_int()?,
                y: r.read_java_byte()?,
                z: r.read_java_int()?,
                data: r.read_java_int()?,
                no_volume_decrease: r.read_java_boolean()?,
            }),
            0x3E => Packet::NamedSoundEffect(NamedSoundEffectPacket {
                name: r.read_java_string16()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
                volume: r.read_java_float()?,
                pitch: r.read_java_byte()?,
            }),
            0x46 => Packet::ChangeGameState(ChangeGameStatePacket {
                state: r.read_java_byte()?,
                game_mode: r.read_java_byte()?,
            }),
            0x47 => Packet::GlobalEntity(GlobalEntityPacket {
                entity_id: r.read_java_int()?,
                kind: r.read_java_byte()?,
                x: r.read_java_int()?,
                y: r.read_java_int()?,
                z: r.read_java_int()?,
            }),
            0x64 => Packet::OpenWindow(OpenWindowPacket {
                window_id: r.read_java_byte()?,
                inventory_type: r.read_java_byte()?,
                title: r.read_java_string16()?,
                slot_count: r.read_java_byte()?,
            }),
            0x65 => Packet::CloseWindow(CloseWindowPacket {
                window_id: r.read_java_byte()?,
            }),
            0x66 => Packet::ClickWindow(ClickWindowPacket {
                window_id: r.read_java_byte()?,
                slot: r.read_java_short()?,
                mouse_button: r.read_java_byte()?,
                action_number: r.read_java_short()?,
                shift: r.read_java_boolean()?,
                clicked_item: read_slot(r)?,
            }),
            0x67 => Packet::SetSlot(SetSlotPacket {
                window_id: r.read_java_byte()?,
                slot: r.read_java_short()?,
                data: read_slot(r)?,
            }),
            0x68 => Packet::SetWindowItems(SetWindowItemsPacket {
                window_id: r.read_java_byte()?,
                slots: read_slot_slice(r)?,
            }),
            0x69 => Packet::UpdateWindowProperty(UpdateWindowPropertyPacket {
                window_id: r.read_java_byte()?,
                property: r.read_java_short()?,
                value: r.read_java_short()?,
            }),
            0x6A => Packet::ConfirmTransaction(ConfirmTransactionPacket {
                window_id: r.read_java_byte()?,
                action_number: r.read_java_short()?,
                accepted: r.read_java_boolean()?,
            }),
            0x6B => Packet::CreativeInventoryAction(CreativeInventoryActionPacket {
                slot: r.read_java_short()?,
                clicked_item: read_slot(r)?,
            }),
            0x6C => Packet::EnchantItem(EnchantItemPacket {
                window_id: r.read_java_byte()?,
                enchantment: r.read_java_byte()?,
            }),
            0x82 => Packet::UpdateSign(UpdateSignPacket {
                x: r.read_java_int()?,
                y: r.read_java_short()?,
                z: r.read_java_int()?,
                lines: Box::new([
                    r.read_java_string16()?,
                    r.read_java_string16()?,
                    r.read_java_string16()?,
                    r.read_java_string16()?,
                ]),
            }),
            0x83 => {
                let item_type = r.read_java_short()?;
                let item_id = r.read_java_short()?;
                let len = r.read_u8()?;
                let mut data = vec![0; len as usize];
                r.read_exact(&mut data)?;
                Packet::ItemData(ItemDataPacket { item_type, item_id, data })
            }
            0x84 => Packet::UpdateTileEntity(UpdateTileEntityPacket {
                x: r.read_java_int()?,
                y: r.read_java_short()?,
                z: r.read_java_int()?,
                action: r.read_java_byte()?,
                nbt: read_short_bytes(r)?,
            }),
            0xC8 => Packet::IncrementStatistic(IncrementStatisticPacket {
                statistic_id: r.read_java_int()?,
                amount: r.read_java_byte()?,
            }),
            0xC9 => Packet::PlayerListItem(PlayerListItemPacket {
                name: r.read_java_string16()?,
                online: r.read_java_boolean()?,
                ping: r.read_java_short()?,
            }),
            0xCA => Packet::PlayerAbilities(PlayerAbilitiesPacket {
                flags: r.read_java_byte()?,
                flying_speed: r.read_java_byte()?,
                walking_speed: r.read_java_byte()?,
            }),
            0xCB => Packet::TabComplete(TabCompletePacket {
                text: r.read_java_string16()?,
            }),
            0xCC => Packet::ClientSettings(ClientSettingsPacket {
                locale: r.read_java_string16()?,
                view_distance: r.read_java_byte()?,
                chat_flags: r.read_java_byte()?,
                difficulty: r.read_java_byte()?,
                show_cape: r.read_java_boolean()?,
            }),
            0xCD => Packet::ClientStatus(ClientStatusPacket {
                payload: r.read_java_byte()?,
            }),
            0xCE => Packet::ScoreboardObjective(ScoreboardObjectivePacket {
                name: r.read_java_string16()?,
                display_name: r.read_java_string16()?,
                action: r.read_java_byte()?,
            }),
            0xCF => {
                let mut packet = UpdateScorePacket {
                    item_name: r.read_java_string16()?,
                    action: r.read_java_byte()?,
                    ..Default::default()
                };
                if packet.action != 1 {
                    packet.score_name = r.read_java_string16()?;
                    packet.value = r.read_java_int()?;
                }
                Packet::UpdateScore(packet)
            }
            0xD0 => Packet::DisplayScoreboard(DisplayScoreboardPacket {
                position: r.read_java_byte()?,
                score_name: r.read_java_string16()?,
            }),
            0xD1 => {
                let mut packet = TeamsPacket {
                    name: r.read_java_string16()?,
                    mode: r.read_java_byte()?,
                    ..Default::default()
                };
                if packet.mode == 0 || packet.mode == 2 {
                    packet.display_name = r.read_java_string16()?;
                    packet.prefix = r.read_java_string16()?;
                    packet.suffix = r.read_java_string16()?;
                    packet.friendly_fire = r.read_java_byte()?;
                }
                if packet.mode == 0 || packet.mode == 3 || packet.mode == 4 {
                    packet.players = read_string_slice(r)?;
                }
                Packet::Teams(packet)
            }
            0xFA => Packet::PluginMessage(PluginMessagePacket {
                channel: r.read_java_string16()?,
                data: read_short_bytes(r)?,
            }),
            0xFC => Packet::EncryptionKeyResponse(EncryptionKeyResponsePacket {
                shared_secret: read_short_bytes(r)?,
                verify_token: read_short_bytes(r)?,
            }),
            0xFD => Packet::EncryptionKeyRequest(EncryptionKeyRequestPacket {
                server_id: r.read_java_string16()?,
                public_key: read_short_bytes(r)?,
                verify_token: read_short_bytes(r)?,
            }),
            0xFE => Packet::ServerListPing(ServerListPingPacket {
                magic: r.read_java_byte()?,
            }),
            0xFF => Packet::Disconnect(DisconnectPacket {
                reason: r.read_java_string16()?,
            }),
            _ => return Err(ProtoError::UnknownOpcode(opcode)),
        })
    }

    /// The opcode this packet is written with when traveling in the given
    /// direction.
    pub fn opcode(&self, dir: Direction) -> Result<u8, ProtoError> {
        Ok(match self {
            Packet::KeepAlive(_) => 0x00,
            Packet::LoginRequest(_) => 0x01,
            Packet::Handshake(_) => 0x02,
            Packet::ChatMessage(_) => 0x03,
            Packet::TimeUpdate(_) => 0x04,
            Packet::EntityEquipment(_) => 0x05,
            Packet::SpawnPosition(_) => 0x06,
            Packet::UseEntity(_) => 0x07,
            Packet::UpdateHealth(_) => 0x08,
            Packet::Respawn(_) => 0x09,
            Packet::Player(_) => 0x0A,
            Packet::PlayerPosition(_) => 0x0B,
            Packet::PlayerLook(_) => 0x0C,
            Packet::PlayerPositionLookServer(_) if dir == Direction::Serverbound => 0x0D,
            Packet::PlayerPositionLookClient(_) if dir == Direction::Clientbound => 0x0D,
            Packet::PlayerPositionLookServer(_) | Packet::PlayerPositionLookClient(_) => {
                return Err(ProtoError::UnregisteredType(dir));
            }
            Packet::PlayerDigging(_) => 0x0E,
            Packet::PlayerBlockPlacement(_) => 0x0F,
            Packet::HeldItemChange(_) => 0x10,
            Packet::UseBed(_) => 0x11,
            Packet::Animation(_) => 0x12,
            Packet::EntityAction(_) => 0x13,
            Packet::SpawnNamedEntity(_) => 0x14,
            Packet::SpawnDroppedItem(_) => 0x15,
            Packet::CollectItem(_) => 0x16,
            Packet::SpawnObject(_) => 0x17,
            Packet::SpawnMob(_) => 0x18,
            Packet::SpawnPainting(_) => 0x19,
            Packet::SpawnExperienceOrb(_) => 0x1A,
            Packet::EntityVelocity(_) => 0x1C,
            Packet::DestroyEntity(_) => 0x1D,
            Packet::CreateEntity(_) => 0x1E,
            Packet::EntityRelativeMove(_) => 0x1F,
            Packet::EntityLook(_) => 0x20,
            Packet::EntityLookRelativeMove(_) => 0x21,
            Packet::EntityTeleport(_) => 0x22,
            Packet::EntityHeadLook(_) => 0x23,
            Packet::EntityStatus(_) => 0x26,
            Packet::AttachEntity(_) => 0x27,
            Packet::SetEntityMetadata(_) => 0x28,
            Packet::EntityEffect(_) => 0x29,
            Packet::RemoveEntityEffect(_) => 0x2A,
            Packet::SetExperience(_) => 0x2B,
            Packet::EntityProperties(_) => 0x2C,
            Packet::ChunkData(_) => 0x33,
            Packet::MultiBlockChange(_) => 0x34,
            Packet::BlockChange(_) => 0x35,
            Packet::BlockAction(_) => 0x36,
            Packet::BlockBreakAnimation(_) => 0x37,
            Packet::MapChunkBulk(_) => 0x38,
            Packet::Explosion(_) => 0x3C,
            Packet::Effect(_) => 0x3D,
            Packet::NamedSoundEffect(_) => 0x3E,
            Packet::ChangeGameState(_) => 0x46,
            Packet::GlobalEntity(_) => 0x47,
            Packet::OpenWindow(_) => 0x64,
            Packet::CloseWindow(_) => 0x65,
            Packet::ClickWindow(_) => 0x66,
            Packet::SetSlot(_) => 0x67,
            Packet::SetWindowItems(_) => 0x68,
            Packet::UpdateWindowProperty(_) => 0x69,
            Packet::ConfirmTransaction(_) => 0x6A,
            Packet::CreativeInventoryAction(_) => 0x6B,
            Packet::EnchantItem(_) => 0x6C,
            Packet::UpdateSign(_) => 0x82,
            Packet::ItemData(_) => 0x83,
            Packet::UpdateTileEntity(_) => 0x84,
            Packet::IncrementStatistic(_) => 0xC8,
            Packet::PlayerListItem(_) => 0xC9,
            Packet::PlayerAbilities(_) => 0xCA,
            Packet::TabComplete(_) => 0xCB,
            Packet::ClientSettings(_) => 0xCC,
            Packet::ClientStatus(_) => 0xCD,
            Packet::ScoreboardObjective(_) => 0xCE,
            Packet::UpdateScore(_) => 0xCF,
            Packet::DisplayScoreboard(_) => 0xD0,
            Packet::Teams(_) => 0xD1,
            Packet::PluginMessage(_) => 0xFA,
            Packet::EncryptionKeyResponse(_) => 0xFC,
            Packet::EncryptionKeyRequest(_) => 0xFD,
            Packet::ServerListPing(_) => 0xFE,
            Packet::Disconnect(_) => 0xFF,
        })
    }

    /// Write one framed packet, an opcode byte then the body, traveling in
    /// the given direction.
    pub fn write(&self, write: &mut impl Write, dir: Direction) -> Result<(), ProtoError> {
        write.write_u8(self.opcode(dir)?)?;
        self.write_body(write)
    }

    fn write_body(&self, w: &mut impl Write) -> Result<(), ProtoError> {
        match self {
            Packet::KeepAlive(p) => {
                w.write_java_int(p.id)?;
            }
            Packet::LoginRequest(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_string16(&p.level_type)?;
                w.write_java_byte(p.game_mode)?;
                w.write_java_byte(p.dimension)?;
                w.write_java_byte(p.difficulty)?;
                w.write_java_byte(p.unused)?;
                w.write_java_byte(p.max_players)?;
            }
            Packet::Handshake(p) => {
                w.write_u8(p.version)?;
                w.write_java_string16(&p.username)?;
                w.write_java_string16(&p.hostname)?;
                w.write_java_int(p.port)?;
            }
            Packet::ChatMessage(p) => {
                w.write_java_string16(&p.message)?;
            }
            Packet::TimeUpdate(p) => {
                w.write_java_long(p.world_age)?;
                w.write_java_long(p.time_of_day)?;
            }
            Packet::EntityEquipment(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_short(p.slot)?;
                write_slot(w, &p.item)?;
            }
            Packet::SpawnPosition(p) => {
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
            }
            Packet::UseEntity(p) => {
                w.write_java_int(p.user_id)?;
                w.write_java_int(p.target_id)?;
                w.write_java_boolean(p.left_click)?;
            }
            Packet::UpdateHealth(p) => {
                w.write_java_float(p.health)?;
                w.write_java_short(p.food)?;
                w.write_java_float(p.saturation)?;
            }
            Packet::Respawn(p) => {
                w.write_java_int(p.dimension)?;
                w.write_java_byte(p.difficulty)?;
                w.write_java_byte(p.game_mode)?;
                w.write_java_short(p.world_height)?;
                w.write_java_string16(&p.level_type)?;
            }
            Packet::Player(p) => {
                w.write_java_boolean(p.on_ground)?;
            }
            Packet::PlayerPosition(p) => {
                w.write_java_double(p.x)?;
                w.write_java_double(p.y)?;
                w.write_java_double(p.stance)?;
                w.write_java_double(p.z)?;
                w.write_java_boolean(p.on_ground)?;
            }
            Packet::PlayerLook(p) => {
                w.write_java_float(p.yaw)?;
                w.write_java_float(p.pitch)?;
                w.write_java_boolean(p.on_ground)?;
            }
            Packet::PlayerPositionLookServer(p) => {
                w.write_java_double(p.x)?;
                w.write_java_double(p.y)?;
                w.write_java_double(p.stance)?;
                w.write_java_double(p.z)?;
                w.write_java_float(p.yaw)?;
                w.write_java_float(p.pitch)?;
                w.write_java_boolean(p.on_ground)?;
            }
            Packet::PlayerPositionLookClient(p) => {
                w.write_java_double(p.x)?;
                w.write_java_double(p.stance)?;
                w.write_java_double(p.y)?;
                w.write_java_double(p.z)?;
                w.write_java_float(p.yaw)?;
                w.write_java_float(p.pitch)?;
                w.write_java_boolean(p.on_ground)?;
            }
            Packet::PlayerDigging(p) => {
                w.write_java_byte(p.status)?;
                w.write_java_int(p.x)?;
                w.write_java_byte(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.face)?;
            }
            Packet::PlayerBlockPlacement(p) => {
                w.write_java_int(p.x)?;
                w.write_u8(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.direction)?;
                write_slot(w, &p.held_item)?;
                w.write_java_byte(p.cursor_x)?;
                w.write_java_byte(p.cursor_y)?;
                w.write_java_byte(p.cursor_z)?;
            }
            Packet::HeldItemChange(p) => {
                w.write_java_short(p.slot_id)?;
            }
            Packet::UseBed(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.unknown)?;
                w.write_java_int(p.x)?;
                w.write_java_byte(p.y)?;
                w.write_java_int(p.z)?;
            }
            Packet::Animation(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.animation)?;
            }
            Packet::EntityAction(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.action_id)?;
            }
            Packet::SpawnNamedEntity(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_string16(&p.player_name)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.yaw)?;
                w.write_java_byte(p.pitch)?;
                w.write_java_short(p.current_item)?;
                write_metadata_list(w, &p.metadata)?;
            }
            Packet::SpawnDroppedItem(p) => {
                w.write_java_int(p.entity_id)?;
                write_slot(w, &p.item)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.rotation)?;
                w.write_java_byte(p.pitch)?;
                w.write_java_byte(p.roll)?;
            }
            Packet::CollectItem(p) => {
                w.write_java_int(p.collected_id)?;
                w.write_java_int(p.collector_id)?;
            }
            Packet::SpawnObject(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.kind)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.pitch)?;
                w.write_java_byte(p.yaw)?;
                w.write_java_int(p.flag)?;
                match p.kind {
                    object::ITEM_FRAME => w.write_java_int(p.orientation)?,
                    object::FALLING_OBJECT => w.write_java_int(p.block_type)?,
                    kind if object::is_projectile(kind) => w.write_java_int(p.owner_id)?,
                    _ => {}
                }
                if p.flag != 0 {
                    w.write_java_short(p.vx)?;
                    w.write_java_short(p.vy)?;
                    w.write_java_short(p.vz)?;
                }
            }
            Packet::SpawnMob(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.kind)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.yaw)?;
                w.write_java_byte(p.pitch)?;
                w.write_java_byte(p.head_yaw)?;
                w.write_java_short(p.vz)?;
                w.write_java_short(p.vx)?;
                w.write_java_short(p.vy)?;
                write_metadata_list(w, &p.metadata)?;
            }
            Packet::SpawnPainting(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_string16(&p.title)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_int(p.direction)?;
            }
            Packet::SpawnExperienceOrb(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_short(p.count)?;
            }
            Packet::EntityVelocity(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_short(p.vx)?;
                w.write_java_short(p.vy)?;
                w.write_java_short(p.vz)?;
            }
            Packet::DestroyEntity(p) => {
                let count = u8::try_from(p.entity_ids.len())
                    .map_err(|_| malformed("too many entity ids"))?;
                w.write_u8(count)?;
                for &id in &p.entity_ids {
                    w.write_java_int(id)?;
                }
            }
            Packet::CreateEntity(p) => {
                w.write_java_int(p.entity_id)?;
            }
            Packet::EntityRelativeMove(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.dx)?;
                w.write_java_byte(p.dy)?;
                w.write_java_byte(p.dz)?;
            }
            Packet::EntityLook(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.yaw)?;
                w.write_java_byte(p.pitch)?;
            }
            Packet::EntityLookRelativeMove(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.dx)?;
                w.write_java_byte(p.dy)?;
                w.write_java_byte(p.dz)?;
                w.write_java_byte(p.yaw)?;
                w.write_java_byte(p.pitch)?;
            }
            Packet::EntityTeleport(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.yaw)?;
                w.write_java_byte(p.pitch)?;
            }
            Packet::EntityHeadLook(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.head_yaw)?;
            }
            Packet::EntityStatus(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.status)?;
            }
            Packet::AttachEntity(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_int(p.vehicle_id)?;
            }
            Packet::SetEntityMetadata(p) => {
                w.write_java_int(p.entity_id)?;
                write_metadata_list(w, &p.metadata)?;
            }
            Packet::EntityEffect(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.effect_id)?;
                w.write_java_byte(p.amplifier)?;
                w.write_java_short(p.duration)?;
            }
            Packet::RemoveEntityEffect(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.effect_id)?;
            }
            Packet::SetExperience(p) => {
                w.write_java_float(p.progress)?;
                w.write_java_short(p.level)?;
                w.write_java_short(p.total)?;
            }
            Packet::EntityProperties(p) => {
                w.write_java_int(p.entity_id)?;
                let count = i32::try_from(p.properties.len())
                    .map_err(|_| malformed("too many entity properties"))?;
                w.write_java_int(count)?;
                for property in &p.properties {
                    w.write_java_string16(&property.key)?;
                    w.write_java_double(property.value)?;
                    let attr_count = i16::try_from(property.modifiers.len())
                        .map_err(|_| malformed("too many attribute modifiers"))?;
                    w.write_java_short(attr_count)?;
                    for modifier in &property.modifiers {
                        w.write_java_long(modifier.uuid_high)?;
                        w.write_java_long(modifier.uuid_low)?;
                        w.write_java_double(modifier.amount)?;
                        w.write_java_byte(modifier.operation)?;
                    }
                }
            }
            Packet::ChunkData(p) => {
                w.write_java_int(p.x)?;
                w.write_java_int(p.z)?;
                w.write_java_boolean(p.ground_up)?;
                w.write_u16::<BE>(p.primary_bitmap)?;
                w.write_u16::<BE>(p.add_bitmap)?;
                write_int_bytes(w, &p.compressed_data)?;
            }
            Packet::MultiBlockChange(p) => {
                w.write_java_int(p.cx)?;
                w.write_java_int(p.cz)?;
                let count = i16::try_from(p.records.len())
                    .map_err(|_| malformed("too many block change records"))?;
                w.write_java_short(count)?;
                w.write_java_int(count as i32 * 4)?;
                for &record in &p.records {
                    w.write_java_int(record)?;
                }
            }
            Packet::BlockChange(p) => {
                w.write_java_int(p.x)?;
                w.write_java_byte(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_short(p.block_type)?;
                w.write_java_byte(p.metadata)?;
            }
            Packet::BlockAction(p) => {
                w.write_java_int(p.x)?;
                w.write_java_short(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.instrument_type)?;
                w.write_java_byte(p.instrument_pitch)?;
                w.write_java_short(p.block_id)?;
            }
            Packet::BlockBreakAnimation(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.stage)?;
            }
            Packet::MapChunkBulk(p) => {
                let count = i16::try_from(p.metadata.len())
                    .map_err(|_| malformed("too many chunk columns"))?;
                let size = i32::try_from(p.compressed_data.len())
                    .map_err(|_| malformed("chunk payload too big"))?;
                w.write_java_short(count)?;
                w.write_java_int(size)?;
                w.write_java_boolean(p.sky_light)?;
                w.write_all(&p.compressed_data)?;
                for meta in &p.metadata {
                    w.write_java_int(meta.cx)?;
                    w.write_java_int(meta.cz)?;
                    w.write_u16::<BE>(meta.primary_bitmap)?;
                    w.write_u16::<BE>(meta.add_bitmap)?;
                }
            }
            Packet::Explosion(p) => {
                w.write_java_double(p.x)?;
                w.write_java_double(p.y)?;
                w.write_java_double(p.z)?;
                w.write_java_float(p.radius)?;
                let count = i32::try_from(p.blocks.len())
                    .map_err(|_| malformed("too many explosion records"))?;
                w.write_java_int(count)?;
                for &(dx, dy, dz) in &p.blocks {
                    w.write_java_byte(dx)?;
                    w.write_java_byte(dy)?;
                    w.write_java_byte(dz)?;
                }
                w.write_java_float(p.push_x)?;
                w.write_java_float(p.push_y)?;
                w.write_java_float(p.push_z)?;
            }
            Packet::Effect(p) => {
                w.write_java_int(p.effect_id)?;
                w.write_java_int(p.x)?;
                w.write_java_byte(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_int(p.data)?;
                w.write_java_boolean(p.no_volume_decrease)?;
            }
            Packet::NamedSoundEffect(p) => {
                w.write_java_string16(&p.name)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_float(p.volume)?;
                w.write_java_byte(p.pitch)?;
            }
            Packet::ChangeGameState(p) => {
                w.write_java_byte(p.state)?;
                w.write_java_byte(p.game_mode)?;
            }
            Packet::GlobalEntity(p) => {
                w.write_java_int(p.entity_id)?;
                w.write_java_byte(p.kind)?;
                w.write_java_int(p.x)?;
                w.write_java_int(p.y)?;
                w.write_java_int(p.z)?;
            }
            Packet::OpenWindow(p) => {
                w.write_java_byte(p.window_id)?;
                w.write_java_byte(p.inventory_type)?;
                w.write_java_string16(&p.title)?;
                w.write_java_byte(p.slot_count)?;
            }
            Packet::CloseWindow(p) => {
                w.write_java_byte(p.window_id)?;
            }
            Packet::ClickWindow(p) => {
                w.write_java_byte(p.window_id)?;
                w.write_java_short(p.slot)?;
                w.write_java_byte(p.mouse_button)?;
                w.write_java_short(p.action_number)?;
                w.write_java_boolean(p.shift)?;
                write_slot(w, &p.clicked_item)?;
            }
            Packet::SetSlot(p) => {
                w.write_java_byte(p.window_id)?;
                w.write_java_short(p.slot)?;
                write_slot(w, &p.data)?;
            }
            Packet::SetWindowItems(p) => {
                w.write_java_byte(p.window_id)?;
                write_slot_slice(w, &p.slots)?;
            }
            Packet::UpdateWindowProperty(p) => {
                w.write_java_byte(p.window_id)?;
                w.write_java_short(p.property)?;
                w.write_java_short(p.value)?;
            }
            Packet::ConfirmTransaction(p) => {
                w.write_java_byte(p.window_id)?;
                w.write_java_short(p.action_number)?;
                w.write_java_boolean(p.accepted)?;
            }
            Packet::CreativeInventoryAction(p) => {
                w.write_java_short(p.slot)?;
                write_slot(w, &p.clicked_item)?;
            }
            Packet::EnchantItem(p) => {
                w.write_java_byte(p.window_id)?;
                w.write_java_byte(p.enchantment)?;
            }
            Packet::UpdateSign(p) => {
                w.write_java_int(p.x)?;
                w.write_java_short(p.y)?;
                w.write_java_int(p.z)?;
                for line in p.lines.iter() {
                    w.write_java_string16(line)?;
                }
            }
            Packet::ItemData(p) => {
                w.write_java_short(p.item_type)?;
                w.write_java_short(p.item_id)?;
                let len = u8::try_from(p.data.len())
                    .map_err(|_| malformed("too much item data"))?;
                w.write_u8(len)?;
                w.write_all(&p.data)?;
            }
            Packet::UpdateTileEntity(p) => {
                w.write_java_int(p.x)?;
                w.write_java_short(p.y)?;
                w.write_java_int(p.z)?;
                w.write_java_byte(p.action)?;
                write_short_bytes(w, &p.nbt)?;
            }
            Packet::IncrementStatistic(p) => {
                w.write_java_int(p.statistic_id)?;
                w.write_java_byte(p.amount)?;
            }
            Packet::PlayerListItem(p) => {
                w.write_java_string16(&p.name)?;
                w.write_java_boolean(p.online)?;
                w.write_java_short(p.ping)?;
            }
            Packet::PlayerAbilities(p) => {
                w.write_java_byte(p.flags)?;
                w.write_java_byte(p.flying_speed)?;
                w.write_java_byte(p.walking_speed)?;
            }
            Packet::TabComplete(p) => {
                w.write_java_string16(&p.text)?;
            }
            Packet::ClientSettings(p) => {
                w.write_java_string16(&p.locale)?;
                w.write_java_byte(p.view_distance)?;
                w.write_java_byte(p.chat_flags)?;
                w.write_java_byte(p.difficulty)?;
                w.write_java_boolean(p.show_cape)?;
            }
            Packet::ClientStatus(p) => {
                w.write_java_byte(p.payload)?;
            }
            Packet::ScoreboardObjective(p) => {
                w.write_java_string16(&p.name)?;
                w.write_java_string16(&p.display_name)?;
                w.write_java_byte(p.action)?;
            }
            Packet::UpdateScore(p) => {
                w.write_java_string16(&p.item_name)?;
                w.write_java_byte(p.action)?;
                if p.action != 1 {
                    w.write_java_string16(&p.score_name)?;
                    w.write_java_int(p.value)?;
                }
            }
            Packet::DisplayScoreboard(p) => {
                w.write_java_byte(p.position)?;
                w.write_java_string16(&p.score_name)?;
            }
            Packet::Teams(p) => {
                w.write_java_string16(&p.name)?;
                w.write_java_byte(p.mode)?;
                if p.mode == 0 || p.mode == 2 {
                    w.write_java_string16(&p.display_name)?;
                    w.write_java_string16(&p.prefix)?;
                    w.write_java_string16(&p.suffix)?;
                    w.write_java_byte(p.friendly_fire)?;
                }
                if p.mode == 0 || p.mode == 3 || p.mode == 4 {
                    write_string_slice(w, &p.players)?;
                }
            }
            Packet::PluginMessage(p) => {
                w.write_java_string16(&p.channel)?;
                write_short_bytes(w, &p.data)?;
            }
            Packet::EncryptionKeyResponse(p) => {
                write_short_bytes(w, &p.shared_secret)?;
                write_short_bytes(w, &p.verify_token)?;
            }
            Packet::EncryptionKeyRequest(p) => {
                w.write_java_string16(&p.server_id)?;
                write_short_bytes(w, &p.public_key)?;
                write_short_bytes(w, &p.verify_token)?;
            }
            Packet::ServerListPing(p) => {
                w.write_java_byte(p.magic)?;
            }
            Packet::Disconnect(p) => {
                w.write_java_string16(&p.reason)?;
            }
        }
        Ok(())
    }

}


/// Read a slot, an empty one is just the -1 sentinel id.
pub fn read_slot(r: &mut impl Read) -> Result<Slot, ProtoError> {

    let id = r.read_java_short()?;
    if id == -1 {
        return Ok(Slot::EMPTY);
    }

    let count = r.read_java_byte()?;
    let damage = r.read_java_short()?;

    let nbt_len = r.read_java_short()?;
    let nbt = if nbt_len < 0 {
        Vec::new()
    } else {
        let mut nbt = vec![0; nbt_len as usize];
        r.read_exact(&mut nbt)?;
        nbt
    };

    Ok(Slot { id, count, damage, nbt })

}

/// Write a slot. A non-empty slot without NBT writes the -1 length sentinel.
pub fn write_slot(w: &mut impl Write, slot: &Slot) -> Result<(), ProtoError> {

    w.write_java_short(slot.id)?;
    if slot.is_empty() {
        return Ok(());
    }

    w.write_java_byte(slot.count)?;
    w.write_java_short(slot.damage)?;

    if slot.nbt.is_empty() {
        w.write_java_short(-1)?;
    } else {
        let len = i16::try_from(slot.nbt.len())
            .map_err(|_| malformed("slot nbt too big"))?;
        w.write_java_short(len)?;
        w.write_all(&slot.nbt)?;
    }

    Ok(())

}

/// Read a short-count-prefixed sequence of slots.
pub fn read_slot_slice(r: &mut impl Read) -> Result<Vec<Slot>, ProtoError> {
    let count = r.read_java_short()?;
    if count < 0 {
        return Err(malformed("negative slot count"));
    }
    let mut slots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        slots.push(read_slot(r)?);
    }
    Ok(slots)
}

pub fn write_slot_slice(w: &mut impl Write, slots: &[Slot]) -> Result<(), ProtoError> {
    let count = i16::try_from(slots.len())
        .map_err(|_| malformed("too many slots"))?;
    w.write_java_short(count)?;
    for slot in slots {
        write_slot(w, slot)?;
    }
    Ok(())
}

/// Read a short-count-prefixed sequence of strings.
pub fn read_string_slice(r: &mut impl Read) -> Result<Vec<String>, ProtoError> {
    let count = r.read_java_short()?;
    if count < 0 {
        return Err(malformed("negative string count"));
    }
    let mut strings = Vec::with_capacity(count.min(256) as usize);
    for _ in 0..count {
        strings.push(r.read_java_string16()?);
    }
    Ok(strings)
}

pub fn write_string_slice(w: &mut impl Write, strings: &[String]) -> Result<(), ProtoError> {
    let count = i16::try_from(strings.len())
        .map_err(|_| malformed("too many strings"))?;
    w.write_java_short(count)?;
    for s in strings {
        w.write_java_string16(s)?;
    }
    Ok(())
}

/// Read a byte array with a signed 16-bit length prefix.
pub fn read_short_bytes(r: &mut impl Read) -> Result<Vec<u8>, ProtoError> {
    let len = r.read_java_short()?;
    if len < 0 {
        return Err(malformed("negative byte array length"));
    }
    let mut bytes = vec![0; len as usize];
    r.read_exact(&mut bytes)?;
    Ok(bytes)
}

pub fn write_short_bytes(w: &mut impl Write, bytes: &[u8]) -> Result<(), ProtoError> {
    let len = i16::try_from(bytes.len())
        .map_err(|_| malformed("byte array too big"))?;
    w.write_java_short(len)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Read a byte array with a signed 32-bit length prefix, used by the
/// compressed chunk payloads.
pub fn read_int_bytes(r: &mut impl Read) -> Result<Vec<u8>, ProtoError> {
    let len = r.read_java_int()?;
    if len < 0 {
        return Err(malformed("negative byte array length"));
    }
    let mut bytes = vec![0; len as usize];
    r.read_exact(&mut bytes)?;
    Ok(bytes)
}

pub fn write_int_bytes(w: &mut impl Write, bytes: &[u8]) -> Result<(), ProtoError> {
    let len = i32::try_from(bytes.len())
        .map_err(|_| malformed("byte array too big"))?;
    w.write_java_int(len)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Terminator byte of a metadata sequence.
const METADATA_TERMINATOR: u8 = 0x7F;

/// Read a metadata sequence, a run of key byte plus typed value entries
/// terminated by 0x7F. The key byte packs the kind in its high 3 bits and
/// the metadata index in the low 5 bits.
pub fn read_metadata_list(r: &mut impl Read) -> Result<Vec<Metadata>, ProtoError> {
    let mut list = Vec::new();
    loop {

        let key = r.read_u8()?;
        if key == METADATA_TERMINATOR {
            return Ok(list);
        }

        let id = key & 0x1F;
        let kind = match key >> 5 {
            0 => MetadataKind::Byte(r.read_java_byte()?),
            1 => MetadataKind::Short(r.read_java_short()?),
            2 => MetadataKind::Int(r.read_java_int()?),
            3 => MetadataKind::Float(r.read_java_float()?),
            4 => MetadataKind::String(r.read_java_string16()?),
            5 => MetadataKind::Slot(read_slot(r)?),
            6 => MetadataKind::Position(
                r.read_java_int()?,
                r.read_java_int()?,
                r.read_java_int()?,
            ),
            _ => return Err(malformed("unknown entity metadata kind")),
        };

        list.push(Metadata { id, kind });

    }
}

pub fn write_metadata_list(w: &mut impl Write, list: &[Metadata]) -> Result<(), ProtoError> {

    for metadata in list {

        let kind_index: u8 = match metadata.kind {
            MetadataKind::Byte(_) => 0,
            MetadataKind::Short(_) => 1,
            MetadataKind::Int(_) => 2,
            MetadataKind::Float(_) => 3,
            MetadataKind::String(_) => 4,
            MetadataKind::Slot(_) => 5,
            MetadataKind::Position(_, _, _) => 6,
        };

        w.write_u8((kind_index << 5) | (metadata.id & 0x1F))?;

        match metadata.kind {
            MetadataKind::Byte(n) => w.write_java_byte(n)?,
            MetadataKind::Short(n) => w.write_java_short(n)?,
            MetadataKind::Int(n) => w.write_java_int(n)?,
            MetadataKind::Float(n) => w.write_java_float(n)?,
            MetadataKind::String(ref s) => w.write_java_string16(s)?,
            MetadataKind::Slot(ref slot) => write_slot(w, slot)?,
            MetadataKind::Position(x, y, z) => {
                w.write_java_int(x)?;
                w.write_java_int(y)?;
                w.write_java_int(z)?;
            }
        }

    }

    w.write_u8(METADATA_TERMINATOR)?;
    Ok(())

}


#[cfg(test)]
mod tests {

    use std::io::Cursor;

    use super::*;

    fn encode(packet: &Packet, dir: Direction) -> Vec<u8> {
        let mut buf = Vec::new();
        packet.write(&mut buf, dir).unwrap();
        buf
    }

    fn decode(bytes: &[u8], dir: Direction) -> Packet {
        let mut cursor = Cursor::new(bytes);
        let packet = Packet::read(&mut cursor, dir).unwrap();
        assert_eq!(cursor.position() as usize, bytes.len(), "bytes left after packet");
        packet
    }

    fn check_round_trip(packet: Packet, dir: Direction) {
        assert_eq!(decode(&encode(&packet, dir), dir), packet);
    }

    #[test]
    fn keep_alive_echo() {
        let bytes = [0x00, 0x00, 0x00, 0x00, 0x2A];
        let packet = decode(&bytes, Direction::Clientbound);
        assert_eq!(packet, Packet::KeepAlive(KeepAlivePacket { id: 42 }));
        assert_eq!(encode(&packet, Direction::Clientbound), bytes);
    }

    #[test]
    fn handshake_round_trip() {
        check_round_trip(Packet::Handshake(HandshakePacket {
            version: VERSION,
            username: "MCBot".to_string(),
            hostname: "localhost".to_string(),
            port: 25565,
        }), Direction::Serverbound);
    }

    #[test]
    fn login_request_round_trip() {
        check_round_trip(Packet::LoginRequest(LoginRequestPacket {
            entity_id: 4052,
            level_type: "default".to_string(),
            game_mode: 0,
            dimension: -1,
            difficulty: 2,
            unused: 0,
            max_players: 20,
        }), Direction::Clientbound);
    }

    #[test]
    fn encryption_packets_round_trip() {
        check_round_trip(Packet::EncryptionKeyRequest(EncryptionKeyRequestPacket {
            server_id: "-".to_string(),
            public_key: vec![0x30, 0x81, 0x9F, 0x00],
            verify_token: vec![1, 2, 3, 4],
        }), Direction::Clientbound);
        check_round_trip(Packet::EncryptionKeyResponse(EncryptionKeyResponsePacket {
            shared_secret: vec![9; 128],
            verify_token: vec![8; 128],
        }), Direction::Serverbound);
        // The committing echo has both arrays empty.
        let echo = Packet::EncryptionKeyResponse(EncryptionKeyResponsePacket::default());
        assert_eq!(encode(&echo, Direction::Clientbound).len(), 5);
        check_round_trip(echo, Direction::Clientbound);
    }

    #[test]
    fn update_health_uses_float_health() {
        let packet = Packet::UpdateHealth(UpdateHealthPacket {
            health: 19.5,
            food: 18,
            saturation: 2.5,
        });
        assert_eq!(encode(&packet, Direction::Clientbound).len(), 1 + 4 + 2 + 4);
        check_round_trip(packet, Direction::Clientbound);
    }

    #[test]
    fn player_movement_round_trips() {
        check_round_trip(Packet::Player(PlayerPacket { on_ground: true }), Direction::Serverbound);
        check_round_trip(Packet::PlayerPosition(PlayerPositionPacket {
            x: 100.5, y: 64.0, stance: 65.62, z: -8.25, on_ground: true,
        }), Direction::Serverbound);
        check_round_trip(Packet::PlayerLook(PlayerLookPacket {
            yaw: 90.0, pitch: -12.5, on_ground: false,
        }), Direction::Serverbound);
        check_round_trip(Packet::PlayerPositionLookServer(PlayerPositionLookServerPacket {
            x: 1.0, y: 2.0, stance: 3.62, z: 4.0, yaw: 5.0, pitch: 6.0, on_ground: true,
        }), Direction::Serverbound);
        check_round_trip(Packet::PlayerPositionLookClient(PlayerPositionLookClientPacket {
            x: 1.0, stance: 3.62, y: 2.0, z: 4.0, yaw: 5.0, pitch: 6.0, on_ground: true,
        }), Direction::Clientbound);
    }

    #[test]
    fn position_look_stance_swaps_with_direction() {
        // The same bytes under opcode 0x0D parse differently per direction:
        // the second double is Y for the client-produced packet and the
        // stance for the server-produced one.
        let sent = Packet::PlayerPositionLookServer(PlayerPositionLookServerPacket {
            x: 1.0, y: 2.0, stance: 3.0, z: 4.0, yaw: 5.0, pitch: 6.0, on_ground: false,
        });
        let bytes = encode(&sent, Direction::Serverbound);
        let Packet::PlayerPositionLookClient(p) = decode(&bytes, Direction::Clientbound) else {
            panic!("expected the client-side packet");
        };
        assert_eq!(p.x, 1.0);
        assert_eq!(p.stance, 2.0);
        assert_eq!(p.y, 3.0);
        assert_eq!(p.z, 4.0);
    }

    #[test]
    fn position_look_needs_a_matching_direction() {
        let packet = Packet::PlayerPositionLookClient(PlayerPositionLookClientPacket {
            x: 0.0, stance: 0.0, y: 0.0, z: 0.0, yaw: 0.0, pitch: 0.0, on_ground: false,
        });
        let mut buf = Vec::new();
        match packet.write(&mut buf, Direction::Serverbound) {
            Err(ProtoError::UnregisteredType(Direction::Serverbound)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let bytes = [0x7B, 0, 0, 0, 0];
        let mut cursor = Cursor::new(&bytes[..]);
        match Packet::read(&mut cursor, Direction::Clientbound) {
            Err(ProtoError::UnknownOpcode(0x7B)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_slot_is_two_bytes() {
        let mut buf = Vec::new();
        write_slot(&mut buf, &Slot::EMPTY).unwrap();
        assert_eq!(buf, [0xFF, 0xFF]);

        let slot = read_slot(&mut &buf[..]).unwrap();
        assert!(slot.is_empty());
    }

    #[test]
    fn slot_without_nbt_writes_negative_length() {
        let slot = Slot::new(276, 1, 100);
        let mut buf = Vec::new();
        write_slot(&mut buf, &slot).unwrap();
        assert_eq!(&buf[5..], [0xFF, 0xFF]);
        assert_eq!(read_slot(&mut &buf[..]).unwrap(), slot);
    }

    #[test]
    fn slot_with_nbt_round_trips() {
        let slot = Slot { id: 276, count: 1, damage: 0, nbt: vec![0x1F, 0x8B, 3, 4] };
        let mut buf = Vec::new();
        write_slot(&mut buf, &slot).unwrap();
        assert_eq!(read_slot(&mut &buf[..]).unwrap(), slot);
    }

    #[test]
    fn slot_slice_of_one() {
        let bytes = [0x00, 0x01, 0x00, 0x02, 0x64, 0x00, 0x63, 0x00, 0x02, 0x02, 0x03];
        let slots = read_slot_slice(&mut &bytes[..]).unwrap();
        assert_eq!(slots, [Slot { id: 2, count: 100, damage: 99, nbt: vec![2, 3] }]);
    }

    #[test]
    fn empty_metadata_is_the_terminator_alone() {
        let mut buf = Vec::new();
        write_metadata_list(&mut buf, &[]).unwrap();
        assert_eq!(buf, [0x7F]);

        let mut cursor = Cursor::new(&buf[..]);
        assert!(read_metadata_list(&mut cursor).unwrap().is_empty());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn metadata_all_kinds_round_trip() {
        let list = vec![
            Metadata { id: 0, kind: MetadataKind::Byte(0x12) },
            Metadata { id: 1, kind: MetadataKind::Short(300) },
            Metadata { id: 8, kind: MetadataKind::Int(0x00FF00FF) },
            Metadata { id: 17, kind: MetadataKind::Float(0.5) },
            Metadata { id: 5, kind: MetadataKind::String("Fluffy".to_string()) },
            Metadata { id: 10, kind: MetadataKind::Slot(Slot::new(35, 1, 14)) },
            Metadata { id: 12, kind: MetadataKind::Position(-1, 64, 12) },
        ];
        let mut buf = Vec::new();
        write_metadata_list(&mut buf, &list).unwrap();
        assert_eq!(read_metadata_list(&mut &buf[..]).unwrap(), list);
    }

    #[test]
    fn metadata_key_packs_kind_and_index() {
        let list = [Metadata { id: 1, kind: MetadataKind::Short(300) }];
        let mut buf = Vec::new();
        write_metadata_list(&mut buf, &list).unwrap();
        assert_eq!(buf[0], (1 << 5) | 1);
    }

    #[test]
    fn metadata_unknown_kind_is_malformed() {
        let bytes = [(7u8 << 5) | 2, 0, 0];
        match read_metadata_list(&mut &bytes[..]) {
            Err(ProtoError::Malformed(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn destroy_entity_count_is_a_byte() {
        let packet = Packet::DestroyEntity(DestroyEntityPacket { entity_ids: vec![1, 2, 3] });
        let bytes = encode(&packet, Direction::Clientbound);
        assert_eq!(bytes.len(), 1 + 1 + 3 * 4);
        assert_eq!(bytes[1], 3);
        check_round_trip(packet, Direction::Clientbound);
    }

    #[test]
    fn spawn_object_velocity_depends_on_flag() {
        let mut packet = SpawnObjectPacket {
            entity_id: 1, kind: object::BOAT,
            x: 100, y: 200, z: 300,
            pitch: 0, yaw: 0,
            flag: 0,
            ..Default::default()
        };
        // Without the flag no velocity is on the wire.
        let bytes = encode(&Packet::SpawnObject(packet.clone()), Direction::Clientbound);
        assert_eq!(bytes.len(), 1 + 4 + 1 + 12 + 2 + 4);
        check_round_trip(Packet::SpawnObject(packet.clone()), Direction::Clientbound);

        packet.flag = 1;
        packet.vx = 8000;
        packet.vy = -1;
        packet.vz = 20;
        let bytes = encode(&Packet::SpawnObject(packet.clone()), Direction::Clientbound);
        assert_eq!(bytes.len(), 1 + 4 + 1 + 12 + 2 + 4 + 6);
        check_round_trip(Packet::SpawnObject(packet), Direction::Clientbound);
    }

    #[test]
    fn spawn_object_conditional_payloads() {
        check_round_trip(Packet::SpawnObject(SpawnObjectPacket {
            entity_id: 2, kind: object::ITEM_FRAME,
            x: 32, y: 64, z: 96, orientation: 3,
            ..Default::default()
        }), Direction::Clientbound);
        check_round_trip(Packet::SpawnObject(SpawnObjectPacket {
            entity_id: 3, kind: object::FALLING_OBJECT,
            x: 0, y: 2048, z: 0, block_type: 12,
            ..Default::default()
        }), Direction::Clientbound);
        check_round_trip(Packet::SpawnObject(SpawnObjectPacket {
            entity_id: 4, kind: object::ARROW,
            x: 0, y: 0, z: 0, owner_id: 77, flag: 1, vx: 1, vy: 2, vz: 3,
            ..Default::default()
        }), Direction::Clientbound);
    }

    #[test]
    fn map_chunk_bulk_field_order() {
        let packet = Packet::MapChunkBulk(MapChunkBulkPacket {
            sky_light: true,
            compressed_data: vec![0xAA, 0xBB, 0xCC],
            metadata: vec![
                ColumnMetadata { cx: 1, cz: -1, primary_bitmap: 0b11, add_bitmap: 0 },
                ColumnMetadata { cx: 2, cz: 0, primary_bitmap: 0b1, add_bitmap: 0b1 },
            ],
        });
        let bytes = encode(&packet, Direction::Clientbound);
        // opcode, count, size, sky light flag, payload, then per-column
        // metadata.
        assert_eq!(&bytes[..8], [0x38, 0, 2, 0, 0, 0, 3, 1]);
        assert_eq!(&bytes[8..11], [0xAA, 0xBB, 0xCC]);
        assert_eq!(bytes.len(), 11 + 2 * 12);
        check_round_trip(packet, Direction::Clientbound);
    }

    #[test]
    fn entity_properties_round_trip() {
        check_round_trip(Packet::EntityProperties(EntityPropertiesPacket {
            entity_id: 99,
            properties: vec![
                EntityProperty {
                    key: "generic.maxHealth".to_string(),
                    value: 20.0,
                    modifiers: Vec::new(),
                },
                EntityProperty {
                    key: "generic.movementSpeed".to_string(),
                    value: 0.25,
                    modifiers: vec![AttributeModifier {
                        uuid_high: -1,
                        uuid_low: 12345,
                        amount: 0.1,
                        operation: 2,
                    }],
                },
            ],
        }), Direction::Clientbound);
    }

    #[test]
    fn set_window_items_round_trip() {
        check_round_trip(Packet::SetWindowItems(SetWindowItemsPacket {
            window_id: 0,
            slots: vec![
                Slot::EMPTY,
                Slot::new(1, 64, 0),
                Slot { id: 276, count: 1, damage: 10, nbt: vec![1, 2, 3] },
            ],
        }), Direction::Clientbound);
    }

    #[test]
    fn chunk_data_uses_int_prefixed_payload() {
        let packet = Packet::ChunkData(ChunkDataPacket {
            x: 4, z: -3,
            ground_up: true,
            primary_bitmap: 0xFFFF,
            add_bitmap: 0,
            compressed_data: vec![1, 2, 3, 4, 5],
        });
        let bytes = encode(&packet, Direction::Clientbound);
        // The payload length prefix is 32 bits wide.
        assert_eq!(&bytes[14..18], [0, 0, 0, 5]);
        check_round_trip(packet, Direction::Clientbound);
    }

    #[test]
    fn multi_block_change_encodes_record_size() {
        let packet = Packet::MultiBlockChange(MultiBlockChangePacket {
            cx: 1, cz: 2,
            records: vec![0x0000_0C01, 0x0001_0C02],
        });
        let bytes = encode(&packet, Direction::Clientbound);
        // count = 2 records, size = 8 bytes.
        assert_eq!(&bytes[9..15], [0, 2, 0, 0, 0, 8]);
        check_round_trip(packet, Direction::Clientbound);
    }

    #[test]
    fn update_score_omits_fields_on_removal(){
        check_round_trip(Packet::UpdateScore(UpdateScorePacket {
            item_name: "kills".to_string(),
            action: 0,
            score_name: "dummy".to_string(),
            value: 3,
        }), Direction::Clientbound);

        let removal = Packet::UpdateScore(UpdateScorePacket {
            item_name: "kills".to_string(),
            action: 1,
            ..Default::default()
        });
        assert_eq!(encode(&removal, Direction::Clientbound).len(), 1 + 2 + 10 + 1);
        check_round_trip(removal, Direction::Clientbound);
    }

    #[test]
    fn teams_field_groups_depend_on_mode() {
        check_round_trip(Packet::Teams(TeamsPacket {
            name: "red".to_string(),
            mode: 0,
            display_name: "Red Team".to_string(),
            prefix: "[R] ".to_string(),
            suffix: String::new(),
            friendly_fire: 1,
            players: vec!["Notch".to_string(), "jeb_".to_string()],
        }), Direction::Clientbound);

        let removal = Packet::Teams(TeamsPacket {
            name: "red".to_string(),
            mode: 1,
            ..Default::default()
        });
        assert_eq!(encode(&removal, Direction::Clientbound).len(), 1 + 2 + 6 + 1);
        check_round_trip(removal, Direction::Clientbound);

        check_round_trip(Packet::Teams(TeamsPacket {
            name: "red".to_string(),
            mode: 3,
            players: vec!["simon".to_string()],
            ..Default::default()
        }), Direction::Clientbound);
    }

    #[test]
    fn assorted_round_trips() {
        let dir = Direction::Clientbound;
        check_round_trip(Packet::ChatMessage(ChatMessagePacket {
            message: "<Notch> Hello".to_string(),
        }), dir);
        check_round_trip(Packet::TimeUpdate(TimeUpdatePacket {
            world_age: 8_640_000, time_of_day: 18_000,
        }), dir);
        check_round_trip(Packet::SpawnNamedEntity(SpawnNamedEntityPacket {
            entity_id: 300,
            player_name: "jeb_".to_string(),
            x: 32 * 10, y: 32 * 64, z: -32, yaw: 64, pitch: 0, current_item: 276,
            metadata: vec![Metadata { id: 0, kind: MetadataKind::Byte(0) }],
        }), dir);
        check_round_trip(Packet::SpawnMob(SpawnMobPacket {
            entity_id: 301, kind: 50,
            x: 0, y: 2048, z: 0, yaw: 0, pitch: 0, head_yaw: 12,
            vz: 1, vx: 2, vy: 3,
            metadata: vec![Metadata { id: 16, kind: MetadataKind::Byte(-1) }],
        }), dir);
        check_round_trip(Packet::Explosion(ExplosionPacket {
            x: 10.5, y: 64.0, z: -3.25, radius: 3.0,
            blocks: vec![(0, 1, 0), (-1, 0, 2)],
            push_x: 0.1, push_y: -0.2, push_z: 0.0,
        }), dir);
        check_round_trip(Packet::UpdateSign(UpdateSignPacket {
            x: 10, y: 70, z: -4,
            lines: Box::new([
                "line1".to_string(),
                String::new(),
                "line3".to_string(),
                String::new(),
            ]),
        }), dir);
        check_round_trip(Packet::ItemData(ItemDataPacket {
            item_type: 358, item_id: 0, data: vec![0; 128],
        }), dir);
        check_round_trip(Packet::PluginMessage(PluginMessagePacket {
            channel: "MC|Brand".to_string(), data: b"vanilla".to_vec(),
        }), dir);
        check_round_trip(Packet::Disconnect(DisconnectPacket {
            reason: "Server closed".to_string(),
        }), dir);
        check_round_trip(Packet::ServerListPing(ServerListPingPacket { magic: 1 }), Direction::Serverbound);
    }

    #[test]
    fn encoding_is_deterministic() {
        let packet = Packet::SpawnObject(SpawnObjectPacket {
            entity_id: 1, kind: object::ARROW,
            x: 5, y: 6, z: 7, owner_id: 3, flag: 1, vx: 1, vy: 2, vz: 3,
            ..Default::default()
        });
        assert_eq!(encode(&packet, Direction::Clientbound), encode(&packet, Direction::Clientbound));
    }

    #[test]
    fn truncated_packet_is_eof() {
        let bytes = [0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(&bytes[..]);
        match Packet::read(&mut cursor, Direction::Clientbound) {
            Err(ProtoError::UnexpectedEof) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

}
