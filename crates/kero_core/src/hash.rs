//! djb2 string hashing.
//!
//! Tiled object names, layer types and tile property names are matched by
//! hash so the hot loaders compare integers instead of strings.

pub const fn name_hash(name: &str) -> u64 {
    let bytes = name.as_bytes();
    let mut hash: u64 = 5381;
    let mut i = 0;
    while i < bytes.len() {
        hash = (hash << 5).wrapping_add(hash).wrapping_add(bytes[i] as u64);
        i += 1;
    }
    hash
}

pub const COIN: u64 = name_hash("coin");
pub const DOOR: u64 = name_hash("door");
pub const BLOCK: u64 = name_hash("block");
pub const SPAWN: u64 = name_hash("spawn");
pub const TILE_LAYER: u64 = name_hash("tilelayer");
pub const OBJECT_GROUP: u64 = name_hash("objectgroup");
pub const IS_DEADLY: u64 = name_hash("is_deadly");
pub const IS_SOLID: u64 = name_hash("is_solid");
pub const IS_WALL: u64 = name_hash("is_wall");
pub const OFFSET_TOP: u64 = name_hash("offset_top");
