//! Tiled JSON (`.tmj`) level loading.
//!
//! A level is a Tiled map with one embedded tileset. Tile layers provide both
//! the artwork and, through per-tile custom properties, the collision grid:
//!
//! - `is_solid` (bool): the character can stand on the tile
//! - `is_wall` (bool): blocks horizontal movement
//! - `is_deadly` (bool): touching it kills
//! - `offset_top` (int): pixels to sink into the tile when standing on it
//!
//! Object groups hold the interactive pieces, told apart by object name:
//! `coin`, `door`, `block` (carries a string property `text`) and `spawn`.
//! Anything else is kept as scenery and animated like the rest.

use crate::assets::AssetSource;
use crate::collision::{Aabb, TileFlags, TileGrid};
use kero_core::hash::{self, name_hash};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const FLIP_BITS: u32 = 0xF000_0000;

#[derive(Debug, Deserialize)]
struct TiledMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    backgroundcolor: Option<String>,
    #[serde(default)]
    layers: Vec<TiledLayer>,
    #[serde(default)]
    tilesets: Vec<TiledTileset>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    objects: Vec<TiledObject>,
}

#[derive(Debug, Deserialize)]
struct TiledObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    gid: u32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    properties: Vec<TiledProperty>,
}

#[derive(Debug, Deserialize)]
struct TiledTileset {
    #[serde(default = "default_first_gid")]
    firstgid: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tiles: Vec<TiledTile>,
}

#[derive(Debug, Deserialize)]
struct TiledTile {
    id: u32,
    #[serde(default)]
    properties: Vec<TiledProperty>,
    #[serde(default)]
    animation: Vec<TiledFrame>,
}

#[derive(Debug, Deserialize)]
struct TiledFrame {
    tileid: u32,
}

#[derive(Debug, Deserialize)]
struct TiledProperty {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Coin,
    Door,
    Block,
    Spawn,
    Scenery,
}

impl ObjectKind {
    fn from_hash(hash: u64) -> Self {
        match hash {
            hash::COIN => Self::Coin,
            hash::DOOR => Self::Door,
            hash::BLOCK => Self::Block,
            hash::SPAWN => Self::Spawn,
            _ => Self::Scenery,
        }
    }
}

/// An interactive object placed on the map.
#[derive(Debug, Clone)]
pub struct MapObject {
    pub object_id: u32,
    pub kind: ObjectKind,
    /// Local id of the tile the object was placed with. Zero-gid objects
    /// (plain rectangles) have none and are never drawn.
    pub local_id: Option<u32>,
    /// Tile currently shown, advanced by the map renderer.
    pub tile_id: u32,
    /// Top-left corner in pixels.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub anim_length: u32,
    pub start_frame: u32,
    pub current_frame: u32,
    pub hidden: bool,
    /// Tile drawn underneath before the object itself.
    pub canvas_tile: Option<u32>,
    pub text: Option<String>,
}

impl MapObject {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub visible: bool,
    /// Local tile ids, `None` for empty cells.
    pub cells: Vec<Option<u32>>,
}

#[derive(Debug, Clone)]
pub struct Map {
    pub grid: TileGrid,
    pub layers: Vec<TileLayer>,
    pub objects: Vec<MapObject>,
    pub spawn_x: i32,
    pub spawn_y: i32,
    /// `0xAARRGGBB`, always opaque.
    pub background: u32,
    pub tileset_image: String,
    pub tileset_columns: u32,
    pub coins_left: u32,
    pub prev_coins: u32,
    pub coin_max: u32,
    /// Object whose dialogue is currently shown, if any.
    pub dialogue_block: Option<usize>,
    pub use_pride_flag: bool,
    animations: HashMap<u32, Vec<u32>>,
}

impl Map {
    pub fn pixel_width(&self) -> u32 {
        self.grid.pixel_width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.grid.pixel_height()
    }

    /// Tile to draw for animation frame `frame` of the object's source tile.
    pub fn animation_frame(&self, local_id: u32, frame: u32) -> Option<u32> {
        self.animations
            .get(&local_id)
            .and_then(|frames| frames.get(frame as usize))
            .copied()
    }

    pub fn doors_open(&self) -> bool {
        self.coins_left == 0
    }
}

pub fn parse_map(raw: &str, origin: &str) -> Result<Map, String> {
    let tiled: TiledMap = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse map JSON {origin}: {e}"))?;
    validate_tiled_map(&tiled)?;
    build_map(tiled, origin)
}

#[allow(dead_code)]
pub fn load_map_from_path(path: &Path) -> Result<Map, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_map(&raw, &path.display().to_string())
}

pub fn load_map(assets: &dyn AssetSource, name: &str) -> Result<Map, String> {
    let bytes = assets.read(name)?;
    let raw = String::from_utf8(bytes).map_err(|e| format!("Failed to read {name}: {e}"))?;
    let map = parse_map(&raw, name)?;
    log::info!(
        "Loaded map {}: {}x{} tiles, {} object(s), {} coin(s)",
        name,
        map.grid.width,
        map.grid.height,
        map.objects.len(),
        map.coin_max
    );
    Ok(map)
}

pub fn level_file_name(level: u32) -> String {
    format!("{:03}.tmj", level)
}

fn validate_tiled_map(map: &TiledMap) -> Result<(), String> {
    if map.width == 0 || map.height == 0 {
        return Err("Map validation failed: width and height must be > 0".to_string());
    }
    if map.tilewidth == 0 || map.tileheight == 0 {
        return Err("Map validation failed: tile size must be > 0".to_string());
    }
    let Some(tileset) = map.tilesets.first() else {
        return Err("Map validation failed: no tileset".to_string());
    };
    if let Some(source) = &tileset.source {
        return Err(format!(
            "Map validation failed: external tileset '{}' is not supported",
            source
        ));
    }
    if tileset.image.as_deref().unwrap_or("").is_empty() {
        return Err("Map validation failed: tileset has no image".to_string());
    }
    if tileset.columns == 0 {
        return Err("Map validation failed: tileset columns must be > 0".to_string());
    }

    let cell_count = map.width as usize * map.height as usize;
    for layer in &map.layers {
        if name_hash(&layer.kind) == hash::TILE_LAYER && layer.data.len() != cell_count {
            return Err(format!(
                "Map validation failed: layer '{}' has {} cells, expected {}",
                layer.name,
                layer.data.len(),
                cell_count
            ));
        }
    }
    Ok(())
}

fn build_map(tiled: TiledMap, origin: &str) -> Result<Map, String> {
    let tileset = tiled
        .tilesets
        .first()
        .ok_or_else(|| "Map validation failed: no tileset".to_string())?;
    let first_gid = tileset.firstgid;

    let mut tile_flags: HashMap<u32, TileFlags> = HashMap::new();
    let mut animations: HashMap<u32, Vec<u32>> = HashMap::new();
    for tile in &tileset.tiles {
        if !tile.properties.is_empty() {
            tile_flags.insert(tile.id, tile_flags_from(&tile.properties));
        }
        if !tile.animation.is_empty() {
            animations.insert(tile.id, tile.animation.iter().map(|f| f.tileid).collect());
        }
    }

    let mut grid = TileGrid::new(tiled.width, tiled.height, tiled.tilewidth, tiled.tileheight);
    let mut layers = Vec::new();
    let mut objects = Vec::new();
    let mut spawn = None;

    for layer in &tiled.layers {
        match name_hash(&layer.kind) {
            hash::TILE_LAYER => {
                let cells: Vec<Option<u32>> = layer
                    .data
                    .iter()
                    .map(|&gid| local_id(gid, first_gid))
                    .collect();
                for (index, cell) in cells.iter().enumerate() {
                    if let Some(flags) = cell.and_then(|id| tile_flags.get(&id)) {
                        grid.merge(index, *flags);
                    }
                }
                layers.push(TileLayer {
                    name: layer.name.clone(),
                    visible: layer.visible,
                    cells,
                });
            }
            hash::OBJECT_GROUP => {
                if !layer.visible {
                    continue;
                }
                let below = layers.last();
                for object in &layer.objects {
                    let placed = build_object(object, first_gid, &grid, below, &animations);
                    if placed.kind == ObjectKind::Spawn {
                        spawn = Some((object.x as i32, object.y as i32));
                    }
                    objects.push(placed);
                }
            }
            _ => log::warn!(
                "Map {}: ignoring layer '{}' of type '{}'",
                origin,
                layer.name,
                layer.kind
            ),
        }
    }

    let (spawn_x, spawn_y) = spawn.unwrap_or_else(|| {
        log::warn!("Map {} has no spawn object, using the top-left tile", origin);
        (tiled.tilewidth as i32, tiled.tileheight as i32)
    });

    let coin_max = objects.iter().filter(|o| o.kind == ObjectKind::Coin).count() as u32;

    Ok(Map {
        grid,
        layers,
        objects,
        spawn_x,
        spawn_y,
        background: parse_background(tiled.backgroundcolor.as_deref()),
        tileset_image: tileset.image.clone().unwrap_or_default(),
        tileset_columns: tileset.columns,
        coins_left: coin_max,
        prev_coins: coin_max,
        coin_max,
        dialogue_block: None,
        use_pride_flag: false,
        animations,
    })
}

fn build_object(
    object: &TiledObject,
    first_gid: u32,
    grid: &TileGrid,
    below: Option<&TileLayer>,
    animations: &HashMap<u32, Vec<u32>>,
) -> MapObject {
    let kind = ObjectKind::from_hash(name_hash(&object.name));
    let local = local_id(object.gid, first_gid);

    // Tile objects are anchored bottom-left, rectangles top-left.
    let (width, height) = if local.is_some() && (object.width <= 0.0 || object.height <= 0.0) {
        (grid.tile_width, grid.tile_height)
    } else {
        (object.width.max(0.0) as u32, object.height.max(0.0) as u32)
    };
    let x = object.x as i32;
    let y = if local.is_some() {
        object.y as i32 - height as i32
    } else {
        object.y as i32
    };

    let frames = local.and_then(|id| animations.get(&id));
    let anim_length = match (kind, frames) {
        (ObjectKind::Door, _) => 0,
        (_, Some(frames)) => frames.len() as u32,
        (_, None) => 0,
    };
    let tile_id = frames
        .and_then(|f| f.first().copied())
        .or(local)
        .unwrap_or(0);

    let canvas_tile = below.and_then(|layer| {
        let index = grid.tile_index(x, y);
        layer.cells.get(index).copied().flatten()
    });

    let text = object
        .properties
        .iter()
        .find(|p| p.name == "text")
        .and_then(|p| p.value.as_str())
        .map(str::to_string);

    if kind == ObjectKind::Scenery && local.is_none() {
        log::warn!(
            "Object {} '{}' has neither a tile nor a known name",
            object.id,
            object.name
        );
    }

    MapObject {
        object_id: object.id,
        kind,
        local_id: local,
        tile_id,
        x,
        y,
        width,
        height,
        anim_length,
        start_frame: 0,
        current_frame: 0,
        hidden: false,
        canvas_tile,
        text,
    }
}

fn tile_flags_from(properties: &[TiledProperty]) -> TileFlags {
    let mut flags = TileFlags::default();
    for property in properties {
        match name_hash(&property.name) {
            hash::IS_SOLID => flags.is_solid = property.value.as_bool().unwrap_or(false),
            hash::IS_WALL => flags.is_wall = property.value.as_bool().unwrap_or(false),
            hash::IS_DEADLY => flags.is_deadly = property.value.as_bool().unwrap_or(false),
            hash::OFFSET_TOP => {
                flags.offset_top = property.value.as_i64().unwrap_or(0) as i32;
            }
            _ => {}
        }
    }
    flags
}

/// Strip Tiled's flip flags and convert to a tileset-local id.
fn local_id(gid: u32, first_gid: u32) -> Option<u32> {
    let gid = gid & !FLIP_BITS;
    if gid == 0 {
        None
    } else {
        Some(gid.saturating_sub(first_gid))
    }
}

/// `#RRGGBB` or `#AARRGGBB`; the alpha byte is ignored.
fn parse_background(color: Option<&str>) -> u32 {
    let rgb = color
        .map(|c| c.trim_start_matches('#'))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .unwrap_or(0);
    0xff00_0000 | (rgb & 0x00ff_ffff)
}

const fn default_visible() -> bool {
    true
}

const fn default_first_gid() -> u32 {
    1
}
