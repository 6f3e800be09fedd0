use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Rect, TilePosition, WorldPosition};
use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Grass,
    Path,
    Sand,
    Flowers,
    Water,
    Bridge,
    Wall,
    Floor,
    Door,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    #[serde(rename = "type")]
    pub kind: TileType,
    pub walkable: bool,
    #[serde(default)]
    pub sprite_id: Option<String>,
    #[serde(default)]
    pub trigger_id: Option<String>,
}

impl Tile {
    pub fn new(kind: TileType, walkable: bool) -> Self {
        Self {
            kind,
            walkable,
            sprite_id: None,
            trigger_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub position: TilePosition,
    #[serde(default)]
    pub sprite_id: Option<String>,
    #[serde(default)]
    pub facing: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Battle,
    Npc,
    Transition,
    Story,
    Shop,
    Tower,
}

/// Authoring record; the engine only detects proximity to it; effects belong to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTrigger {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TriggerType,
    pub position: TilePosition,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Pseudo-3D building footprint in tiles. The door sits on the bottom edge, centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: String,
    pub position: TilePosition,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub sprite_id: Option<String>,
    #[serde(default)]
    pub trigger_id: Option<String>,
    #[serde(default)]
    pub interior_id: Option<String>,
}

impl Building {
    pub fn footprint(&self, tile_size: f32) -> Rect {
        Rect::new(
            self.position.x as f32 * tile_size,
            self.position.y as f32 * tile_size,
            self.width as f32 * tile_size,
            self.height as f32 * tile_size,
        )
    }

    pub fn door_world(&self, tile_size: f32) -> WorldPosition {
        let footprint = self.footprint(tile_size);
        WorldPosition::new(footprint.x + footprint.width * 0.5, footprint.bottom())
    }

    /// Bottom-right tile covered by the footprint.
    pub fn last_tile(&self) -> TilePosition {
        let span = |extent: u32| i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX);
        TilePosition::new(
            self.position.x.saturating_add(span(self.width)),
            self.position.y.saturating_add(span(self.height)),
        )
    }

    /// First walkable tile in front of the door.
    pub fn approach_tile(&self) -> TilePosition {
        TilePosition::new(
            self.position.x + self.width as i32 / 2,
            self.position.y + self.height as i32,
        )
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map {map_id}: expected {expected} tile rows, got {actual}")]
    RowCountMismatch {
        map_id: String,
        expected: u32,
        actual: usize,
    },
    #[error("map {map_id}: row {row} has {actual} tiles, expected {expected}")]
    RowWidthMismatch {
        map_id: String,
        row: usize,
        expected: u32,
        actual: usize,
    },
    #[error("map {map_id}: spawn point ({x},{y}) lies outside the map")]
    SpawnOutOfBounds { map_id: String, x: i32, y: i32 },
    #[error("map {map_id}: {kind} {id} at ({x},{y}) lies outside the map")]
    EntityOutOfBounds {
        map_id: String,
        kind: &'static str,
        id: String,
        x: i32,
        y: i32,
    },
    #[error("failed to read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode map at {path}: {message}")]
    Decode { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMap {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Vec<Tile>>,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub triggers: Vec<MapTrigger>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    pub spawn_point: TilePosition,
    #[serde(default)]
    pub encounter_rate: Option<f32>,
    #[serde(default)]
    pub encounter_pool: Vec<String>,
}

impl GameMap {
    /// Uniform map, mostly for authoring helpers and tests.
    pub fn filled(id: &str, width: u32, height: u32, tile: Tile) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            width,
            height,
            tiles: vec![vec![tile; width as usize]; height as usize],
            npcs: Vec::new(),
            triggers: Vec::new(),
            buildings: Vec::new(),
            spawn_point: TilePosition::new(0, 0),
            encounter_rate: None,
            encounter_pool: Vec::new(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, MapError> {
        let deserializer = &mut serde_json::Deserializer::from_str(raw);
        let map: GameMap =
            serde_path_to_error::deserialize(deserializer).map_err(|error| MapError::Decode {
                path: error.path().to_string(),
                message: error.inner().to_string(),
            })?;
        map.validate()?;
        Ok(map)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, MapError> {
        let map: GameMap =
            serde_path_to_error::deserialize(value).map_err(|error| MapError::Decode {
                path: error.path().to_string(),
                message: error.inner().to_string(),
            })?;
        map.validate()?;
        Ok(map)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, MapError> {
        let raw = fs::read_to_string(path).map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if self.tiles.len() != self.height as usize {
            return Err(MapError::RowCountMismatch {
                map_id: self.id.clone(),
                expected: self.height,
                actual: self.tiles.len(),
            });
        }
        for (row, tiles) in self.tiles.iter().enumerate() {
            if tiles.len() != self.width as usize {
                return Err(MapError::RowWidthMismatch {
                    map_id: self.id.clone(),
                    row,
                    expected: self.width,
                    actual: tiles.len(),
                });
            }
        }
        if !self.in_bounds(self.spawn_point) {
            return Err(MapError::SpawnOutOfBounds {
                map_id: self.id.clone(),
                x: self.spawn_point.x,
                y: self.spawn_point.y,
            });
        }
        for trigger in &self.triggers {
            self.check_placement("trigger", &trigger.id, trigger.position)?;
        }
        for npc in &self.npcs {
            self.check_placement("npc", &npc.id, npc.position)?;
        }
        for building in &self.buildings {
            self.check_placement("building", &building.id, building.position)?;
            self.check_placement("building", &building.id, building.last_tile())?;
        }
        Ok(())
    }

    fn check_placement(
        &self,
        kind: &'static str,
        id: &str,
        position: TilePosition,
    ) -> Result<(), MapError> {
        if self.in_bounds(position) {
            return Ok(());
        }
        Err(MapError::EntityOutOfBounds {
            map_id: self.id.clone(),
            kind,
            id: id.to_string(),
            x: position.x,
            y: position.y,
        })
    }

    pub fn in_bounds(&self, position: TilePosition) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    pub fn tile_at(&self, position: TilePosition) -> Option<&Tile> {
        if !self.in_bounds(position) {
            return None;
        }
        self.tiles
            .get(position.y as usize)
            .and_then(|row| row.get(position.x as usize))
    }

    /// Out-of-range lookups are never walkable.
    pub fn is_walkable(&self, position: TilePosition) -> bool {
        self.tile_at(position).is_some_and(|tile| tile.walkable)
    }

    pub fn pixel_size(&self, tile_size: f32) -> (f32, f32) {
        (self.width as f32 * tile_size, self.height as f32 * tile_size)
    }

    pub fn trigger(&self, id: &str) -> Option<&MapTrigger> {
        self.triggers.iter().find(|trigger| trigger.id == id)
    }

    pub fn trigger_at(&self, position: TilePosition) -> Option<&MapTrigger> {
        self.triggers
            .iter()
            .find(|trigger| trigger.position == position)
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|building| building.id == id)
    }

    pub fn set_tile(&mut self, position: TilePosition, tile: Tile) {
        if !self.in_bounds(position) {
            return;
        }
        if let Some(slot) = self
            .tiles
            .get_mut(position.y as usize)
            .and_then(|row| row.get_mut(position.x as usize))
        {
            *slot = tile;
        }
    }
}
