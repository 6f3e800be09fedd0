use std::collections::HashSet;

use overworld_engine::{
    AppPaths, Building, Direction, FloorStyle, Furniture, FurnitureKind, GameMap, InteriorRoom,
    MapTrigger, Npc, Tile, TilePosition, TileType, TriggerType,
};
use serde_json::json;
use tracing::{info, warn};

pub(crate) const VILLAGE_MAP_ID: &str = "village";

const VILLAGE_WIDTH: u32 = 24;
const VILLAGE_HEIGHT: u32 = 18;

/// Map plus the rooms its doors lead into.
#[derive(Debug, Clone)]
pub(crate) struct World {
    pub map: GameMap,
    pub interiors: Vec<InteriorRoom>,
}

impl World {
    /// Room behind a door or transition trigger, from the trigger's `interior` field
    /// or a building that shares the trigger id.
    pub(crate) fn interior_for_trigger(&self, trigger_id: &str) -> Option<&str> {
        let from_data = self
            .map
            .trigger(trigger_id)
            .and_then(|trigger| trigger.data.get("interior"))
            .and_then(|value| value.as_str());
        let from_building = || {
            self.map
                .buildings
                .iter()
                .find(|building| building.trigger_id.as_deref() == Some(trigger_id))
                .and_then(|building| building.interior_id.as_deref())
        };
        from_data
            .or_else(from_building)
            .filter(|room_id| self.interiors.iter().any(|room| room.id == *room_id))
    }

    /// Map tiles plus NPC positions, owned so the engine can keep it.
    pub(crate) fn walkability(&self) -> impl Fn(TilePosition) -> bool + 'static {
        let width = self.map.width as i32;
        let height = self.map.height as i32;
        let walkable: Vec<bool> = self
            .map
            .tiles
            .iter()
            .flat_map(|row| row.iter().map(|tile| tile.walkable))
            .collect();
        let occupied: HashSet<TilePosition> =
            self.map.npcs.iter().map(|npc| npc.position).collect();
        move |tile: TilePosition| {
            if tile.x < 0 || tile.y < 0 || tile.x >= width || tile.y >= height {
                return false;
            }
            let index = (tile.y * width + tile.x) as usize;
            walkable.get(index).copied().unwrap_or(false) && !occupied.contains(&tile)
        }
    }
}

/// `assets/maps/village.json` when present and valid, the built-in village otherwise.
pub(crate) fn load_world(paths: Option<&AppPaths>) -> World {
    let map = paths
        .map(|paths| paths.map_file(VILLAGE_MAP_ID))
        .filter(|path| path.is_file())
        .and_then(|path| match GameMap::from_json_file(&path) {
            Ok(map) => {
                info!(path = %path.display(), "map_file_loaded");
                Some(map)
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "map_file_invalid_using_builtin");
                None
            }
        })
        .unwrap_or_else(village_map);

    World {
        map,
        interiors: vec![inn_room(), cellar_room()],
    }
}

fn tile(kind: TileType) -> Tile {
    let walkable = !matches!(kind, TileType::Water | TileType::Wall | TileType::Tree);
    Tile::new(kind, walkable)
}

fn trigger(id: &str, kind: TriggerType, x: i32, y: i32, data: serde_json::Value) -> MapTrigger {
    MapTrigger {
        id: id.to_string(),
        kind,
        position: TilePosition::new(x, y),
        data,
    }
}

fn building(
    id: &str,
    x: i32,
    y: i32,
    trigger_id: Option<&str>,
    interior_id: Option<&str>,
) -> Building {
    Building {
        id: id.to_string(),
        position: TilePosition::new(x, y),
        width: 3,
        height: 3,
        sprite_id: Some(format!("buildings/{id}")),
        trigger_id: trigger_id.map(str::to_string),
        interior_id: interior_id.map(str::to_string),
    }
}

pub(crate) fn village_map() -> GameMap {
    let mut map = GameMap::filled(
        VILLAGE_MAP_ID,
        VILLAGE_WIDTH,
        VILLAGE_HEIGHT,
        tile(TileType::Grass),
    );
    map.name = "Willow Village".to_string();
    map.spawn_point = TilePosition::new(12, 9);
    map.encounter_rate = Some(0.1);
    map.encounter_pool = vec!["slime".to_string(), "bat".to_string()];

    let (w, h) = (VILLAGE_WIDTH as i32, VILLAGE_HEIGHT as i32);
    for x in 0..w {
        map.set_tile(TilePosition::new(x, 0), tile(TileType::Tree));
        map.set_tile(TilePosition::new(x, h - 1), tile(TileType::Tree));
        map.set_tile(TilePosition::new(x, 9), tile(TileType::Path));
    }
    for y in 0..h {
        map.set_tile(TilePosition::new(0, y), tile(TileType::Tree));
        map.set_tile(TilePosition::new(w - 1, y), tile(TileType::Tree));
        if y > 0 && y < h - 1 {
            map.set_tile(TilePosition::new(12, y), tile(TileType::Path));
        }
    }
    for y in 12..15 {
        for x in 2..7 {
            map.set_tile(TilePosition::new(x, y), tile(TileType::Water));
        }
    }
    map.set_tile(TilePosition::new(4, 12), tile(TileType::Bridge));
    map.set_tile(TilePosition::new(4, 13), tile(TileType::Bridge));
    map.set_tile(TilePosition::new(4, 14), tile(TileType::Bridge));
    for x in 17..21 {
        map.set_tile(TilePosition::new(x, 15), tile(TileType::Flowers));
    }

    map.buildings = vec![
        building("inn", 8, 4, Some("door_inn"), Some("inn")),
        building("shop", 15, 4, None, None),
    ];
    for building in &map.buildings.clone() {
        for y in building.position.y..building.position.y + building.height as i32 {
            for x in building.position.x..building.position.x + building.width as i32 {
                map.set_tile(TilePosition::new(x, y), tile(TileType::Wall));
            }
        }
    }

    let mut cellar_door = tile(TileType::Door);
    cellar_door.trigger_id = Some("door_cellar".to_string());
    map.set_tile(TilePosition::new(4, 15), cellar_door);

    map.triggers = vec![
        trigger(
            "door_inn",
            TriggerType::Transition,
            9,
            7,
            json!({ "interior": "inn" }),
        ),
        trigger(
            "door_cellar",
            TriggerType::Transition,
            4,
            15,
            json!({ "interior": "cellar" }),
        ),
        trigger(
            "shop_general",
            TriggerType::Shop,
            16,
            7,
            json!({ "stock": ["potion", "rope"] }),
        ),
        trigger(
            "tower_lookout",
            TriggerType::Tower,
            20,
            12,
            json!({ "floors": 3 }),
        ),
        trigger(
            "battle_tall_grass",
            TriggerType::Battle,
            19,
            15,
            json!({ "encounter": "slime" }),
        ),
        trigger(
            "story_elder_welcome",
            TriggerType::Story,
            12,
            11,
            json!({ "scene": "welcome" }),
        ),
    ];

    map.npcs = vec![
        Npc {
            id: "npc_elder".to_string(),
            name: "Elder".to_string(),
            position: TilePosition::new(10, 10),
            sprite_id: Some("units/elder".to_string()),
            facing: Direction::Right,
        },
        Npc {
            id: "npc_guard".to_string(),
            name: "Guard".to_string(),
            position: TilePosition::new(14, 2),
            sprite_id: None,
            facing: Direction::Down,
        },
    ];
    map
}

fn furniture(kind: FurnitureKind, x: f32, y: f32, width: f32, height: f32) -> Furniture {
    Furniture {
        kind,
        x,
        y,
        width,
        height,
        sprite_id: None,
    }
}

fn inn_room() -> InteriorRoom {
    InteriorRoom {
        id: "inn".to_string(),
        name: "The Sleepy Willow".to_string(),
        width: 320.0,
        height: 224.0,
        floor: FloorStyle::Wood,
        furniture: vec![
            furniture(FurnitureKind::Rug, 120.0, 120.0, 80.0, 48.0),
            furniture(FurnitureKind::Counter, 40.0, 40.0, 96.0, 28.0),
            furniture(FurnitureKind::Shelf, 48.0, 16.0, 64.0, 20.0),
            furniture(FurnitureKind::Table, 208.0, 88.0, 48.0, 32.0),
            furniture(FurnitureKind::Chair, 190.0, 96.0, 16.0, 16.0),
            furniture(FurnitureKind::Chair, 258.0, 96.0, 16.0, 16.0),
            furniture(FurnitureKind::Fireplace, 248.0, 16.0, 48.0, 32.0),
            furniture(FurnitureKind::Plant, 288.0, 176.0, 16.0, 24.0),
        ],
    }
}

fn cellar_room() -> InteriorRoom {
    InteriorRoom {
        id: "cellar".to_string(),
        name: "Old Cellar".to_string(),
        width: 192.0,
        height: 160.0,
        floor: FloorStyle::Stone,
        furniture: vec![
            furniture(FurnitureKind::Shelf, 24.0, 16.0, 64.0, 20.0),
            furniture(FurnitureKind::Bed, 132.0, 24.0, 36.0, 52.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_village_is_valid_and_spawn_is_walkable() {
        let map = village_map();
        map.validate().expect("valid map");
        assert!(map.is_walkable(map.spawn_point));
    }

    #[test]
    fn every_door_trigger_leads_to_a_known_room() {
        let world = load_world(None);
        assert_eq!(world.interior_for_trigger("door_inn"), Some("inn"));
        assert_eq!(world.interior_for_trigger("door_cellar"), Some("cellar"));
        assert_eq!(world.interior_for_trigger("shop_general"), None);
    }

    #[test]
    fn walkability_blocks_npcs_and_walls() {
        let world = load_world(None);
        let walkable = world.walkability();
        assert!(walkable(TilePosition::new(12, 9)));
        assert!(!walkable(TilePosition::new(10, 10)));
        assert!(!walkable(TilePosition::new(9, 5)));
        assert!(!walkable(TilePosition::new(-1, 3)));
        assert!(walkable(TilePosition::new(4, 13)));
    }

    #[test]
    fn map_file_overrides_builtin_and_bad_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::from_root(dir.path().to_path_buf());
        std::fs::create_dir_all(&paths.maps_dir).expect("maps dir");

        let mut small = GameMap::filled(VILLAGE_MAP_ID, 4, 3, tile(TileType::Sand));
        small.spawn_point = TilePosition::new(1, 1);
        let json = serde_json::to_string(&small).expect("encode");
        std::fs::write(paths.map_file(VILLAGE_MAP_ID), json).expect("write");
        assert_eq!(load_world(Some(&paths)).map.width, 4);

        std::fs::write(paths.map_file(VILLAGE_MAP_ID), "{\"id\":1}").expect("write");
        assert_eq!(load_world(Some(&paths)).map.width, VILLAGE_WIDTH);
    }
}
