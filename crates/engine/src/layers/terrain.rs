use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, TileRect};
use crate::map::{GameMap, TileType};
use crate::rendering::{with_alpha, Canvas, RenderTarget, Rgba, ScreenRect};

use super::Layer;

const GRASS: Rgba = [92, 156, 72, 255];
const GRASS_DARK: Rgba = [76, 138, 60, 255];
const PATH: Rgba = [198, 172, 122, 255];
const PATH_PEBBLE: Rgba = [168, 142, 98, 255];
const SAND: Rgba = [228, 208, 150, 255];
const WATER: Rgba = [58, 120, 196, 255];
const WATER_SHINE: Rgba = [164, 208, 248, 255];
const BRIDGE: Rgba = [152, 110, 68, 255];
const BRIDGE_GAP: Rgba = [104, 72, 42, 255];
const WALL: Rgba = [122, 118, 114, 255];
const MORTAR: Rgba = [88, 84, 82, 255];
const FLOOR: Rgba = [178, 142, 102, 255];
const DOOR: Rgba = [112, 70, 40, 255];
const DOOR_FRAME: Rgba = [64, 42, 26, 255];
const PETALS: [Rgba; 3] = [
    [238, 96, 124, 255],
    [250, 224, 96, 255],
    [244, 244, 250, 255],
];

/// How the terrain maps the tile grid onto the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainMode {
    /// Camera-relative, culled to the visible tiles.
    #[default]
    World,
    /// Whole grid stretched over the canvas, for small hand-authored maps.
    Scene,
}

pub struct TerrainLayer {
    map: Option<Arc<GameMap>>,
    mode: TerrainMode,
    tile_size: f32,
}

impl TerrainLayer {
    pub fn new(tile_size: f32) -> Self {
        Self {
            map: None,
            mode: TerrainMode::World,
            tile_size,
        }
    }

    fn tile_range(&self, map: &GameMap, target: &RenderTarget<'_>) -> Option<TileRect> {
        match self.mode {
            TerrainMode::World => {
                target
                    .camera
                    .visible_tile_bounds(self.tile_size, map.width, map.height)
            }
            TerrainMode::Scene => {
                if map.width == 0 || map.height == 0 {
                    return None;
                }
                Some(TileRect {
                    x_min: 0,
                    x_max: map.width - 1,
                    y_min: 0,
                    y_max: map.height - 1,
                })
            }
        }
    }
}

fn tile_noise(x: u32, y: u32) -> u32 {
    let mut hash = x.wrapping_mul(0x9e37_79b1) ^ y.wrapping_mul(0x85eb_ca77);
    hash ^= hash >> 15;
    hash = hash.wrapping_mul(0xc2b2_ae3d);
    hash ^ (hash >> 13)
}

fn draw_procedural_tile(
    canvas: &mut Canvas<'_>,
    kind: TileType,
    rect: ScreenRect,
    noise: u32,
    clock_ms: f64,
) {
    let unit = (rect.width / 8).max(1);
    match kind {
        TileType::Grass | TileType::Tree => {
            canvas.fill(rect, GRASS);
            for blade in 0..3u32 {
                let bits = noise >> (blade * 8);
                let x = rect.x + (bits % 7) as i32 * unit;
                let y = rect.y + ((bits >> 3) % 7) as i32 * unit;
                canvas.fill_rect(x, y, unit, unit * 2, GRASS_DARK);
            }
        }
        TileType::Flowers => {
            canvas.fill(rect, GRASS);
            for flower in 0..4u32 {
                let bits = noise >> (flower * 7);
                let x = rect.x + (bits % 7) as i32 * unit + unit / 2;
                let y = rect.y + ((bits >> 3) % 7) as i32 * unit + unit / 2;
                let petal = PETALS[(bits >> 5) as usize % PETALS.len()];
                canvas.fill_rect(x, y, unit.max(2), unit.max(2), petal);
            }
        }
        TileType::Path => {
            canvas.fill(rect, PATH);
            let x = rect.x + (noise % 6) as i32 * unit + unit;
            let y = rect.y + ((noise >> 4) % 6) as i32 * unit + unit;
            canvas.fill_rect(x, y, unit, unit, PATH_PEBBLE);
        }
        TileType::Sand => canvas.fill(rect, SAND),
        TileType::Water => {
            canvas.fill(rect, WATER);
            let wave = ((clock_ms / 600.0) as f32 + (noise % 11) as f32).sin();
            let y = rect.y + rect.height / 2 + (wave * unit as f32 * 1.5) as i32;
            let shine = with_alpha(WATER_SHINE, 0.6);
            canvas.fill_rect(rect.x + unit, y, rect.width / 2, unit.max(1), shine);
        }
        TileType::Bridge => {
            canvas.fill(rect, BRIDGE);
            let plank = (rect.height / 4).max(1);
            for row in 1..4 {
                canvas.fill_rect(rect.x, rect.y + row * plank, rect.width, 1, BRIDGE_GAP);
            }
        }
        TileType::Wall => {
            canvas.fill(rect, WALL);
            let course = (rect.height / 4).max(1);
            for row in 0..4 {
                let y = rect.y + row * course;
                canvas.fill_rect(rect.x, y, rect.width, 1, MORTAR);
                let offset = if row % 2 == 0 {
                    rect.width / 2
                } else {
                    rect.width / 4
                };
                canvas.fill_rect(rect.x + offset, y, 1, course, MORTAR);
            }
        }
        TileType::Floor => {
            canvas.fill(rect, FLOOR);
            canvas.fill_rect(rect.x, rect.y, rect.width, 1, with_alpha(MORTAR, 0.4));
        }
        TileType::Door => {
            canvas.fill(rect, DOOR_FRAME);
            canvas.fill_rect(
                rect.x + unit,
                rect.y + unit,
                rect.width - unit * 2,
                rect.height - unit,
                DOOR,
            );
            let knob_x = rect.x + rect.width - unit * 3;
            canvas.fill_rect(knob_x, rect.y + rect.height / 2, unit, unit, PATH);
        }
    }
}

impl Layer for TerrainLayer {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn z_index(&self) -> i32 {
        2
    }

    fn set_map(&mut self, map: Option<&Arc<GameMap>>) {
        self.map = map.cloned();
    }

    fn set_terrain_mode(&mut self, mode: TerrainMode) {
        self.mode = mode;
    }

    fn render(&self, target: &mut RenderTarget<'_>) {
        let Some(map) = self.map.as_deref() else {
            return;
        };
        let Some(range) = self.tile_range(map, target) else {
            return;
        };
        for y in range.y_min..=range.y_max {
            let Some(row) = map.tiles.get(y as usize) else {
                continue;
            };
            for x in range.x_min..=range.x_max {
                let Some(tile) = row.get(x as usize) else {
                    continue;
                };
                let world = Rect::new(
                    x as f32 * self.tile_size,
                    y as f32 * self.tile_size,
                    self.tile_size,
                    self.tile_size,
                );
                let rect = target.view.rect_to_screen(world);
                if target.draw_sprite(tile.sprite_id.as_deref(), rect) {
                    continue;
                }
                draw_procedural_tile(
                    &mut target.canvas,
                    tile.kind,
                    rect,
                    tile_noise(x, y),
                    target.clock_ms,
                );
            }
        }
    }
}
