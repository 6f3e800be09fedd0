use std::borrow::Cow;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::{Direction, Rect, WorldPosition};
use crate::map::{GameMap, TileType};
use crate::rendering::{
    building_windows, palette_index, with_alpha, PlaceholderKind, RenderTarget, Rgba,
};
use crate::sprite_keys::unit_sprite_candidates;

use super::{draw_depth_sorted, AmbientState, DepthItem, Layer, PlayerVisual};

const TREE_SPRITE: &str = "scenery/tree";
const DECORATION_SPRITES: [&str; 3] = [
    "scenery/flower_red",
    "scenery/flower_yellow",
    "scenery/rock",
];
const DECORATION_CHANCE: f64 = 0.04;
const DEFAULT_UNIT: &str = "player";
const WINDOW_GLOW: Rgba = [255, 206, 112, 255];
/// Character feet sit this far below the tile center.
const FEET_OFFSET_TILES: f32 = 0.4;

struct Scenery {
    kind: PlaceholderKind,
    bounds: Rect,
    sprite_id: &'static str,
    seed: String,
}

/// Figure bounds for a character standing with feet near `position`.
pub(crate) fn character_bounds(position: WorldPosition, tile_size: f32) -> Rect {
    let width = tile_size * 0.75;
    let height = tile_size * 1.1;
    let bottom = position.y + tile_size * FEET_OFFSET_TILES;
    Rect::new(position.x - width * 0.5, bottom - height, width, height)
}

fn map_seed(map_id: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in map_id.bytes() {
        hash = (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

fn seed_scenery(map: &GameMap, tile_size: f32) -> Vec<Scenery> {
    let mut rng = ChaCha8Rng::seed_from_u64(map_seed(&map.id));
    let mut scenery = Vec::new();
    for (y, row) in map.tiles.iter().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let origin_x = x as f32 * tile_size;
            let bottom = (y + 1) as f32 * tile_size;
            match tile.kind {
                TileType::Tree => {
                    let width = tile_size * rng.gen_range(1.0..1.3);
                    let height = tile_size * rng.gen_range(1.4..1.9);
                    let jitter = tile_size * rng.gen_range(-0.1..0.1);
                    scenery.push(Scenery {
                        kind: PlaceholderKind::Tree,
                        bounds: Rect::new(
                            origin_x + (tile_size - width) * 0.5 + jitter,
                            bottom - height,
                            width,
                            height,
                        ),
                        sprite_id: TREE_SPRITE,
                        seed: format!("tree_{x}_{y}"),
                    });
                }
                TileType::Grass if rng.gen_bool(DECORATION_CHANCE) => {
                    let size = tile_size * 0.4;
                    let offset_x = rng.gen_range(0.0..tile_size - size);
                    let offset_y = rng.gen_range(0.0..tile_size - size);
                    let seed = format!("decoration_{x}_{y}");
                    let variant = palette_index(&seed, DECORATION_SPRITES.len());
                    let sprite_id = DECORATION_SPRITES[variant];
                    scenery.push(Scenery {
                        kind: PlaceholderKind::Decoration,
                        bounds: Rect::new(
                            origin_x + offset_x,
                            y as f32 * tile_size + offset_y,
                            size,
                            size,
                        ),
                        sprite_id,
                        seed,
                    });
                }
                _ => {}
            }
        }
    }
    scenery
}

/// Buildings, trees, decorations, NPCs and the player, Y-sorted every frame.
pub struct EntityLayer {
    tile_size: f32,
    map: Option<Arc<GameMap>>,
    scenery: Vec<Scenery>,
    player: PlayerVisual,
    ambient: AmbientState,
}

impl EntityLayer {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            map: None,
            scenery: Vec::new(),
            player: PlayerVisual::default(),
            ambient: AmbientState::default(),
        }
    }

    pub fn scenery_count(&self) -> usize {
        self.scenery.len()
    }

    fn collect_items<'s>(
        &'s self,
        target: &mut RenderTarget<'_>,
        unit_sprite: &'s mut Option<String>,
    ) -> Vec<DepthItem<'s>> {
        let mut items = Vec::with_capacity(self.scenery.len() + 8);
        if let Some(map) = self.map.as_deref() {
            for building in &map.buildings {
                items.push(DepthItem {
                    kind: PlaceholderKind::Building,
                    bounds: building.footprint(self.tile_size),
                    sprite_id: building.sprite_id.as_deref().map(Cow::Borrowed),
                    seed: &building.id,
                    facing: Direction::Down,
                });
            }
            for npc in &map.npcs {
                let feet = npc.position.to_world_center(self.tile_size);
                items.push(DepthItem {
                    kind: PlaceholderKind::Npc,
                    bounds: character_bounds(feet, self.tile_size),
                    sprite_id: npc.sprite_id.as_deref().map(Cow::Borrowed),
                    seed: &npc.id,
                    facing: npc.facing,
                });
            }
        }
        for scenery in &self.scenery {
            items.push(DepthItem {
                kind: scenery.kind,
                bounds: scenery.bounds,
                sprite_id: Some(Cow::Borrowed(scenery.sprite_id)),
                seed: &scenery.seed,
                facing: Direction::Down,
            });
        }
        if let Some(position) = self.player.position {
            let unit = self.player.unit_id.as_deref().unwrap_or(DEFAULT_UNIT);
            let [specific, generic] = unit_sprite_candidates(unit, self.player.facing.as_str());
            *unit_sprite = target
                .sprites
                .first_available(&[specific.as_str(), generic.as_str()])
                .map(str::to_string);
            items.push(DepthItem {
                kind: PlaceholderKind::Player,
                bounds: character_bounds(position, self.tile_size),
                sprite_id: unit_sprite.as_deref().map(Cow::Borrowed),
                seed: "player",
                facing: self.player.facing,
            });
        }
        items
    }
}

impl Layer for EntityLayer {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn z_index(&self) -> i32 {
        3
    }

    fn set_map(&mut self, map: Option<&Arc<GameMap>>) {
        self.map = map.cloned();
        self.scenery = self
            .map
            .as_deref()
            .map(|map| seed_scenery(map, self.tile_size))
            .unwrap_or_default();
    }

    fn set_ambient(&mut self, ambient: &AmbientState) {
        self.ambient = *ambient;
    }

    fn set_player(&mut self, player: &PlayerVisual) {
        self.player.clone_from(player);
    }

    fn render(&self, target: &mut RenderTarget<'_>) {
        let mut unit_sprite = None;
        let mut items = self.collect_items(target, &mut unit_sprite);
        draw_depth_sorted(target, &mut items);
    }

    fn render_overlay(&self, target: &mut RenderTarget<'_>) {
        let light = self.ambient.light;
        if light.alpha > 0.0 {
            target.canvas.wash(with_alpha(light.color, light.alpha));
        }
        if !self.ambient.is_night() {
            return;
        }
        let Some(map) = self.map.as_deref() else {
            return;
        };
        for building in &map.buildings {
            let footprint = building.footprint(self.tile_size);
            if !target.is_visible(footprint, 0) {
                continue;
            }
            let rect = target.view.rect_to_screen(footprint);
            for window in building_windows(rect) {
                let halo = window.width.max(window.height);
                target.canvas.fill_circle(
                    window.x + window.width / 2,
                    window.y + window.height / 2,
                    halo,
                    with_alpha(WINDOW_GLOW, 0.18),
                );
                target.canvas.fill(window, with_alpha(WINDOW_GLOW, 0.9));
            }
        }
    }
}
