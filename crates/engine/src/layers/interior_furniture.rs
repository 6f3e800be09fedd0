use std::borrow::Cow;
use std::sync::Arc;

use crate::geometry::Direction;
use crate::rendering::{with_alpha, PlaceholderKind, RenderTarget};
use crate::room::InteriorRoom;
use crate::sprite_keys::unit_sprite_candidates;

use super::entity::character_bounds;
use super::{draw_depth_sorted, AmbientState, DepthItem, Layer, PlayerVisual};

/// Indoor lamps keep most of the night out.
const INDOOR_AMBIENT_SCALE: f32 = 0.35;
const DEFAULT_UNIT: &str = "player";

/// Standing furniture and the player, depth sorted together.
pub struct InteriorFurnitureLayer {
    room: Option<Arc<InteriorRoom>>,
    player: PlayerVisual,
    ambient: AmbientState,
}

impl InteriorFurnitureLayer {
    pub fn new() -> Self {
        Self {
            room: None,
            player: PlayerVisual::default(),
            ambient: AmbientState::default(),
        }
    }
}

impl Default for InteriorFurnitureLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for InteriorFurnitureLayer {
    fn name(&self) -> &'static str {
        "interior_furniture"
    }

    fn z_index(&self) -> i32 {
        1
    }

    fn set_room(&mut self, room: Option<&Arc<InteriorRoom>>) {
        self.room = room.cloned();
    }

    fn set_player(&mut self, player: &PlayerVisual) {
        self.player.clone_from(player);
    }

    fn set_ambient(&mut self, ambient: &AmbientState) {
        self.ambient = *ambient;
    }

    fn render(&self, target: &mut RenderTarget<'_>) {
        let Some(room) = self.room.as_deref() else {
            return;
        };
        let mut items: Vec<DepthItem<'_>> = room
            .furniture
            .iter()
            .filter(|piece| !piece.kind.is_flat())
            .map(|piece| DepthItem {
                kind: PlaceholderKind::Furniture(piece.kind),
                bounds: piece.bounds(),
                sprite_id: piece.sprite_id.as_deref().map(Cow::Borrowed),
                seed: &room.id,
                facing: Direction::Down,
            })
            .collect();

        if let Some(position) = self.player.position {
            let unit = self.player.unit_id.as_deref().unwrap_or(DEFAULT_UNIT);
            let [specific, generic] = unit_sprite_candidates(unit, self.player.facing.as_str());
            let sprite_id = target
                .sprites
                .first_available(&[specific.as_str(), generic.as_str()])
                .map(|id| Cow::Owned(id.to_string()));
            items.push(DepthItem {
                kind: PlaceholderKind::Player,
                bounds: character_bounds(position, target.tile_size),
                sprite_id,
                seed: "player",
                facing: self.player.facing,
            });
        }
        draw_depth_sorted(target, &mut items);
    }

    fn render_overlay(&self, target: &mut RenderTarget<'_>) {
        let light = self.ambient.light;
        if self.room.is_none() || light.alpha <= 0.0 {
            return;
        }
        target
            .canvas
            .wash(with_alpha(light.color, light.alpha * INDOOR_AMBIENT_SCALE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::geometry::WorldPosition;
    use crate::rendering::{Canvas, SpriteCache, ViewTransform};
    use crate::room::{FloorStyle, Furniture, FurnitureKind};

    #[test]
    fn draws_furniture_and_player_inside_room() {
        let room = Arc::new(InteriorRoom {
            id: "shop".to_string(),
            name: "Shop".to_string(),
            width: 128.0,
            height: 96.0,
            floor: FloorStyle::Wood,
            furniture: vec![Furniture {
                kind: FurnitureKind::Counter,
                x: 16.0,
                y: 16.0,
                width: 48.0,
                height: 16.0,
                sprite_id: None,
            }],
        });
        let mut layer = InteriorFurnitureLayer::new();
        layer.set_room(Some(&room));
        layer.set_player(&PlayerVisual {
            position: Some(WorldPosition::new(96.0, 60.0)),
            facing: Direction::Down,
            unit_id: None,
            moving: false,
        });

        let mut frame = vec![0u8; 128 * 96 * 4];
        let mut sprites = SpriteCache::new(None);
        let camera = Camera::new(128.0, 96.0, 0.1);
        let mut target = RenderTarget {
            canvas: Canvas::new(&mut frame, 128, 96),
            sprites: &mut sprites,
            camera: &camera,
            view: ViewTransform::centered(128.0, 96.0, 128, 96),
            tile_size: 32.0,
            clock_ms: 0.0,
        };
        layer.render(&mut target);
        assert!(target.canvas.pixel(20, 20).is_some_and(|pixel| pixel[3] == 255));
        assert!(target.canvas.pixel(96, 60).is_some_and(|pixel| pixel[3] == 255));
        assert_eq!(target.canvas.pixel(120, 90), Some([0, 0, 0, 0]));
    }
}
