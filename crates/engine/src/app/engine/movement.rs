use crate::geometry::{Direction, TilePosition, WorldPosition};
use crate::layers::SceneType;

use super::Engine;

/// Keeps clamped positions on the last in-bounds tile.
const EDGE_INSET_PX: f32 = 0.01;

impl Engine {
    pub(super) fn update_movement(&mut self, dt_ms: f32) {
        let (dx, dy) = self.input.direction_vector();
        let Some(facing) = Direction::from_vector(dx, dy) else {
            self.player.moving = false;
            return;
        };
        self.player.facing = facing;

        let length = (dx * dx + dy * dy).sqrt();
        let step = self.config.movement.speed_px_per_ms * dt_ms;
        let move_x = dx / length * step;
        let move_y = dy / length * step;
        match self.scene {
            SceneType::Overworld => self.move_overworld(move_x, move_y),
            SceneType::Interior => self.move_interior(move_x, move_y, dy > 0.0),
        }
    }

    /// Blocked candidates stop the player outright; there is no sliding along walls.
    fn move_overworld(&mut self, move_x: f32, move_y: f32) {
        let Some(current) = self.player.world else {
            self.player.moving = false;
            return;
        };
        let candidate = current.offset(move_x, move_y);
        if !self.is_tile_walkable(candidate.to_tile(self.config.tile_size)) {
            self.player.moving = false;
            return;
        }
        self.player.world = Some(self.clamp_to_world(candidate));
        self.player.moving = true;
    }

    fn move_interior(&mut self, move_x: f32, move_y: f32, holding_down: bool) {
        let Some(room) = self.active_room.clone() else {
            self.player.moving = false;
            return;
        };
        let interior = &self.config.interior;
        let next = room.clamp(
            self.player.interior.offset(move_x, move_y),
            interior.wall_padding_px,
        );
        let at_exit = holding_down
            && room.in_exit_zone(
                next,
                interior.wall_padding_px,
                interior.exit_zone_width_px,
                interior.exit_zone_depth_px,
            );
        self.player.moving = next != self.player.interior;
        self.player.interior = next;
        if at_exit {
            self.exit_interior();
        }
    }

    pub(super) fn is_tile_walkable(&self, tile: TilePosition) -> bool {
        if let Some(check) = &self.collision_check {
            return check(tile);
        }
        self.map
            .as_deref()
            .is_some_and(|map| map.is_walkable(tile))
    }

    fn clamp_to_world(&self, position: WorldPosition) -> WorldPosition {
        let Some(map) = self.map.as_deref() else {
            return position;
        };
        let (width, height) = map.pixel_size(self.config.tile_size);
        WorldPosition::new(
            position.x.clamp(0.0, (width - EDGE_INSET_PX).max(0.0)),
            position.y.clamp(0.0, (height - EDGE_INSET_PX).max(0.0)),
        )
    }
}
