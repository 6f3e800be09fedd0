use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, WorldPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FurnitureKind {
    Rug,
    Table,
    Chair,
    Bed,
    Shelf,
    Counter,
    Plant,
    Fireplace,
}

impl FurnitureKind {
    /// Flat pieces are drawn under everything else instead of being depth sorted.
    pub fn is_flat(self) -> bool {
        matches!(self, FurnitureKind::Rug)
    }
}

/// Room-local placement in pixels, origin at the room's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Furniture {
    pub kind: FurnitureKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub sprite_id: Option<String>,
}

impl Furniture {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorStyle {
    #[default]
    Wood,
    Stone,
    Carpet,
}

/// Single-room interior, sized in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteriorRoom {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub floor: FloorStyle,
    #[serde(default)]
    pub furniture: Vec<Furniture>,
}

impl InteriorRoom {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Spawn point just inside the bottom-center exit.
    pub fn entrance(&self, wall_padding: f32) -> WorldPosition {
        WorldPosition::new(self.width * 0.5, self.height - wall_padding - 1.0)
    }

    /// Keeps a point inside the walkable part of the room.
    pub fn clamp(&self, position: WorldPosition, wall_padding: f32) -> WorldPosition {
        let max_x = (self.width - wall_padding).max(wall_padding);
        let max_y = (self.height - wall_padding).max(wall_padding);
        WorldPosition::new(
            position.x.clamp(wall_padding, max_x),
            position.y.clamp(wall_padding, max_y),
        )
    }

    pub fn in_exit_zone(
        &self,
        position: WorldPosition,
        wall_padding: f32,
        exit_zone_width: f32,
        exit_zone_depth: f32,
    ) -> bool {
        let center_x = self.width * 0.5;
        let near_center = (position.x - center_x).abs() <= exit_zone_width * 0.5;
        let near_bottom = position.y >= self.height - wall_padding - exit_zone_depth;
        near_center && near_bottom
    }
}
