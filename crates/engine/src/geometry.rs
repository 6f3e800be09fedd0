use serde::{Deserialize, Serialize};

/// Continuous pixel-space location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Floor-divides by `tile_size`. Negative coordinates map to negative tiles.
    pub fn to_tile(self, tile_size: f32) -> TilePosition {
        TilePosition {
            x: (self.x / tile_size).floor() as i32,
            y: (self.y / tile_size).floor() as i32,
        }
    }

    pub fn distance_to(self, other: WorldPosition) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center of this tile in world space.
    pub fn to_world_center(self, tile_size: f32) -> WorldPosition {
        WorldPosition {
            x: (self.x as f32 + 0.5) * tile_size,
            y: (self.y as f32 + 0.5) * tile_size,
        }
    }

    pub fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.unit_vector();
        Self {
            x: self.x + dx as i32,
            y: self.y + dy as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Screen-space unit vector; +y points down.
    pub const fn unit_vector(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Facing for a movement vector, picked from the dominant axis.
    /// Ties resolve to the vertical axis. Returns `None` for a zero vector.
    pub fn from_vector(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Some(if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            })
        }
    }
}

/// Axis-aligned rectangle in world pixels; `y + height` is the bottom edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || other.right() < self.x
            || self.bottom() < other.y
            || other.bottom() < self.y)
    }

    pub fn contains(&self, point: WorldPosition) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

/// Inclusive tile range, already clamped to a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_tile_floors_including_negative_coordinates() {
        assert_eq!(
            WorldPosition::new(63.9, 32.0).to_tile(32.0),
            TilePosition::new(1, 1)
        );
        assert_eq!(
            WorldPosition::new(-0.5, -33.0).to_tile(32.0),
            TilePosition::new(-1, -2)
        );
    }

    #[test]
    fn tile_center_round_trips_to_same_tile() {
        for (x, y) in [(0, 0), (5, 6), (9, 2)] {
            let tile = TilePosition::new(x, y);
            let center = tile.to_world_center(32.0);
            assert_eq!(center.to_tile(32.0), tile);
        }
        let center = TilePosition::new(2, 3).to_world_center(16.0);
        assert_eq!(center, WorldPosition::new(40.0, 56.0));
    }

    #[test]
    fn facing_uses_dominant_axis_and_ties_go_vertical() {
        assert_eq!(Direction::from_vector(1.0, 0.2), Some(Direction::Right));
        assert_eq!(Direction::from_vector(-0.9, 0.1), Some(Direction::Left));
        assert_eq!(Direction::from_vector(0.7, -0.7), Some(Direction::Up));
        assert_eq!(Direction::from_vector(0.0, 1.0), Some(Direction::Down));
        assert_eq!(Direction::from_vector(0.0, 0.0), None);
    }

    #[test]
    fn rect_intersection_is_inclusive_of_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(a.contains(WorldPosition::new(5.0, 10.0)));
    }

    #[test]
    fn neighbor_follows_screen_axes() {
        let origin = TilePosition::new(5, 6);
        assert_eq!(origin.neighbor(Direction::Up), TilePosition::new(5, 5));
        assert_eq!(origin.neighbor(Direction::Right), TilePosition::new(6, 6));
    }
}
