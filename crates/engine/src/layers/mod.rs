mod background;
mod depth;
mod entity;
mod interior_floor;
mod interior_furniture;
mod sky;
mod terrain;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use background::BackgroundLayer;
pub use depth::{draw_depth_sorted, sort_by_depth, DepthItem};
pub use entity::EntityLayer;
pub use interior_floor::InteriorFloorLayer;
pub use interior_furniture::InteriorFurnitureLayer;
pub use sky::SkyLayer;
pub use terrain::{TerrainLayer, TerrainMode};

use crate::geometry::{Direction, WorldPosition};
use crate::map::GameMap;
use crate::rendering::RenderTarget;
use crate::room::InteriorRoom;
use crate::systems::{AmbientLight, DayPeriod, TimeOfDay, Weather};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    #[default]
    Overworld,
    Interior,
}

impl SceneType {
    pub const fn as_str(self) -> &'static str {
        match self {
            SceneType::Overworld => "overworld",
            SceneType::Interior => "interior",
        }
    }
}

/// Time and weather snapshot pushed to layers each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientState {
    pub phase: f32,
    pub period: DayPeriod,
    pub darkness: f32,
    pub light: AmbientLight,
    pub weather: Weather,
}

impl AmbientState {
    pub fn from_time(time: &TimeOfDay, weather: Weather) -> Self {
        Self {
            phase: time.phase(),
            period: time.period(),
            darkness: time.darkness(),
            light: time.ambient_light(),
            weather,
        }
    }

    pub fn is_night(&self) -> bool {
        self.period == DayPeriod::Night
    }
}

impl Default for AmbientState {
    fn default() -> Self {
        Self {
            phase: 0.5,
            period: DayPeriod::Day,
            darkness: 0.0,
            light: AmbientLight::NONE,
            weather: Weather::Clear,
        }
    }
}

/// What the layers need to draw the player.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerVisual {
    /// Feet position in the active scene's coordinates. `None` hides the player.
    pub position: Option<WorldPosition>,
    pub facing: Direction,
    pub unit_id: Option<String>,
    pub moving: bool,
}

pub trait Layer {
    fn name(&self) -> &'static str;

    fn z_index(&self) -> i32;

    fn set_map(&mut self, _map: Option<&Arc<GameMap>>) {}

    fn set_room(&mut self, _room: Option<&Arc<InteriorRoom>>) {}

    fn set_ambient(&mut self, _ambient: &AmbientState) {}

    fn set_player(&mut self, _player: &PlayerVisual) {}

    fn set_terrain_mode(&mut self, _mode: TerrainMode) {}

    fn update(&mut self, _dt_ms: f32) {}

    fn render(&self, target: &mut RenderTarget<'_>);

    /// Second pass drawn after every layer's `render`, in the same order.
    fn render_overlay(&self, _target: &mut RenderTarget<'_>) {}
}

/// Layers kept sorted by `z_index`; equal indices keep insertion order.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
        self.layers.sort_by_key(|layer| layer.z_index());
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    pub fn set_map(&mut self, map: Option<&Arc<GameMap>>) {
        for layer in &mut self.layers {
            layer.set_map(map);
        }
    }

    pub fn set_room(&mut self, room: Option<&Arc<InteriorRoom>>) {
        for layer in &mut self.layers {
            layer.set_room(room);
        }
    }

    pub fn set_ambient(&mut self, ambient: &AmbientState) {
        for layer in &mut self.layers {
            layer.set_ambient(ambient);
        }
    }

    pub fn set_player(&mut self, player: &PlayerVisual) {
        for layer in &mut self.layers {
            layer.set_player(player);
        }
    }

    pub fn set_terrain_mode(&mut self, mode: TerrainMode) {
        for layer in &mut self.layers {
            layer.set_terrain_mode(mode);
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        for layer in &mut self.layers {
            layer.update(dt_ms);
        }
    }

    pub fn render(&self, target: &mut RenderTarget<'_>) {
        for layer in &self.layers {
            layer.render(target);
        }
        for layer in &self.layers {
            layer.render_overlay(target);
        }
    }
}

pub fn overworld_stack(tile_size: f32) -> LayerStack {
    let mut stack = LayerStack::new();
    stack.push(Box::new(EntityLayer::new(tile_size)));
    stack.push(Box::new(TerrainLayer::new(tile_size)));
    stack.push(Box::new(BackgroundLayer::new()));
    stack.push(Box::new(SkyLayer::new()));
    stack
}

pub fn interior_stack(wall_padding: f32) -> LayerStack {
    let mut stack = LayerStack::new();
    stack.push(Box::new(InteriorFurnitureLayer::new()));
    stack.push(Box::new(InteriorFloorLayer::new(wall_padding)));
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_sort_by_z_index() {
        assert_eq!(
            overworld_stack(32.0).names(),
            vec!["sky", "background", "terrain", "entity"]
        );
        assert_eq!(
            interior_stack(24.0).names(),
            vec!["interior_floor", "interior_furniture"]
        );
    }

    struct Marker(&'static str, i32);

    impl Layer for Marker {
        fn name(&self) -> &'static str {
            self.0
        }

        fn z_index(&self) -> i32 {
            self.1
        }

        fn render(&self, _target: &mut RenderTarget<'_>) {}
    }

    #[test]
    fn equal_z_keeps_insertion_order() {
        let mut stack = LayerStack::new();
        stack.push(Box::new(Marker("b", 1)));
        stack.push(Box::new(Marker("a", 1)));
        stack.push(Box::new(Marker("first", 0)));
        assert_eq!(stack.names(), vec!["first", "b", "a"]);
    }
}
