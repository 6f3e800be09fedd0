mod interaction;
mod movement;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::config::{ConfigError, EngineConfig};
use crate::geometry::{Direction, TilePosition, WorldPosition};
use crate::layers::{
    interior_stack, overworld_stack, AmbientState, LayerStack, PlayerVisual, SceneType,
    TerrainMode,
};
use crate::map::{GameMap, MapError};
use crate::rendering::{
    validate_surface, Canvas, RenderTarget, SpriteCache, Surface, SurfaceError, ViewTransform,
};
use crate::room::InteriorRoom;
use crate::systems::{
    InteractiveZone, ProximitySystem, SceneTransition, TimeOfDay, TransitionStep, Weather,
};

use super::hud::{build_hud_lines, draw_hud, HudData};
use super::input::InputState;
use super::metrics::MetricsAccumulator;
use super::scheduler::{FrameHandle, FrameScheduler};
use super::LoopMetricsSnapshot;

/// Runs against the engine at a transition's midpoint or completion.
pub type SceneHook = Box<dyn FnOnce(&mut Engine)>;

/// Host-supplied walkability predicate for overworld tiles.
pub type CollisionCheck = Box<dyn Fn(TilePosition) -> bool>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("drawing surface unavailable: {0}")]
    Surface(#[from] SurfaceError),
    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),
}

/// Outbound notifications, polled by the host with [`Engine::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Interaction { zone: InteractiveZone },
    BuildingEntered {
        building_id: String,
        trigger_id: String,
    },
    SceneSwitched { scene: SceneType },
    TransitionCompleted { scene: SceneType },
}

#[derive(Debug, Clone, Default)]
struct PlayerState {
    /// Overworld feet position; `None` until the host first places the player.
    world: Option<WorldPosition>,
    /// Position inside the active room.
    interior: WorldPosition,
    facing: Direction,
    unit_id: Option<String>,
    moving: bool,
}

pub struct Engine {
    config: EngineConfig,
    surface: Box<dyn Surface>,
    scheduler: Box<dyn FrameScheduler>,
    frame_handle: Option<FrameHandle>,
    last_timestamp_ms: Option<f64>,
    running: bool,
    paused: bool,
    camera: Camera,
    overworld_layers: LayerStack,
    interior_layers: LayerStack,
    proximity: ProximitySystem,
    transition: SceneTransition,
    time_of_day: TimeOfDay,
    weather: Weather,
    sprites: SpriteCache,
    map: Option<Arc<GameMap>>,
    rooms: HashMap<String, Arc<InteriorRoom>>,
    active_room: Option<Arc<InteriorRoom>>,
    scene: SceneType,
    terrain_mode: TerrainMode,
    player: PlayerState,
    overworld_return: Option<WorldPosition>,
    input: InputState,
    collision_check: Option<CollisionCheck>,
    pending_switch: Option<SceneHook>,
    pending_complete: Option<SceneHook>,
    events: Vec<EngineEvent>,
    debug_mode: bool,
    metrics: MetricsAccumulator,
    clock_ms: f64,
}

impl Engine {
    /// Fails when the surface cannot be drawn into or the config is out of range.
    pub fn new(
        config: EngineConfig,
        mut surface: Box<dyn Surface>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        validate_surface(surface.as_mut())?;
        let (width, height) = surface.size();
        info!(width, height, tile_size = config.tile_size, "engine_created");

        Ok(Self {
            camera: Camera::new(width as f32, height as f32, config.camera.follow_speed),
            overworld_layers: overworld_stack(config.tile_size),
            interior_layers: interior_stack(config.interior.wall_padding_px),
            proximity: ProximitySystem::new(&config.proximity, config.tile_size),
            transition: SceneTransition::new(&config.transition),
            time_of_day: TimeOfDay::new(&config.time_of_day),
            config,
            surface,
            scheduler,
            frame_handle: None,
            last_timestamp_ms: None,
            running: false,
            paused: false,
            weather: Weather::Clear,
            sprites: SpriteCache::new(None),
            map: None,
            rooms: HashMap::new(),
            active_room: None,
            scene: SceneType::Overworld,
            terrain_mode: TerrainMode::World,
            player: PlayerState::default(),
            overworld_return: None,
            input: InputState::default(),
            collision_check: None,
            pending_switch: None,
            pending_complete: None,
            events: Vec::new(),
            debug_mode: false,
            metrics: MetricsAccumulator::new(),
            clock_ms: 0.0,
        })
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.paused = false;
        self.last_timestamp_ms = None;
        self.frame_handle = Some(self.scheduler.request_frame());
        info!("engine_started");
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.paused = false;
        if let Some(handle) = self.frame_handle.take() {
            self.scheduler.cancel_frame(handle);
        }
        info!("engine_stopped");
    }

    /// Frames keep being scheduled but the simulation stands still.
    pub fn pause(&mut self) {
        if !self.running || self.paused {
            return;
        }
        self.paused = true;
        info!("engine_paused");
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.last_timestamp_ms = None;
        info!("engine_resumed");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frame callback. Handles other than the one last requested are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) {
        if !self.running || self.frame_handle != Some(handle) {
            debug!(handle = handle.0, "stale_frame_ignored");
            return;
        }
        self.frame_handle = None;
        let dt_ms = match self.last_timestamp_ms {
            Some(previous) => {
                (timestamp_ms - previous).clamp(0.0, self.config.max_frame_delta_ms as f64)
            }
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        if !self.paused {
            self.update(dt_ms as f32);
        }
        self.render();

        if self.running {
            self.frame_handle = Some(self.scheduler.request_frame());
        }
    }

    /// One simulation step of `dt_ms` milliseconds, clamped to the configured maximum.
    pub fn update(&mut self, dt_ms: f32) {
        let dt_ms = dt_ms.clamp(0.0, self.config.max_frame_delta_ms);
        self.clock_ms += dt_ms as f64;
        if let Some(snapshot) = self.metrics.record_frame(dt_ms as f64) {
            debug!(
                fps = snapshot.fps,
                frame_time_ms = snapshot.frame_time_ms,
                scene = self.scene.as_str(),
                "loop_metrics"
            );
        }

        self.time_of_day.update(dt_ms);
        self.update_transition(dt_ms);

        if self.transition.is_idle() {
            self.update_movement(dt_ms);
        } else {
            self.player.moving = false;
        }
        self.update_proximity(dt_ms);

        let interact_pressed = self.input.take_interact_pressed();
        if interact_pressed && self.transition.is_idle() {
            self.dispatch_interaction();
        }
        self.update_camera(dt_ms);
        self.sync_layers(dt_ms);
    }

    pub fn render(&mut self) {
        let hud_lines = self.debug_mode.then(|| build_hud_lines(&self.hud_data()));
        let (width, height) = self.surface.size();
        let view = self.view_transform(width, height);
        let layers = match self.scene {
            SceneType::Overworld => &self.overworld_layers,
            SceneType::Interior => &self.interior_layers,
        };

        let mut target = RenderTarget {
            canvas: Canvas::new(self.surface.frame_mut(), width, height),
            sprites: &mut self.sprites,
            camera: &self.camera,
            view,
            tile_size: self.config.tile_size,
            clock_ms: self.clock_ms,
        };
        layers.render(&mut target);
        if self.scene == SceneType::Overworld {
            self.proximity.render(&mut target);
        }
        self.transition.render(&mut target.canvas);
        if let Some(lines) = &hud_lines {
            draw_hud(&mut target.canvas, lines);
        }

        if let Err(error) = self.surface.present() {
            warn!(error = %error, "surface_present_failed");
        }
    }

    /// Swaps in a new map wholesale and rebuilds everything derived from it.
    pub fn set_map(&mut self, map: GameMap) -> Result<(), MapError> {
        map.validate()?;
        let map = Arc::new(map);
        let (world_width, world_height) = map.pixel_size(self.config.tile_size);
        self.camera.set_world_bounds(world_width, world_height);
        self.overworld_layers.set_map(Some(&map));
        self.proximity.set_map(Some(&map));
        info!(
            map_id = %map.id,
            width = map.width,
            height = map.height,
            zones = self.proximity.zones().len(),
            "map_loaded"
        );
        self.map = Some(map);
        Ok(())
    }

    pub fn map(&self) -> Option<&GameMap> {
        self.map.as_deref()
    }

    /// Directory holding `<id>.png` sprite files. Clears previously cached sprites.
    pub fn set_sprite_root(&mut self, root: Option<PathBuf>) {
        info!(root = ?root, "sprite_root_set");
        self.sprites = SpriteCache::new(root);
    }

    /// Places the player on the first call only; later calls are ignored since
    /// movement is owned by the engine. Use [`Engine::teleport_player`] to relocate.
    pub fn set_player_position(&mut self, tile: TilePosition) {
        if self.player.world.is_some() {
            debug!(x = tile.x, y = tile.y, "player_position_ignored");
            return;
        }
        self.player.world = Some(tile.to_world_center(self.config.tile_size));
        self.snap_camera_to_player();
        info!(x = tile.x, y = tile.y, "player_placed");
    }

    pub fn teleport_player(&mut self, tile: TilePosition) {
        self.player.world = Some(tile.to_world_center(self.config.tile_size));
        self.player.moving = false;
        self.snap_camera_to_player();
        info!(x = tile.x, y = tile.y, "player_teleported");
    }

    pub fn set_player_facing(&mut self, facing: Direction) {
        self.player.facing = facing;
    }

    pub fn set_player_unit(&mut self, unit_id: impl Into<String>) {
        self.player.unit_id = Some(unit_id.into());
    }

    /// Replaces the map-tile walkability lookup for overworld movement.
    pub fn set_collision_check(&mut self, check: impl Fn(TilePosition) -> bool + 'static) {
        self.collision_check = Some(Box::new(check));
    }

    pub fn clear_collision_check(&mut self) {
        self.collision_check = None;
    }

    /// Starts a fade to `scene`. `on_switch` runs at the midpoint after the scene
    /// changes, `on_complete` once the fade-in ends. Returns `false` and drops both
    /// hooks while another transition is running.
    pub fn transition_to_scene(
        &mut self,
        scene: SceneType,
        on_switch: Option<SceneHook>,
        on_complete: Option<SceneHook>,
    ) -> bool {
        if !self.transition.start_transition(scene, None, None) {
            return false;
        }
        self.pending_switch = on_switch;
        self.pending_complete = on_complete;
        info!(from = self.scene.as_str(), to = scene.as_str(), "transition_started");
        true
    }

    pub fn register_interior(&mut self, room: InteriorRoom) {
        debug!(room_id = %room.id, furniture = room.furniture.len(), "interior_registered");
        self.rooms.insert(room.id.clone(), Arc::new(room));
    }

    /// Fades into a registered room and remembers where to return in the overworld.
    pub fn enter_interior(&mut self, room_id: &str) -> bool {
        let Some(room) = self.rooms.get(room_id).cloned() else {
            warn!(room_id, "interior_not_registered");
            return false;
        };
        let hook: SceneHook = Box::new(move |engine: &mut Engine| engine.place_in_room(room));
        self.transition_to_scene(SceneType::Interior, Some(hook), None)
    }

    /// Fades back to the overworld position held before entering.
    pub fn exit_interior(&mut self) -> bool {
        if self.scene != SceneType::Interior {
            return false;
        }
        let hook: SceneHook = Box::new(|engine: &mut Engine| engine.leave_room());
        self.transition_to_scene(SceneType::Overworld, Some(hook), None)
    }

    pub fn handle_key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn handle_key_up(&mut self, key: &str) -> bool {
        self.input.key_up(key)
    }

    /// Drops every held key, e.g. when the window loses focus and key-up events stop arriving.
    pub fn release_input(&mut self) {
        self.input.release_all();
        self.player.moving = false;
        debug!("input_released");
    }

    /// Overworld tile under the player. While indoors this is the tile the
    /// player entered from.
    pub fn get_player_tile_position(&self) -> Option<TilePosition> {
        self.player
            .world
            .map(|position| position.to_tile(self.config.tile_size))
    }

    pub fn get_player_world_position(&self) -> Option<WorldPosition> {
        self.player.world
    }

    pub fn get_player_facing(&self) -> Direction {
        self.player.facing
    }

    pub fn get_camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> SceneType {
        self.scene
    }

    pub fn active_room(&self) -> Option<&InteriorRoom> {
        self.active_room.as_deref()
    }

    pub fn transition(&self) -> &SceneTransition {
        &self.transition
    }

    pub fn proximity(&self) -> &ProximitySystem {
        &self.proximity
    }

    pub fn time_of_day(&self) -> &TimeOfDay {
        &self.time_of_day
    }

    pub fn metrics(&self) -> LoopMetricsSnapshot {
        self.metrics.latest()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
        info!(enabled, "debug_mode_set");
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
        info!(weather = weather.as_str(), "weather_set");
    }

    pub fn set_terrain_mode(&mut self, mode: TerrainMode) {
        self.terrain_mode = mode;
        self.overworld_layers.set_terrain_mode(mode);
        info!(mode = ?mode, "terrain_mode_set");
    }

    pub fn set_hour(&mut self, hour: f32) {
        self.time_of_day.set_hour(hour);
    }

    pub fn set_time_paused(&mut self, paused: bool) {
        if paused {
            self.time_of_day.pause();
        } else {
            self.time_of_day.resume();
        }
    }

    /// The window changed size; the frame buffer and camera viewport do not.
    pub fn resize_output(&mut self, width: u32, height: u32) {
        if let Err(error) = self.surface.resize_output(width, height) {
            warn!(error = %error, width, height, "surface_resize_failed");
        }
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn update_transition(&mut self, dt_ms: f32) {
        match self.transition.update(dt_ms) {
            TransitionStep::None => {}
            TransitionStep::SceneChanged(scene) => {
                self.scene = scene;
                self.proximity.reset_nearest();
                if let Some(hook) = self.pending_switch.take() {
                    hook(self);
                }
                self.events.push(EngineEvent::SceneSwitched { scene });
                info!(scene = scene.as_str(), "scene_switched");
            }
            TransitionStep::Completed(scene) => {
                if let Some(hook) = self.pending_complete.take() {
                    hook(self);
                }
                self.events.push(EngineEvent::TransitionCompleted { scene });
                info!(scene = scene.as_str(), "transition_completed");
            }
        }
    }

    fn update_proximity(&mut self, dt_ms: f32) {
        match (self.scene, self.player.world) {
            (SceneType::Overworld, Some(position)) => {
                self.proximity.check_proximity(position);
            }
            _ => self.proximity.reset_nearest(),
        }
        self.proximity.update(dt_ms);
    }

    fn update_camera(&mut self, dt_ms: f32) {
        if self.scene == SceneType::Overworld {
            if let Some(position) = self.player.world {
                self.camera.set_target(position.x, position.y);
            }
        }
        self.camera.update(dt_ms);
    }

    fn snap_camera_to_player(&mut self) {
        if let Some(position) = self.player.world {
            self.camera.snap_to(position.x, position.y);
        }
    }

    fn player_visual(&self) -> PlayerVisual {
        let position = match self.scene {
            SceneType::Overworld => self.player.world,
            SceneType::Interior => self.active_room.as_ref().map(|_| self.player.interior),
        };
        PlayerVisual {
            position,
            facing: self.player.facing,
            unit_id: self.player.unit_id.clone(),
            moving: self.player.moving,
        }
    }

    fn sync_layers(&mut self, dt_ms: f32) {
        let ambient = AmbientState::from_time(&self.time_of_day, self.weather);
        let visual = self.player_visual();
        let layers = match self.scene {
            SceneType::Overworld => &mut self.overworld_layers,
            SceneType::Interior => &mut self.interior_layers,
        };
        layers.set_ambient(&ambient);
        layers.set_player(&visual);
        layers.update(dt_ms);
    }

    fn view_transform(&self, width: u32, height: u32) -> ViewTransform {
        match self.scene {
            SceneType::Interior => self
                .active_room
                .as_ref()
                .map(|room| ViewTransform::centered(room.width, room.height, width, height))
                .unwrap_or_default(),
            SceneType::Overworld => match (self.terrain_mode, self.map.as_deref()) {
                (TerrainMode::Scene, Some(map)) => {
                    let (world_width, world_height) = map.pixel_size(self.config.tile_size);
                    ViewTransform::stretched(world_width, world_height, width, height)
                }
                _ => ViewTransform::from_camera(&self.camera),
            },
        }
    }

    fn hud_data(&self) -> HudData {
        HudData {
            metrics: self.metrics.latest(),
            player_world: self.player_visual().position,
            player_tile: self.get_player_tile_position(),
            camera: (self.camera.x(), self.camera.y()),
            scene: self.scene,
            clock: self.time_of_day.clock_label(),
            period: self.time_of_day.period().as_str(),
            nearest_zone: self.proximity.nearest_zone().map(|zone| zone.id.clone()),
        }
    }

    fn place_in_room(&mut self, room: Arc<InteriorRoom>) {
        self.overworld_return = self.player.world;
        self.player.interior = room.entrance(self.config.interior.wall_padding_px);
        self.player.facing = Direction::Up;
        self.player.moving = false;
        self.interior_layers.set_room(Some(&room));
        info!(room_id = %room.id, "interior_entered");
        self.active_room = Some(room);
    }

    fn leave_room(&mut self) {
        let room = self.active_room.take();
        if let Some(room) = &room {
            info!(room_id = %room.id, "interior_left");
        }
        self.interior_layers.set_room(None);
        let doorstep = room.and_then(|room| self.building_doorstep(&room.id));
        if let Some(position) = self.overworld_return.take().or(doorstep) {
            self.player.world = Some(position);
        }
        self.player.facing = Direction::Down;
        self.player.moving = false;
        self.snap_camera_to_player();
    }

    /// Tile in front of the building whose door leads into `room_id`.
    fn building_doorstep(&self, room_id: &str) -> Option<WorldPosition> {
        let building = self
            .map
            .as_deref()?
            .buildings
            .iter()
            .find(|building| building.interior_id.as_deref() == Some(room_id))?;
        Some(building.approach_tile().to_world_center(self.config.tile_size))
    }
}
