use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::app::ManualScheduler;
use crate::map::{MapTrigger, Tile, TileType, TriggerType};
use crate::rendering::MemorySurface;
use crate::room::FloorStyle;

const VIEW_WIDTH: u32 = 320;
const VIEW_HEIGHT: u32 = 240;

/// Owns its frame and reports presents through a shared counter.
struct CountingSurface {
    width: u32,
    height: u32,
    frame: Vec<u8>,
    presented: Rc<Cell<u32>>,
    fail_present: bool,
}

impl CountingSurface {
    fn new(width: u32, height: u32, presented: Rc<Cell<u32>>) -> Self {
        Self {
            width,
            height,
            frame: vec![0; width as usize * height as usize * 4],
            presented,
            fail_present: false,
        }
    }
}

impl Surface for CountingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if self.fail_present {
            return Err(SurfaceError::Present("device lost".to_string()));
        }
        self.presented.set(self.presented.get() + 1);
        Ok(())
    }
}

fn engine_with_scheduler() -> (Engine, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let engine = Engine::new(
        EngineConfig::default(),
        Box::new(MemorySurface::new(VIEW_WIDTH, VIEW_HEIGHT)),
        Box::new(scheduler.clone()),
    )
    .expect("engine");
    (engine, scheduler)
}

fn engine() -> Engine {
    engine_with_scheduler().0
}

fn open_map() -> GameMap {
    GameMap::filled("meadow", 10, 10, Tile::new(TileType::Grass, true))
}

fn door_map() -> GameMap {
    let mut map = open_map();
    let mut door = Tile::new(TileType::Door, true);
    door.trigger_id = Some("door_inn".to_string());
    map.set_tile(TilePosition::new(5, 5), door);
    map.triggers.push(MapTrigger {
        id: "door_inn".to_string(),
        kind: TriggerType::Transition,
        position: TilePosition::new(5, 5),
        data: serde_json::Value::Null,
    });
    map
}

fn inn_room() -> InteriorRoom {
    InteriorRoom {
        id: "inn".to_string(),
        name: "Inn".to_string(),
        width: 160.0,
        height: 120.0,
        floor: FloorStyle::Wood,
        furniture: Vec::new(),
    }
}

fn building_map() -> GameMap {
    let mut map = open_map();
    map.buildings.push(crate::map::Building {
        id: "inn".to_string(),
        position: TilePosition::new(3, 2),
        width: 2,
        height: 2,
        sprite_id: None,
        trigger_id: Some("door_inn".to_string()),
        interior_id: Some("inn".to_string()),
    });
    map
}

fn run_for(engine: &mut Engine, total_ms: f32) {
    let mut elapsed = 0.0;
    while elapsed < total_ms {
        engine.update(50.0);
        elapsed += 50.0;
    }
}

fn player_tile(engine: &Engine) -> TilePosition {
    engine.get_player_tile_position().expect("player placed")
}

fn interaction_ids(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Interaction { zone } => Some(zone.id.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn door_interaction_fires_once_per_press() {
    let mut engine = engine();
    engine.set_map(door_map()).expect("map");
    engine.set_player_position(TilePosition::new(5, 6));
    engine.set_player_facing(Direction::Up);

    engine.handle_key_down("Enter");
    engine.update(16.0);
    assert_eq!(interaction_ids(&engine.drain_events()), ["door_inn"]);

    engine.handle_key_down("Enter");
    engine.update(16.0);
    assert!(interaction_ids(&engine.drain_events()).is_empty());

    engine.handle_key_up("Enter");
    engine.handle_key_down("Enter");
    engine.update(16.0);
    assert_eq!(interaction_ids(&engine.drain_events()), ["door_inn"]);
}

#[test]
fn interact_outside_every_zone_does_nothing() {
    let mut engine = engine();
    engine.set_map(door_map()).expect("map");
    engine.set_player_position(TilePosition::new(1, 1));
    engine.handle_key_down("e");
    engine.update(16.0);
    assert!(!engine.proximity().can_interact());
    assert!(engine.drain_events().is_empty());
}

#[test]
fn blocked_predicate_keeps_player_tile() {
    let mut engine = engine();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(4, 4));
    engine.set_collision_check(|_| false);

    for key in ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"] {
        engine.handle_key_down(key);
        for _ in 0..10 {
            engine.update(100.0);
        }
        engine.handle_key_up(key);
        assert_eq!(player_tile(&engine), TilePosition::new(4, 4));
    }

    engine.handle_key_down("d");
    engine.handle_key_down("s");
    engine.update(100.0);
    assert_eq!(
        engine.get_player_world_position(),
        Some(TilePosition::new(4, 4).to_world_center(32.0))
    );
}

#[test]
fn map_tiles_gate_movement_without_predicate() {
    let mut engine = engine();
    let mut map = open_map();
    map.set_tile(TilePosition::new(3, 2), Tile::new(TileType::Wall, false));
    engine.set_map(map).expect("map");
    engine.set_player_position(TilePosition::new(2, 2));

    engine.handle_key_down("ArrowRight");
    for _ in 0..20 {
        engine.update(100.0);
    }
    assert_eq!(player_tile(&engine), TilePosition::new(2, 2));
    assert_eq!(engine.get_player_facing(), Direction::Right);

    engine.handle_key_up("ArrowRight");
    engine.handle_key_down("ArrowDown");
    for _ in 0..3 {
        engine.update(100.0);
    }
    assert_eq!(player_tile(&engine), TilePosition::new(2, 3));
}

#[test]
fn diagonal_movement_is_normalized() {
    let mut engine = engine();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(2, 2));
    let start = engine.get_player_world_position().expect("placed");

    engine.handle_key_down("ArrowRight");
    engine.handle_key_down("ArrowDown");
    engine.update(100.0);

    let end = engine.get_player_world_position().expect("placed");
    let expected = EngineConfig::default().movement.speed_px_per_ms * 100.0;
    assert!((start.distance_to(end) - expected).abs() < 0.01);
    assert!((end.x - start.x - (end.y - start.y)).abs() < 0.001);
    assert_eq!(engine.get_player_facing(), Direction::Down);
}

#[test]
fn releasing_input_stops_held_movement() {
    let mut engine = engine();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(2, 2));
    let start = engine.get_player_world_position().expect("placed");

    engine.handle_key_down("ArrowRight");
    engine.update(100.0);
    let moved = engine.get_player_world_position().expect("placed");
    assert!(moved.x > start.x);

    engine.release_input();
    engine.update(100.0);
    assert_eq!(engine.get_player_world_position(), Some(moved));

    engine.handle_key_down("ArrowLeft");
    engine.update(100.0);
    let back = engine.get_player_world_position().expect("placed");
    assert!(back.x < moved.x);
}

#[test]
fn movement_clamps_to_world_bounds() {
    let mut engine = engine();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(0, 0));
    engine.set_collision_check(|_| true);
    engine.handle_key_down("ArrowLeft");
    engine.update(200.0);
    let position = engine.get_player_world_position().expect("placed");
    assert_eq!(position.x, 0.0);
    assert_eq!(player_tile(&engine), TilePosition::new(0, 0));
}

#[test]
fn set_player_position_only_snaps_once() {
    let mut engine = engine();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(9, 9));
    let camera = engine.get_camera().position();
    assert_eq!(camera, WorldPosition::new(0.0, 80.0));

    engine.set_player_position(TilePosition::new(1, 1));
    assert_eq!(player_tile(&engine), TilePosition::new(9, 9));

    engine.teleport_player(TilePosition::new(1, 1));
    assert_eq!(player_tile(&engine), TilePosition::new(1, 1));
    assert_eq!(engine.get_camera().position(), WorldPosition::new(0.0, 0.0));
}

#[test]
fn overlapping_transitions_switch_and_complete_once() {
    let mut engine = engine();
    let switches = Rc::new(Cell::new(0));
    let completions = Rc::new(Cell::new(0));

    for _ in 0..2 {
        let switches = Rc::clone(&switches);
        let completions = Rc::clone(&completions);
        engine.transition_to_scene(
            SceneType::Interior,
            Some(Box::new(move |_: &mut Engine| switches.set(switches.get() + 1))),
            Some(Box::new(move |_: &mut Engine| completions.set(completions.get() + 1))),
        );
    }
    run_for(&mut engine, 1_000.0);

    assert_eq!(switches.get(), 1);
    assert_eq!(completions.get(), 1);
    assert_eq!(engine.scene(), SceneType::Interior);
    assert!(engine.transition().is_idle());
    let events = engine.drain_events();
    assert_eq!(
        events,
        vec![
            EngineEvent::SceneSwitched {
                scene: SceneType::Interior,
            },
            EngineEvent::TransitionCompleted {
                scene: SceneType::Interior,
            },
        ]
    );
}

#[test]
fn input_is_ignored_while_transitioning() {
    let mut engine = engine();
    engine.set_map(door_map()).expect("map");
    engine.set_player_position(TilePosition::new(5, 6));
    let start = engine.get_player_world_position();

    assert!(engine.transition_to_scene(SceneType::Overworld, None, None));
    engine.handle_key_down("ArrowLeft");
    engine.handle_key_down("Enter");
    engine.update(100.0);

    assert_eq!(engine.get_player_world_position(), start);
    assert!(interaction_ids(&engine.drain_events()).is_empty());
}

#[test]
fn building_interact_enters_and_exit_zone_returns() {
    let mut engine = engine();
    engine.register_interior(inn_room());
    engine.set_map(building_map()).expect("map");
    engine.set_player_position(TilePosition::new(4, 4));

    engine.handle_key_down("Enter");
    engine.update(16.0);
    engine.handle_key_up("Enter");
    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::BuildingEntered {
        building_id: "inn".to_string(),
        trigger_id: "door_inn".to_string(),
    }));
    assert!(!engine.transition().is_idle());

    run_for(&mut engine, 1_000.0);
    assert_eq!(engine.scene(), SceneType::Interior);
    assert_eq!(
        engine.active_room().map(|room| room.id.as_str()),
        Some("inn")
    );
    assert_eq!(player_tile(&engine), TilePosition::new(4, 4));

    engine.handle_key_down("ArrowDown");
    engine.update(16.0);
    engine.handle_key_up("ArrowDown");
    assert!(!engine.transition().is_idle());

    run_for(&mut engine, 1_000.0);
    assert_eq!(engine.scene(), SceneType::Overworld);
    assert!(engine.active_room().is_none());
    assert_eq!(player_tile(&engine), TilePosition::new(4, 4));
    assert_eq!(engine.get_player_facing(), Direction::Down);
}

#[test]
fn leaving_a_room_entered_before_placement_lands_at_the_doorstep() {
    let mut engine = engine();
    engine.register_interior(inn_room());
    engine.set_map(building_map()).expect("map");
    assert!(engine.enter_interior("inn"));
    run_for(&mut engine, 1_000.0);
    assert_eq!(engine.scene(), SceneType::Interior);

    assert!(engine.exit_interior());
    run_for(&mut engine, 1_000.0);
    assert_eq!(engine.scene(), SceneType::Overworld);
    assert_eq!(player_tile(&engine), TilePosition::new(4, 4));
}

#[test]
fn unknown_interior_is_rejected() {
    let mut engine = engine();
    assert!(!engine.enter_interior("cellar"));
    assert!(engine.transition().is_idle());
}

#[test]
fn zero_sized_surface_is_fatal() {
    let result = Engine::new(
        EngineConfig::default(),
        Box::new(MemorySurface::new(0, 0)),
        Box::new(ManualScheduler::new()),
    );
    assert!(matches!(
        result,
        Err(EngineError::Surface(SurfaceError::ZeroSize {
            width: 0,
            height: 0,
        }))
    ));
}

#[test]
fn invalid_config_is_fatal() {
    let config = EngineConfig {
        tile_size: 0.0,
        ..EngineConfig::default()
    };
    let result = Engine::new(
        config,
        Box::new(MemorySurface::new(8, 8)),
        Box::new(ManualScheduler::new()),
    );
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn lifecycle_schedules_and_cancels_frames() {
    let (mut engine, scheduler) = engine_with_scheduler();
    engine.start();
    engine.start();
    assert!(engine.is_running());
    assert_eq!(scheduler.requested_count(), 1);

    let first = scheduler.take_pending().expect("frame requested");
    engine.on_frame(first, 0.0);
    assert_eq!(scheduler.requested_count(), 2);

    engine.on_frame(first, 16.0);
    assert_eq!(scheduler.requested_count(), 2);

    engine.stop();
    assert!(!engine.is_running());
    assert_eq!(scheduler.pending(), None);
    assert_eq!(scheduler.cancelled_count(), 1);
}

#[test]
fn frame_delta_is_clamped() {
    let (mut engine, scheduler) = engine_with_scheduler();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(0, 5));
    let start = engine.get_player_world_position().expect("placed");
    engine.handle_key_down("ArrowRight");
    engine.start();

    let first = scheduler.take_pending().expect("frame");
    engine.on_frame(first, 1_000.0);
    let second = scheduler.take_pending().expect("frame");
    engine.on_frame(second, 11_000.0);

    let end = engine.get_player_world_position().expect("placed");
    let config = EngineConfig::default();
    let expected = config.movement.speed_px_per_ms * config.max_frame_delta_ms;
    assert!((end.x - start.x - expected).abs() < 0.01);
}

#[test]
fn paused_engine_keeps_scheduling_without_simulating() {
    let (mut engine, scheduler) = engine_with_scheduler();
    engine.set_map(open_map()).expect("map");
    engine.set_player_position(TilePosition::new(2, 2));
    let start = engine.get_player_world_position();
    engine.handle_key_down("ArrowRight");
    engine.start();
    engine.pause();

    for timestamp in [0.0, 16.0, 32.0] {
        let handle = scheduler.take_pending().expect("frame");
        engine.on_frame(handle, timestamp);
    }
    assert_eq!(engine.get_player_world_position(), start);

    engine.resume();
    let handle = scheduler.take_pending().expect("frame");
    engine.on_frame(handle, 48.0);
    let handle = scheduler.take_pending().expect("frame");
    engine.on_frame(handle, 64.0);
    assert_ne!(engine.get_player_world_position(), start);
}

#[test]
fn render_presents_and_survives_present_failure() {
    let presented = Rc::new(Cell::new(0));
    let mut engine = Engine::new(
        EngineConfig::default(),
        Box::new(CountingSurface::new(64, 48, Rc::clone(&presented))),
        Box::new(ManualScheduler::new()),
    )
    .expect("engine");
    engine.set_map(door_map()).expect("map");
    engine.set_player_position(TilePosition::new(5, 6));
    engine.set_debug_mode(true);
    engine.update(16.0);
    engine.render();
    engine.set_terrain_mode(TerrainMode::Scene);
    engine.render();
    assert_eq!(presented.get(), 2);

    let mut surface = CountingSurface::new(16, 16, Rc::clone(&presented));
    surface.fail_present = true;
    let mut failing = Engine::new(
        EngineConfig::default(),
        Box::new(surface),
        Box::new(ManualScheduler::new()),
    )
    .expect("engine");
    failing.render();
    assert_eq!(presented.get(), 2);
}
