use std::path::{Path, PathBuf};

use overworld_engine::{
    Engine, EngineEvent, Host, InteractiveZone, SceneType, TilePosition, TriggerType, ZoneKind,
};
use tracing::{debug, error, info, warn};

use super::save::{load_from_path, save_to_path, GameState};
use super::world::World;

const PLAYER_UNIT_ID: &str = "hero";

/// Trigger effects handed to systems that live outside this overworld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Battle {
        trigger_id: String,
        encounter: Option<String>,
    },
    Story { trigger_id: String },
    Shop { trigger_id: String },
    Tower { trigger_id: String },
    Dialogue { npc_id: String },
}

/// Host side of the engine contract: owns the persisted player state and
/// decides what triggers mean.
pub(crate) struct GameSession {
    world: World,
    state: GameState,
    save_path: Option<PathBuf>,
    last_step_tile: Option<TilePosition>,
    dispatched: Vec<Dispatch>,
}

impl GameSession {
    pub(crate) fn new(world: World, save_path: Option<PathBuf>) -> Self {
        let state = save_path
            .as_deref()
            .and_then(|path| restore_state(path, &world))
            .unwrap_or_else(|| GameState::new(&world.map.id, world.map.spawn_point));
        Self {
            world,
            state,
            save_path,
            last_step_tile: None,
            dispatched: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn take_dispatched(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.dispatched)
    }

    /// Reacts to engine events, then picks up the player's tile and facing.
    pub(crate) fn process_frame(&mut self, engine: &mut Engine) {
        for event in engine.drain_events() {
            self.handle_event(engine, event);
        }
        self.sync_from_engine(engine);
    }

    /// Stand-in for the battle, dialogue and shop systems: each dispatch is logged.
    fn flush_dispatched(&mut self) {
        for dispatch in self.dispatched.drain(..) {
            match dispatch {
                Dispatch::Battle {
                    trigger_id,
                    encounter,
                } => info!(trigger_id = %trigger_id, encounter = ?encounter, "battle_dispatched"),
                Dispatch::Story { trigger_id } => {
                    info!(trigger_id = %trigger_id, "story_dispatched")
                }
                Dispatch::Shop { trigger_id } => info!(trigger_id = %trigger_id, "shop_dispatched"),
                Dispatch::Tower { trigger_id } => {
                    info!(trigger_id = %trigger_id, "tower_dispatched")
                }
                Dispatch::Dialogue { npc_id } => info!(npc_id = %npc_id, "dialogue_dispatched"),
            }
        }
    }

    fn handle_event(&mut self, engine: &mut Engine, event: EngineEvent) {
        match event {
            EngineEvent::Interaction { zone } => self.handle_interaction(engine, &zone),
            EngineEvent::BuildingEntered {
                building_id,
                trigger_id,
            } => {
                info!(building_id = %building_id, trigger_id = %trigger_id, "building_entered");
            }
            EngineEvent::SceneSwitched { scene } => {
                self.state.scene = scene;
                self.state.room_id = engine.active_room().map(|room| room.id.clone());
                info!(
                    scene = scene.as_str(),
                    room_id = ?self.state.room_id,
                    "session_scene_changed"
                );
                self.save();
            }
            EngineEvent::TransitionCompleted { scene } => {
                debug!(scene = scene.as_str(), "session_transition_completed");
            }
        }
    }

    fn handle_interaction(&mut self, engine: &mut Engine, zone: &InteractiveZone) {
        let trigger_id = zone.id.clone();
        let dispatch = match (zone.kind, zone.trigger_type) {
            (ZoneKind::Npc, _) => Dispatch::Dialogue { npc_id: trigger_id },
            (_, Some(TriggerType::Shop)) => Dispatch::Shop { trigger_id },
            (_, Some(TriggerType::Tower)) => Dispatch::Tower { trigger_id },
            (ZoneKind::Door, _) => {
                self.enter_door(engine, &trigger_id);
                return;
            }
            (kind, trigger_type) => {
                debug!(
                    zone_id = %zone.id,
                    kind = ?kind,
                    trigger_type = ?trigger_type,
                    "interaction_unhandled"
                );
                return;
            }
        };
        self.dispatched.push(dispatch);
    }

    fn enter_door(&self, engine: &mut Engine, trigger_id: &str) {
        match self.world.interior_for_trigger(trigger_id) {
            Some(room_id) => {
                if !engine.enter_interior(room_id) {
                    debug!(room_id, "door_ignored_transition_busy");
                }
            }
            None => warn!(trigger_id, "door_has_no_interior"),
        }
    }

    /// Copies tile and facing out of the engine and fires step-on triggers.
    fn sync_from_engine(&mut self, engine: &Engine) {
        self.state.facing = engine.get_player_facing();
        if engine.scene() != SceneType::Overworld {
            return;
        }
        let Some(tile) = engine.get_player_tile_position() else {
            return;
        };
        if self.last_step_tile == Some(tile) {
            return;
        }
        self.last_step_tile = Some(tile);
        self.state.player_tile = tile;
        debug!(x = tile.x, y = tile.y, "player_tile_changed");
        self.step_on(tile);
    }

    fn step_on(&mut self, tile: TilePosition) {
        let Some(trigger) = self.world.map.trigger_at(tile) else {
            return;
        };
        match trigger.kind {
            TriggerType::Battle => {
                let encounter = trigger
                    .data
                    .get("encounter")
                    .and_then(|value| value.as_str())
                    .map(str::to_string);
                self.dispatched.push(Dispatch::Battle {
                    trigger_id: trigger.id.clone(),
                    encounter,
                });
            }
            TriggerType::Story => {
                if self.state.seen_story.contains(&trigger.id) {
                    return;
                }
                self.state.seen_story.push(trigger.id.clone());
                self.dispatched.push(Dispatch::Story {
                    trigger_id: trigger.id.clone(),
                });
            }
            TriggerType::Npc
            | TriggerType::Transition
            | TriggerType::Shop
            | TriggerType::Tower => {}
        }
    }

    fn save(&self) {
        let Some(path) = self.save_path.as_deref() else {
            return;
        };
        match save_to_path(&self.state, path) {
            Ok(()) => debug!(path = %path.display(), "session_saved"),
            Err(error) => warn!(error = %error, "session_save_failed"),
        }
    }
}

impl Host for GameSession {
    fn init(&mut self, engine: &mut Engine) {
        if let Err(error) = engine.set_map(self.world.map.clone()) {
            error!(map_id = %self.world.map.id, error = %error, "map_rejected");
            return;
        }
        for room in &self.world.interiors {
            engine.register_interior(room.clone());
        }
        engine.set_collision_check(self.world.walkability());
        engine.set_player_unit(PLAYER_UNIT_ID);
        engine.set_player_position(self.state.player_tile);
        engine.set_player_facing(self.state.facing);
        self.last_step_tile = Some(self.state.player_tile);

        if let Some(room_id) = self.state.room_id.clone() {
            if self.state.scene == SceneType::Interior && !engine.enter_interior(&room_id) {
                warn!(room_id = %room_id, "saved_room_unavailable");
            }
        }
        info!(
            map_id = %self.world.map.id,
            x = self.state.player_tile.x,
            y = self.state.player_tile.y,
            "session_started"
        );
    }

    fn after_frame(&mut self, engine: &mut Engine) {
        self.process_frame(engine);
        self.flush_dispatched();
    }

    fn shutdown(&mut self, engine: &Engine) {
        self.sync_from_engine(engine);
        self.flush_dispatched();
        self.save();
        info!(
            x = self.state.player_tile.x,
            y = self.state.player_tile.y,
            "session_closed"
        );
    }
}

/// Saved state for this map, if it loads and still points at walkable ground.
fn restore_state(path: &Path, world: &World) -> Option<GameState> {
    if !path.is_file() {
        return None;
    }
    match load_from_path(path, &world.map.id) {
        Ok(state) if world.map.is_walkable(state.player_tile) => {
            info!(path = %path.display(), "session_save_loaded");
            Some(state)
        }
        Ok(state) => {
            warn!(
                x = state.player_tile.x,
                y = state.player_tile.y,
                "session_save_tile_blocked_using_spawn"
            );
            None
        }
        Err(error) => {
            warn!(error = %error, "session_save_invalid_using_spawn");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use overworld_engine::{Direction, EngineConfig, ManualScheduler, MemorySurface};

    use super::*;
    use crate::app::save::SESSION_SAVE_FILE;
    use crate::app::world::load_world;

    fn engine() -> Engine {
        Engine::new(
            EngineConfig::default(),
            Box::new(MemorySurface::new(320, 240)),
            Box::new(ManualScheduler::new()),
        )
        .expect("engine")
    }

    fn started(save_path: Option<PathBuf>) -> (GameSession, Engine) {
        let mut session = GameSession::new(load_world(None), save_path);
        let mut engine = engine();
        session.init(&mut engine);
        (session, engine)
    }

    fn tick(session: &mut GameSession, engine: &mut Engine, total_ms: f32) {
        let mut elapsed = 0.0;
        while elapsed < total_ms {
            engine.update(50.0);
            session.process_frame(engine);
            elapsed += 50.0;
        }
    }

    fn press_interact(session: &mut GameSession, engine: &mut Engine) {
        engine.handle_key_down("e");
        engine.update(16.0);
        session.process_frame(engine);
        engine.handle_key_up("e");
    }

    #[test]
    fn init_places_player_at_spawn() {
        let (session, engine) = started(None);
        assert_eq!(
            engine.get_player_tile_position(),
            Some(TilePosition::new(12, 9))
        );
        assert_eq!(session.state().player_tile, TilePosition::new(12, 9));
        assert_eq!(engine.map().map(|map| map.id.as_str()), Some("village"));
    }

    #[test]
    fn walking_onto_story_trigger_dispatches_once() {
        let (mut session, mut engine) = started(None);
        engine.handle_key_down("ArrowDown");
        tick(&mut session, &mut engine, 400.0);
        engine.handle_key_up("ArrowDown");

        assert_eq!(session.state().player_tile, TilePosition::new(12, 11));
        assert_eq!(session.state().facing, Direction::Down);
        assert_eq!(
            session.take_dispatched(),
            vec![Dispatch::Story {
                trigger_id: "story_elder_welcome".to_string()
            }]
        );

        engine.teleport_player(TilePosition::new(12, 9));
        session.process_frame(&mut engine);
        engine.teleport_player(TilePosition::new(12, 11));
        session.process_frame(&mut engine);
        assert!(session.take_dispatched().is_empty());
    }

    #[test]
    fn battle_trigger_dispatches_every_step_on() {
        let (mut session, mut engine) = started(None);
        for _ in 0..2 {
            engine.teleport_player(TilePosition::new(19, 15));
            session.process_frame(&mut engine);
            engine.teleport_player(TilePosition::new(18, 15));
            session.process_frame(&mut engine);
        }
        let battles = session
            .take_dispatched()
            .into_iter()
            .filter(|dispatch| match dispatch {
                Dispatch::Battle { encounter, .. } => encounter.as_deref() == Some("slime"),
                _ => false,
            })
            .count();
        assert_eq!(battles, 2);
    }

    #[test]
    fn shop_interaction_is_dispatched() {
        let (mut session, mut engine) = started(None);
        engine.teleport_player(TilePosition::new(16, 8));
        press_interact(&mut session, &mut engine);
        assert_eq!(
            session.take_dispatched(),
            vec![Dispatch::Shop {
                trigger_id: "shop_general".to_string()
            }]
        );
    }

    #[test]
    fn npc_interaction_is_dialogue() {
        let (mut session, mut engine) = started(None);
        engine.teleport_player(TilePosition::new(10, 11));
        press_interact(&mut session, &mut engine);
        assert_eq!(
            session.take_dispatched(),
            vec![Dispatch::Dialogue {
                npc_id: "npc_elder".to_string()
            }]
        );
    }

    #[test]
    fn cellar_door_enters_room_and_records_scene() {
        let (mut session, mut engine) = started(None);
        engine.teleport_player(TilePosition::new(4, 14));
        session.process_frame(&mut engine);
        press_interact(&mut session, &mut engine);
        tick(&mut session, &mut engine, 1000.0);

        assert_eq!(engine.scene(), SceneType::Interior);
        assert_eq!(session.state().scene, SceneType::Interior);
        assert_eq!(session.state().room_id.as_deref(), Some("cellar"));
    }

    #[test]
    fn inn_building_enters_room() {
        let (mut session, mut engine) = started(None);
        engine.teleport_player(TilePosition::new(9, 7));
        press_interact(&mut session, &mut engine);
        tick(&mut session, &mut engine, 1000.0);

        assert_eq!(session.state().room_id.as_deref(), Some("inn"));
    }

    #[test]
    fn shutdown_save_restores_next_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_SAVE_FILE);

        let (mut session, mut engine) = started(Some(path.clone()));
        engine.teleport_player(TilePosition::new(12, 11));
        engine.set_player_facing(Direction::Left);
        session.process_frame(&mut engine);
        session.shutdown(&engine);

        let (restored, engine) = started(Some(path));
        assert_eq!(restored.state().player_tile, TilePosition::new(12, 11));
        assert_eq!(restored.state().facing, Direction::Left);
        assert_eq!(
            restored.state().seen_story,
            vec!["story_elder_welcome".to_string()]
        );
        assert_eq!(
            engine.get_player_tile_position(),
            Some(TilePosition::new(12, 11))
        );
        assert_eq!(engine.get_player_facing(), Direction::Left);
    }

    #[test]
    fn corrupt_save_starts_at_spawn() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_SAVE_FILE);
        std::fs::write(&path, "not json").expect("write");

        let session = GameSession::new(load_world(None), Some(path));
        assert_eq!(session.state().player_tile, TilePosition::new(12, 9));
    }
}
