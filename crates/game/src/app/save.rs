use std::fmt::Display;
use std::fs;
use std::path::Path;

use overworld_engine::{Direction, SceneType, TilePosition};
use serde::{Deserialize, Serialize};

pub(crate) const SAVE_VERSION: u32 = 1;
pub(crate) const SESSION_SAVE_FILE: &str = "session.save.json";

pub(crate) type SaveLoadResult<T> = Result<T, String>;

/// What the host remembers about the player between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GameState {
    pub save_version: u32,
    pub map_id: String,
    pub player_tile: TilePosition,
    pub facing: Direction,
    pub scene: SceneType,
    #[serde(default)]
    pub room_id: Option<String>,
    /// Story triggers that already fired.
    #[serde(default)]
    pub seen_story: Vec<String>,
}

impl GameState {
    pub(crate) fn new(map_id: &str, spawn: TilePosition) -> Self {
        Self {
            save_version: SAVE_VERSION,
            map_id: map_id.to_string(),
            player_tile: spawn,
            facing: Direction::Down,
            scene: SceneType::Overworld,
            room_id: None,
            seen_story: Vec::new(),
        }
    }
}

pub(crate) fn save_to_path(state: &GameState, path: &Path) -> SaveLoadResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| format!("create save dir '{}': {error}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state)
        .map_err(|error| format!("encode save json: {error}"))?;
    fs::write(path, json).map_err(|error| format!("write save '{}': {error}", path.display()))
}

pub(crate) fn load_from_path(path: &Path, expected_map: &str) -> SaveLoadResult<GameState> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("read save '{}': {error}", path.display()))?;
    let state = parse_save_json(&raw)?;
    validate_save(&state, expected_map)?;
    Ok(state)
}

fn parse_save_json(raw: &str) -> SaveLoadResult<GameState> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, GameState>(&mut deserializer) {
        Ok(state) => Ok(state),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse save json: {source}"))
            } else {
                Err(format!("parse save json at {path}: {source}"))
            }
        }
    }
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> String {
    format!("validation failed at {path}: expected {expected}, got {actual}")
}

fn validate_save(state: &GameState, expected_map: &str) -> SaveLoadResult<()> {
    if state.save_version != SAVE_VERSION {
        return Err(expected_actual(
            "save_version",
            SAVE_VERSION,
            state.save_version,
        ));
    }
    if state.map_id != expected_map {
        return Err(expected_actual("map_id", expected_map, &state.map_id));
    }
    Ok(())
}
