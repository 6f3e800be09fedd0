use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod layers;
pub mod map;
pub mod rendering;
pub mod room;
mod sprite_keys;
pub mod systems;

pub use app::{
    run_app, AppError, CollisionCheck, Engine, EngineError, EngineEvent, FrameHandle,
    FrameScheduler, Host, InputAction, LoopConfig, LoopMetricsSnapshot, ManualScheduler,
    SceneHook,
};
pub use camera::Camera;
pub use config::{ConfigError, EngineConfig, CONFIG_ENV_VAR};
pub use geometry::{Direction, Rect, TilePosition, TileRect, WorldPosition};
pub use layers::{SceneType, TerrainMode};
pub use map::{Building, GameMap, MapError, MapTrigger, Npc, Tile, TileType, TriggerType};
pub use rendering::{MemorySurface, Surface, SurfaceError};
pub use room::{FloorStyle, Furniture, FurnitureKind, InteriorRoom};
pub use systems::{
    DayPeriod, InteractiveZone, ProximitySystem, SceneTransition, TimeOfDay, TransitionState,
    Weather, ZoneKind,
};

pub const ROOT_ENV_VAR: &str = "OVERWORLD_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub sprites_dir: PathBuf,
    pub maps_dir: PathBuf,
    /// `cache/saves`; created lazily by whoever writes to it.
    pub saves_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        Self {
            sprites_dir: assets_dir.join("sprites"),
            maps_dir: assets_dir.join("maps"),
            saves_dir: root.join("cache").join("saves"),
            assets_dir,
            root,
        }
    }

    /// `assets/maps/<id>.json`.
    pub fn map_file(&self, map_id: &str) -> PathBuf {
        self.maps_dir.join(format!("{map_id}.json"))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "OVERWORLD_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/overworld\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("assets")).expect("assets");
        assert!(!is_repo_marker(dir.path()));

        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn root_is_found_from_nested_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        fs::create_dir(dir.path().join("crates")).expect("crates");
        let nested = dir.path().join("target").join("debug");
        fs::create_dir_all(&nested).expect("nested");

        let found = find_root_above(&nested).expect("root");
        assert_eq!(found, normalize_path(dir.path()));
    }

    #[test]
    fn paths_hang_off_assets() {
        let paths = AppPaths::from_root(PathBuf::from("/game"));
        assert_eq!(paths.sprites_dir, PathBuf::from("/game/assets/sprites"));
        assert_eq!(
            paths.map_file("village"),
            PathBuf::from("/game/assets/maps/village.json")
        );
        assert_eq!(paths.saves_dir, PathBuf::from("/game/cache/saves"));
    }
}
