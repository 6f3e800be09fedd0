use std::env;
use std::path::{Path, PathBuf};

use overworld_engine::{resolve_app_paths, EngineConfig, LoopConfig, CONFIG_ENV_VAR};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::save::SESSION_SAVE_FILE;
use super::session::GameSession;
use super::world::load_world;

pub(crate) struct AppWiring {
    pub config: LoopConfig,
    pub engine_config: EngineConfig,
    pub session: GameSession,
}

pub(crate) fn build_app() -> AppWiring {
    let paths = match resolve_app_paths() {
        Ok(paths) => Some(paths),
        Err(error) => {
            warn!(error = %error, "app_paths_unresolved_using_builtin_assets");
            None
        }
    };

    let world = load_world(paths.as_ref());
    let save_path = paths
        .as_ref()
        .map(|paths| paths.saves_dir.join(SESSION_SAVE_FILE));
    let config = LoopConfig {
        window_title: format!("Overworld - {}", world.map.name),
        sprite_root: paths.as_ref().map(|paths| paths.sprites_dir.clone()),
        ..LoopConfig::default()
    };
    info!(
        map_id = %world.map.id,
        sprite_root = ?config.sprite_root,
        save_path = ?save_path,
        "app_wired"
    );

    AppWiring {
        config,
        engine_config: engine_config_from_env(),
        session: GameSession::new(world, save_path),
    }
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn engine_config_from_env() -> EngineConfig {
    match env::var(CONFIG_ENV_VAR) {
        Ok(raw) if !raw.trim().is_empty() => load_engine_config(&PathBuf::from(raw.trim())),
        Ok(_) | Err(env::VarError::NotPresent) => EngineConfig::default(),
        Err(error) => {
            warn!(var = CONFIG_ENV_VAR, error = %error, "config_env_unreadable_using_defaults");
            EngineConfig::default()
        }
    }
}

fn load_engine_config(path: &Path) -> EngineConfig {
    match EngineConfig::from_json_file(path) {
        Ok(config) => {
            info!(path = %path.display(), "engine_config_loaded");
            config
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "engine_config_invalid_using_defaults");
            EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("engine.json");
        let raw = r#"{"tileSize": 16, "movement": {"speedPxPerMs": 0.2}}"#;
        std::fs::write(&path, raw).expect("write");

        let config = load_engine_config(&path);
        assert_eq!(config.tile_size, 16.0);
        assert_eq!(config.movement.speed_px_per_ms, 0.2);
    }

    #[test]
    fn missing_or_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = load_engine_config(&dir.path().join("absent.json"));
        assert_eq!(missing, EngineConfig::default());

        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"tileSize": -4}"#).expect("write");
        assert_eq!(load_engine_config(&path), EngineConfig::default());
    }
}
