mod engine;
mod hud;
mod input;
mod loop_runner;
mod metrics;
mod scheduler;

pub use engine::{CollisionCheck, Engine, EngineError, EngineEvent, SceneHook};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, Host, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
