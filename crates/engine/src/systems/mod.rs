mod proximity;
mod time_of_day;
mod transition;
mod weather;

pub use proximity::{InteractiveZone, ProximitySystem, ZoneKind};
pub use time_of_day::{AmbientLight, DayPeriod, TimeOfDay};
pub use transition::{
    CompleteCallback, SceneChangeCallback, SceneTransition, TransitionState, TransitionStep,
};
pub use weather::Weather;
