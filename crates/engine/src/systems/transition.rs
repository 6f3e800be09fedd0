use tracing::debug;

use crate::config::TransitionConfig;
use crate::rendering::{with_alpha, Canvas, BLACK};
use crate::SceneType;

pub type SceneChangeCallback = Box<dyn FnOnce(SceneType)>;
pub type CompleteCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    FadingOut,
    FadingIn,
}

/// What happened during one `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    None,
    SceneChanged(SceneType),
    Completed(SceneType),
}

/// Fade to black, switch scene, hold, fade back in.
pub struct SceneTransition {
    state: TransitionState,
    progress: f32,
    hold_remaining_ms: f32,
    fade_duration_ms: f32,
    hold_duration_ms: f32,
    target: Option<SceneType>,
    on_scene_change: Option<SceneChangeCallback>,
    on_complete: Option<CompleteCallback>,
}

impl SceneTransition {
    pub fn new(config: &TransitionConfig) -> Self {
        Self {
            state: TransitionState::Idle,
            progress: 0.0,
            hold_remaining_ms: 0.0,
            fade_duration_ms: config.fade_duration_ms.max(f32::EPSILON),
            hold_duration_ms: config.hold_duration_ms.max(0.0),
            target: None,
            on_scene_change: None,
            on_complete: None,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransitionState::Idle
    }

    /// 0 is fully clear, 1 is fully black.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> Option<SceneType> {
        self.target
    }

    /// Returns `false` and changes nothing when a transition is already running.
    pub fn start_transition(
        &mut self,
        target: SceneType,
        on_scene_change: Option<SceneChangeCallback>,
        on_complete: Option<CompleteCallback>,
    ) -> bool {
        if self.state != TransitionState::Idle {
            debug!(requested = ?target, current = ?self.target, "transition_request_ignored");
            return false;
        }
        self.state = TransitionState::FadingOut;
        self.progress = 0.0;
        self.hold_remaining_ms = 0.0;
        self.target = Some(target);
        self.on_scene_change = on_scene_change;
        self.on_complete = on_complete;
        debug!(target = ?target, "transition_started");
        true
    }

    pub fn update(&mut self, dt_ms: f32) -> TransitionStep {
        let dt_ms = dt_ms.max(0.0);
        match self.state {
            TransitionState::Idle => TransitionStep::None,
            TransitionState::FadingOut => {
                self.progress = (self.progress + dt_ms / self.fade_duration_ms).min(1.0);
                if self.progress < 1.0 {
                    return TransitionStep::None;
                }
                let Some(target) = self.target else {
                    self.reset();
                    return TransitionStep::None;
                };
                self.state = TransitionState::FadingIn;
                self.hold_remaining_ms = self.hold_duration_ms;
                if let Some(callback) = self.on_scene_change.take() {
                    callback(target);
                }
                TransitionStep::SceneChanged(target)
            }
            TransitionState::FadingIn => {
                let mut fade_ms = dt_ms;
                if self.hold_remaining_ms > 0.0 {
                    self.hold_remaining_ms -= dt_ms;
                    if self.hold_remaining_ms > 0.0 {
                        return TransitionStep::None;
                    }
                    fade_ms = -self.hold_remaining_ms;
                    self.hold_remaining_ms = 0.0;
                }
                self.progress = (self.progress - fade_ms / self.fade_duration_ms).max(0.0);
                if self.progress > 0.0 {
                    return TransitionStep::None;
                }
                let target = self.target;
                let on_complete = self.on_complete.take();
                self.reset();
                if let Some(callback) = on_complete {
                    callback();
                }
                match target {
                    Some(target) => TransitionStep::Completed(target),
                    None => TransitionStep::None,
                }
            }
        }
    }

    pub fn render(&self, canvas: &mut Canvas<'_>) {
        if self.state == TransitionState::Idle || self.progress <= 0.0 {
            return;
        }
        canvas.wash(with_alpha(BLACK, self.progress));
    }

    fn reset(&mut self) {
        self.state = TransitionState::Idle;
        self.progress = 0.0;
        self.hold_remaining_ms = 0.0;
        self.target = None;
        self.on_scene_change = None;
        self.on_complete = None;
    }
}
