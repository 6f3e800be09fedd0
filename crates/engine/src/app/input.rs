#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
}

const ACTION_COUNT: usize = 5;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Interact => 4,
        }
    }

    /// Maps a host key identifier (DOM-style names such as `"ArrowUp"` or `"w"`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(InputAction::MoveUp),
            "ArrowDown" | "s" | "S" => Some(InputAction::MoveDown),
            "ArrowLeft" | "a" | "A" => Some(InputAction::MoveLeft),
            "ArrowRight" | "d" | "D" => Some(InputAction::MoveRight),
            "Enter" | " " | "e" | "E" => Some(InputAction::Interact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// Held actions plus a one-shot interact edge.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct InputState {
    actions: ActionStates,
    interact_pressed_edge: bool,
}

impl InputState {
    /// Returns `false` for keys that map to no action.
    pub(crate) fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = InputAction::from_key(key) else {
            return false;
        };
        if action == InputAction::Interact && !self.actions.is_down(action) {
            self.interact_pressed_edge = true;
        }
        self.actions.set(action, true);
        true
    }

    pub(crate) fn key_up(&mut self, key: &str) -> bool {
        let Some(action) = InputAction::from_key(key) else {
            return false;
        };
        self.actions.set(action, false);
        true
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub(crate) fn take_interact_pressed(&mut self) -> bool {
        let was_pressed = self.interact_pressed_edge;
        self.interact_pressed_edge = false;
        was_pressed
    }

    /// Raw direction vector from held keys, not normalized.
    pub(crate) fn direction_vector(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.is_down(InputAction::MoveLeft) {
            dx -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            dx += 1.0;
        }
        if self.is_down(InputAction::MoveUp) {
            dy -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            dy += 1.0;
        }
        (dx, dy)
    }

    pub(crate) fn release_all(&mut self) {
        *self = Self::default();
    }
}
