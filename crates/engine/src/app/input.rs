#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Fire,
    Quit,
}

const ACTION_COUNT: usize = 6;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Fire,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Fire => 4,
            InputAction::Quit => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

/// Tracks held actions and latches up->down transitions until the next
/// snapshot is taken, so a press shorter than one tick is never lost and a
/// held key reports exactly one press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputLatch {
    held: ActionStates,
    pressed_edges: ActionStates,
    quit_requested: bool,
}

impl InputLatch {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        if is_down && !self.held.is_down(action) {
            self.pressed_edges.set(action, true);
        }
        self.held.set(action, is_down);
        if action == InputAction::Quit && is_down {
            self.quit_requested = true;
        }
    }

    /// Replaces the whole held set, latching edges for every action that
    /// goes from up to down.
    pub fn set_held(&mut self, held: &[InputAction]) {
        for action in InputAction::ALL {
            self.set(action, held.contains(&action));
        }
    }

    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn snapshot_for_tick(&mut self) -> super::InputSnapshot {
        let snapshot =
            super::InputSnapshot::new(self.quit_requested, self.held, self.pressed_edges);
        self.pressed_edges.clear();
        snapshot
    }
}
