use engine::GameLogic;

use crate::tetris_core::{RotationDir, TetrisCore, Vec2i};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCw,
    RotateCcw,
    Rotate180,
    HardDrop,
    Hold,
    Restart,
}

#[derive(Debug, Clone)]
pub struct TetrisLogic {
    seed: u64,
    start_level: u32,
}

impl TetrisLogic {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start_level: 1,
        }
    }

    pub fn with_start_level(mut self, level: u32) -> Self {
        self.start_level = level;
        self
    }

    pub fn set_start_level(&mut self, level: u32) {
        self.start_level = level;
    }

    pub fn start_level(&self) -> u32 {
        self.start_level
    }

    /// A fresh game that continues `previous`'s randomizer, so restarts get new pieces.
    pub fn restart_from(&self, previous: &TetrisCore) -> TetrisCore {
        let mut core = previous.clone();
        core.set_start_level(self.start_level);
        core.initialize_game();
        core
    }
}

/// Applies one player action in place. Returns whether the piece actually changed.
pub fn apply_action(core: &mut TetrisCore, action: InputAction) -> bool {
    match action {
        InputAction::MoveLeft => core.move_piece(Vec2i::new(-1, 0)),
        InputAction::MoveRight => core.move_piece(Vec2i::new(1, 0)),
        InputAction::SoftDrop => core.soft_drop(),
        InputAction::RotateCw => core.rotate_piece(RotationDir::Cw),
        InputAction::RotateCcw => core.rotate_piece(RotationDir::Ccw),
        InputAction::Rotate180 => core.rotate_piece(RotationDir::Half),
        InputAction::HardDrop => {
            core.hard_drop();
            true
        }
        InputAction::Hold => core.hold_piece(),
        InputAction::Restart => {
            core.initialize_game();
            true
        }
    }
}

impl GameLogic for TetrisLogic {
    type State = TetrisCore;
    type Input = InputAction;

    fn initial_state(&self) -> Self::State {
        let mut core = TetrisCore::new(self.seed);
        core.set_start_level(self.start_level);
        core.initialize_game();
        core
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        if input == InputAction::Restart {
            return self.restart_from(state);
        }
        let mut next = state.clone();
        apply_action(&mut next, input);
        next
    }
}
