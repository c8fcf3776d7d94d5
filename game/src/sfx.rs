use crate::gameplay::InputAction;
use crate::tetris_core::{Piece, TetrisCore, Vec2i};

/// Per-effect volume constants (0.0..=1.0), scaled by the user's SFX gain.
pub const MOVE_PIECE_SFX_VOLUME: f32 = 0.25;
pub const ACTION_SFX_VOLUME: f32 = 0.35;
pub const LINE_CLEAR_SFX_VOLUME: f32 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfxKind {
    Move,
    Rotate,
    Hold,
    Drop,
    Line,
}

impl SfxKind {
    pub const ALL: [SfxKind; 5] = [
        SfxKind::Move,
        SfxKind::Rotate,
        SfxKind::Hold,
        SfxKind::Drop,
        SfxKind::Line,
    ];

    /// File stem looked up in the sounds directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            SfxKind::Move => "move",
            SfxKind::Rotate => "rotate",
            SfxKind::Hold => "hold",
            SfxKind::Drop => "drop",
            SfxKind::Line => "line",
        }
    }

    pub fn volume(self) -> f32 {
        match self {
            SfxKind::Move => MOVE_PIECE_SFX_VOLUME,
            SfxKind::Rotate | SfxKind::Hold | SfxKind::Drop => ACTION_SFX_VOLUME,
            SfxKind::Line => LINE_CLEAR_SFX_VOLUME,
        }
    }
}

/// The parts of the core that decide whether an action was audible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSnapshot {
    pos: Vec2i,
    rotation: u8,
    piece: Option<Piece>,
    held: Option<Piece>,
    can_hold: bool,
    lines: u32,
}

impl PieceSnapshot {
    pub fn of(core: &TetrisCore) -> Self {
        Self {
            pos: core.current_piece_pos(),
            rotation: core.current_piece_rotation(),
            piece: core.current_piece(),
            held: core.held_piece(),
            can_hold: core.can_hold(),
            lines: core.lines_cleared(),
        }
    }
}

/// Sounds for one applied action, given the core before and after it.
pub fn sounds_for(action: InputAction, before: &PieceSnapshot, after: &PieceSnapshot) -> Vec<SfxKind> {
    let mut out = Vec::new();
    let cue = match action {
        InputAction::MoveLeft | InputAction::MoveRight | InputAction::SoftDrop => {
            (after.pos != before.pos).then_some(SfxKind::Move)
        }
        InputAction::RotateCw | InputAction::RotateCcw | InputAction::Rotate180 => {
            (after.rotation != before.rotation).then_some(SfxKind::Rotate)
        }
        InputAction::HardDrop => Some(SfxKind::Drop),
        InputAction::Hold => (after.piece != before.piece
            || after.held != before.held
            || after.can_hold != before.can_hold)
            .then_some(SfxKind::Hold),
        InputAction::Restart => None,
    };
    out.extend(cue);
    if action != InputAction::Restart && after.lines > before.lines {
        out.push(SfxKind::Line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::apply_action;

    fn core() -> TetrisCore {
        let mut core = TetrisCore::new(21);
        core.initialize_game();
        core
    }

    fn run(core: &mut TetrisCore, action: InputAction) -> Vec<SfxKind> {
        let before = PieceSnapshot::of(core);
        apply_action(core, action);
        sounds_for(action, &before, &PieceSnapshot::of(core))
    }

    #[test]
    fn volumes_are_in_range() {
        for kind in SfxKind::ALL {
            assert!((0.0..=1.0).contains(&kind.volume()), "{kind:?}");
        }
    }

    #[test]
    fn blocked_move_is_silent() {
        let mut core = core();
        for _ in 0..10 {
            run(&mut core, InputAction::MoveLeft);
        }
        assert!(run(&mut core, InputAction::MoveLeft).is_empty());
    }

    #[test]
    fn hard_drop_always_sounds() {
        let mut core = core();
        assert_eq!(run(&mut core, InputAction::HardDrop), vec![SfxKind::Drop]);
    }

    #[test]
    fn line_clear_adds_line_cue() {
        let mut core = core();
        core.set_current_piece_for_test(Piece::I, Vec2i::new(4, 10), 0);
        for x in 0..10 {
            if !(3..=6).contains(&x) {
                core.set_cell(x, 0, Piece::O.cell());
            }
        }
        let sounds = run(&mut core, InputAction::HardDrop);
        assert_eq!(sounds, vec![SfxKind::Drop, SfxKind::Line]);
    }
}
