use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fall_timer::FallTimer;
use crate::mode::Mode;
use crate::tetris_core::{GravityStep, LockOutcome, TetrisCore};

/// Everything needed to resume a game exactly where it stopped.
///
/// This is the value that gets saved, loaded, and compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub tetris: TetrisCore,
    pub fall_timer: FallTimer,
    #[serde(with = "crate::serde_duration")]
    pub play_time: Duration,
}

/// Result of advancing a running session by one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTick {
    pub gravity_steps: u32,
    pub locks: Vec<LockOutcome>,
    pub topped_out: bool,
}

impl Session {
    pub fn new(tetris: TetrisCore) -> Self {
        Self {
            tetris,
            fall_timer: FallTimer::new(),
            play_time: Duration::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        self.tetris.validate()
    }

    /// Advances play time and gravity by `dt`.
    pub fn tick(&mut self, dt: Duration) -> SessionTick {
        let mut out = SessionTick::default();
        if self.tetris.is_game_over() {
            out.topped_out = true;
            return out;
        }

        self.play_time = self.play_time.saturating_add(dt);
        let steps = self.fall_timer.advance(dt, self.tetris.gravity_interval());
        for _ in 0..steps {
            out.gravity_steps += 1;
            if let GravityStep::Locked(outcome) = self.tetris.gravity_step() {
                out.locks.push(outcome);
                // A lock starts a fresh piece; it should get a full interval before falling.
                self.fall_timer.reset();
                break;
            }
        }
        out.topped_out = self.tetris.is_game_over();
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) mode: Mode,
    pub(crate) paused_from: Option<Mode>,
    pub(crate) session: Session,
}

impl GameState {
    pub fn new(session: Session) -> Self {
        Self {
            mode: Mode::default(),
            paused_from: None,
            session,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The mode a resume returns to; only set while paused.
    pub fn paused_from(&self) -> Option<Mode> {
        self.paused_from
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tetris(&self) -> &TetrisCore {
        &self.session.tetris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetris_core::{Piece, Vec2i};

    fn playing_session() -> Session {
        let mut core = TetrisCore::new(3);
        core.initialize_game();
        Session::new(core)
    }

    #[test]
    fn tick_moves_piece_after_one_interval() {
        let mut session = playing_session();
        let start_y = session.tetris.current_piece_pos().y;
        let interval = session.tetris.gravity_interval();

        let out = session.tick(interval / 2);
        assert_eq!(out.gravity_steps, 0);
        assert_eq!(session.tetris.current_piece_pos().y, start_y);

        let out = session.tick(interval / 2);
        assert_eq!(out.gravity_steps, 1);
        assert_eq!(session.tetris.current_piece_pos().y, start_y - 1);
        assert_eq!(session.play_time, interval);
    }

    #[test]
    fn tick_locks_grounded_piece_and_resets_phase() {
        let mut session = playing_session();
        session
            .tetris
            .set_current_piece_for_test(Piece::O, Vec2i::new(4, 1), 0);
        let interval = session.tetris.gravity_interval();

        let out = session.tick(interval + interval / 4);
        assert_eq!(out.locks.len(), 1);
        assert_eq!(session.fall_timer.phase(), Duration::ZERO);
        assert_eq!(session.tetris.board()[0][4], Piece::O.cell());
    }

    #[test]
    fn fresh_state_starts_in_main_menu() {
        let state = GameState::new(playing_session());
        assert_eq!(state.mode(), Mode::MainMenu);
        assert_eq!(state.paused_from(), None);
    }
}
