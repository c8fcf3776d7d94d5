use serde::{Deserialize, Serialize};

/// Top-level phase of the application. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    MainMenu,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    StartGame,
    Pause,
    Resume,
    LoadSession,
    TopOut,
    Back,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    None,
    NewSession,
    FreezeTimers,
    InstallLoadedSession,
    Exit,
}

impl Mode {
    /// Pure transition function for the mode state machine.
    ///
    /// Side effects are reported as a `ModeEffect` for the router to carry out.
    pub fn handle(self, event: ModeEvent) -> (Mode, ModeEffect) {
        match (self, event) {
            (Mode::MainMenu, ModeEvent::StartGame) => (Mode::Playing, ModeEffect::NewSession),
            (Mode::GameOver, ModeEvent::StartGame) => (Mode::Playing, ModeEffect::NewSession),

            (Mode::Playing, ModeEvent::Pause) => (Mode::Paused, ModeEffect::FreezeTimers),
            (Mode::Playing, ModeEvent::TopOut) => (Mode::GameOver, ModeEffect::None),

            (Mode::Paused, ModeEvent::Resume) => (Mode::Playing, ModeEffect::None),
            (Mode::Paused, ModeEvent::LoadSession) => {
                (Mode::Playing, ModeEffect::InstallLoadedSession)
            }

            (Mode::GameOver, ModeEvent::Back) => (Mode::MainMenu, ModeEffect::None),

            (Mode::MainMenu | Mode::Paused | Mode::GameOver, ModeEvent::Quit) => {
                (self, ModeEffect::Exit)
            }

            // Everything else is ignored in the current mode.
            (mode, _) => (mode, ModeEffect::None),
        }
    }

    pub fn is_playing(self) -> bool {
        self == Mode::Playing
    }

    pub fn is_paused(self) -> bool {
        self == Mode::Paused
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::MainMenu => "main-menu",
            Mode::Playing => "playing",
            Mode::Paused => "paused",
            Mode::GameOver => "game-over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_main_menu() {
        assert_eq!(Mode::default(), Mode::MainMenu);
    }

    #[test]
    fn start_game_from_menu_or_game_over_requests_new_session() {
        for mode in [Mode::MainMenu, Mode::GameOver] {
            assert_eq!(
                mode.handle(ModeEvent::StartGame),
                (Mode::Playing, ModeEffect::NewSession)
            );
        }
    }

    #[test]
    fn pause_and_resume_round_trip() {
        assert_eq!(
            Mode::Playing.handle(ModeEvent::Pause),
            (Mode::Paused, ModeEffect::FreezeTimers)
        );
        assert_eq!(
            Mode::Paused.handle(ModeEvent::Resume),
            (Mode::Playing, ModeEffect::None)
        );
    }

    #[test]
    fn resume_while_playing_is_a_no_op() {
        assert_eq!(
            Mode::Playing.handle(ModeEvent::Resume),
            (Mode::Playing, ModeEffect::None)
        );
    }

    #[test]
    fn paused_is_only_entered_from_playing() {
        for mode in [Mode::MainMenu, Mode::GameOver, Mode::Paused] {
            assert_eq!(mode.handle(ModeEvent::Pause), (mode, ModeEffect::None));
        }
    }

    #[test]
    fn load_while_paused_installs_session_and_plays() {
        assert_eq!(
            Mode::Paused.handle(ModeEvent::LoadSession),
            (Mode::Playing, ModeEffect::InstallLoadedSession)
        );
        assert_eq!(
            Mode::MainMenu.handle(ModeEvent::LoadSession),
            (Mode::MainMenu, ModeEffect::None)
        );
    }

    #[test]
    fn top_out_only_ends_a_running_game() {
        assert_eq!(
            Mode::Playing.handle(ModeEvent::TopOut),
            (Mode::GameOver, ModeEffect::None)
        );
        assert_eq!(
            Mode::Paused.handle(ModeEvent::TopOut),
            (Mode::Paused, ModeEffect::None)
        );
    }

    #[test]
    fn quit_exits_everywhere_but_playing() {
        for mode in [Mode::MainMenu, Mode::Paused, Mode::GameOver] {
            assert_eq!(mode.handle(ModeEvent::Quit), (mode, ModeEffect::Exit));
        }
        assert_eq!(
            Mode::Playing.handle(ModeEvent::Quit),
            (Mode::Playing, ModeEffect::None)
        );
    }

    #[test]
    fn back_from_game_over_returns_to_main_menu() {
        assert_eq!(
            Mode::GameOver.handle(ModeEvent::Back),
            (Mode::MainMenu, ModeEffect::None)
        );
    }
}
