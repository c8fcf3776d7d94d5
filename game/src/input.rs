//! Raw input classification.
//!
//! [`classify`] is the single place that decides what ESC and the legacy `P` key mean in each
//! mode. Everything else is passed through to gameplay or the active menu untouched.

use winit::event::VirtualKeyCode;

use crate::gameplay::InputAction;
use crate::mode::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Key(VirtualKeyCode),
    Click { x: u32, y: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    OpenPause,
    ResumeOrClose,
    Quit,
    Gameplay(RawInput),
    MenuInput(RawInput),
}

pub const PAUSE_KEY: VirtualKeyCode = VirtualKeyCode::Escape;
pub const LEGACY_PAUSE_KEY: VirtualKeyCode = VirtualKeyCode::P;

pub fn classify(raw: RawInput, mode: Mode) -> InputClass {
    let key = match raw {
        RawInput::Key(key) => key,
        RawInput::Click { .. } => return InputClass::MenuInput(raw),
    };

    match (key, mode) {
        (PAUSE_KEY, Mode::MainMenu | Mode::GameOver) => InputClass::Quit,
        (PAUSE_KEY | LEGACY_PAUSE_KEY, Mode::Playing) => InputClass::OpenPause,
        (PAUSE_KEY | LEGACY_PAUSE_KEY, Mode::Paused) => InputClass::ResumeOrClose,
        (_, Mode::Playing) => InputClass::Gameplay(raw),
        (_, Mode::MainMenu | Mode::Paused | Mode::GameOver) => InputClass::MenuInput(raw),
    }
}

pub fn map_key_to_action(key: VirtualKeyCode) -> Option<InputAction> {
    match key {
        VirtualKeyCode::Left => Some(InputAction::MoveLeft),
        VirtualKeyCode::Right => Some(InputAction::MoveRight),
        VirtualKeyCode::Down => Some(InputAction::SoftDrop),
        VirtualKeyCode::Up | VirtualKeyCode::Z => Some(InputAction::RotateCw),
        VirtualKeyCode::X => Some(InputAction::RotateCcw),
        VirtualKeyCode::A | VirtualKeyCode::S => Some(InputAction::Rotate180),
        VirtualKeyCode::Space => Some(InputAction::HardDrop),
        VirtualKeyCode::R => Some(InputAction::Restart),
        VirtualKeyCode::C | VirtualKeyCode::LShift | VirtualKeyCode::RShift => {
            Some(InputAction::Hold)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [Mode; 4] = [Mode::MainMenu, Mode::Playing, Mode::Paused, Mode::GameOver];

    fn key(k: VirtualKeyCode) -> RawInput {
        RawInput::Key(k)
    }

    #[test]
    fn escape_policy_by_mode() {
        assert_eq!(classify(key(PAUSE_KEY), Mode::MainMenu), InputClass::Quit);
        assert_eq!(classify(key(PAUSE_KEY), Mode::Playing), InputClass::OpenPause);
        assert_eq!(classify(key(PAUSE_KEY), Mode::Paused), InputClass::ResumeOrClose);
        assert_eq!(classify(key(PAUSE_KEY), Mode::GameOver), InputClass::Quit);
    }

    #[test]
    fn legacy_key_never_quits() {
        for mode in ALL_MODES {
            assert_ne!(
                classify(key(LEGACY_PAUSE_KEY), mode),
                InputClass::Quit,
                "P must not quit in {mode:?}"
            );
        }
        assert_eq!(
            classify(key(LEGACY_PAUSE_KEY), Mode::MainMenu),
            InputClass::MenuInput(key(LEGACY_PAUSE_KEY))
        );
    }

    #[test]
    fn legacy_key_matches_escape_between_playing_and_paused() {
        for mode in [Mode::Playing, Mode::Paused] {
            assert_eq!(classify(key(LEGACY_PAUSE_KEY), mode), classify(key(PAUSE_KEY), mode));
        }
    }

    #[test]
    fn other_keys_route_by_mode() {
        let left = key(VirtualKeyCode::Left);
        assert_eq!(classify(left, Mode::Playing), InputClass::Gameplay(left));
        for mode in [Mode::MainMenu, Mode::Paused, Mode::GameOver] {
            assert_eq!(classify(left, mode), InputClass::MenuInput(left));
        }
    }

    #[test]
    fn clicks_are_always_menu_input() {
        let click = RawInput::Click { x: 3, y: 4 };
        for mode in ALL_MODES {
            assert_eq!(classify(click, mode), InputClass::MenuInput(click));
        }
    }

    #[test]
    fn pause_keys_are_not_gameplay_actions() {
        assert_eq!(map_key_to_action(PAUSE_KEY), None);
        assert_eq!(map_key_to_action(LEGACY_PAUSE_KEY), None);
        assert_eq!(map_key_to_action(VirtualKeyCode::Space), Some(InputAction::HardDrop));
    }
}
