//! Top-level event dispatch.
//!
//! [`ModeRouter`] owns the single [`GameState`], routes every classified input to gameplay or
//! the active menu, and is the only place that changes the mode.

use std::time::Duration;

use engine::GameLogic;
use winit::event::VirtualKeyCode;

use crate::gameplay::{InputAction, TetrisLogic};
use crate::input::{InputClass, RawInput, classify, map_key_to_action};
use crate::layout::PauseMenuLayout;
use crate::mode::{Mode, ModeEffect, ModeEvent};
use crate::music::{MusicControl, TrackDirection};
use crate::pause_menu::{MenuCommand, PauseAction, PauseMenu, menu_command_for};
use crate::save::SessionStore;
use crate::settings::GameplaySettings;
use crate::sfx::{PieceSnapshot, SfxKind, sounds_for};
use crate::state::{GameState, Session};
use crate::tetris_core::{MAX_START_LEVEL, MIN_START_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    pub confirm_exit: bool,
    pub start_level: u32,
    pub auto_pause_on_focus_loss: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self::from(&GameplaySettings::default())
    }
}

impl From<&GameplaySettings> for RouterOptions {
    fn from(settings: &GameplaySettings) -> Self {
        Self {
            confirm_exit: settings.confirm_exit,
            start_level: settings.start_level,
            auto_pause_on_focus_loss: settings.auto_pause_on_focus_loss,
        }
    }
}

pub struct ModeRouter<S, M> {
    state: GameState,
    pause_menu: Option<PauseMenu>,
    pause_layout: Option<PauseMenuLayout>,
    logic: TetrisLogic,
    store: S,
    music: M,
    options: RouterOptions,
    sounds: Vec<SfxKind>,
}

impl<S: SessionStore, M: MusicControl> ModeRouter<S, M> {
    pub fn new(seed: u64, store: S, music: M, options: RouterOptions) -> Self {
        let logic = TetrisLogic::new(seed).with_start_level(options.start_level);
        let session = Session::new(logic.initial_state());
        Self {
            state: GameState::new(session),
            pause_menu: None,
            pause_layout: None,
            logic,
            store,
            music,
            options,
            sounds: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn session(&self) -> &Session {
        self.state.session()
    }

    pub fn pause_menu(&self) -> Option<&PauseMenu> {
        self.pause_menu.as_ref()
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    pub fn start_level(&self) -> u32 {
        self.logic.start_level()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn music(&self) -> &M {
        &self.music
    }

    pub fn music_mut(&mut self) -> &mut M {
        &mut self.music
    }

    /// Layout of the last drawn pause menu, used to resolve clicks.
    pub fn set_pause_layout(&mut self, layout: Option<PauseMenuLayout>) {
        self.pause_layout = layout;
    }

    /// Sound cues produced since the last call.
    pub fn drain_sounds(&mut self) -> Vec<SfxKind> {
        std::mem::take(&mut self.sounds)
    }

    pub fn set_start_level(&mut self, level: u32) {
        let level = level.clamp(MIN_START_LEVEL, MAX_START_LEVEL);
        self.logic.set_start_level(level);
        self.options.start_level = level;
    }

    /// Starts play directly with `session`, as if a new game had begun.
    pub fn start_with_session(&mut self, session: Session) {
        if self.transition(ModeEvent::StartGame) == ModeEffect::NewSession {
            self.state.session = session;
        }
    }

    pub fn dispatch(&mut self, raw: RawInput) -> Flow {
        match classify(raw, self.state.mode) {
            InputClass::Quit => {
                self.transition(ModeEvent::Quit);
                tracing::info!(mode = self.state.mode.name(), "quit requested");
                Flow::Exit
            }
            InputClass::OpenPause => {
                self.open_pause();
                Flow::Continue
            }
            InputClass::ResumeOrClose => self.menu_command(MenuCommand::Close),
            InputClass::Gameplay(raw) => {
                self.gameplay_input(raw);
                Flow::Continue
            }
            InputClass::MenuInput(raw) => match self.state.mode {
                Mode::MainMenu => self.main_menu_input(raw),
                Mode::Paused => {
                    let command = self
                        .pause_menu
                        .as_ref()
                        .and_then(|menu| menu_command_for(raw, menu, self.pause_layout.as_ref()));
                    match command {
                        Some(command) => self.menu_command(command),
                        None => Flow::Continue,
                    }
                }
                Mode::GameOver => self.game_over_input(raw),
                Mode::Playing => Flow::Continue,
            },
        }
    }

    /// Advances the frame clock. Gravity only runs while Playing.
    pub fn tick(&mut self, dt: Duration) {
        match self.state.mode {
            Mode::Playing => {
                let out = self.state.session.tick(dt);
                for lock in &out.locks {
                    if lock.lines > 0 {
                        self.sounds.push(SfxKind::Line);
                    }
                }
                if out.topped_out {
                    self.top_out();
                }
            }
            Mode::Paused => {
                if let Some(menu) = self.pause_menu.as_mut() {
                    menu.tick(dt);
                }
            }
            Mode::MainMenu | Mode::GameOver => {}
        }
    }

    pub fn on_focus_lost(&mut self) {
        if self.options.auto_pause_on_focus_loss && self.state.mode == Mode::Playing {
            tracing::info!("focus lost; pausing");
            self.open_pause();
        }
    }

    /// Applies a pause-menu result. `Resume` while already Playing is a no-op.
    pub fn apply(&mut self, action: PauseAction) -> Flow {
        tracing::debug!(action = action.name(), "pause action");
        match action {
            PauseAction::Resume => {
                self.transition(ModeEvent::Resume);
                if self.state.mode != Mode::Paused {
                    self.pause_menu = None;
                }
                Flow::Continue
            }
            PauseAction::Quit => {
                if self.transition(ModeEvent::Quit) == ModeEffect::Exit {
                    tracing::info!("quit from pause menu");
                    Flow::Exit
                } else {
                    Flow::Continue
                }
            }
            PauseAction::Load(session) => {
                if self.transition(ModeEvent::LoadSession) == ModeEffect::InstallLoadedSession {
                    self.state.session = *session;
                    self.pause_menu = None;
                    tracing::info!(score = self.state.session.tetris.score(), "saved game installed");
                }
                Flow::Continue
            }
            PauseAction::Save | PauseAction::TrackChange(_) => Flow::Continue,
        }
    }

    fn transition(&mut self, event: ModeEvent) -> ModeEffect {
        let from = self.state.mode;
        let (to, effect) = from.handle(event);
        if to != from {
            tracing::info!(from = from.name(), to = to.name(), ?event, "mode changed");
            self.state.paused_from = (to == Mode::Paused).then_some(from);
        }
        self.state.mode = to;

        if effect == ModeEffect::NewSession {
            let core = self.logic.restart_from(&self.state.session.tetris);
            self.state.session = Session::new(core);
        }
        effect
    }

    fn open_pause(&mut self) {
        if self.transition(ModeEvent::Pause) == ModeEffect::FreezeTimers {
            self.pause_menu = Some(PauseMenu::new(self.options.confirm_exit));
        }
    }

    fn menu_command(&mut self, command: MenuCommand) -> Flow {
        let Some(menu) = self.pause_menu.as_mut() else {
            return Flow::Continue;
        };
        let action = menu.handle(command, &self.state.session, &mut self.store, &mut self.music);
        match action {
            Some(action) => self.apply(action),
            None => Flow::Continue,
        }
    }

    fn gameplay_input(&mut self, raw: RawInput) {
        let RawInput::Key(key) = raw else {
            return;
        };
        let Some(action) = map_key_to_action(key) else {
            return;
        };

        let next = self.logic.step(&self.state.session.tetris, action);
        if action == InputAction::Restart {
            self.state.session = Session::new(next);
            tracing::info!(level = self.logic.start_level(), "game restarted");
            return;
        }

        let session = &mut self.state.session;
        let before = PieceSnapshot::of(&session.tetris);
        let changed = next != session.tetris;
        session.tetris = next;
        if action == InputAction::HardDrop {
            session.fall_timer.reset();
        }
        if changed {
            self.sounds
                .extend(sounds_for(action, &before, &PieceSnapshot::of(&session.tetris)));
        }

        if session.tetris.is_game_over() {
            self.top_out();
        }
    }

    fn top_out(&mut self) {
        self.transition(ModeEvent::TopOut);
        let core = &self.state.session.tetris;
        tracing::info!(
            score = core.score(),
            lines = core.lines_cleared(),
            level = core.level(),
            "game over"
        );
    }

    fn main_menu_input(&mut self, raw: RawInput) -> Flow {
        let RawInput::Key(key) = raw else {
            return Flow::Continue;
        };
        match key {
            VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter | VirtualKeyCode::Space => {
                self.transition(ModeEvent::StartGame);
            }
            VirtualKeyCode::Left => self.set_start_level(self.start_level().saturating_sub(1)),
            VirtualKeyCode::Right => self.set_start_level(self.start_level() + 1),
            VirtualKeyCode::Up => self.music.skip_track(TrackDirection::Previous),
            VirtualKeyCode::Down => self.music.skip_track(TrackDirection::Next),
            _ => {}
        }
        Flow::Continue
    }

    fn game_over_input(&mut self, raw: RawInput) -> Flow {
        let RawInput::Key(key) = raw else {
            return Flow::Continue;
        };
        match key {
            VirtualKeyCode::Return
            | VirtualKeyCode::NumpadEnter
            | VirtualKeyCode::Space
            | VirtualKeyCode::R => {
                self.transition(ModeEvent::StartGame);
            }
            VirtualKeyCode::M | VirtualKeyCode::Back => {
                self.transition(ModeEvent::Back);
            }
            _ => {}
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{LoadError, SaveError};
    use std::path::PathBuf;

    struct NoStore;

    impl SessionStore for NoStore {
        fn save(&mut self, _session: &Session) -> Result<(), SaveError> {
            Ok(())
        }

        fn load(&mut self) -> Result<Session, LoadError> {
            Err(LoadError::Missing {
                path: PathBuf::from("none"),
            })
        }
    }

    #[derive(Default)]
    struct Skips(Vec<TrackDirection>);

    impl MusicControl for Skips {
        fn skip_track(&mut self, direction: TrackDirection) {
            self.0.push(direction);
        }
    }

    fn router() -> ModeRouter<NoStore, Skips> {
        ModeRouter::new(9, NoStore, Skips::default(), RouterOptions::default())
    }

    fn key(k: VirtualKeyCode) -> RawInput {
        RawInput::Key(k)
    }

    #[test]
    fn enter_starts_a_game_from_the_main_menu() {
        let mut r = router();
        assert_eq!(r.dispatch(key(VirtualKeyCode::Return)), Flow::Continue);
        assert_eq!(r.mode(), Mode::Playing);
        assert!(r.session().tetris.current_piece().is_some());
    }

    #[test]
    fn escape_quits_from_main_menu() {
        let mut r = router();
        assert_eq!(r.dispatch(key(VirtualKeyCode::Escape)), Flow::Exit);
    }

    #[test]
    fn start_level_is_adjusted_within_bounds() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Left));
        assert_eq!(r.start_level(), MIN_START_LEVEL);
        for _ in 0..20 {
            r.dispatch(key(VirtualKeyCode::Right));
        }
        assert_eq!(r.start_level(), MAX_START_LEVEL);
        r.dispatch(key(VirtualKeyCode::Return));
        assert_eq!(r.session().tetris.level(), MAX_START_LEVEL);
    }

    #[test]
    fn main_menu_arrows_skip_tracks() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Down));
        r.dispatch(key(VirtualKeyCode::Up));
        assert_eq!(
            r.music().0,
            vec![TrackDirection::Next, TrackDirection::Previous]
        );
    }

    #[test]
    fn gravity_only_runs_while_playing() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Return));
        let before = r.session().clone();
        r.dispatch(key(VirtualKeyCode::Escape));
        r.tick(Duration::from_secs(10));
        assert_eq!(r.session(), &before);
        assert_eq!(r.state().paused_from(), Some(Mode::Playing));
    }

    #[test]
    fn focus_loss_pauses_when_enabled() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Return));
        r.on_focus_lost();
        assert_eq!(r.mode(), Mode::Paused);

        let mut r = ModeRouter::new(
            9,
            NoStore,
            Skips::default(),
            RouterOptions {
                auto_pause_on_focus_loss: false,
                ..RouterOptions::default()
            },
        );
        r.dispatch(key(VirtualKeyCode::Return));
        r.on_focus_lost();
        assert_eq!(r.mode(), Mode::Playing);
    }

    #[test]
    fn hard_drop_queues_a_drop_sound() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Return));
        r.dispatch(key(VirtualKeyCode::Space));
        assert!(r.drain_sounds().contains(&SfxKind::Drop));
        assert!(r.drain_sounds().is_empty());
    }

    #[test]
    fn top_out_goes_to_game_over_and_enter_restarts() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Return));
        for _ in 0..200 {
            if r.mode() == Mode::GameOver {
                break;
            }
            r.dispatch(key(VirtualKeyCode::Space));
        }
        assert_eq!(r.mode(), Mode::GameOver);
        assert_eq!(r.dispatch(key(VirtualKeyCode::P)), Flow::Continue);
        assert_eq!(r.mode(), Mode::GameOver);

        r.dispatch(key(VirtualKeyCode::Return));
        assert_eq!(r.mode(), Mode::Playing);
        assert_eq!(r.session().tetris.score(), 0);
        assert!(!r.session().tetris.is_game_over());
    }

    #[test]
    fn game_over_back_returns_to_main_menu() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Return));
        while r.mode() == Mode::Playing {
            r.dispatch(key(VirtualKeyCode::Space));
        }
        r.dispatch(key(VirtualKeyCode::M));
        assert_eq!(r.mode(), Mode::MainMenu);

        r.dispatch(key(VirtualKeyCode::Return));
        while r.mode() == Mode::Playing {
            r.dispatch(key(VirtualKeyCode::Space));
        }
        r.dispatch(key(VirtualKeyCode::Back));
        assert_eq!(r.mode(), Mode::MainMenu);
    }

    #[test]
    fn gameplay_keys_follow_the_logic_step() {
        let mut r = router();
        r.dispatch(key(VirtualKeyCode::Return));
        let logic = TetrisLogic::new(9);
        let mut expected = r.session().tetris.clone();

        for (k, action) in [
            (VirtualKeyCode::Left, InputAction::MoveLeft),
            (VirtualKeyCode::Up, InputAction::RotateCw),
            (VirtualKeyCode::Space, InputAction::HardDrop),
            (VirtualKeyCode::Left, InputAction::MoveLeft),
        ] {
            r.dispatch(key(k));
            expected = logic.step(&expected, action);
            assert_eq!(r.session().tetris, expected, "{action:?}");
        }
        assert!(expected.score() > 0);
    }
}
