//! The pause menu as an explicit sub-state.
//!
//! [`PauseMenu`] is fed one [`MenuCommand`] at a time and answers with an optional
//! [`PauseAction`]. It reads the paused [`Session`] but never writes it; loads come back to the
//! caller as `PauseAction::Load` and are installed by the router.

use std::time::Duration;

use winit::event::VirtualKeyCode;

use crate::input::RawInput;
use crate::layout::PauseMenuLayout;
use crate::music::{MusicControl, TrackDirection};
use crate::save::SessionStore;
use crate::state::Session;

/// How long a status message stays up without further input.
pub const STATUS_LIFETIME: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseItem {
    Resume,
    Save,
    Load,
    NextTrack,
    PrevTrack,
    Exit,
}

impl PauseItem {
    pub const ALL: [PauseItem; 6] = [
        PauseItem::Resume,
        PauseItem::Save,
        PauseItem::Load,
        PauseItem::NextTrack,
        PauseItem::PrevTrack,
        PauseItem::Exit,
    ];
    pub const COUNT: usize = Self::ALL.len();

    pub fn label(self) -> &'static str {
        match self {
            PauseItem::Resume => "RESUME",
            PauseItem::Save => "SAVE GAME",
            PauseItem::Load => "LOAD GAME",
            PauseItem::NextTrack => "NEXT TRACK",
            PauseItem::PrevTrack => "PREV TRACK",
            PauseItem::Exit => "EXIT",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PauseItem::Resume => 0,
            PauseItem::Save => 1,
            PauseItem::Load => 2,
            PauseItem::NextTrack => 3,
            PauseItem::PrevTrack => 4,
            PauseItem::Exit => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Up,
    Down,
    /// Flips the Yes/No focus of the exit confirmation.
    Toggle,
    Activate,
    Choose(PauseItem),
    /// ESC or the legacy pause key.
    Close,
    ConfirmYes,
    ConfirmNo,
}

/// Result of one pause-menu interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseAction {
    Resume,
    Quit,
    Load(Box<Session>),
    /// The save already happened; reported for logging only.
    Save,
    TrackChange(TrackDirection),
}

impl PauseAction {
    /// Whether this action closes the menu.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PauseAction::Resume | PauseAction::Quit | PauseAction::Load(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            PauseAction::Resume => "resume",
            PauseAction::Quit => "quit",
            PauseAction::Load(_) => "load",
            PauseAction::Save => "save",
            PauseAction::TrackChange(_) => "track-change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
    age: Duration,
}

impl StatusLine {
    fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            age: Duration::ZERO,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitConfirm {
    pub yes_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseMenu {
    selected: usize,
    confirm: Option<ExitConfirm>,
    status: Option<StatusLine>,
    confirm_exit: bool,
}

impl PauseMenu {
    pub fn new(confirm_exit: bool) -> Self {
        Self {
            selected: 0,
            confirm: None,
            status: None,
            confirm_exit,
        }
    }

    pub fn selected(&self) -> PauseItem {
        PauseItem::ALL[self.selected % PauseItem::COUNT]
    }

    pub fn confirm(&self) -> Option<ExitConfirm> {
        self.confirm
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm.is_some()
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn confirm_exit(&self) -> bool {
        self.confirm_exit
    }

    /// Ages the status line by paused real time.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(status) = self.status.as_mut() {
            status.age = status.age.saturating_add(dt);
            if status.age >= STATUS_LIFETIME {
                self.status = None;
            }
        }
    }

    /// Applies one command. Save, load and track skips go through the collaborators; the
    /// session itself is only read.
    pub fn handle<S, M>(
        &mut self,
        command: MenuCommand,
        session: &Session,
        store: &mut S,
        music: &mut M,
    ) -> Option<PauseAction>
    where
        S: SessionStore + ?Sized,
        M: MusicControl + ?Sized,
    {
        self.status = None;

        if let Some(confirm) = self.confirm {
            return self.handle_confirm(command, confirm);
        }

        match command {
            MenuCommand::Up => {
                self.selected = (self.selected + PauseItem::COUNT - 1) % PauseItem::COUNT;
                None
            }
            MenuCommand::Down => {
                self.selected = (self.selected + 1) % PauseItem::COUNT;
                None
            }
            MenuCommand::Activate => self.activate(self.selected(), session, store, music),
            MenuCommand::Choose(item) => {
                self.selected = item.index();
                self.activate(item, session, store, music)
            }
            MenuCommand::Close => Some(PauseAction::Resume),
            MenuCommand::Toggle | MenuCommand::ConfirmYes | MenuCommand::ConfirmNo => None,
        }
    }

    /// Feeds `commands` in order and returns the first action that closes the menu, or `None`
    /// if the input runs out first.
    pub fn run<I, S, M>(
        &mut self,
        commands: I,
        session: &Session,
        store: &mut S,
        music: &mut M,
    ) -> Option<PauseAction>
    where
        I: IntoIterator<Item = MenuCommand>,
        S: SessionStore + ?Sized,
        M: MusicControl + ?Sized,
    {
        for command in commands {
            match self.handle(command, session, store, music) {
                Some(action) if action.is_terminal() => return Some(action),
                _ => {}
            }
        }
        None
    }

    fn handle_confirm(&mut self, command: MenuCommand, confirm: ExitConfirm) -> Option<PauseAction> {
        match command {
            MenuCommand::ConfirmYes => Some(PauseAction::Quit),
            MenuCommand::Activate if confirm.yes_selected => Some(PauseAction::Quit),
            MenuCommand::ConfirmNo | MenuCommand::Close | MenuCommand::Activate => {
                tracing::debug!("exit confirmation dismissed");
                self.confirm = None;
                None
            }
            MenuCommand::Toggle | MenuCommand::Up | MenuCommand::Down => {
                self.confirm = Some(ExitConfirm {
                    yes_selected: !confirm.yes_selected,
                });
                None
            }
            MenuCommand::Choose(_) => None,
        }
    }

    fn activate<S, M>(
        &mut self,
        item: PauseItem,
        session: &Session,
        store: &mut S,
        music: &mut M,
    ) -> Option<PauseAction>
    where
        S: SessionStore + ?Sized,
        M: MusicControl + ?Sized,
    {
        tracing::debug!(item = item.label(), "pause menu item activated");
        match item {
            PauseItem::Resume => Some(PauseAction::Resume),
            PauseItem::Save => match store.save(session) {
                Ok(()) => {
                    self.status = Some(StatusLine::new("GAME SAVED", StatusKind::Info));
                    Some(PauseAction::Save)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "save failed");
                    self.status = Some(StatusLine::new(err.summary(), StatusKind::Error));
                    None
                }
            },
            PauseItem::Load => match store.load() {
                Ok(loaded) => Some(PauseAction::Load(Box::new(loaded))),
                Err(err) => {
                    tracing::warn!(error = %err, "load failed");
                    self.status = Some(StatusLine::new(err.summary(), StatusKind::Error));
                    None
                }
            },
            PauseItem::NextTrack => Some(self.skip(TrackDirection::Next, music)),
            PauseItem::PrevTrack => Some(self.skip(TrackDirection::Previous, music)),
            PauseItem::Exit if self.confirm_exit => {
                self.confirm = Some(ExitConfirm::default());
                None
            }
            PauseItem::Exit => Some(PauseAction::Quit),
        }
    }

    fn skip<M>(&mut self, direction: TrackDirection, music: &mut M) -> PauseAction
    where
        M: MusicControl + ?Sized,
    {
        music.skip_track(direction);
        if let Some(name) = music.current_track_name() {
            let text = format!("NOW PLAYING: {}", name.to_uppercase());
            self.status = Some(StatusLine::new(text, StatusKind::Info));
        }
        PauseAction::TrackChange(direction)
    }
}

/// Translates a raw key or click into a menu command.
///
/// Clicks are resolved against the last drawn `layout`; without one they are ignored.
pub fn menu_command_for(
    raw: RawInput,
    menu: &PauseMenu,
    layout: Option<&PauseMenuLayout>,
) -> Option<MenuCommand> {
    match raw {
        RawInput::Key(key) => match key {
            VirtualKeyCode::Up | VirtualKeyCode::W => Some(MenuCommand::Up),
            VirtualKeyCode::Down | VirtualKeyCode::S => Some(MenuCommand::Down),
            VirtualKeyCode::Left | VirtualKeyCode::Right | VirtualKeyCode::Tab => {
                Some(MenuCommand::Toggle)
            }
            VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter | VirtualKeyCode::Space => {
                Some(MenuCommand::Activate)
            }
            VirtualKeyCode::Y => Some(MenuCommand::ConfirmYes),
            VirtualKeyCode::N => Some(MenuCommand::ConfirmNo),
            VirtualKeyCode::Escape | VirtualKeyCode::P => Some(MenuCommand::Close),
            _ => None,
        },
        RawInput::Click { x, y } => {
            let layout = layout?;
            if menu.is_confirming() {
                let confirm = layout.confirm.as_ref()?;
                if confirm.yes_button.contains(x, y) {
                    Some(MenuCommand::ConfirmYes)
                } else if confirm.no_button.contains(x, y) {
                    Some(MenuCommand::ConfirmNo)
                } else {
                    None
                }
            } else {
                layout.item_at(x, y).map(MenuCommand::Choose)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{LoadError, SaveError};
    use crate::tetris_core::TetrisCore;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Store {
        saved: Vec<Session>,
        fail_save: bool,
        load: Option<Session>,
    }

    impl SessionStore for Store {
        fn save(&mut self, session: &Session) -> Result<(), SaveError> {
            if self.fail_save {
                return Err(SaveError::Write {
                    path: PathBuf::from("slot.json"),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.saved.push(session.clone());
            Ok(())
        }

        fn load(&mut self) -> Result<Session, LoadError> {
            self.load.clone().ok_or(LoadError::Missing {
                path: PathBuf::from("slot.json"),
            })
        }
    }

    #[derive(Default)]
    struct Music {
        skips: Vec<TrackDirection>,
    }

    impl MusicControl for Music {
        fn skip_track(&mut self, direction: TrackDirection) {
            self.skips.push(direction);
        }

        fn current_track_name(&self) -> Option<String> {
            Some("theme".to_string())
        }
    }

    fn session() -> Session {
        let mut core = TetrisCore::new(5);
        core.initialize_game();
        Session::new(core)
    }

    #[test]
    fn selection_wraps_both_ways() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        menu.handle(MenuCommand::Up, &s, &mut store, &mut music);
        assert_eq!(menu.selected(), PauseItem::Exit);
        menu.handle(MenuCommand::Down, &s, &mut store, &mut music);
        assert_eq!(menu.selected(), PauseItem::Resume);
    }

    #[test]
    fn close_resumes_immediately() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(true);
        assert_eq!(
            menu.handle(MenuCommand::Close, &s, &mut store, &mut music),
            Some(PauseAction::Resume)
        );
    }

    #[test]
    fn save_stays_open_and_reports_status() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        let action = menu.handle(
            MenuCommand::Choose(PauseItem::Save),
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(action, Some(PauseAction::Save));
        assert!(!PauseAction::Save.is_terminal());
        assert_eq!(store.saved, vec![s.clone()]);
        assert_eq!(menu.status().map(|st| st.text.as_str()), Some("GAME SAVED"));
    }

    #[test]
    fn failed_save_shows_error_and_no_action() {
        let s = session();
        let mut store = Store {
            fail_save: true,
            ..Store::default()
        };
        let mut music = Music::default();
        let mut menu = PauseMenu::new(false);
        let action = menu.handle(
            MenuCommand::Choose(PauseItem::Save),
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(action, None);
        assert!(menu.status().is_some_and(StatusLine::is_error));
    }

    #[test]
    fn load_failure_keeps_menu_open_with_error() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        let action = menu.handle(
            MenuCommand::Choose(PauseItem::Load),
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(action, None);
        let status = menu.status().expect("error status");
        assert_eq!(status.text, "NO SAVED GAME");
        assert!(status.is_error());
    }

    #[test]
    fn track_skip_forwards_to_music_and_stays_open() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        let action = menu.handle(
            MenuCommand::Choose(PauseItem::PrevTrack),
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(
            action,
            Some(PauseAction::TrackChange(TrackDirection::Previous))
        );
        assert_eq!(music.skips, vec![TrackDirection::Previous]);
        assert_eq!(
            menu.status().map(|st| st.text.as_str()),
            Some("NOW PLAYING: THEME")
        );
    }

    #[test]
    fn exit_without_confirmation_quits() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        let action = menu.handle(
            MenuCommand::Choose(PauseItem::Exit),
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(action, Some(PauseAction::Quit));
    }

    #[test]
    fn confirmation_requires_a_second_input() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(true);
        let commands = [
            MenuCommand::Choose(PauseItem::Exit),
            MenuCommand::Close,
            MenuCommand::Choose(PauseItem::Exit),
            MenuCommand::Toggle,
            MenuCommand::Activate,
        ];
        let mut actions = Vec::new();
        for command in commands {
            actions.push(menu.handle(command, &s, &mut store, &mut music));
            if command == MenuCommand::Close {
                assert!(!menu.is_confirming(), "close dismisses the prompt only");
            }
        }
        assert_eq!(actions, vec![None, None, None, None, Some(PauseAction::Quit)]);
    }

    #[test]
    fn choose_is_ignored_while_confirming() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(true);
        menu.handle(MenuCommand::Choose(PauseItem::Exit), &s, &mut store, &mut music);
        let action = menu.handle(
            MenuCommand::Choose(PauseItem::Resume),
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(action, None);
        assert!(menu.is_confirming());
    }

    #[test]
    fn run_skips_non_terminal_actions() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        let action = menu.run(
            [
                MenuCommand::Choose(PauseItem::NextTrack),
                MenuCommand::Choose(PauseItem::Save),
                MenuCommand::Down,
                MenuCommand::Close,
                MenuCommand::Choose(PauseItem::Exit),
            ],
            &s,
            &mut store,
            &mut music,
        );
        assert_eq!(action, Some(PauseAction::Resume));
        assert_eq!(music.skips.len(), 1);
        assert_eq!(store.saved.len(), 1);
    }

    #[test]
    fn status_expires_and_clears_on_input() {
        let (s, mut store, mut music) = (session(), Store::default(), Music::default());
        let mut menu = PauseMenu::new(false);
        menu.handle(MenuCommand::Choose(PauseItem::Save), &s, &mut store, &mut music);
        menu.tick(STATUS_LIFETIME / 2);
        assert!(menu.status().is_some());
        menu.tick(STATUS_LIFETIME / 2);
        assert!(menu.status().is_none());

        menu.handle(MenuCommand::Choose(PauseItem::Save), &s, &mut store, &mut music);
        menu.handle(MenuCommand::Down, &s, &mut store, &mut music);
        assert!(menu.status().is_none());
    }

    #[test]
    fn keys_map_to_commands() {
        let menu = PauseMenu::new(false);
        let cmd = |k| menu_command_for(RawInput::Key(k), &menu, None);
        assert_eq!(cmd(VirtualKeyCode::W), Some(MenuCommand::Up));
        assert_eq!(cmd(VirtualKeyCode::S), Some(MenuCommand::Down));
        assert_eq!(cmd(VirtualKeyCode::Return), Some(MenuCommand::Activate));
        assert_eq!(cmd(VirtualKeyCode::P), Some(MenuCommand::Close));
        assert_eq!(cmd(VirtualKeyCode::Q), None);
        assert_eq!(
            menu_command_for(RawInput::Click { x: 1, y: 1 }, &menu, None),
            None
        );
    }
}
