use std::time::{Duration, Instant};

use engine::app::{AppContext, AppControl, GameApp, InputFrame};
use engine::assets::AssetLoader;
use engine::graphics::Renderer2d;

use crate::audio::{AudioOutput, MusicPlayer, Sfx};
use crate::headful::input_adapter::{HorizontalRepeat, collect_raw_inputs};
use crate::layout::PauseMenuLayout;
use crate::music::{MusicControl, Playlist};
use crate::render::{FrameView, render_frame};
use crate::router::{Flow, ModeRouter, RouterOptions};
use crate::save::JsonSessionStore;
use crate::settings::PlayerSettings;

pub type Router = ModeRouter<JsonSessionStore, MusicPlayer>;

pub struct TetrisApp {
    settings: PlayerSettings,
    seed: u64,
    store: Option<JsonSessionStore>,
    music: Option<MusicPlayer>,
    sfx: Option<Sfx>,
    // Keeps the output device open for the lifetime of the app.
    _audio: Option<AudioOutput>,
    repeat: HorizontalRepeat,
    pause_layout: Option<PauseMenuLayout>,
}

impl TetrisApp {
    pub fn new(settings: PlayerSettings, store: JsonSessionStore, seed: u64) -> Self {
        let audio = AudioOutput::try_default();
        let output = audio.as_ref().map(AudioOutput::handle);

        let playlist = match Playlist::scan(&settings.paths.music_dir) {
            Ok(playlist) => playlist,
            Err(err) => {
                tracing::warn!(
                    dir = %settings.paths.music_dir.display(),
                    error = %err,
                    "could not scan music directory"
                );
                Playlist::default()
            }
        };
        tracing::info!(tracks = playlist.len(), "playlist loaded");

        let loader = match AssetLoader::spawn() {
            Ok(loader) => Some(loader),
            Err(err) => {
                tracing::warn!(error = %err, "asset loader unavailable; loading music inline");
                None
            }
        };
        let music = MusicPlayer::new(
            playlist,
            output.clone(),
            loader,
            settings.audio.effective_music_gain(),
        );
        let sfx = output.map(|handle| {
            Sfx::load(
                handle,
                &settings.paths.sounds_dir,
                settings.audio.effective_sfx_gain(),
            )
        });

        Self {
            settings,
            seed,
            store: Some(store),
            music: Some(music),
            sfx,
            _audio: audio,
            repeat: HorizontalRepeat::default(),
            pause_layout: None,
        }
    }
}

impl GameApp for TetrisApp {
    type State = Router;

    fn init_state(&mut self, _ctx: &mut AppContext) -> Router {
        let store = self.store.take().unwrap_or_else(JsonSessionStore::from_env);
        let mut music = self
            .music
            .take()
            .unwrap_or_else(|| MusicPlayer::silent(Playlist::default()));
        music.start();
        ModeRouter::new(
            self.seed,
            store,
            music,
            RouterOptions::from(&self.settings.gameplay),
        )
    }

    fn update_state(
        &mut self,
        router: &mut Router,
        input: &InputFrame,
        dt: Duration,
        _ctx: &mut AppContext,
    ) -> AppControl {
        router.set_pause_layout(self.pause_layout);
        if input.focus_lost {
            self.repeat.clear();
            router.on_focus_lost();
        }

        let repeat = router.mode().is_playing().then_some(&mut self.repeat);
        for raw in collect_raw_inputs(input, repeat, Instant::now()) {
            if router.dispatch(raw) == Flow::Exit {
                return AppControl::Exit;
            }
        }
        if !router.mode().is_playing() {
            self.repeat.clear();
        }

        router.tick(dt);
        router.music_mut().update();

        let sounds = router.drain_sounds();
        if let Some(sfx) = &self.sfx {
            for kind in sounds {
                sfx.play(kind);
            }
        }
        AppControl::Continue
    }

    fn render(&mut self, router: &Router, renderer: &mut dyn Renderer2d) {
        let view = FrameView {
            mode: router.mode(),
            session: router.session(),
            pause_menu: router.pause_menu(),
            start_level: router.start_level(),
            track_name: router.music().current_track_name(),
            ui_scale: self.settings.video.ui_scale,
        };
        self.pause_layout = render_frame(renderer, &view);
    }

    fn shutdown(&mut self, router: &mut Router) {
        tracing::info!(
            mode = router.mode().name(),
            score = router.session().tetris.score(),
            "shutting down"
        );
    }
}
