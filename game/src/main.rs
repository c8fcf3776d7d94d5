use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use engine::app::{AppConfig, run_game};
use tetris_enhanced::headful::TetrisApp;
use tetris_enhanced::logging;
use tetris_enhanced::render::GAME_TITLE;
use tetris_enhanced::save::JsonSessionStore;
use tetris_enhanced::settings::SettingsStore;
use winit::dpi::PhysicalSize;

fn main() -> ExitCode {
    logging::init();

    let settings_store = SettingsStore::from_env();
    let settings = settings_store.load();
    let save_store = JsonSessionStore::from_env();
    tracing::info!(
        settings = %settings_store.path().display(),
        save = %save_store.path().display(),
        "starting"
    );

    let config = AppConfig {
        title: GAME_TITLE.to_string(),
        desired_size: PhysicalSize::new(settings.video.width, settings.video.height),
        clamp_to_monitor: true,
        vsync: Some(settings.video.vsync),
    };
    let app = TetrisApp::new(settings, save_store, seed_from_clock());

    match run_game(config, app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "could not start the game window");
            ExitCode::FAILURE
        }
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}
