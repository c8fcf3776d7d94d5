pub mod audio;
pub mod fall_timer;
pub mod gameplay;
pub mod headful;
pub mod input;
pub mod layout;
pub mod logging;
pub mod mode;
pub mod music;
pub mod pause_menu;
pub mod render;
pub mod router;
pub mod save;
pub mod serde_duration;
pub mod settings;
pub mod sfx;
pub mod state;
pub mod tetris_core;
