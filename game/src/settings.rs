use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tetris_core::{MAX_START_LEVEL, MIN_START_LEVEL};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub mute_all: bool,
    pub music_enabled: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.7,
            sfx_volume: 0.8,
            mute_all: false,
            music_enabled: true,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = clamp_unit(self.master_volume);
        self.music_volume = clamp_unit(self.music_volume);
        self.sfx_volume = clamp_unit(self.sfx_volume);
        self
    }

    pub fn effective_music_gain(self) -> f32 {
        if self.mute_all || !self.music_enabled {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    pub fn effective_sfx_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameplaySettings {
    /// Ask for a second confirmation before "Exit" in the pause menu quits.
    pub confirm_exit: bool,
    pub start_level: u32,
    pub auto_pause_on_focus_loss: bool,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            confirm_exit: false,
            start_level: MIN_START_LEVEL,
            auto_pause_on_focus_loss: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// User multiplier on top of the automatic UI scale.
    pub ui_scale: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            vsync: true,
            ui_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathSettings {
    pub music_dir: PathBuf,
    pub sounds_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            music_dir: PathBuf::from("music"),
            sounds_dir: PathBuf::from("sounds"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub gameplay: GameplaySettings,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            audio: AudioSettings::default(),
            gameplay: GameplaySettings::default(),
            video: VideoSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self.gameplay.start_level = self
            .gameplay
            .start_level
            .clamp(MIN_START_LEVEL, MAX_START_LEVEL);
        self.video.width = self.video.width.clamp(320, 7680);
        self.video.height = self.video.height.clamp(240, 4320);
        if !self.video.ui_scale.is_finite() || self.video.ui_scale <= 0.0 {
            self.video.ui_scale = 1.0;
        }
        self.video.ui_scale = self.video.ui_scale.clamp(0.5, 2.0);
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("TETRIS_SETTINGS_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("tetris-enhanced");
        path.push("settings.json");
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<PlayerSettings, SettingsError> {
        let bytes = fs::read(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice::<PlayerSettings>(&bytes)
            .map(PlayerSettings::sanitized)
            .map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Loads settings, falling back to defaults when the file is absent or unusable.
    pub fn load(&self) -> PlayerSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(SettingsError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file; using defaults");
                PlayerSettings::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "using default settings");
                PlayerSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PlayerSettings) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)?;
        crate::save::atomic_write(&self.path, text.as_bytes()).map_err(write_err)
    }
}
