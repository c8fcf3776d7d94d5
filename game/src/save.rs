use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Session;

pub const SAVE_FILE_VERSION: u32 = 1;
pub const SAVE_FILE_NAME: &str = "tetris_save.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not create save directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode save data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not write save file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no saved game at {path}")]
    Missing { path: PathBuf },
    #[error("could not read save file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("save file version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("saved game is invalid: {0}")]
    Invalid(&'static str),
}

impl SaveError {
    /// Short text for the in-game status line.
    pub fn summary(&self) -> &'static str {
        match self {
            SaveError::CreateDir { .. } | SaveError::Write { .. } => "SAVE FAILED: DISK ERROR",
            SaveError::Encode(_) => "SAVE FAILED",
        }
    }
}

impl LoadError {
    pub fn summary(&self) -> &'static str {
        match self {
            LoadError::Missing { .. } => "NO SAVED GAME",
            LoadError::Read { .. } => "LOAD FAILED: DISK ERROR",
            LoadError::Corrupt { .. } | LoadError::Invalid(_) => "LOAD FAILED: SAVE IS CORRUPT",
            LoadError::UnsupportedVersion { .. } => "LOAD FAILED: OLD SAVE FORMAT",
        }
    }
}

/// Persistence collaborator for the pause menu.
pub trait SessionStore {
    fn save(&mut self, session: &Session) -> Result<(), SaveError>;
    fn load(&mut self) -> Result<Session, LoadError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    #[serde(default)]
    saved_at_unix_ms: u64,
    session: Session,
}

/// Only the version is read first, so a newer layout reports a version error, not corruption.
#[derive(Debug, Deserialize)]
struct SaveHeader {
    version: u32,
}

/// Stores a single save slot as pretty JSON.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `TETRIS_SAVE_PATH`, else the XDG data dir, else `~/.local/share`.
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("TETRIS_SAVE_PATH") {
            return Self::at(explicit);
        }

        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".local");
                    p.push("share");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("saves"));

        let mut path = base;
        path.push("tetris-enhanced");
        path.push(SAVE_FILE_NAME);
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonSessionStore {
    fn save(&mut self, session: &Session) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SaveError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let file = SaveFile {
            version: SAVE_FILE_VERSION,
            saved_at_unix_ms: unix_millis_now(),
            session: session.clone(),
        };
        let text = serde_json::to_string_pretty(&file)?;
        atomic_write(&self.path, text.as_bytes()).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), score = session.tetris.score(), "game saved");
        Ok(())
    }

    fn load(&mut self) -> Result<Session, LoadError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(LoadError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let corrupt = |source| LoadError::Corrupt {
            path: self.path.clone(),
            source,
        };
        let header: SaveHeader = serde_json::from_slice(&bytes).map_err(corrupt)?;
        if header.version != SAVE_FILE_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: header.version,
                expected: SAVE_FILE_VERSION,
            });
        }
        let file: SaveFile = serde_json::from_slice(&bytes).map_err(corrupt)?;
        file.session.validate().map_err(LoadError::Invalid)?;

        tracing::info!(path = %self.path.display(), "game loaded");
        Ok(file.session)
    }
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Writes via a sibling temp file and rename, so a crash never leaves a half-written save.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}
