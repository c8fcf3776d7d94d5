use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackDirection {
    Next,
    Previous,
}

/// Fire-and-forget track control used by the pause menu.
pub trait MusicControl {
    fn skip_track(&mut self, direction: TrackDirection);

    /// Display name of the current track, if any.
    fn current_track_name(&self) -> Option<String> {
        None
    }
}

const MUSIC_EXTENSIONS: [&str; 3] = ["mp3", "ogg", "wav"];

/// Ordered list of music files with a wrapping cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<PathBuf>,
    index: usize,
}

impl Playlist {
    pub fn new(tracks: Vec<PathBuf>) -> Self {
        Self { tracks, index: 0 }
    }

    /// Collects supported audio files directly inside `dir`, sorted by file name.
    pub fn scan(dir: &Path) -> io::Result<Self> {
        let mut tracks = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_music_file(&path) {
                tracks.push(path);
            }
        }
        tracks.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(Self::new(tracks))
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Path> {
        self.tracks.get(self.index).map(PathBuf::as_path)
    }

    pub fn current_name(&self) -> Option<String> {
        let path = self.current()?;
        let stem = path.file_stem()?;
        Some(stem.to_string_lossy().into_owned())
    }

    /// Moves the cursor one track in `direction`, wrapping at either end.
    pub fn step(&mut self, direction: TrackDirection) -> Option<&Path> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.index = match direction {
            TrackDirection::Next => (self.index + 1) % len,
            TrackDirection::Previous => (self.index + len - 1) % len,
        };
        self.current()
    }
}

fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MUSIC_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(names: &[&str]) -> Playlist {
        Playlist::new(names.iter().map(PathBuf::from).collect())
    }

    #[test]
    fn next_and_previous_wrap() {
        let mut list = playlist(&["a.ogg", "b.ogg", "c.ogg"]);
        assert_eq!(list.step(TrackDirection::Previous), Some(Path::new("c.ogg")));
        assert_eq!(list.step(TrackDirection::Next), Some(Path::new("a.ogg")));
        assert_eq!(list.step(TrackDirection::Next), Some(Path::new("b.ogg")));
        assert_eq!(list.current_name().as_deref(), Some("b"));
    }

    #[test]
    fn empty_playlist_ignores_skips() {
        let mut list = Playlist::default();
        assert_eq!(list.step(TrackDirection::Next), None);
        assert_eq!(list.index(), 0);
        assert_eq!(list.current_name(), None);
    }

    #[test]
    fn scan_keeps_supported_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.OGG", "a.mp3", "notes.txt", "c.wav"] {
            fs::write(dir.path().join(name), b"x").expect("write fixture");
        }
        fs::create_dir(dir.path().join("d.mp3")).expect("dir fixture");

        let list = Playlist::scan(dir.path()).expect("scan");
        let names: Vec<_> = list
            .tracks()
            .iter()
            .filter_map(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
