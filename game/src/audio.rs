//! Music and sound effects over rodio.
//!
//! Everything here degrades to silence: no output device, a missing file or an undecodable
//! track is logged and skipped.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use engine::assets::{AssetId, AssetLoader};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::music::{MusicControl, Playlist, TrackDirection};
use crate::sfx::SfxKind;

const SFX_EXTENSIONS: [&str; 3] = ["wav", "ogg", "mp3"];

/// Owns the output stream; dropping it silences every sink created from its handle.
pub struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    pub fn try_default() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "no audio output device; audio disabled");
                None
            }
        }
    }

    pub fn handle(&self) -> OutputStreamHandle {
        self.handle.clone()
    }
}

/// Background music over a [`Playlist`], one fresh [`Sink`] per track.
pub struct MusicPlayer {
    playlist: Playlist,
    output: Option<OutputStreamHandle>,
    loader: Option<AssetLoader>,
    pending: Option<AssetId>,
    sink: Option<Sink>,
    gain: f32,
    /// Tracks that failed to load since the last one that played.
    failures: usize,
}

impl MusicPlayer {
    pub fn new(
        playlist: Playlist,
        output: Option<OutputStreamHandle>,
        loader: Option<AssetLoader>,
        gain: f32,
    ) -> Self {
        Self {
            playlist,
            output,
            loader,
            pending: None,
            sink: None,
            gain,
            failures: 0,
        }
    }

    /// A player that tracks the playlist but never makes a sound.
    pub fn silent(playlist: Playlist) -> Self {
        Self::new(playlist, None, None, 0.0)
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn is_audible(&self) -> bool {
        self.output.is_some() && self.gain > 0.0
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        if let Some(sink) = &self.sink {
            sink.set_volume(gain);
        }
    }

    /// Starts the current track.
    pub fn start(&mut self) {
        self.failures = 0;
        self.play_current();
    }

    /// Picks up finished loads and advances when a track ends. Call once per frame.
    pub fn update(&mut self) {
        let loaded = match &self.loader {
            Some(loader) => loader.poll(),
            None => Vec::new(),
        };
        for asset in loaded {
            if Some(asset.id) != self.pending {
                continue;
            }
            self.pending = None;
            match asset.bytes {
                Ok(bytes) => self.play_bytes(bytes),
                Err(err) => {
                    tracing::warn!(path = %asset.path.display(), error = %err, "could not read music track");
                    self.skip_unplayable();
                }
            }
        }

        let finished = self.sink.as_ref().is_some_and(Sink::empty);
        if finished && self.pending.is_none() {
            self.sink = None;
            self.playlist.step(TrackDirection::Next);
            tracing::debug!(track = ?self.playlist.current_name(), "track finished; advancing");
            self.play_current();
        }
    }

    fn play_current(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.pending = None;
        if !self.is_audible() {
            return;
        }
        let Some(path) = self.playlist.current().map(Path::to_path_buf) else {
            return;
        };

        match self.loader.as_mut() {
            Some(loader) => self.pending = loader.request(path),
            None => match fs::read(&path) {
                Ok(bytes) => self.play_bytes(bytes),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "could not read music track");
                    self.skip_unplayable();
                }
            },
        }
    }

    /// Moves on from a track that could not be read or decoded. Gives up once every track
    /// in the playlist has failed in a row.
    fn skip_unplayable(&mut self) {
        self.failures += 1;
        if self.failures >= self.playlist.len() {
            tracing::warn!(tracks = self.playlist.len(), "no playable music tracks; music stopped");
            return;
        }
        self.playlist.step(TrackDirection::Next);
        tracing::debug!(track = ?self.playlist.current_name(), "skipping to next track");
        self.play_current();
    }

    fn play_bytes(&mut self, bytes: Vec<u8>) {
        let Some(output) = &self.output else {
            return;
        };
        let sink = match Sink::try_new(output) {
            Ok(sink) => sink,
            Err(err) => {
                tracing::warn!(error = %err, "could not open music sink");
                return;
            }
        };
        match Decoder::new(Cursor::new(bytes)) {
            Ok(source) => {
                sink.set_volume(self.gain);
                sink.append(source);
                self.sink = Some(sink);
                self.failures = 0;
            }
            Err(err) => {
                tracing::warn!(track = ?self.playlist.current_name(), error = %err, "could not decode music track");
                self.skip_unplayable();
            }
        }
    }
}

impl MusicControl for MusicPlayer {
    fn skip_track(&mut self, direction: TrackDirection) {
        if self.playlist.step(direction).is_none() {
            return;
        }
        tracing::info!(track = ?self.playlist.current_name(), ?direction, "track changed");
        self.failures = 0;
        self.play_current();
    }

    fn current_track_name(&self) -> Option<String> {
        self.playlist.current_name()
    }
}

/// One-shot effects, decoded from memory on every play.
pub struct Sfx {
    output: OutputStreamHandle,
    clips: HashMap<SfxKind, Arc<[u8]>>,
    gain: f32,
}

impl Sfx {
    /// Loads `<stem>.{wav,ogg,mp3}` for every effect from `dir`; missing effects stay silent.
    pub fn load(output: OutputStreamHandle, dir: &Path, gain: f32) -> Self {
        let mut clips = HashMap::new();
        for kind in SfxKind::ALL {
            let found = SFX_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}.{ext}", kind.file_stem())))
                .find_map(|path| fs::read(path).ok());
            match found {
                Some(bytes) => {
                    clips.insert(kind, Arc::from(bytes));
                }
                None => tracing::debug!(effect = kind.file_stem(), "no sound file; effect disabled"),
            }
        }
        Self {
            output,
            clips,
            gain,
        }
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub fn play(&self, kind: SfxKind) {
        if self.gain <= 0.0 {
            return;
        }
        let Some(clip) = self.clips.get(&kind) else {
            return;
        };
        let Ok(sink) = Sink::try_new(&self.output) else {
            return;
        };
        sink.set_volume(self.gain * kind.volume());

        let Ok(source) = Decoder::new(Cursor::new(Arc::clone(clip))) else {
            return;
        };
        sink.append(source);
        sink.detach();
    }
}
