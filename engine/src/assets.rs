//! Background asset loading.
//!
//! A single worker thread reads files off the render thread. Callers push [`AssetRequest`]s
//! through one channel and poll [`LoadedAsset`] completions from another; neither side blocks
//! the frame loop.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

pub type AssetId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub id: AssetId,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct LoadedAsset {
    pub id: AssetId,
    pub path: PathBuf,
    pub bytes: io::Result<Vec<u8>>,
}

pub struct AssetLoader {
    requests: Option<Sender<AssetRequest>>,
    completions: Receiver<LoadedAsset>,
    worker: Option<JoinHandle<()>>,
    next_id: AssetId,
}

impl AssetLoader {
    pub fn spawn() -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<AssetRequest>();
        let (done_tx, done_rx) = mpsc::channel::<LoadedAsset>();

        let worker = thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                for request in request_rx {
                    let bytes = fs::read(&request.path);
                    if let Err(err) = &bytes {
                        tracing::debug!(path = %request.path.display(), error = %err, "asset read failed");
                    }
                    let loaded = LoadedAsset {
                        id: request.id,
                        path: request.path,
                        bytes,
                    };
                    if done_tx.send(loaded).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            completions: done_rx,
            worker: Some(worker),
            next_id: 1,
        })
    }

    /// Queues `path` for loading and returns the id its completion will carry.
    ///
    /// Returns `None` if the worker has gone away.
    pub fn request(&mut self, path: impl Into<PathBuf>) -> Option<AssetId> {
        let id = self.next_id;
        self.next_id += 1;
        let request = AssetRequest {
            id,
            path: path.into(),
        };
        let sender = self.requests.as_ref()?;
        match sender.send(request) {
            Ok(()) => Some(id),
            Err(_) => {
                tracing::warn!("asset loader worker is gone");
                None
            }
        }
    }

    /// Drains every completion that is ready without waiting.
    pub fn poll(&self) -> Vec<LoadedAsset> {
        let mut done = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok(asset) => done.push(asset),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        done
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("asset loader worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait(loader: &AssetLoader, timeout: Duration) -> Option<LoadedAsset> {
        loader.completions.recv_timeout(timeout).ok()
    }

    #[test]
    fn missing_file_completes_with_error() {
        let mut loader = AssetLoader::spawn().expect("spawn loader");
        let id = loader
            .request("/definitely/not/here.ogg")
            .expect("worker accepts requests");

        let done = wait(&loader, Duration::from_secs(5)).expect("completion should arrive");
        assert_eq!(done.id, id);
        assert!(done.bytes.is_err());
    }

    #[test]
    fn ids_are_unique_per_request() {
        let mut loader = AssetLoader::spawn().expect("spawn loader");
        let a = loader.request("a.bin");
        let b = loader.request("b.bin");
        assert_ne!(a, b);
    }
}
