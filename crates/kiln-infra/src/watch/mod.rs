// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A background thread turning folder change events into per-path callbacks.

use crossbeam_channel::{select, Receiver, Sender};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

/// An error raised while starting a [`CatalogWatcher`].
#[derive(Debug, Error)]
pub enum WatchError {
    /// The platform watch primitive refused a folder.
    #[error("failed to watch folder: {0}")]
    Notify(#[from] notify::Error),
    /// The watcher thread could not be spawned.
    #[error("failed to spawn watcher thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Watches a fixed set of folders and reports every created or modified file.
///
/// The callback runs on a dedicated thread. Dropping the watcher (or calling
/// [`CatalogWatcher::shutdown`]) signals that thread and joins it.
pub struct CatalogWatcher {
    folders: Vec<PathBuf>,
    shutdown_tx: Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
    // Kept alive so the platform watch stays registered.
    _watcher: RecommendedWatcher,
}

fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

impl CatalogWatcher {
    /// Starts watching `folders` (non-recursively) and spawns the callback thread.
    ///
    /// # Errors
    /// Fails if any folder cannot be watched or the thread cannot be spawned.
    pub fn spawn<F>(folders: &[PathBuf], mut on_change: F) -> Result<Self, WatchError>
    where
        F: FnMut(&Path) + Send + 'static,
    {
        let (event_tx, event_rx) = crossbeam_channel::unbounded::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver only disappears once the thread has stopped.
            let _ = event_tx.send(res);
        })?;
        for folder in folders {
            watcher.watch(folder, RecursiveMode::NonRecursive)?;
            log::debug!("Watching {}", folder.display());
        }

        let (shutdown_tx, shutdown_rx): (Sender<()>, Receiver<()>) = crossbeam_channel::bounded(1);
        let handle = thread::Builder::new()
            .name("kiln-catalog-watcher".to_string())
            .spawn(move || {
                log::info!("Catalog watcher thread started.");
                loop {
                    select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(event_rx) -> message => match message {
                            Ok(Ok(event)) if is_content_change(&event.kind) => {
                                for path in &event.paths {
                                    on_change(path);
                                }
                            }
                            Ok(Ok(_)) => {}
                            Ok(Err(err)) => log::warn!("File watch error: {err}"),
                            Err(_) => break,
                        },
                    }
                }
                log::info!("Catalog watcher thread stopped.");
            })?;

        Ok(Self {
            folders: folders.to_vec(),
            shutdown_tx,
            handle: Some(handle),
            _watcher: watcher,
        })
    }

    /// The folders being watched.
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Returns `true` while the callback thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the callback thread and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.shutdown_tx.try_send(());
        if handle.join().is_err() {
            log::error!("Catalog watcher thread panicked.");
        }
    }
}

impl Drop for CatalogWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CatalogWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogWatcher")
            .field("folders", &self.folders)
            .field("running", &self.is_running())
            .finish()
    }
}
