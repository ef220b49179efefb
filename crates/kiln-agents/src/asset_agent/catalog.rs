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

//! The asset catalog: cold load, lookup, and per-frame hot-reload.

use super::context::HandlerContext;
use super::handlers::HandlerRegistry;
use super::inbox::{extension_of, CatalogInbox, NotifyOutcome};
use super::store::{AssetKind, EntityAsset, MeshAsset, TextureAsset};
use super::{CatalogConfig, CatalogError};
use kiln_core::asset::{AssetId, CpuTexture, EntityId, MeshId, TextureId};
use kiln_core::gpu::{GpuResources, TextureFormat};
use kiln_core::vfs::FileSource;
use kiln_infra::CatalogWatcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The central registry of loaded assets.
///
/// Every loaded file is known by its file name and gets an [`AssetId`] that
/// resolves to exactly one texture, mesh, or entity. Identifiers are never
/// reused or removed.
///
/// Change events from the background watcher (or from [`Catalog::notify`]) are
/// queued and only applied when the owning thread calls [`Catalog::drain`], so
/// the asset arrays and the GPU backend are only ever touched from that thread.
pub struct Catalog {
    config: CatalogConfig,
    handlers: HandlerRegistry,
    cx: HandlerContext,
    inbox: Arc<CatalogInbox>,
    watcher: Option<CatalogWatcher>,
}

impl Catalog {
    /// Creates the catalog with the built-in handlers, cold-loads every
    /// configured folder, and starts the watcher if enabled.
    ///
    /// # Errors
    /// Only a failure to start the watcher is returned. Files that fail to load
    /// are logged and skipped.
    pub fn init(
        config: CatalogConfig,
        files: Arc<dyn FileSource>,
        gpu: Arc<dyn GpuResources>,
    ) -> Result<Self, CatalogError> {
        Self::with_handlers(config, files, gpu, HandlerRegistry::default())
    }

    /// Like [`Catalog::init`], with a caller-supplied handler registry.
    pub fn with_handlers(
        config: CatalogConfig,
        files: Arc<dyn FileSource>,
        gpu: Arc<dyn GpuResources>,
        handlers: HandlerRegistry,
    ) -> Result<Self, CatalogError> {
        let discover = config.discover_new_files.then(|| {
            config
                .folders
                .iter()
                .map(|folder| folder.extension.to_ascii_lowercase())
                .collect()
        });
        let inbox = Arc::new(CatalogInbox::new(discover));
        let cx = HandlerContext::new(Arc::clone(&inbox), files, gpu, config.scratch_bytes);

        let mut catalog = Self {
            config,
            handlers,
            cx,
            inbox,
            watcher: None,
        };

        let folders: Vec<(PathBuf, String)> = catalog
            .config
            .resolved_folders()
            .map(|(path, ext)| (path, ext.to_ascii_lowercase()))
            .collect();
        for (folder, extension) in &folders {
            catalog.scan_folder(folder, extension);
        }
        log::info!(
            "Catalog cold load finished: {} assets ({} textures, {} meshes, {} entities)",
            catalog.asset_count(),
            catalog.textures().len(),
            catalog.meshes().len(),
            catalog.entities().len()
        );

        if catalog.config.watch {
            catalog.start_watcher(folders.into_iter().map(|(path, _)| path))?;
        }
        Ok(catalog)
    }

    fn scan_folder(&mut self, folder: &Path, extension: &str) -> usize {
        let files = match self.cx.files().list_files(folder) {
            Ok(files) => files,
            Err(err) => {
                log::error!("Failed to list '{}': {err}", folder.display());
                return 0;
            }
        };

        let mut loaded = 0;
        for path in files {
            if extension_of(&path).as_deref() != Some(extension) {
                continue;
            }
            match self.load_file(&path) {
                Ok(_) => loaded += 1,
                Err(err) => log::error!("Failed to load '{}': {err}", path.display()),
            }
        }
        log::debug!("Scanned '{}': {loaded} .{extension} files", folder.display());
        loaded
    }

    fn start_watcher(&mut self, folders: impl Iterator<Item = PathBuf>) -> Result<(), CatalogError> {
        let mut unique: Vec<PathBuf> = Vec::new();
        for folder in folders {
            if !folder.is_dir() {
                log::warn!("Not watching missing folder '{}'", folder.display());
            } else if !unique.contains(&folder) {
                unique.push(folder);
            }
        }
        if unique.is_empty() {
            log::warn!("No folders to watch; hot-reload disabled");
            return Ok(());
        }

        let inbox = Arc::clone(&self.inbox);
        let watcher = CatalogWatcher::spawn(&unique, move |path| {
            inbox.notify(path);
        })?;
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Reads `path` and runs the handler registered for its extension.
    ///
    /// Performs a cold load if the file name is new, a reload otherwise.
    pub fn load_file(&mut self, path: &Path) -> Result<AssetId, CatalogError> {
        let handler = extension_of(path)
            .and_then(|ext| self.handlers.find(&ext))
            .ok_or_else(|| CatalogError::NoHandler(path.to_path_buf()))?;
        let bytes = self.cx.read(path)?;
        handler.handle(&mut self.cx, path, &bytes)
    }

    /// Reports a change to `path`. Safe to call from any thread.
    ///
    /// Files the catalog does not know are ignored unless discovery is enabled.
    /// A path already waiting in the queue is not queued twice.
    pub fn notify(&self, path: &Path) -> NotifyOutcome {
        self.inbox.notify(path)
    }

    /// Applies every queued change, in the order it was queued.
    ///
    /// Returns how many files were processed successfully. Failures are logged
    /// and leave the previous version of the asset in place.
    pub fn drain(&mut self) -> usize {
        let mut pending = self.inbox.take_pending();
        let mut processed = 0;
        for path in pending.drain() {
            match self.load_file(&path) {
                Ok(_) => processed += 1,
                Err(err) => log::error!("Failed to reload '{}': {err}", path.display()),
            }
        }
        processed
    }

    /// Registers a texture built in memory, or refreshes it if `name` is
    /// already a texture. `pixels` are RGBA8, top row first.
    pub fn add_texture_pixels(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<AssetId, CatalogError> {
        let texture = CpuTexture {
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            pixels,
        };
        match self.find_asset_id(name) {
            None => self.cx.add_texture(name, texture),
            Some(id) => self.cx.reload_texture(id, name, texture).map(|_| id),
        }
    }

    /// The identifier registered under a file name.
    pub fn find_asset_id(&self, name: &str) -> Option<AssetId> {
        self.inbox.asset_id(name)
    }

    /// Which kind of asset `id` names.
    pub fn asset_kind(&self, id: AssetId) -> Option<AssetKind> {
        self.cx.store().kind_of(id)
    }

    /// The texture slot of `id`, if it names a texture.
    pub fn texture_id(&self, id: AssetId) -> Option<TextureId> {
        self.cx.store().texture_id(id)
    }

    /// The mesh slot of `id`, if it names a mesh.
    pub fn mesh_id(&self, id: AssetId) -> Option<MeshId> {
        self.cx.store().mesh_id(id)
    }

    /// The entity slot of `id`, if it names an entity.
    pub fn entity_id(&self, id: AssetId) -> Option<EntityId> {
        self.cx.store().entity_id(id)
    }

    /// The texture `id` names.
    pub fn find_texture(&self, id: AssetId) -> Option<&TextureAsset> {
        let store = self.cx.store();
        store.texture_id(id).and_then(|slot| store.texture(slot))
    }

    /// The texture registered under a file name.
    pub fn find_texture_by_name(&self, name: &str) -> Option<&TextureAsset> {
        self.find_asset_id(name).and_then(|id| self.find_texture(id))
    }

    /// The mesh `id` names.
    pub fn find_mesh(&self, id: AssetId) -> Option<&MeshAsset> {
        let store = self.cx.store();
        store.mesh_id(id).and_then(|slot| store.mesh(slot))
    }

    /// The mesh registered under a file name.
    pub fn find_mesh_by_name(&self, name: &str) -> Option<&MeshAsset> {
        self.find_asset_id(name).and_then(|id| self.find_mesh(id))
    }

    /// The entity `id` names.
    pub fn find_entity(&self, id: AssetId) -> Option<&EntityAsset> {
        let store = self.cx.store();
        store.entity_id(id).and_then(|slot| store.entity(slot))
    }

    /// The entity registered under a file name.
    pub fn find_entity_by_name(&self, name: &str) -> Option<&EntityAsset> {
        self.find_asset_id(name).and_then(|id| self.find_entity(id))
    }

    /// Every texture, indexed by [`TextureId`].
    pub fn textures(&self) -> &[TextureAsset] {
        self.cx.store().textures()
    }

    /// Every mesh, indexed by [`MeshId`].
    pub fn meshes(&self) -> &[MeshAsset] {
        self.cx.store().meshes()
    }

    /// Every entity, indexed by [`EntityId`].
    pub fn entities(&self) -> &[EntityAsset] {
        self.cx.store().entities()
    }

    /// Every registered file name with its identifier, sorted by identifier.
    pub fn assets(&self) -> Vec<(String, AssetId)> {
        let mut assets = self.inbox.names();
        assets.sort_by_key(|(_, id)| *id);
        assets
    }

    /// Number of registered assets.
    pub fn asset_count(&self) -> usize {
        self.inbox.asset_count()
    }

    /// Number of paths waiting for the next [`Catalog::drain`].
    pub fn pending_count(&self) -> usize {
        self.inbox.pending_count()
    }

    /// The configuration the catalog was created with.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns `true` while the background watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(CatalogWatcher::is_running)
    }

    /// Stops the watcher thread and waits for it. Queued changes are discarded.
    pub fn shutdown(mut self) {
        self.stop_watcher();
    }

    fn stop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.shutdown();
            log::info!("Catalog watcher joined.");
        }
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("assets", &self.asset_count())
            .field("pending", &self.pending_count())
            .field("handlers", &self.handlers)
            .field("watcher", &self.watcher)
            .finish()
    }
}
