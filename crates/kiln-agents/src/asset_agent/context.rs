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

use super::inbox::CatalogInbox;
use super::store::{AssetKind, AssetStore, EntityAsset, MeshAsset, TextureAsset};
use super::CatalogError;
use kiln_core::asset::{AssetId, CpuTexture, EntityData, MeshData, MeshId, TextureId};
use kiln_core::collections::TableError;
use kiln_core::gpu::{GpuBufferId, GpuResources, ResourceError, TextureDescriptor};
use kiln_core::memory::StackAllocator;
use kiln_core::vfs::FileSource;
use std::path::Path;
use std::sync::Arc;

fn kind_mismatch(name: &str, expected: AssetKind) -> CatalogError {
    CatalogError::KindMismatch {
        name: name.to_string(),
        expected: expected.as_str(),
    }
}

/// Everything a [`CatalogHandler`](super::CatalogHandler) may touch while loading a file.
///
/// Only the draining thread ever holds one, so nothing in here is locked except
/// the name table shared with the watcher.
pub struct HandlerContext {
    store: AssetStore,
    inbox: Arc<CatalogInbox>,
    files: Arc<dyn FileSource>,
    gpu: Arc<dyn GpuResources>,
    scratch: StackAllocator,
    next_id: u32,
}

impl HandlerContext {
    pub(crate) fn new(
        inbox: Arc<CatalogInbox>,
        files: Arc<dyn FileSource>,
        gpu: Arc<dyn GpuResources>,
        scratch_bytes: usize,
    ) -> Self {
        Self {
            store: AssetStore::new(),
            inbox,
            files,
            gpu,
            scratch: StackAllocator::new(scratch_bytes),
            next_id: 0,
        }
    }

    /// The asset arrays.
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// The GPU backend.
    pub fn gpu(&self) -> &dyn GpuResources {
        self.gpu.as_ref()
    }

    /// The file source.
    pub fn files(&self) -> &dyn FileSource {
        self.files.as_ref()
    }

    /// Scratch memory for decoding. Open a scope per file.
    pub fn scratch(&mut self) -> &mut StackAllocator {
        &mut self.scratch
    }

    /// Reads a whole file through the file source.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>, CatalogError> {
        self.files.read_file(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The identifier registered under `name`.
    pub fn asset_id(&self, name: &str) -> Option<AssetId> {
        self.inbox.asset_id(name)
    }

    /// Hands out the next identifier and binds it to `name` once `insert`
    /// has stored the record.
    fn register(
        &mut self,
        name: &str,
        insert: impl FnOnce(&mut AssetStore, AssetId) -> Result<(), TableError>,
    ) -> Result<AssetId, CatalogError> {
        if self.inbox.asset_id(name).is_some() {
            log::error!("'{name}' is already registered");
            return Err(TableError::DuplicateKey.into());
        }
        let id = AssetId(self.next_id);
        insert(&mut self.store, id)?;
        // The watcher may see the name from here on, so the record must exist first.
        self.inbox.register(name, id)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Uploads a new texture and registers it under `name`.
    pub fn add_texture(&mut self, name: &str, texture: CpuTexture) -> Result<AssetId, CatalogError> {
        let descriptor = TextureDescriptor {
            label: Some(name),
            width: texture.width,
            height: texture.height,
            format: texture.format,
        };
        let gpu = self.gpu.create_texture(&descriptor, &texture.pixels)?;

        let record = TextureAsset {
            name: name.to_string(),
            texture,
            gpu,
        };
        match self.register(name, |store, id| store.insert_texture(id, record).map(|_| ())) {
            Ok(id) => {
                log::info!("Loaded texture '{name}' as {id}");
                Ok(id)
            }
            Err(err) => {
                if let Err(cleanup) = self.gpu.destroy_texture(gpu) {
                    log::warn!("Failed to release texture for '{name}': {cleanup}");
                }
                Err(err)
            }
        }
    }

    /// Replaces the pixels of the texture registered as `id`, on the CPU and the GPU.
    ///
    /// The new image must have the same dimensions as the old one.
    pub fn reload_texture(
        &mut self,
        id: AssetId,
        name: &str,
        texture: CpuTexture,
    ) -> Result<TextureId, CatalogError> {
        let slot = self
            .store
            .texture_id(id)
            .ok_or_else(|| kind_mismatch(name, AssetKind::Texture))?;
        let record = self
            .store
            .texture_mut(slot)
            .ok_or_else(|| kind_mismatch(name, AssetKind::Texture))?;

        let old = &record.texture;
        if (old.width, old.height, old.format) != (texture.width, texture.height, texture.format) {
            return Err(ResourceError::Backend(format!(
                "texture '{name}' changed from {}x{} to {}x{}",
                old.width, old.height, texture.width, texture.height
            ))
            .into());
        }

        self.gpu.update_texture(record.gpu, &texture.pixels)?;
        record.texture = texture;
        log::info!("Reloaded texture '{name}' ({id})");
        Ok(slot)
    }

    /// Registers a decoded mesh under `name`.
    pub fn add_mesh(&mut self, name: &str, data: MeshData) -> Result<AssetId, CatalogError> {
        let record = MeshAsset {
            name: name.to_string(),
            data,
        };
        let id = self.register(name, |store, id| store.insert_mesh(id, record).map(|_| ()))?;
        log::info!("Loaded mesh '{name}' as {id}");
        Ok(id)
    }

    fn resolve_mesh(&self, entity: &str, mesh: &str) -> Result<MeshId, CatalogError> {
        self.inbox
            .asset_id(mesh)
            .and_then(|id| self.store.mesh_id(id))
            .ok_or_else(|| CatalogError::MissingMesh {
                entity: entity.to_string(),
                mesh: mesh.to_string(),
            })
    }

    fn create_mesh_buffers(&self, mesh: MeshId) -> Result<(GpuBufferId, GpuBufferId), CatalogError> {
        let data = &self
            .store
            .mesh(mesh)
            .ok_or(ResourceError::NotFound(mesh.index() as u64))?
            .data;
        let vertices = self
            .gpu
            .create_vertex_buffer(bytemuck::cast_slice(&data.vertices))?;
        match self
            .gpu
            .create_index_buffer(bytemuck::cast_slice(&data.indices))
        {
            Ok(indices) => Ok((vertices, indices)),
            Err(err) => {
                self.release_buffer(vertices);
                Err(err.into())
            }
        }
    }

    fn release_buffer(&self, buffer: GpuBufferId) {
        if let Err(err) = self.gpu.destroy_buffer(buffer) {
            log::warn!("Failed to release buffer {buffer:?}: {err}");
        }
    }

    /// Registers an entity under `name`, binding it to the mesh it references.
    pub fn add_entity(&mut self, name: &str, data: EntityData) -> Result<AssetId, CatalogError> {
        let mesh = self.resolve_mesh(name, &data.mesh)?;
        let (vertex_buffer, index_buffer) = self.create_mesh_buffers(mesh)?;

        let record = EntityAsset {
            name: name.to_string(),
            data,
            mesh,
            vertex_buffer,
            index_buffer,
        };
        match self.register(name, |store, id| store.insert_entity(id, record).map(|_| ())) {
            Ok(id) => {
                log::info!("Loaded entity '{name}' as {id}");
                Ok(id)
            }
            Err(err) => {
                self.release_buffer(vertex_buffer);
                self.release_buffer(index_buffer);
                Err(err)
            }
        }
    }

    /// Overwrites the transform of the entity registered as `id`.
    ///
    /// The mesh binding is kept; a changed mesh reference only takes effect on
    /// the next cold load.
    pub fn reload_entity(
        &mut self,
        id: AssetId,
        name: &str,
        data: EntityData,
    ) -> Result<(), CatalogError> {
        let slot = self
            .store
            .entity_id(id)
            .ok_or_else(|| kind_mismatch(name, AssetKind::Entity))?;
        let record = self
            .store
            .entity_mut(slot)
            .ok_or_else(|| kind_mismatch(name, AssetKind::Entity))?;

        if record.data.mesh != data.mesh {
            log::warn!(
                "Entity '{name}' now references '{}'; keeping '{}' until restart",
                data.mesh,
                record.data.mesh
            );
        }
        record.data.version = data.version;
        record.data.position = data.position;
        record.data.scale = data.scale;
        record.data.rotation = data.rotation;
        log::info!("Reloaded entity '{name}' ({id})");
        Ok(())
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("store", &self.store)
            .field("next_id", &self.next_id)
            .field("scratch_capacity", &self.scratch.capacity())
            .finish()
    }
}
