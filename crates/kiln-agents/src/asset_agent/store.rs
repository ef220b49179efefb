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

//! Storage for every asset the catalog holds.

use kiln_core::asset::{
    AssetId, CpuTexture, EntityData, EntityId, MeshData, MeshId, TextureId,
};
use kiln_core::collections::{Array, PodTable, TableError};
use kiln_core::gpu::{GpuBufferId, GpuTextureId};
use kiln_core::memory::{HeapAllocator, HEAP};

/// A texture with its GPU copy.
#[derive(Debug)]
pub struct TextureAsset {
    /// The file (or procedural) name it was registered under.
    pub name: String,
    /// Decoded pixels, kept in sync with the GPU image.
    pub texture: CpuTexture,
    /// The GPU image.
    pub gpu: GpuTextureId,
}

/// A decoded mesh.
#[derive(Debug)]
pub struct MeshAsset {
    /// The file name it was registered under.
    pub name: String,
    /// Interleaved vertices and triangle indices.
    pub data: MeshData,
}

/// An entity bound to the mesh it renders with.
#[derive(Debug)]
pub struct EntityAsset {
    /// The file name it was registered under.
    pub name: String,
    /// Transform and mesh reference as decoded.
    pub data: EntityData,
    /// The mesh resolved at load time.
    pub mesh: MeshId,
    /// Vertex buffer built from the mesh.
    pub vertex_buffer: GpuBufferId,
    /// Index buffer built from the mesh.
    pub index_buffer: GpuBufferId,
}

/// Which array an [`AssetId`] resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// A [`TextureAsset`].
    Texture,
    /// A [`MeshAsset`].
    Mesh,
    /// An [`EntityAsset`].
    Entity,
}

impl AssetKind {
    /// Lowercase name, for messages.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Texture => "texture",
            AssetKind::Mesh => "mesh",
            AssetKind::Entity => "entity",
        }
    }
}

/// The asset arrays and the tables mapping public identifiers into them.
///
/// Records are append-only: an identifier, once handed out, keeps pointing at
/// the same slot for the lifetime of the store.
pub struct AssetStore {
    textures: Array<'static, TextureAsset, HeapAllocator>,
    meshes: Array<'static, MeshAsset, HeapAllocator>,
    entities: Array<'static, EntityAsset, HeapAllocator>,
    texture_ids: PodTable<'static, AssetId, TextureId>,
    mesh_ids: PodTable<'static, AssetId, MeshId>,
    entity_ids: PodTable<'static, AssetId, EntityId>,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore {
    /// Creates an empty store on the process heap.
    pub fn new() -> Self {
        Self {
            textures: Array::new_in(&HEAP),
            meshes: Array::new_in(&HEAP),
            entities: Array::new_in(&HEAP),
            texture_ids: PodTable::new_in(&HEAP),
            mesh_ids: PodTable::new_in(&HEAP),
            entity_ids: PodTable::new_in(&HEAP),
        }
    }

    /// The array `id` resolves into, if any.
    pub fn kind_of(&self, id: AssetId) -> Option<AssetKind> {
        if self.texture_ids.contains_key(&id) {
            Some(AssetKind::Texture)
        } else if self.mesh_ids.contains_key(&id) {
            Some(AssetKind::Mesh)
        } else if self.entity_ids.contains_key(&id) {
            Some(AssetKind::Entity)
        } else {
            None
        }
    }

    fn ensure_unbound(&self, id: AssetId) -> Result<(), TableError> {
        match self.kind_of(id) {
            Some(kind) => {
                log::error!("{id} is already bound to a {}", kind.as_str());
                Err(TableError::DuplicateKey)
            }
            None => Ok(()),
        }
    }

    /// Appends a texture and binds `id` to it.
    pub fn insert_texture(
        &mut self,
        id: AssetId,
        asset: TextureAsset,
    ) -> Result<TextureId, TableError> {
        self.ensure_unbound(id)?;
        let slot = TextureId(self.textures.try_push(asset)?);
        self.texture_ids.add(id, slot)?;
        Ok(slot)
    }

    /// Appends a mesh and binds `id` to it.
    pub fn insert_mesh(&mut self, id: AssetId, asset: MeshAsset) -> Result<MeshId, TableError> {
        self.ensure_unbound(id)?;
        let slot = MeshId(self.meshes.try_push(asset)?);
        self.mesh_ids.add(id, slot)?;
        Ok(slot)
    }

    /// Appends an entity and binds `id` to it.
    pub fn insert_entity(
        &mut self,
        id: AssetId,
        asset: EntityAsset,
    ) -> Result<EntityId, TableError> {
        self.ensure_unbound(id)?;
        let slot = EntityId(self.entities.try_push(asset)?);
        self.entity_ids.add(id, slot)?;
        Ok(slot)
    }

    /// The texture slot `id` is bound to.
    pub fn texture_id(&self, id: AssetId) -> Option<TextureId> {
        self.texture_ids.find(&id).copied()
    }

    /// The mesh slot `id` is bound to.
    pub fn mesh_id(&self, id: AssetId) -> Option<MeshId> {
        self.mesh_ids.find(&id).copied()
    }

    /// The entity slot `id` is bound to.
    pub fn entity_id(&self, id: AssetId) -> Option<EntityId> {
        self.entity_ids.find(&id).copied()
    }

    /// A texture by slot.
    pub fn texture(&self, id: TextureId) -> Option<&TextureAsset> {
        self.textures.get(id.index())
    }

    /// A texture by slot, for in-place reload.
    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut TextureAsset> {
        self.textures.get_mut(id.index())
    }

    /// A mesh by slot.
    pub fn mesh(&self, id: MeshId) -> Option<&MeshAsset> {
        self.meshes.get(id.index())
    }

    /// An entity by slot.
    pub fn entity(&self, id: EntityId) -> Option<&EntityAsset> {
        self.entities.get(id.index())
    }

    /// An entity by slot, for in-place reload.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityAsset> {
        self.entities.get_mut(id.index())
    }

    /// Every texture, indexed by [`TextureId`].
    pub fn textures(&self) -> &[TextureAsset] {
        &self.textures
    }

    /// Every mesh, indexed by [`MeshId`].
    pub fn meshes(&self) -> &[MeshAsset] {
        &self.meshes
    }

    /// Every entity, indexed by [`EntityId`].
    pub fn entities(&self) -> &[EntityAsset] {
        &self.entities
    }
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStore")
            .field("textures", &self.textures.len())
            .field("meshes", &self.meshes.len())
            .field("entities", &self.entities.len())
            .finish()
    }
}
