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

//! Per-extension load and reload logic, and the registry that selects it.

use super::context::HandlerContext;
use super::inbox::asset_name;
use super::store::AssetKind;
use super::CatalogError;
use kiln_core::asset::AssetId;
use kiln_core::collections::{StrTable, TableError};
use kiln_core::memory::HEAP;
use kiln_lanes::{AssetLoaderLane, BmpLoaderLane, DecodeError, EntityLoaderLane, ObjLoaderLane};
use std::path::Path;

/// Turns one file into a catalog entry.
///
/// A handler decides between the two paths itself: if the file name is not yet
/// registered it performs a cold load, otherwise it updates the existing entry
/// in place and returns the same identifier.
pub trait CatalogHandler: Send + Sync {
    /// The kind of asset this handler produces.
    fn kind(&self) -> AssetKind;

    /// Loads or reloads `path`, whose contents are `bytes`.
    /// ## Arguments
    /// * `cx` - The catalog state the handler may mutate.
    /// * `path` - The file that was read. Its file name is the registration key.
    /// * `bytes` - The file contents.
    fn handle(
        &self,
        cx: &mut HandlerContext,
        path: &Path,
        bytes: &[u8],
    ) -> Result<AssetId, CatalogError>;
}

fn decode_error(path: &Path) -> impl FnOnce(DecodeError) -> CatalogError + '_ {
    move |source| CatalogError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

fn name_of(path: &Path) -> Result<&str, CatalogError> {
    asset_name(path).ok_or_else(|| CatalogError::NoHandler(path.to_path_buf()))
}

/// Loads `.bmp` files as textures. Reloads re-upload the pixels.
#[derive(Debug, Default)]
pub struct TextureHandler {
    lane: BmpLoaderLane,
}

impl CatalogHandler for TextureHandler {
    fn kind(&self) -> AssetKind {
        AssetKind::Texture
    }

    fn handle(
        &self,
        cx: &mut HandlerContext,
        path: &Path,
        bytes: &[u8],
    ) -> Result<AssetId, CatalogError> {
        let name = name_of(path)?;
        let texture = self.lane.load(bytes).map_err(decode_error(path))?;
        match cx.asset_id(name) {
            None => cx.add_texture(name, texture),
            Some(id) => cx.reload_texture(id, name, texture).map(|_| id),
        }
    }
}

/// Loads `.obj` files as meshes. Meshes cannot be reloaded.
///
/// Decoding runs in the catalog's scratch stack, or on the heap for meshes
/// too large for it.
#[derive(Debug, Default)]
pub struct MeshHandler {
    lane: ObjLoaderLane,
}

impl CatalogHandler for MeshHandler {
    fn kind(&self) -> AssetKind {
        AssetKind::Mesh
    }

    fn handle(
        &self,
        cx: &mut HandlerContext,
        path: &Path,
        bytes: &[u8],
    ) -> Result<AssetId, CatalogError> {
        let name = name_of(path)?;
        if cx.asset_id(name).is_some() {
            return Err(CatalogError::MeshReloadUnsupported(name.to_string()));
        }

        let scope = cx.scratch().scope();
        let decoded = self.lane.load_in(bytes, &scope);
        drop(scope);
        let data = match decoded {
            Err(DecodeError::Memory(err)) => {
                log::debug!(
                    "'{name}' needs {} scratch bytes ({err}); decoding on the heap",
                    ObjLoaderLane::scratch_bytes(bytes)
                );
                self.lane.load(bytes)
            }
            other => other,
        }
        .map_err(decode_error(path))?;
        cx.add_mesh(name, data)
    }
}

/// Loads `.ent` files as entities. Reloads overwrite the transform.
#[derive(Debug, Default)]
pub struct EntityHandler {
    lane: EntityLoaderLane,
}

impl CatalogHandler for EntityHandler {
    fn kind(&self) -> AssetKind {
        AssetKind::Entity
    }

    fn handle(
        &self,
        cx: &mut HandlerContext,
        path: &Path,
        bytes: &[u8],
    ) -> Result<AssetId, CatalogError> {
        let name = name_of(path)?;
        let data = self.lane.load(bytes).map_err(decode_error(path))?;
        match cx.asset_id(name) {
            None => cx.add_entity(name, data),
            Some(id) => cx.reload_entity(id, name, data).map(|_| id),
        }
    }
}

/// Maps lowercase file extensions to the handler responsible for them.
pub struct HandlerRegistry {
    handlers: StrTable<'static, Box<dyn CatalogHandler>>,
}

impl Default for HandlerRegistry {
    /// Textures from `bmp`, meshes from `obj`, entities from `ent`.
    fn default() -> Self {
        let mut registry = Self::empty();
        let builtin: [(&str, Box<dyn CatalogHandler>); 3] = [
            ("bmp", Box::new(TextureHandler::default())),
            ("obj", Box::new(MeshHandler::default())),
            ("ent", Box::new(EntityHandler::default())),
        ];
        for (extension, handler) in builtin {
            if let Err(err) = registry.register(extension, handler) {
                log::error!("Failed to register built-in handler for '{extension}': {err}");
            }
        }
        registry
    }
}

impl HandlerRegistry {
    /// A registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: StrTable::new_in(&HEAP),
        }
    }

    /// Registers `handler` for `extension` (without the dot, any case).
    ///
    /// # Errors
    /// [`TableError::DuplicateKey`] if the extension already has a handler.
    pub fn register(
        &mut self,
        extension: &str,
        handler: Box<dyn CatalogHandler>,
    ) -> Result<(), TableError> {
        self.handlers
            .add(extension.to_ascii_lowercase(), handler)
            .map(|_| ())
    }

    /// The handler for a lowercase extension.
    pub fn find(&self, extension: &str) -> Option<&dyn CatalogHandler> {
        self.handlers.find(extension).map(|handler| &**handler)
    }

    /// Every registered extension.
    pub fn extensions(&self) -> Vec<String> {
        self.handlers.iter().map(|(ext, _)| ext.clone()).collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_handlers_cover_the_three_formats() {
        let registry = HandlerRegistry::default();
        assert_eq!(registry.find("bmp").map(|h| h.kind()), Some(AssetKind::Texture));
        assert_eq!(registry.find("obj").map(|h| h.kind()), Some(AssetKind::Mesh));
        assert_eq!(registry.find("ent").map(|h| h.kind()), Some(AssetKind::Entity));
        assert!(registry.find("png").is_none());
    }

    #[test]
    fn extensions_register_once_case_insensitively() {
        let mut registry = HandlerRegistry::empty();
        registry
            .register("BMP", Box::new(TextureHandler::default()))
            .unwrap();
        assert_eq!(
            registry.register("bmp", Box::new(TextureHandler::default())),
            Err(TableError::DuplicateKey)
        );
        assert_eq!(registry.extensions(), vec!["bmp".to_string()]);
    }
}
