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

use kiln_core::collections::TableError;
use kiln_core::gpu::ResourceError;
use kiln_core::memory::MemoryError;
use kiln_infra::WatchError;
use kiln_lanes::DecodeError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised while loading, reloading, or registering a catalog entry.
///
/// None of these are fatal to the catalog itself: the failing file is skipped
/// and the rest of the scan or drain continues.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A file or folder could not be read.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// A file's contents could not be decoded.
    #[error("failed to decode '{path}': {source}")]
    Decode {
        /// The offending file.
        path: PathBuf,
        /// What the decoder rejected.
        #[source]
        source: DecodeError,
    },
    /// The configuration file is malformed.
    #[error("invalid configuration '{path}': {source}")]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// The parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// The GPU backend refused an operation.
    #[error(transparent)]
    Gpu(#[from] ResourceError),
    /// A lookup table rejected an insertion.
    #[error(transparent)]
    Table(#[from] TableError),
    /// The asset store could not grow.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// An entity names a mesh the catalog does not hold.
    #[error("entity '{entity}' references unknown mesh '{mesh}'")]
    MissingMesh {
        /// The entity file name.
        entity: String,
        /// The mesh file name it references.
        mesh: String,
    },
    /// A mesh file changed after it was loaded.
    #[error("hot-reloading mesh '{0}' is not supported")]
    MeshReloadUnsupported(String),
    /// A name is already registered as a different kind of asset.
    #[error("'{name}' is already registered, but not as a {expected}")]
    KindMismatch {
        /// The registered name.
        name: String,
        /// The kind the caller expected.
        expected: &'static str,
    },
    /// No handler is registered for the file's extension.
    #[error("no handler registered for '{0}'")]
    NoHandler(PathBuf),
    /// The background watcher could not be started.
    #[error(transparent)]
    Watch(#[from] WatchError),
}
