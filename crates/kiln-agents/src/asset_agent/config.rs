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

//! Catalog configuration, read from a `Catalog.toml` file.

use super::CatalogError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default size of the scratch stack used while decoding one file.
pub const DEFAULT_SCRATCH_BYTES: usize = 1024 * 1024;

/// One watched folder and the file extension loaded from it.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FolderConfig {
    /// Folder path, relative to [`CatalogConfig::data_root`].
    pub path: PathBuf,
    /// Extension of the files to load, without the leading dot.
    pub extension: String,
}

impl FolderConfig {
    /// Creates a folder entry.
    pub fn new(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extension: extension.into(),
        }
    }
}

/// Represents the structure of the `Catalog.toml` file.
///
/// ```toml
/// data_root = "data"
/// watch = true
///
/// [[folders]]
/// path = "textures"
/// extension = "bmp"
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root every folder path is resolved against.
    pub data_root: PathBuf,
    /// Folders scanned at startup, in order.
    pub folders: Vec<FolderConfig>,
    /// Starts the background watcher when `true`.
    pub watch: bool,
    /// Queues files created after startup instead of ignoring them.
    pub discover_new_files: bool,
    /// Capacity of the per-file scratch allocator, in bytes.
    pub scratch_bytes: usize,
}

impl Default for CatalogConfig {
    /// The standard layout: `textures/*.bmp`, `models/*.obj` and
    /// `entities/*.ent` under `data`.
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            folders: vec![
                FolderConfig::new("textures", "bmp"),
                FolderConfig::new("models", "obj"),
                FolderConfig::new("entities", "ent"),
            ],
            watch: true,
            discover_new_files: false,
            scratch_bytes: DEFAULT_SCRATCH_BYTES,
        }
    }
}

impl CatalogConfig {
    /// Loads a configuration file, falling back to the defaults if it does not exist.
    ///
    /// # Errors
    /// [`CatalogError::Io`] if the file exists but cannot be read, or
    /// [`CatalogError::Config`] if it is not valid TOML for this structure.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            log::info!(
                "No '{}' found. Using default catalog configuration.",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Found '{}'. Loading catalog configuration.", path.display());
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| CatalogError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Every configured folder resolved against the data root.
    pub fn resolved_folders(&self) -> impl Iterator<Item = (PathBuf, &str)> + '_ {
        self.folders
            .iter()
            .map(|folder| (self.data_root.join(&folder.path), folder.extension.as_str()))
    }
}
