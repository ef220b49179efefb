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

//! The file-access contract the asset catalog consumes.
//!
//! The catalog only needs two operations from the platform: enumerate the files
//! of a watched folder and read a file's raw bytes. Keeping them behind
//! [`FileSource`] lets tests substitute in-memory content.

use std::io;
use std::path::{Path, PathBuf};

/// Lists and reads files.
pub trait FileSource: Send + Sync {
    /// Returns the regular files directly inside `folder`, in a stable order.
    ///
    /// # Errors
    /// Returns the I/O error if the folder cannot be read.
    fn list_files(&self, folder: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads the whole file at `path`.
    ///
    /// # Errors
    /// Returns the I/O error if the file is missing or unreadable.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
}
