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

//! File access backed by the local file system.

use kiln_core::vfs::FileSource;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A [`FileSource`] that reads straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSource;

impl FileSource for DiskFileSource {
    fn list_files(&self, folder: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_direct_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.obj"), b"b").unwrap();
        std::fs::write(dir.path().join("a.obj"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.obj"), b"c").unwrap();

        let files = DiskFileSource.list_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.obj", "b.obj"]);
        assert_eq!(DiskFileSource.read_file(&files[1]).unwrap(), b"b");
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DiskFileSource.list_files(&dir.path().join("nope")).is_err());
        assert!(DiskFileSource.read_file(&dir.path().join("nope.bmp")).is_err());
    }
}
