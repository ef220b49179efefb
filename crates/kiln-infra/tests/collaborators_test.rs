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

//! The infra types used through the contracts the catalog sees.

use kiln_core::gpu::{GpuResources, TextureDescriptor, TextureFormat};
use kiln_core::vfs::FileSource;
use kiln_infra::{CatalogWatcher, DiskFileSource, HeadlessGpu};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn disk_source_behind_a_trait_object() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.ent"), b"#version 1\n").unwrap();

    let files: Arc<dyn FileSource> = Arc::new(DiskFileSource);
    let listed = files.list_files(dir.path()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(files.read_file(&listed[0]).unwrap(), b"#version 1\n");
    assert!(files.read_file(&dir.path().join("missing.ent")).is_err());
}

#[test]
fn headless_gpu_behind_a_trait_object() {
    let concrete = Arc::new(HeadlessGpu::new());
    let gpu: Arc<dyn GpuResources> = concrete.clone();

    let descriptor = TextureDescriptor {
        label: None,
        width: 2,
        height: 1,
        format: TextureFormat::Bgra8Unorm,
    };
    let id = gpu.create_texture(&descriptor, &[0; 8]).unwrap();
    assert_eq!(concrete.texture_extent(id), Some((2, 1, TextureFormat::Bgra8Unorm)));
    assert_eq!(concrete.texture_label(id), None);
}

#[test]
fn watcher_sees_every_watched_folder() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let (tx, rx) = crossbeam_channel::unbounded();
    let watcher = CatalogWatcher::spawn(
        &[first.path().to_path_buf(), second.path().to_path_buf()],
        move |path| {
            let _ = tx.send(path.to_path_buf());
        },
    )
    .unwrap();
    assert_eq!(watcher.folders().len(), 2);

    std::fs::write(second.path().join("b.obj"), b"v 0 0 0\n").unwrap();
    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(seen.file_name().and_then(|n| n.to_str()), Some("b.obj"));
    drop(watcher);
}
