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

mod common;

use common::*;
use kiln_agents::{AssetKind, Catalog, CatalogError, NotifyOutcome};
use kiln_core::asset::{AssetId, EntityId, MeshId, TextureId};
use kiln_core::gpu::{GpuBufferId, GpuResources, GpuTextureId, ResourceError, TextureDescriptor};
use kiln_core::math::Vec3;
use kiln_infra::{DiskFileSource, HeadlessGpu};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const RED: [u8; 3] = [0, 0, 255];
const BLUE: [u8; 3] = [255, 0, 0];

fn open(config: kiln_agents::CatalogConfig, gpu: &Arc<HeadlessGpu>) -> Catalog {
    Catalog::init(config, Arc::new(DiskFileSource), gpu.clone()).unwrap()
}

#[test]
fn cold_load_then_reload_keeps_identifiers() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.bmp"), solid_bmp(2, 2, RED)).unwrap();
    fs::write(dir.path().join("b.obj"), TRIANGLE_OBJ).unwrap();
    fs::write(dir.path().join("c.ent"), entity("b.obj", [1.0, 2.0, 3.0])).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);

    assert_eq!(
        catalog.assets(),
        vec![
            ("a.bmp".to_string(), AssetId(0)),
            ("b.obj".to_string(), AssetId(1)),
            ("c.ent".to_string(), AssetId(2)),
        ]
    );

    // Each identifier resolves through exactly one table.
    assert_eq!(catalog.texture_id(AssetId(0)), Some(TextureId(0)));
    assert_eq!(catalog.mesh_id(AssetId(0)), None);
    assert_eq!(catalog.entity_id(AssetId(0)), None);
    assert_eq!(catalog.mesh_id(AssetId(1)), Some(MeshId(0)));
    assert_eq!(catalog.texture_id(AssetId(1)), None);
    assert_eq!(catalog.entity_id(AssetId(2)), Some(EntityId(0)));
    assert_eq!(catalog.asset_kind(AssetId(2)), Some(AssetKind::Entity));

    let entity = catalog.find_entity(AssetId(2)).unwrap();
    assert_eq!(entity.data.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(entity.mesh, MeshId(0));
    assert!(gpu.is_index_buffer(entity.index_buffer));
    assert_eq!(gpu.buffer_data(entity.vertex_buffer).map(|b| b.len()), Some(36));

    let a = dir.path().join("a.bmp");
    fs::write(&a, solid_bmp(2, 2, BLUE)).unwrap();
    assert_eq!(catalog.notify(&a), NotifyOutcome::Queued);
    assert_eq!(catalog.drain(), 1);

    assert_eq!(catalog.asset_count(), 3);
    assert_eq!(catalog.find_asset_id("a.bmp"), Some(AssetId(0)));
    assert_eq!(catalog.textures().len(), 1);
    let texture = catalog.find_texture(AssetId(0)).unwrap();
    assert_eq!(texture.texture.pixels, solid_rgba(2, 2, BLUE));
    assert_eq!(gpu.texture_pixels(texture.gpu), Some(solid_rgba(2, 2, BLUE)));
    assert_eq!(gpu.texture_upload_count(texture.gpu), Some(2));
    assert_eq!(gpu.live_textures(), 1);
}

#[test]
fn notifications_are_deduplicated_until_drained() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.bmp"), solid_bmp(1, 1, RED)).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);
    let a = dir.path().join("a.bmp");

    assert_eq!(catalog.notify(&a), NotifyOutcome::Queued);
    assert_eq!(catalog.notify(&a), NotifyOutcome::AlreadyQueued);
    assert_eq!(catalog.pending_count(), 1);

    assert_eq!(catalog.drain(), 1);
    assert_eq!(catalog.pending_count(), 0);
    assert_eq!(catalog.drain(), 0);

    assert_eq!(catalog.notify(&a), NotifyOutcome::Queued);
}

#[test]
fn unknown_files_are_ignored_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);

    let late = dir.path().join("late.bmp");
    fs::write(&late, solid_bmp(1, 1, RED)).unwrap();
    assert_eq!(catalog.notify(&late), NotifyOutcome::Ignored);
    assert_eq!(catalog.drain(), 0);
    assert_eq!(catalog.asset_count(), 0);
}

#[test]
fn discovery_loads_files_created_after_startup() {
    let dir = tempfile::tempdir().unwrap();
    let gpu = Arc::new(HeadlessGpu::new());
    let mut config = flat_config(dir.path());
    config.discover_new_files = true;
    let mut catalog = open(config, &gpu);

    let late = dir.path().join("late.bmp");
    fs::write(&late, solid_bmp(1, 1, RED)).unwrap();
    assert_eq!(catalog.notify(&late), NotifyOutcome::Queued);
    assert_eq!(catalog.notify(&dir.path().join("notes.txt")), NotifyOutcome::Ignored);
    assert_eq!(catalog.drain(), 1);
    assert_eq!(catalog.find_asset_id("late.bmp"), Some(AssetId(0)));
}

#[test]
fn broken_files_are_skipped_without_stopping_the_scan() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.bmp"), b"not a bitmap").unwrap();
    fs::write(dir.path().join("b.bmp"), solid_bmp(1, 1, RED)).unwrap();
    fs::write(dir.path().join("c.obj"), "v 0 0 0\nf 1 2 3 4\n").unwrap();
    fs::write(dir.path().join("d.ent"), entity("missing.obj", [0.0; 3])).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let catalog = open(flat_config(dir.path()), &gpu);

    assert_eq!(catalog.assets(), vec![("b.bmp".to_string(), AssetId(0))]);
    assert!(catalog.find_mesh_by_name("c.obj").is_none());
    assert!(catalog.find_entity_by_name("d.ent").is_none());
    assert_eq!(gpu.live_buffers(), 0);
}

#[test]
fn failed_reload_keeps_the_previous_version() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.bmp");
    fs::write(&a, solid_bmp(1, 1, RED)).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);

    // Truncated mid-write.
    fs::write(&a, &solid_bmp(1, 1, BLUE)[..20]).unwrap();
    catalog.notify(&a);
    assert_eq!(catalog.drain(), 0);

    // Same name, different size.
    fs::write(&a, solid_bmp(2, 2, BLUE)).unwrap();
    catalog.notify(&a);
    assert_eq!(catalog.drain(), 0);

    let texture = catalog.find_texture_by_name("a.bmp").unwrap();
    assert_eq!(texture.texture.pixels, solid_rgba(1, 1, RED));
}

#[test]
fn meshes_cannot_be_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let b = dir.path().join("b.obj");
    fs::write(&b, TRIANGLE_OBJ).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);

    assert!(matches!(
        catalog.load_file(&b),
        Err(CatalogError::MeshReloadUnsupported(name)) if name == "b.obj"
    ));
    assert_eq!(catalog.meshes().len(), 1);
}

#[test]
fn entity_reload_overwrites_the_transform_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.obj"), TRIANGLE_OBJ).unwrap();
    let c = dir.path().join("c.ent");
    fs::write(&c, entity("b.obj", [0.0; 3])).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);
    let before = catalog.find_entity_by_name("c.ent").unwrap().vertex_buffer;

    fs::write(
        &c,
        "#version 3\nposition 4, 5, 6;\nmesh b.obj;\nscale 2, 2, 2;\n",
    )
    .unwrap();
    catalog.notify(&c);
    assert_eq!(catalog.drain(), 1);

    let entity = catalog.find_entity_by_name("c.ent").unwrap();
    assert_eq!(entity.data.position, Vec3::new(4.0, 5.0, 6.0));
    assert_eq!(entity.data.scale, Vec3::new(2.0, 2.0, 2.0));
    assert_eq!(entity.data.version, 3);
    assert_eq!(entity.vertex_buffer, before);
    assert_eq!(catalog.entities().len(), 1);
}

#[test]
fn procedural_textures_share_the_name_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.obj"), TRIANGLE_OBJ).unwrap();
    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);

    let id = catalog
        .add_texture_pixels("white", 1, 1, vec![255; 4])
        .unwrap();
    assert_eq!(id, AssetId(1));
    assert_eq!(
        catalog.add_texture_pixels("white", 1, 1, vec![0, 0, 0, 255]).unwrap(),
        id
    );
    assert_eq!(
        catalog.find_texture(id).map(|t| t.texture.pixels.clone()),
        Some(vec![0, 0, 0, 255])
    );

    assert!(matches!(
        catalog.add_texture_pixels("b.obj", 1, 1, vec![255; 4]),
        Err(CatalogError::KindMismatch { expected: "texture", .. })
    ));
    assert!(matches!(
        catalog.add_texture_pixels("bad", 2, 2, vec![255; 4]),
        Err(CatalogError::Gpu(_))
    ));
    assert_eq!(catalog.asset_count(), 2);
}

#[test]
fn large_meshes_load_with_the_default_scratch() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("grid.obj"), grid_obj(64)).unwrap();
    fs::write(dir.path().join("floor.ent"), entity("grid.obj", [0.0; 3])).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let catalog = open(flat_config(dir.path()), &gpu);

    let mesh = catalog.find_mesh_by_name("grid.obj").unwrap();
    assert_eq!(mesh.data.triangle_count(), 8192);
    assert!(catalog.find_entity_by_name("floor.ent").is_some());
}

#[test]
fn meshes_larger_than_the_scratch_decode_on_the_heap() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("grid.obj"), grid_obj(16)).unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut config = flat_config(dir.path());
    config.scratch_bytes = 1024;
    let catalog = open(config, &gpu);

    let mesh = catalog.find_mesh_by_name("grid.obj").unwrap();
    assert_eq!(mesh.data.triangle_count(), 16 * 16 * 2);
    assert_eq!(mesh.data.vertex_count(), 17 * 17);
}

#[test]
fn only_version_one_entities_default_to_the_cube() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cube.obj"), TRIANGLE_OBJ).unwrap();
    fs::write(dir.path().join("old.ent"), "#version 1\nposition 1, 0, 0;\n").unwrap();
    let unbound = dir.path().join("new.ent");
    fs::write(&unbound, "#version 2\nposition 2, 0, 0;\n").unwrap();

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = open(flat_config(dir.path()), &gpu);

    let old = catalog.find_entity_by_name("old.ent").unwrap();
    assert_eq!(old.mesh, MeshId(0));
    assert!(catalog.find_entity_by_name("new.ent").is_none());
    assert!(matches!(
        catalog.load_file(&unbound),
        Err(CatalogError::MissingMesh { entity, mesh }) if entity == "new.ent" && mesh.is_empty()
    ));
}

/// Delegates to [`HeadlessGpu`] but refuses to create index buffers.
#[derive(Debug, Default)]
struct NoIndexGpu {
    inner: HeadlessGpu,
    destroyed_buffers: AtomicUsize,
}

impl GpuResources for NoIndexGpu {
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
        pixels: &[u8],
    ) -> Result<GpuTextureId, ResourceError> {
        self.inner.create_texture(descriptor, pixels)
    }

    fn update_texture(&self, id: GpuTextureId, pixels: &[u8]) -> Result<(), ResourceError> {
        self.inner.update_texture(id, pixels)
    }

    fn destroy_texture(&self, id: GpuTextureId) -> Result<(), ResourceError> {
        self.inner.destroy_texture(id)
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Result<GpuBufferId, ResourceError> {
        self.inner.create_vertex_buffer(data)
    }

    fn create_index_buffer(&self, _data: &[u8]) -> Result<GpuBufferId, ResourceError> {
        Err(ResourceError::Backend("index buffers unavailable".to_string()))
    }

    fn destroy_buffer(&self, id: GpuBufferId) -> Result<(), ResourceError> {
        self.destroyed_buffers.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy_buffer(id)
    }
}

#[test]
fn failed_buffer_creation_releases_the_vertex_buffer() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.obj"), TRIANGLE_OBJ).unwrap();
    let c = dir.path().join("c.ent");
    fs::write(&c, entity("b.obj", [0.0; 3])).unwrap();

    let gpu = Arc::new(NoIndexGpu::default());
    let mut catalog = Catalog::init(flat_config(dir.path()), Arc::new(DiskFileSource), gpu.clone())
        .unwrap();

    assert!(catalog.find_entity_by_name("c.ent").is_none());
    assert_eq!(gpu.destroyed_buffers.load(Ordering::SeqCst), 1);
    assert_eq!(gpu.inner.live_buffers(), 0);

    assert!(matches!(
        catalog.load_file(&c),
        Err(CatalogError::Gpu(ResourceError::Backend(_)))
    ));
    assert_eq!(gpu.destroyed_buffers.load(Ordering::SeqCst), 2);
    assert_eq!(gpu.inner.live_buffers(), 0);
}
