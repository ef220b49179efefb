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

//! An in-memory [`GpuResources`] backend.

use ahash::AHashMap;
use kiln_core::gpu::{
    GpuBufferId, GpuResources, GpuTextureId, ResourceError, TextureDescriptor, TextureFormat,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct HeadlessTextureEntry {
    label: Option<String>,
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: Vec<u8>,
    uploads: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug)]
struct HeadlessBufferEntry {
    kind: BufferKind,
    data: Vec<u8>,
}

/// A GPU backend that keeps every resource in host memory.
///
/// It validates sizes and handles the same way a real device would, which makes
/// it suitable for tools running without a window and for asserting what the
/// catalog uploaded.
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    textures: Mutex<AHashMap<u64, HeadlessTextureEntry>>,
    buffers: Mutex<AHashMap<u64, HeadlessBufferEntry>>,
    next_id: AtomicU64,
    allocated_bytes: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HeadlessGpu {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // Texture and buffer handles share one counter so they never collide in logs.
    fn generate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current contents of a texture.
    pub fn texture_pixels(&self, id: GpuTextureId) -> Option<Vec<u8>> {
        lock(&self.textures).get(&id.0).map(|t| t.pixels.clone())
    }

    /// Size and format of a texture, as `(width, height, format)`.
    pub fn texture_extent(&self, id: GpuTextureId) -> Option<(u32, u32, TextureFormat)> {
        lock(&self.textures)
            .get(&id.0)
            .map(|t| (t.width, t.height, t.format))
    }

    /// The debug label a texture was created with.
    pub fn texture_label(&self, id: GpuTextureId) -> Option<String> {
        lock(&self.textures).get(&id.0).and_then(|t| t.label.clone())
    }

    /// How many times a texture received pixel data, creation included.
    pub fn texture_upload_count(&self, id: GpuTextureId) -> Option<u32> {
        lock(&self.textures).get(&id.0).map(|t| t.uploads)
    }

    /// Contents of a vertex or index buffer.
    pub fn buffer_data(&self, id: GpuBufferId) -> Option<Vec<u8>> {
        lock(&self.buffers).get(&id.0).map(|b| b.data.clone())
    }

    /// Returns `true` if `id` names a live index buffer.
    pub fn is_index_buffer(&self, id: GpuBufferId) -> bool {
        lock(&self.buffers)
            .get(&id.0)
            .is_some_and(|b| b.kind == BufferKind::Index)
    }

    /// Number of textures not yet destroyed.
    pub fn live_textures(&self) -> usize {
        lock(&self.textures).len()
    }

    /// Number of buffers not yet destroyed.
    pub fn live_buffers(&self) -> usize {
        lock(&self.buffers).len()
    }

    /// Bytes held by live resources.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes.load(Ordering::Relaxed)
    }

    fn create_buffer(&self, kind: BufferKind, data: &[u8]) -> Result<GpuBufferId, ResourceError> {
        if data.is_empty() {
            return Err(ResourceError::Backend(format!(
                "cannot create an empty {kind:?} buffer"
            )));
        }
        let id = self.generate_id();
        lock(&self.buffers).insert(
            id,
            HeadlessBufferEntry {
                kind,
                data: data.to_vec(),
            },
        );
        self.allocated_bytes.fetch_add(data.len(), Ordering::Relaxed);
        log::trace!("Created {kind:?} buffer {id} ({} bytes)", data.len());
        Ok(GpuBufferId(id))
    }
}

impl GpuResources for HeadlessGpu {
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
        pixels: &[u8],
    ) -> Result<GpuTextureId, ResourceError> {
        let expected = descriptor.byte_size();
        if pixels.len() != expected {
            return Err(ResourceError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let id = self.generate_id();
        lock(&self.textures).insert(
            id,
            HeadlessTextureEntry {
                label: descriptor.label.map(str::to_string),
                width: descriptor.width,
                height: descriptor.height,
                format: descriptor.format,
                pixels: pixels.to_vec(),
                uploads: 1,
            },
        );
        self.allocated_bytes.fetch_add(expected, Ordering::Relaxed);
        log::trace!(
            "Created texture {id} '{}' {}x{}",
            descriptor.label.unwrap_or("<unnamed>"),
            descriptor.width,
            descriptor.height
        );
        Ok(GpuTextureId(id))
    }

    fn update_texture(&self, id: GpuTextureId, pixels: &[u8]) -> Result<(), ResourceError> {
        let mut textures = lock(&self.textures);
        let entry = textures
            .get_mut(&id.0)
            .ok_or(ResourceError::NotFound(id.0))?;
        if entry.pixels.len() != pixels.len() {
            return Err(ResourceError::SizeMismatch {
                expected: entry.pixels.len(),
                actual: pixels.len(),
            });
        }
        entry.pixels.copy_from_slice(pixels);
        entry.uploads += 1;
        Ok(())
    }

    fn destroy_texture(&self, id: GpuTextureId) -> Result<(), ResourceError> {
        let entry = lock(&self.textures)
            .remove(&id.0)
            .ok_or(ResourceError::NotFound(id.0))?;
        self.allocated_bytes
            .fetch_sub(entry.pixels.len(), Ordering::Relaxed);
        Ok(())
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Result<GpuBufferId, ResourceError> {
        self.create_buffer(BufferKind::Vertex, data)
    }

    fn create_index_buffer(&self, data: &[u8]) -> Result<GpuBufferId, ResourceError> {
        self.create_buffer(BufferKind::Index, data)
    }

    fn destroy_buffer(&self, id: GpuBufferId) -> Result<(), ResourceError> {
        let entry = lock(&self.buffers)
            .remove(&id.0)
            .ok_or(ResourceError::NotFound(id.0))?;
        self.allocated_bytes
            .fetch_sub(entry.data.len(), Ordering::Relaxed);
        Ok(())
    }
}
