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

use super::{GpuBufferId, GpuTextureId, ResourceError, TextureDescriptor};
use std::fmt::Debug;

/// Logical GPU resource operations, independent of any graphics API.
///
/// Implementations must be shareable across threads, but the catalog only ever
/// calls them from the thread that drains it.
pub trait GpuResources: Send + Sync + Debug + 'static {
    /// Creates a texture and uploads its initial pixels.
    /// ## Arguments
    /// * `descriptor` - Size and format of the texture.
    /// * `pixels` - Tightly packed pixel data, top row first.
    /// ## Errors
    /// * `ResourceError::SizeMismatch` - If `pixels` does not match the descriptor.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
        pixels: &[u8],
    ) -> Result<GpuTextureId, ResourceError>;

    /// Replaces the full contents of an existing texture.
    /// ## Arguments
    /// * `id` - The texture to overwrite.
    /// * `pixels` - New pixel data, same size as at creation.
    fn update_texture(&self, id: GpuTextureId, pixels: &[u8]) -> Result<(), ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&self, id: GpuTextureId) -> Result<(), ResourceError>;

    /// Creates a vertex buffer initialized with `data`.
    fn create_vertex_buffer(&self, data: &[u8]) -> Result<GpuBufferId, ResourceError>;

    /// Creates an index buffer initialized with `data`.
    fn create_index_buffer(&self, data: &[u8]) -> Result<GpuBufferId, ResourceError>;

    /// Destroys a vertex or index buffer.
    fn destroy_buffer(&self, id: GpuBufferId) -> Result<(), ResourceError>;
}
