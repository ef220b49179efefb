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

//! The GPU resource contract the asset catalog consumes.
//!
//! The catalog never talks to a graphics API directly. It only needs to create,
//! update, and destroy textures and vertex/index buffers through the
//! [`GpuResources`] trait, which a rendering backend implements.

mod error;
mod resources;

pub use error::ResourceError;
pub use resources::GpuResources;

/// An opaque handle to a texture living on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureId(pub u64);

/// An opaque handle to a vertex or index buffer living on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuBufferId(pub u64);

/// Pixel layouts the catalog uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Four 8-bit channels in red, green, blue, alpha order.
    Rgba8Unorm,
    /// Four 8-bit channels in blue, green, red, alpha order.
    Bgra8Unorm,
}

impl TextureFormat {
    /// Size of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Bgra8Unorm => 4,
        }
    }
}

/// Describes a texture to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor<'a> {
    /// A debug label, usually the source file name.
    pub label: Option<&'a str>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: TextureFormat,
}

impl TextureDescriptor<'_> {
    /// Number of bytes a full upload of this texture contains.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}
