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

use super::Asset;

/// Which attributes each vertex of a [`MeshData`] carries, in interleaving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// `[px, py, pz]`
    Position,
    /// `[px, py, pz, nx, ny, nz]`
    PositionNormal,
    /// `[px, py, pz, u, v]`
    PositionUv,
    /// `[px, py, pz, nx, ny, nz, u, v]`
    PositionNormalUv,
}

impl VertexLayout {
    /// Picks the layout for the given attribute presence.
    pub fn from_attributes(normals: bool, uvs: bool) -> Self {
        match (normals, uvs) {
            (false, false) => Self::Position,
            (true, false) => Self::PositionNormal,
            (false, true) => Self::PositionUv,
            (true, true) => Self::PositionNormalUv,
        }
    }

    /// Number of `f32` values per vertex.
    pub fn stride(self) -> usize {
        match self {
            Self::Position => 3,
            Self::PositionNormal => 6,
            Self::PositionUv => 5,
            Self::PositionNormalUv => 8,
        }
    }

    /// Whether vertices carry a normal.
    pub fn has_normals(self) -> bool {
        matches!(self, Self::PositionNormal | Self::PositionNormalUv)
    }

    /// Whether vertices carry texture coordinates.
    pub fn has_uvs(self) -> bool {
        matches!(self, Self::PositionUv | Self::PositionNormalUv)
    }
}

/// A decoded, de-duplicated, indexed triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Attribute layout of `vertices`.
    pub layout: VertexLayout,
    /// Interleaved vertex stream, `layout.stride()` floats per vertex.
    pub vertices: Vec<f32>,
    /// Triangle list indices into the vertex stream.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of unique vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The floats of vertex `index`.
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        let stride = self.layout.stride();
        self.vertices.get(index * stride..(index + 1) * stride)
    }
}

impl Asset for MeshData {}
