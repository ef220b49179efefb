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
use crate::math::{Quaternion, Vec3};

/// The mesh a version 1 entity renders with. Later versions must name one.
pub const DEFAULT_ENTITY_MESH: &str = "cube.obj";

/// A decoded entity definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityData {
    /// The `#version` the file declared.
    pub version: u32,
    /// World-space position.
    pub position: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Orientation, as written in the file.
    pub rotation: Quaternion,
    /// File name of the mesh to render the entity with.
    pub mesh: String,
}

impl Default for EntityData {
    fn default() -> Self {
        Self {
            version: 1,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Quaternion::IDENTITY,
            mesh: DEFAULT_ENTITY_MESH.to_string(),
        }
    }
}

impl EntityData {
    /// The defaults a file of `version` starts from.
    ///
    /// Only version 1 files, which cannot name a mesh, fall back to
    /// [`DEFAULT_ENTITY_MESH`]. From version 2 on the mesh starts empty.
    pub fn for_version(version: u32) -> Self {
        let mesh = if version < 2 {
            DEFAULT_ENTITY_MESH.to_string()
        } else {
            String::new()
        };
        Self {
            version,
            mesh,
            ..Self::default()
        }
    }
}

impl Asset for EntityData {}
