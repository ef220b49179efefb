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

use std::fmt;

/// The stable public handle of a catalog entry.
///
/// Identifiers are assigned in registration order starting at zero and are
/// never reused. Each one resolves to exactly one texture, mesh, or entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

macro_rules! slot_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            /// The array slot this identifier points at.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

slot_id!(
    /// Index of a texture in the catalog's texture array.
    TextureId
);
slot_id!(
    /// Index of a mesh in the catalog's mesh array.
    MeshId
);
slot_id!(
    /// Index of an entity in the catalog's entity array.
    EntityId
);
