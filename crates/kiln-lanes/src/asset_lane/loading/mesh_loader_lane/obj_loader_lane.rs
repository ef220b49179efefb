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

//! Defines a lane for loading OBJ mesh assets.

use crate::asset_lane::{AssetLoaderLane, DecodeError};
use ahash::AHashMap;
use kiln_core::asset::{MeshData, VertexLayout};
use kiln_core::collections::Array;
use kiln_core::memory::{Allocator, HEAP};
use std::mem;

/// Lane for loading triangulated OBJ meshes.
///
/// Faces may carry normals and texture coordinates, but every face must use the
/// same combination as the first one. The output vertex stream is interleaved
/// as position, normal, uv, with identical vertices shared through the index
/// buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjLoaderLane;

/// One corner of a face, as 1-based indices. Zero means the attribute is absent.
#[derive(Debug, Clone, Copy, Default)]
struct Corner {
    position: i64,
    uv: i64,
    normal: i64,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    corners: [Corner; 3],
    line: u32,
}

fn parse_floats<const N: usize>(
    fields: &mut std::str::SplitWhitespace<'_>,
    line: u32,
    what: &str,
) -> Result<[f32; N], DecodeError> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let field = fields
            .next()
            .ok_or_else(|| DecodeError::parse(line, format!("expected {N} components for {what}")))?;
        *slot = field
            .parse()
            .map_err(|_| DecodeError::parse(line, format!("invalid number '{field}' in {what}")))?;
    }
    Ok(out)
}

fn parse_index(text: &str, line: u32) -> Result<i64, DecodeError> {
    text.parse()
        .map_err(|_| DecodeError::parse(line, format!("invalid face index '{text}'")))
}

/// Parses `p`, `p/t`, `p//n` or `p/t/n`.
fn parse_corner(text: &str, line: u32) -> Result<Corner, DecodeError> {
    let mut parts = text.split('/');
    let position = parse_index(parts.next().unwrap_or_default(), line)?;
    let uv = match parts.next() {
        None | Some("") => 0,
        Some(t) => parse_index(t, line)?,
    };
    let normal = match parts.next() {
        None | Some("") => 0,
        Some(n) => parse_index(n, line)?,
    };
    if parts.next().is_some() {
        return Err(DecodeError::parse(line, format!("malformed face vertex '{text}'")));
    }
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Resolves a 1-based index into `items`.
fn resolve<'i, T>(
    items: &'i [T],
    index: i64,
    kind: &'static str,
    line: u32,
) -> Result<&'i T, DecodeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| items.get(i))
        .ok_or(DecodeError::IndexOutOfRange {
            line,
            kind,
            index,
            count: items.len(),
        })
}

/// How many of each attribute statement a file holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct StatementCounts {
    positions: usize,
    normals: usize,
    uvs: usize,
    faces: usize,
}

impl StatementCounts {
    fn of(text: &str) -> Self {
        let mut counts = Self::default();
        for raw in text.lines() {
            match raw.split('#').next().and_then(|c| c.split_whitespace().next()) {
                Some("v") => counts.positions += 1,
                Some("vn") => counts.normals += 1,
                Some("vt") => counts.uvs += 1,
                Some("f") => counts.faces += 1,
                _ => {}
            }
        }
        counts
    }
}

/// Bit pattern used for exact-match vertex de-duplication. Both zeros compare
/// equal as floats, so they share a key.
fn key_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

impl ObjLoaderLane {
    /// Decodes `bytes`, using `scratch` for every intermediate buffer.
    ///
    /// Only the returned [`MeshData`] lives on the global heap; attribute lists
    /// and face records are dropped before returning, so a stack scope or frame
    /// arena is a suitable scratch allocator. Each list is sized once from a
    /// counting pass, so the scratch use is [`ObjLoaderLane::scratch_bytes`].
    ///
    /// # Errors
    /// [`DecodeError::Memory`] if `scratch` cannot hold the lists.
    pub fn load_in<A: Allocator + ?Sized>(
        &self,
        bytes: &[u8],
        scratch: &A,
    ) -> Result<MeshData, DecodeError> {
        let text = std::str::from_utf8(bytes)?;

        let counts = StatementCounts::of(text);

        let mut positions: Array<'_, [f32; 3], A> =
            Array::with_capacity_in(counts.positions, scratch)?;
        let mut normals: Array<'_, [f32; 3], A> = Array::with_capacity_in(counts.normals, scratch)?;
        let mut uvs: Array<'_, [f32; 2], A> = Array::with_capacity_in(counts.uvs, scratch)?;
        let mut faces: Array<'_, Face, A> = Array::with_capacity_in(counts.faces, scratch)?;
        let mut layout: Option<VertexLayout> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = number as u32 + 1;
            let content = raw.split('#').next().unwrap_or_default();
            let mut fields = content.split_whitespace();
            let Some(marker) = fields.next() else {
                continue;
            };

            match marker {
                "v" => {
                    positions.try_push(parse_floats::<3>(&mut fields, line, "vertex")?)?;
                }
                "vn" => {
                    normals.try_push(parse_floats::<3>(&mut fields, line, "normal")?)?;
                }
                "vt" => {
                    uvs.try_push(parse_floats::<2>(&mut fields, line, "texture coordinate")?)?;
                }
                "f" => {
                    let refs: Vec<&str> = fields.collect();
                    if refs.len() != 3 {
                        return Err(DecodeError::NotTriangulated {
                            line,
                            count: refs.len(),
                        });
                    }

                    let mut corners = [Corner::default(); 3];
                    for (corner, text) in corners.iter_mut().zip(&refs) {
                        *corner = parse_corner(text, line)?;
                    }

                    let face_layout = VertexLayout::from_attributes(
                        corners[0].normal != 0,
                        corners[0].uv != 0,
                    );
                    let uniform = corners.iter().all(|c| {
                        VertexLayout::from_attributes(c.normal != 0, c.uv != 0) == face_layout
                    });
                    if !uniform || layout.is_some_and(|first| first != face_layout) {
                        return Err(DecodeError::MixedFaceLayout { line });
                    }
                    layout = Some(face_layout);

                    faces.try_push(Face { corners, line })?;
                }
                "o" | "g" | "s" | "usemtl" | "mtllib" => {}
                other => log::trace!("Skipping unsupported OBJ statement '{other}' on line {line}"),
            }
        }

        if positions.is_empty() {
            return Err(DecodeError::Empty("vertices"));
        }
        let Some(layout) = layout else {
            return Err(DecodeError::Empty("faces"));
        };

        let stride = layout.stride();
        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(faces.len() * 3);
        let mut unique: AHashMap<[u32; 8], u32> = AHashMap::new();

        for face in faces.iter() {
            for corner in &face.corners {
                let mut vertex = [0.0f32; 8];
                vertex[..3].copy_from_slice(resolve(&positions, corner.position, "vertex", face.line)?);
                let mut at = 3;
                if layout.has_normals() {
                    vertex[at..at + 3]
                        .copy_from_slice(resolve(&normals, corner.normal, "normal", face.line)?);
                    at += 3;
                }
                if layout.has_uvs() {
                    vertex[at..at + 2].copy_from_slice(resolve(
                        &uvs,
                        corner.uv,
                        "texture coordinate",
                        face.line,
                    )?);
                }

                let key = vertex.map(key_bits);
                let next = (vertices.len() / stride) as u32;
                let index = *unique.entry(key).or_insert_with(|| {
                    vertices.extend_from_slice(&vertex[..stride]);
                    next
                });
                indices.push(index);
            }
        }

        log::debug!(
            "Decoded OBJ: {} positions, {} normals, {} uvs, {} faces -> {} unique vertices",
            positions.len(),
            normals.len(),
            uvs.len(),
            faces.len(),
            vertices.len() / stride
        );

        Ok(MeshData {
            layout,
            vertices,
            indices,
        })
    }
}

impl ObjLoaderLane {
    /// Upper bound on the scratch bytes [`ObjLoaderLane::load_in`] needs for
    /// `bytes`, alignment padding included.
    pub fn scratch_bytes(bytes: &[u8]) -> usize {
        let Ok(text) = std::str::from_utf8(bytes) else {
            return 0;
        };
        let counts = StatementCounts::of(text);
        let padded = |count: usize, size: usize| count * size + 16;
        padded(counts.positions, mem::size_of::<[f32; 3]>())
            + padded(counts.normals, mem::size_of::<[f32; 3]>())
            + padded(counts.uvs, mem::size_of::<[f32; 2]>())
            + padded(counts.faces, mem::size_of::<Face>())
    }
}

impl AssetLoaderLane<MeshData> for ObjLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<MeshData, DecodeError> {
        self.load_in(bytes, &HEAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::memory::StackAllocator;

    const QUAD: &str = "\
# two triangles sharing an edge
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
s off
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    #[test]
    fn shared_corners_are_deduplicated() {
        let mesh = ObjLoaderLane.load(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.layout, VertexLayout::PositionNormalUv);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(
            mesh.vertex(1),
            Some(&[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0][..])
        );
    }

    #[test]
    fn positions_only_faces() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 3 2 1\n";
        let mesh = ObjLoaderLane.load(src.as_bytes()).unwrap();
        assert_eq!(mesh.layout, VertexLayout::Position);
        assert_eq!(mesh.vertices.len(), 9);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn normals_without_uvs() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let mesh = ObjLoaderLane.load(src.as_bytes()).unwrap();
        assert_eq!(mesh.layout, VertexLayout::PositionNormal);
        assert_eq!(mesh.vertex(2), Some(&[0.0, 1.0, 0.0, 0.0, 0.0, 1.0][..]));
    }

    #[test]
    fn uvs_without_normals() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.25\nf 1/1 2/1 3/1\n";
        let mesh = ObjLoaderLane.load(src.as_bytes()).unwrap();
        assert_eq!(mesh.layout, VertexLayout::PositionUv);
        assert_eq!(mesh.vertex(0), Some(&[0.0, 0.0, 0.0, 0.5, 0.25][..]));
    }

    #[test]
    fn mixed_face_layouts_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\n\
                   f 1/1/1 2/1/1 3/1/1\nf 1 2 3\n";
        assert_eq!(
            ObjLoaderLane.load(src.as_bytes()),
            Err(DecodeError::MixedFaceLayout { line: 7 })
        );
    }

    #[test]
    fn quads_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        assert_eq!(
            ObjLoaderLane.load(src.as_bytes()),
            Err(DecodeError::NotTriangulated { line: 5, count: 4 })
        );
    }

    #[test]
    fn out_of_range_and_zero_indices_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(matches!(
            ObjLoaderLane.load(src.as_bytes()),
            Err(DecodeError::IndexOutOfRange { index: 9, count: 3, .. })
        ));
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        assert!(matches!(
            ObjLoaderLane.load(src.as_bytes()),
            Err(DecodeError::IndexOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(ObjLoaderLane.load(b""), Err(DecodeError::Empty("vertices")));
        assert_eq!(
            ObjLoaderLane.load(b"v 0 0 0\n"),
            Err(DecodeError::Empty("faces"))
        );
    }

    /// A `cells` x `cells` grid of quads, two triangles each, with normals.
    fn grid(cells: usize) -> String {
        let mut src = String::new();
        for y in 0..=cells {
            for x in 0..=cells {
                src.push_str(&format!("v {x} {y} 0\n"));
            }
        }
        src.push_str("vn 0 0 1\n");
        let row = cells + 1;
        for y in 0..cells {
            for x in 0..cells {
                let a = y * row + x + 1;
                let (b, c, d) = (a + 1, a + row + 1, a + row);
                src.push_str(&format!("f {a}//1 {b}//1 {c}//1\nf {a}//1 {c}//1 {d}//1\n"));
            }
        }
        src
    }

    #[test]
    fn lists_are_sized_from_a_counting_pass() {
        let src = grid(64);
        let counts = StatementCounts::of(&src);
        assert_eq!(counts.positions, 65 * 65);
        assert_eq!(counts.normals, 1);
        assert_eq!(counts.faces, 64 * 64 * 2);

        // Exactly the estimate is enough: no list grows and abandons a buffer.
        let mut stack = StackAllocator::new(ObjLoaderLane::scratch_bytes(src.as_bytes()));
        let scope = stack.scope();
        let mesh = ObjLoaderLane.load_in(src.as_bytes(), &scope).unwrap();
        assert_eq!(mesh.triangle_count(), 8192);
        assert_eq!(mesh.vertex_count(), 65 * 65);
    }

    #[test]
    fn scratch_exhaustion_is_a_memory_error() {
        let mut stack = StackAllocator::new(256);
        let scope = stack.scope();
        assert!(matches!(
            ObjLoaderLane.load_in(grid(4).as_bytes(), &scope),
            Err(DecodeError::Memory(_))
        ));
    }

    #[test]
    fn scratch_is_released_when_the_scope_closes() {
        let mut stack = StackAllocator::new(64 * 1024);
        {
            let scope = stack.scope();
            let mesh = ObjLoaderLane.load_in(QUAD.as_bytes(), &scope).unwrap();
            assert_eq!(mesh.triangle_count(), 2);
            assert!(scope.used() > 0);
        }
        assert_eq!(stack.used(), 0);
    }
}
