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

//! Writes a small data folder so the sandbox has something to load.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const CUBE_OBJ: &str = "\
# unit cube, positions and normals
o cube
v -0.5 -0.5 -0.5
v  0.5 -0.5 -0.5
v  0.5  0.5 -0.5
v -0.5  0.5 -0.5
v -0.5 -0.5  0.5
v  0.5 -0.5  0.5
v  0.5  0.5  0.5
v -0.5  0.5  0.5
vn 0 0 -1
vn 0 0 1
vn -1 0 0
vn 1 0 0
vn 0 -1 0
vn 0 1 0
f 1//1 3//1 2//1
f 1//1 4//1 3//1
f 5//2 6//2 7//2
f 5//2 7//2 8//2
f 1//3 5//3 8//3
f 1//3 8//3 4//3
f 2//4 3//4 7//4
f 2//4 7//4 6//4
f 1//5 2//5 6//5
f 1//5 6//5 5//5
f 4//6 8//6 7//6
f 4//6 7//6 3//6
";

const CRATE_ENT: &str = "\
#version 4
// a crate sitting on the ground, turned a quarter
position 0, 0.5, -3;
mesh cube.obj;
scale 1, 1, 1;
rotation euler 0, 90, 0;
";

/// An 8x8 black and white checkerboard as a 24-bit bottom-up bitmap.
fn checker_bmp() -> Vec<u8> {
    const SIZE: u32 = 8;
    let row_bytes = (SIZE * 3) as usize;
    let offset = 14 + 40;
    let file_size = offset + row_bytes * SIZE as usize;

    let mut out = Vec::with_capacity(file_size);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(offset as u32).to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(SIZE as i32).to_le_bytes());
    out.extend_from_slice(&(SIZE as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&[0; 24]);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let value = if (x + y) % 2 == 0 { 255 } else { 0 };
            out.extend_from_slice(&[value; 3]);
        }
    }
    out
}

fn write_if_missing(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        log::debug!("Keeping existing '{}'", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write '{}'", path.display()))?;
    log::info!("Wrote demo file '{}'", path.display());
    Ok(())
}

/// Creates `textures/checker.bmp`, `models/cube.obj` and `entities/crate.ent`
/// under `root`, leaving existing files untouched.
pub fn seed(root: &Path) -> Result<()> {
    write_if_missing(&root.join("textures").join("checker.bmp"), &checker_bmp())?;
    write_if_missing(&root.join("models").join("cube.obj"), CUBE_OBJ.as_bytes())?;
    write_if_missing(&root.join("entities").join("crate.ent"), CRATE_ENT.as_bytes())?;
    Ok(())
}
