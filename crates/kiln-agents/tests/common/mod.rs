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

//! Fixture helpers shared by the catalog integration tests.

#![allow(dead_code)]

use kiln_agents::{CatalogConfig, FolderConfig};
use std::path::Path;

/// A solid-color 24-bit bottom-up BMP, `bgr` given in file byte order.
pub fn solid_bmp(width: u32, height: u32, bgr: [u8; 3]) -> Vec<u8> {
    let row_bytes = ((width as usize * 3) + 3) & !3;
    let offset = 14 + 40;
    let size = offset + row_bytes * height as usize;

    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(offset as u32).to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&[0; 24]);
    for _ in 0..height {
        for _ in 0..width {
            out.extend_from_slice(&bgr);
        }
        out.resize(out.len() + row_bytes - width as usize * 3, 0);
    }
    out
}

/// The RGBA pixels [`solid_bmp`] decodes to.
pub fn solid_rgba(width: u32, height: u32, bgr: [u8; 3]) -> Vec<u8> {
    [bgr[2], bgr[1], bgr[0], 255].repeat((width * height) as usize)
}

pub const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

/// A `cells` x `cells` grid of quads split into triangles, with one shared normal.
pub fn grid_obj(cells: usize) -> String {
    let mut src = String::from("o grid\n");
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

pub fn entity(mesh: &str, position: [f32; 3]) -> String {
    format!(
        "#version 2\nposition {}, {}, {};\nmesh {mesh};\n",
        position[0], position[1], position[2]
    )
}

/// All three formats loaded from a single folder, without a watcher.
pub fn flat_config(root: &Path) -> CatalogConfig {
    CatalogConfig {
        data_root: root.to_path_buf(),
        folders: vec![
            FolderConfig::new(".", "bmp"),
            FolderConfig::new(".", "obj"),
            FolderConfig::new(".", "ent"),
        ],
        watch: false,
        ..CatalogConfig::default()
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
