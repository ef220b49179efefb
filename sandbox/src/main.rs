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

//! Headless sandbox: cold-loads a data folder into the catalog, then runs a
//! fixed number of frames, applying hot-reloads at the start of each one.

mod demo;

use anyhow::{Context, Result};
use clap::Parser;
use kiln_agents::{Catalog, CatalogConfig};
use kiln_core::collections::Array;
use kiln_core::gpu::GpuBufferId;
use kiln_core::math::Vec3;
use kiln_core::memory::{Allocator, ArenaAllocator, HEAP};
use kiln_infra::{DiskFileSource, HeadlessGpu};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sandbox")]
#[command(about = "Loads and hot-reloads a Kiln data folder without a window")]
struct Cli {
    /// Catalog configuration file.
    #[arg(long, default_value = "Catalog.toml")]
    config: PathBuf,
    /// Number of frames to run before exiting.
    #[arg(long, default_value_t = 600)]
    frames: u64,
    /// Target frame time in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Bytes available to each frame's scratch arena.
    #[arg(long, default_value_t = 64 * 1024)]
    frame_bytes: usize,
    /// Write a small demo data set under the data root first.
    #[arg(long)]
    seed_demo: bool,
}

/// One entity ready to be drawn this frame.
#[derive(Debug, Clone, Copy)]
struct DrawItem {
    vertex_buffer: GpuBufferId,
    index_buffer: GpuBufferId,
    index_count: usize,
    /// World-space position of the mesh's local +X axis tip.
    probe: Vec3,
}

fn build_draw_list<'a>(
    catalog: &Catalog,
    arena: &'a ArenaAllocator,
) -> Result<Array<'a, DrawItem, ArenaAllocator>> {
    let mut items = Array::with_capacity_in(catalog.entities().len(), arena)
        .context("Frame arena too small for the draw list")?;
    for entity in catalog.entities() {
        let index_count = catalog
            .meshes()
            .get(entity.mesh.index())
            .map_or(0, |mesh| mesh.data.indices.len());
        let data = &entity.data;
        let probe = data.position + data.rotation * Vec3::new(data.scale.x, 0.0, 0.0);
        items
            .try_push(DrawItem {
                vertex_buffer: entity.vertex_buffer,
                index_buffer: entity.index_buffer,
                index_count,
                probe,
            })
            .context("Frame arena exhausted")?;
    }
    Ok(items)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("notify", log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    let config = CatalogConfig::load(&cli.config)
        .with_context(|| format!("Failed to load '{}'", cli.config.display()))?;
    if cli.seed_demo {
        demo::seed(&config.data_root)?;
    }

    let gpu = Arc::new(HeadlessGpu::new());
    let mut catalog = Catalog::init(config, Arc::new(DiskFileSource), gpu.clone())
        .context("Failed to start the asset catalog")?;
    log::info!(
        "Catalog ready: {} assets, watching: {}",
        catalog.asset_count(),
        catalog.is_watching()
    );

    let mut frame_arena = ArenaAllocator::new(cli.frame_bytes);
    let frame_time = Duration::from_millis(cli.frame_ms);

    for frame in 0..cli.frames {
        frame_arena.reset();

        let reloaded = catalog.drain();
        if reloaded > 0 {
            log::info!("Frame {frame}: applied {reloaded} change(s)");
        }

        let draw_list = build_draw_list(&catalog, &frame_arena)?;
        for item in draw_list.iter() {
            log::trace!(
                "Frame {frame}: draw {:?}/{:?} ({} indices), +X tip at ({:.2}, {:.2}, {:.2})",
                item.vertex_buffer,
                item.index_buffer,
                item.index_count,
                item.probe.x,
                item.probe.y,
                item.probe.z
            );
        }
        drop(draw_list);

        thread::sleep(frame_time);
    }

    let heap = HEAP.stats();
    log::info!(
        "Done: {} textures, {} buffers, {} bytes on the GPU; catalog heap {} bytes (peak {})",
        gpu.live_textures(),
        gpu.live_buffers(),
        gpu.allocated_bytes(),
        heap.current_bytes,
        heap.peak_bytes
    );
    log::debug!("Frame arena peak: {} bytes", frame_arena.stats().peak_bytes);

    catalog.shutdown();
    Ok(())
}
