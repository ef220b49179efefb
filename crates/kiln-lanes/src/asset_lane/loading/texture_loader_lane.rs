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

//! Texture decoding: uncompressed 24-bit Windows bitmaps.

use crate::asset_lane::{AssetLoaderLane, DecodeError};
use bytemuck::{Pod, Zeroable};
use kiln_core::asset::CpuTexture;
use kiln_core::gpu::TextureFormat;
use std::mem::size_of;

/// "BM" read as a little-endian `u16`.
const BMP_MAGIC: u16 = 0x4D42;
/// Size of the version 3 (`BITMAPINFOHEADER`) info header.
const INFO_HEADER_V3: u32 = 40;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
struct BitmapFileHeader {
    kind: u16,
    size: u32,
    reserved0: u16,
    reserved1: u16,
    offset: u32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct BitmapInfoHeader {
    header_size: u32,
    width: i32,
    height: i32,
    planes: u16,
    bpp: u16,
    compression: u32,
    image_size: u32,
    res_horiz: i32,
    res_vert: i32,
    colors_used: u32,
    colors_important: u32,
}

/// A lane dedicated to decoding BMP files into RGBA8 textures on the CPU.
///
/// Only version 3 info headers with uncompressed 24 bits-per-pixel data are
/// accepted. The output is always four bytes per pixel with full opacity,
/// stored top row first regardless of the file's row order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BmpLoaderLane;

fn read_header<T: Pod>(bytes: &[u8], at: usize) -> Result<T, DecodeError> {
    let end = at + size_of::<T>();
    bytes
        .get(at..end)
        .map(bytemuck::pod_read_unaligned)
        .ok_or(DecodeError::Truncated {
            needed: end,
            actual: bytes.len(),
        })
}

impl AssetLoaderLane<CpuTexture> for BmpLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<CpuTexture, DecodeError> {
        let file: BitmapFileHeader = read_header(bytes, 0)?;
        let magic = file.kind;
        if magic != BMP_MAGIC {
            return Err(DecodeError::BadMagic {
                expected: BMP_MAGIC,
                found: magic,
            });
        }

        let info: BitmapInfoHeader = read_header(bytes, size_of::<BitmapFileHeader>())?;
        if info.header_size != INFO_HEADER_V3 {
            return Err(DecodeError::UnsupportedHeader(info.header_size));
        }
        if info.compression != 0 {
            return Err(DecodeError::UnsupportedCompression(info.compression));
        }

        let colors_used = match info.colors_used {
            0 if info.bpp < 16 => 1u32 << info.bpp,
            n => n,
        };
        let colors_important = match info.colors_important {
            0 => colors_used,
            n => n,
        };
        log::trace!("BMP palette: {colors_used} colors, {colors_important} important");

        // 24-bit bitmaps carry no palette.
        if info.bpp != 24 {
            return Err(DecodeError::UnsupportedBitDepth(info.bpp));
        }

        let (width, raw_height) = (info.width, info.height);
        if width <= 0 || raw_height == 0 || raw_height == i32::MIN {
            return Err(DecodeError::InvalidDimensions {
                width,
                height: raw_height,
            });
        }
        let bottom_up = raw_height > 0;
        let width = width as usize;
        let height = raw_height.unsigned_abs() as usize;

        // Source rows are padded to a multiple of four bytes.
        let src_row = (width * 3 + 3) & !3;
        let data_start = file.offset as usize;
        let needed = data_start + src_row * height;
        if bytes.len() < needed {
            return Err(DecodeError::Truncated {
                needed,
                actual: bytes.len(),
            });
        }

        let format = TextureFormat::Rgba8Unorm;
        let dst_row = width * format.bytes_per_pixel();
        let mut pixels = Vec::with_capacity(dst_row * height);
        for row in bytes[data_start..needed].chunks_exact(src_row) {
            for bgr in row[..width * 3].chunks_exact(3) {
                pixels.extend_from_slice(&[bgr[2], bgr[1], bgr[0], 255]);
            }
        }

        if bottom_up {
            flip_rows(&mut pixels, dst_row);
        }

        log::debug!(
            "Decoded BMP {}x{} ({})",
            width,
            height,
            if bottom_up { "bottom-up" } else { "top-down" }
        );

        Ok(CpuTexture {
            width: width as u32,
            height: height as u32,
            format,
            pixels,
        })
    }
}

/// Mirrors an image vertically in place.
fn flip_rows(pixels: &mut [u8], row_bytes: usize) {
    let rows = pixels.len() / row_bytes;
    for top in 0..rows / 2 {
        let bottom = rows - 1 - top;
        let (upper, lower) = pixels.split_at_mut(bottom * row_bytes);
        upper[top * row_bytes..(top + 1) * row_bytes].swap_with_slice(&mut lower[..row_bytes]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a 24-bit BMP from rows given top row first, as BGR triples.
    fn bmp(width: i32, rows_top_first: &[&[[u8; 3]]], top_down: bool) -> Vec<u8> {
        let height = rows_top_first.len() as i32;
        let row_bytes = ((width as usize * 3) + 3) & !3;
        let offset = 14 + 40;
        let size = offset + row_bytes * height as usize;

        let mut out = Vec::with_capacity(size);
        out.extend_from_slice(&BMP_MAGIC.to_le_bytes());
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(offset as u32).to_le_bytes());

        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        let h = if top_down { -height } else { height };
        out.extend_from_slice(&h.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        out.extend_from_slice(&[0; 24]);

        let mut emit = |row: &[[u8; 3]]| {
            for px in row {
                out.extend_from_slice(px);
            }
            out.resize(out.len() + row_bytes - row.len() * 3, 0);
        };
        if top_down {
            rows_top_first.iter().for_each(|r| emit(*r));
        } else {
            rows_top_first.iter().rev().for_each(|r| emit(*r));
        }
        out
    }

    const RED: [u8; 3] = [0, 0, 255];
    const GREEN: [u8; 3] = [0, 255, 0];
    const BLUE: [u8; 3] = [255, 0, 0];
    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn bottom_up_2x2_decodes_top_row_first() {
        let bytes = bmp(2, &[&[RED, GREEN], &[BLUE, WHITE]], false);
        let texture = BmpLoaderLane.load(&bytes).unwrap();

        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(
            texture.pixels,
            vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 255,
            ]
        );
        assert!(texture.pixels.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn top_down_rows_are_not_flipped() {
        let bytes = bmp(2, &[&[RED, GREEN], &[BLUE, WHITE]], true);
        let texture = BmpLoaderLane.load(&bytes).unwrap();
        assert_eq!(texture.pixel(0, 0), Some(&[255, 0, 0, 255][..]));
        assert_eq!(texture.pixel(1, 1), Some(&[255, 255, 255, 255][..]));
    }

    #[test]
    fn odd_widths_skip_row_padding() {
        let bytes = bmp(3, &[&[RED, GREEN, BLUE], &[WHITE, WHITE, RED]], false);
        let texture = BmpLoaderLane.load(&bytes).unwrap();
        assert_eq!(texture.pixel(2, 0), Some(&[0, 0, 255, 255][..]));
        assert_eq!(texture.pixel(2, 1), Some(&[255, 0, 0, 255][..]));
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = bmp(1, &[&[RED]], false);
        bytes[0] = b'X';
        assert!(matches!(
            BmpLoaderLane.load(&bytes),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn rejects_other_header_versions_and_depths() {
        let mut v5 = bmp(1, &[&[RED]], false);
        v5[14..18].copy_from_slice(&124u32.to_le_bytes());
        assert_eq!(
            BmpLoaderLane.load(&v5),
            Err(DecodeError::UnsupportedHeader(124))
        );

        let mut rle = bmp(1, &[&[RED]], false);
        rle[30..34].copy_from_slice(&1u32.to_le_bytes());
        assert_eq!(
            BmpLoaderLane.load(&rle),
            Err(DecodeError::UnsupportedCompression(1))
        );

        let mut paletted = bmp(1, &[&[RED]], false);
        paletted[28..30].copy_from_slice(&8u16.to_le_bytes());
        assert_eq!(
            BmpLoaderLane.load(&paletted),
            Err(DecodeError::UnsupportedBitDepth(8))
        );
    }

    #[test]
    fn rejects_truncated_pixel_data() {
        let bytes = bmp(2, &[&[RED, GREEN], &[BLUE, WHITE]], false);
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(
            BmpLoaderLane.load(cut),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(
            BmpLoaderLane.load(&bytes[..10]),
            Err(DecodeError::Truncated { needed: 14, .. })
        ));
    }
}
