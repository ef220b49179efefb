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

use kiln_core::memory::MemoryError;
use thiserror::Error;

/// An error produced while decoding asset content.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// The file does not start with the expected signature.
    #[error("bad magic number {found:#06x}, expected {expected:#06x}")]
    BadMagic {
        /// The signature the format requires.
        expected: u16,
        /// The signature found in the file.
        found: u16,
    },
    /// The info header is of a version that is not supported.
    #[error("unsupported header size {0} bytes")]
    UnsupportedHeader(u32),
    /// The pixel data uses a compression method that is not supported.
    #[error("unsupported compression method {0}")]
    UnsupportedCompression(u32),
    /// The pixel data uses a bit depth that is not supported.
    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u16),
    /// The image declares a zero or negative width, or a zero height.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: i32,
        /// Declared height.
        height: i32,
    },
    /// The file ends before the data its headers describe.
    #[error("file truncated: needed {needed} bytes, got {actual}")]
    Truncated {
        /// Bytes the headers require.
        needed: usize,
        /// Bytes actually present.
        actual: usize,
    },
    /// A text format could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line of the offending token.
        line: u32,
        /// What was expected or found.
        message: String,
    },
    /// A face carries a different normal/uv combination than the first face.
    #[error("line {line}: face attributes differ from the first face")]
    MixedFaceLayout {
        /// 1-based line of the offending face.
        line: u32,
    },
    /// A face does not have exactly three vertices.
    #[error("line {line}: only triangulated faces are supported, found {count} vertices")]
    NotTriangulated {
        /// 1-based line of the offending face.
        line: u32,
        /// Number of vertices the face lists.
        count: usize,
    },
    /// A face refers to an element that does not exist.
    #[error("line {line}: {kind} index {index} out of range (1..={count})")]
    IndexOutOfRange {
        /// 1-based line of the offending face.
        line: u32,
        /// Which element list the index refers to.
        kind: &'static str,
        /// The index as written.
        index: i64,
        /// Number of elements available.
        count: usize,
    },
    /// A required section is missing entirely.
    #[error("no {0} found")]
    Empty(&'static str),
    /// A text format is not valid UTF-8.
    #[error("file is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The scratch allocator ran out of space.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl DecodeError {
    pub(crate) fn parse(line: u32, message: impl Into<String>) -> Self {
        DecodeError::Parse {
            line,
            message: message.into(),
        }
    }
}
