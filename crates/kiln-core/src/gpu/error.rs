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

//! Defines the error type for GPU resource operations.

use thiserror::Error;

/// An error related to the creation or management of a GPU resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The handle does not refer to a live resource.
    #[error("Resource not found with ID {0}.")]
    NotFound(u64),
    /// The supplied data does not match the resource's size.
    #[error("Resource data size mismatch: expected {expected} bytes, got {actual}.")]
    SizeMismatch {
        /// Size the resource was created with.
        expected: usize,
        /// Size of the data supplied.
        actual: usize,
    },
    /// An error originating from the specific graphics backend implementation.
    #[error("Backend-specific resource error: {0}")]
    Backend(String),
}
