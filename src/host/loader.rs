// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module image loading
//!
//! A [`ModuleImage`] holds the raw bytes of the TapirMD module. It comes either
//! from the image compiled into the binary by `build.rs` or from a file on
//! disk. This module does not parse the bytes; that is the detector's job.

use crate::errors::{BridgeError, BridgeResult};
use crate::observability::messages::module::{ModuleLoadFailed, ModuleLoaded};
use std::borrow::Cow;
use std::path::Path;

const MAX_WASM_SIZE: usize = 16 * 1024 * 1024;

/// Origin reported for the image compiled into the binary.
pub const EMBEDDED_ORIGIN: &str = "<embedded tmd.wasm>";

#[cfg(tmd_embedded)]
static EMBEDDED_IMAGE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/tmd.wasm"));

/// The bytes of a TapirMD module plus where they came from.
#[derive(Debug, Clone)]
pub struct ModuleImage {
    bytes: Cow<'static, [u8]>,
    origin: String,
}

impl ModuleImage {
    /// The image compiled into this binary, if the build found one.
    pub fn embedded() -> Option<Self> {
        #[cfg(tmd_embedded)]
        {
            Some(Self {
                bytes: Cow::Borrowed(EMBEDDED_IMAGE),
                origin: EMBEDDED_ORIGIN.to_string(),
            })
        }
        #[cfg(not(tmd_embedded))]
        {
            None
        }
    }

    /// Load an image from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let bytes = load_wasm_bytes(path)?;
        Ok(Self {
            bytes: Cow::Owned(bytes),
            origin: path.display().to_string(),
        })
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, origin: impl Into<String>) -> Self {
        Self {
            bytes: Cow::Owned(bytes.into()),
            origin: origin.into(),
        }
    }

    /// Pick the first explicit path, falling back to the embedded image.
    ///
    /// Candidates are tried in order; the first `Some` wins even if loading it
    /// fails, so a mistyped path is reported instead of silently replaced.
    pub fn resolve(candidates: &[Option<&Path>]) -> BridgeResult<Self> {
        if let Some(path) = candidates.iter().flatten().next() {
            return Self::from_file(path);
        }
        Self::embedded().ok_or_else(|| {
            BridgeError::Instantiation(
                "no module image: pass a module path or build with TMD_WASM set".to_string(),
            )
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read a module image from disk.
///
/// Only the size is checked here (at most 16 MiB); whether the bytes are a
/// usable core module is decided when the host opens it. Failures are logged
/// with the path before being returned.
pub fn load_wasm_bytes<P: AsRef<Path>>(path: P) -> BridgeResult<Vec<u8>> {
    let path = path.as_ref();
    let module_path = path.display().to_string();

    let result = std::fs::read(path)
        .map_err(BridgeError::IoError)
        .and_then(|bytes| match bytes.len() {
            size if size > MAX_WASM_SIZE => Err(BridgeError::ValidationError(format!(
                "module image is {} bytes, limit is {} bytes",
                size, MAX_WASM_SIZE
            ))),
            _ => Ok(bytes),
        });

    match &result {
        Ok(bytes) => tracing::info!(
            "{}",
            ModuleLoaded {
                module_path: &module_path,
                size_bytes: bytes.len(),
            }
        ),
        Err(error) => tracing::error!(
            "{}",
            ModuleLoadFailed {
                module_path: &module_path,
                error,
            }
        ),
    }
    result
}
