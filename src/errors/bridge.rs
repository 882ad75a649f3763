// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for module bridge operations.
//!
//! Every fallible bridge operation returns a [`BridgeError`]. The variants map
//! onto the failure policy of the bridge: instantiation failures are fatal to
//! the caller, everything else leaves the instance usable.

use thiserror::Error;

/// Error message for component-model binaries handed to the bridge.
///
/// The TapirMD module is a classic core WASM module with C-style exports;
/// components cannot provide the shared linear memory the protocol relies on.
pub const WASM_UNSUPPORTED_ENCODING: &str = "Unsupported WASM binary: Component Model binaries \
are not supported. The bridge requires a classic core WASM module exporting 'memory'.";

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Engine creation, host function registration, compilation or
    /// instantiation failed. No instance was created.
    #[error("Instantiation failed: {0}")]
    Instantiation(String),

    /// The module reported a failure through a negative return value, or the
    /// call itself trapped.
    #[error("{function} error: {message}")]
    Call {
        function: &'static str,
        message: String,
    },

    /// A protocol read or write addressed bytes outside the current memory.
    #[error("Memory access out of bounds: {operation} at offset {offset} (+{length} bytes), memory size {memory_size}")]
    MemoryBounds {
        operation: &'static str,
        offset: u64,
        length: u64,
        memory_size: usize,
    },

    /// A staged input handle was used after a newer input replaced it.
    #[error("Staged input is stale: staged as generation {staged}, current generation is {current}")]
    StaleInput { staged: u64, current: u64 },

    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Unsupported WASM encoding (component model).
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Module image validation error (size limits and the like).
    #[error("Invalid module image: {0}")]
    ValidationError(String),

    /// File I/O error while loading a module image.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),
}

impl BridgeError {
    pub(crate) fn call(function: &'static str, message: impl Into<String>) -> Self {
        Self::Call {
            function,
            message: message.into(),
        }
    }

    pub(crate) fn bounds(
        operation: &'static str,
        offset: u64,
        length: u64,
        memory_size: usize,
    ) -> Self {
        Self::MemoryBounds {
            operation,
            offset,
            length,
            memory_size,
        }
    }

    /// True for errors after which the instance must not be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Instantiation(_))
    }
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
