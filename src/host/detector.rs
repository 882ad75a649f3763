// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module image format check.
//!
//! The bridge only talks to classic core modules: the calling convention
//! needs an exported linear memory and plain `() -> i32` exports. A component
//! model binary is turned away here with a clear message, before Wasmtime
//! would fail to compile it as a core module.

use crate::errors::{BridgeError, BridgeResult, WASM_UNSUPPORTED_ENCODING};

use wasmparser::{Encoding, Parser, Payload};

/// Checks that `bytes` hold a core WASM module.
///
/// Only the header is inspected; the first payload settles the question.
///
/// # Errors
/// * `InvalidWasmBinary` / `ParserError` - empty, truncated or not WASM at all
/// * `UnsupportedEncoding` - a Component Model binary
pub fn validate_core_module(bytes: &[u8]) -> BridgeResult<()> {
    let first = Parser::new(0).parse_all(bytes).next().transpose()?;

    match first {
        Some(Payload::Version {
            encoding: Encoding::Module,
            ..
        }) => Ok(()),
        Some(Payload::Version {
            encoding: Encoding::Component,
            ..
        }) => Err(BridgeError::UnsupportedEncoding(
            WASM_UNSUPPORTED_ENCODING.to_string(),
        )),
        _ => Err(BridgeError::InvalidWasmBinary(
            "missing WASM header".to_string(),
        )),
    }
}
