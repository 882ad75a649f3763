// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM engine configuration
//!
//! Creates the Wasmtime engine the TapirMD module runs in. The module is a
//! classic core module with a single linear memory, so the engine is locked
//! down to exactly that.

use crate::errors::{BridgeError, BridgeResult};
use wasmtime::*;

/// Creates a Wasmtime engine for a classic core WASM module
///
/// **Always:**
/// - Disabled features: threads, multi-memory, memory64
/// - `epoch_interruption(false)` - no asynchronous interruption of calls
///
/// **With `fuel_metering`:**
/// - `consume_fuel(true)` - every call runs against a fuel budget set on the store
///
/// # Returns
/// * `Ok(Engine)` - Configured Wasmtime engine
/// * `Err(BridgeError::Instantiation)` - If engine creation fails
pub fn create_engine(fuel_metering: bool) -> BridgeResult<Engine> {
    let mut config = Config::new();

    config.wasm_threads(false); // No shared memories
    config.wasm_multi_memory(false); // Single memory instance only
    config.wasm_memory64(false); // 32-bit offsets, matching the i32 calling convention
    config.consume_fuel(fuel_metering);
    config.epoch_interruption(false);

    tracing::debug!(
        "Creating engine for classic WASM module (fuel metering: {})",
        fuel_metering
    );

    Engine::new(&config).map_err(|e| BridgeError::Instantiation(format!("engine: {:#}", e)))
}
