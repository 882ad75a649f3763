// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandbox host for the TapirMD WASM module.
//!
//! Layers, leaf first:
//! * `memory` - the module's linear memory and the length-prefixed buffer protocol
//! * `gateway` - calling an export and decoding its `i32` return value
//! * `diagnostics` - the `env.print` import and its sinks
//! * `loader` / `detector` / `engine` - getting a module image into Wasmtime
//! * `module_host` - owning engine, store, instance and memory for one module

pub mod detector;
pub mod diagnostics;
pub mod engine;
pub mod gateway;
pub mod loader;
pub mod memory;
pub mod module_host;

pub use diagnostics::{
    write_diagnostic, CollectingSink, DiagnosticSink, SilentSink, StdoutSink, TracingSink,
};
pub use gateway::{CallGateway, Export};
pub use loader::{load_wasm_bytes, ModuleImage};
pub use memory::SharedMemory;
pub use module_host::{HostSettings, HostState, ModuleHost};
