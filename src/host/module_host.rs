// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandbox lifetime: engine, store, instance and memory of one module.
//!
//! [`ModuleHost::open`] either returns a fully usable host or an error; every
//! resource created before a failure is a local that is dropped on the way out,
//! so no half-open instance is ever observable. [`ModuleHost::close`] consumes
//! the host, and `Drop` releases the same resources when a caller never gets
//! around to closing.

use crate::errors::{BridgeError, BridgeResult};
use crate::host::detector::validate_core_module;
use crate::host::diagnostics::{register_print, DiagnosticSink, StdoutSink};
use crate::host::engine::create_engine;
use crate::host::gateway::{CallGateway, Export};
use crate::host::loader::ModuleImage;
use crate::host::memory::SharedMemory;
use crate::observability::messages::module::{
    ExportUnavailable, InstantiationFailed, ModuleClosed, ModuleInstantiated,
};
use wasmtime::{Linker, Module, Store};

/// Data owned by the store and reachable from host imports.
pub struct HostState {
    pub(crate) sink: Box<dyn DiagnosticSink>,
}

/// Options for opening a module host.
pub struct HostSettings {
    /// Fuel granted to each exported call; `None` disables metering.
    pub fuel: Option<u64>,
    /// Destination of messages the module prints.
    pub sink: Box<dyn DiagnosticSink>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            fuel: None,
            sink: Box::new(StdoutSink),
        }
    }
}

impl HostSettings {
    pub fn with_fuel(mut self, fuel: Option<u64>) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }
}

/// One live sandbox: the module instance and its linear memory.
pub struct ModuleHost {
    store: Store<HostState>,
    memory: SharedMemory,
    gateways: [CallGateway; 4],
    fuel: Option<u64>,
    origin: String,
}

impl ModuleHost {
    /// Create the runtime, register `env.print`, instantiate the module.
    pub fn open(image: &ModuleImage, settings: HostSettings) -> BridgeResult<Self> {
        Self::instantiate(image, settings).map_err(|error| {
            tracing::error!(
                "{}",
                InstantiationFailed {
                    origin: image.origin(),
                    error: &error,
                }
            );
            match error {
                BridgeError::Instantiation(_) => error,
                other => BridgeError::Instantiation(other.to_string()),
            }
        })
    }

    fn instantiate(image: &ModuleImage, settings: HostSettings) -> BridgeResult<Self> {
        validate_core_module(image.bytes())?;

        let engine = create_engine(settings.fuel.is_some())?;
        let module = Module::new(&engine, image.bytes())
            .map_err(|e| BridgeError::Instantiation(format!("compile: {:#}", e)))?;

        let mut linker = Linker::new(&engine);
        register_print(&mut linker).map_err(|e| {
            BridgeError::Instantiation(format!("register host function: {:#}", e))
        })?;

        let mut store = Store::new(
            &engine,
            HostState {
                sink: settings.sink,
            },
        );
        // the start function, if any, runs under the same budget as a call
        if let Some(fuel) = settings.fuel {
            store
                .set_fuel(fuel)
                .map_err(|e| BridgeError::Instantiation(format!("fuel: {:#}", e)))?;
        }

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| BridgeError::Instantiation(format!("instantiate: {:#}", e)))?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .map(SharedMemory::new)
            .ok_or_else(|| {
                BridgeError::Instantiation("module must export 'memory'".to_string())
            })?;

        let gateways = Export::ALL.map(|export| CallGateway::bind(&mut store, &instance, export));
        for gateway in &gateways {
            if let Some(reason) = gateway.unavailable_reason() {
                tracing::warn!(
                    "{}",
                    ExportUnavailable {
                        export: gateway.export().name(),
                        reason,
                    }
                );
            }
        }

        tracing::info!(
            "{}",
            ModuleInstantiated {
                origin: image.origin(),
                image_size: image.len(),
                memory_size: memory.size(&store),
                fuel: settings.fuel,
            }
        );

        Ok(Self {
            store,
            memory,
            gateways,
            fuel: settings.fuel,
            origin: image.origin().to_string(),
        })
    }

    /// Release the runtime, module and memory.
    pub fn close(self) {
        // resources are released by Drop
    }

    /// Call an export and decode its return value into an offset.
    pub fn call(&mut self, export: Export) -> BridgeResult<u32> {
        if let Some(fuel) = self.fuel {
            self.store
                .set_fuel(fuel)
                .map_err(|e| BridgeError::call(export.name(), format!("{:#}", e)))?;
        }
        self.gateways[export as usize].call(&mut self.store, &self.memory)
    }

    /// Write a length-prefixed buffer at `offset`.
    pub fn write_buffer(&mut self, offset: u32, bytes: &[u8]) -> BridgeResult<()> {
        self.memory.write_buffer(&mut self.store, offset, bytes)
    }

    /// Read the length-prefixed buffer at `offset`; `None` for zero length.
    pub fn read_buffer(&self, offset: u32) -> BridgeResult<Option<&[u8]>> {
        self.memory.read_buffer(&self.store, offset)
    }

    /// Read the NUL-terminated string at `offset`.
    pub fn read_c_string(&self, offset: u32) -> BridgeResult<&[u8]> {
        self.memory.read_c_string(&self.store, offset)
    }

    pub fn memory_size(&self) -> usize {
        self.memory.size(&self.store)
    }

    /// Fuel left after the last call, when metering is enabled.
    pub fn remaining_fuel(&self) -> Option<u64> {
        self.fuel.and_then(|_| self.store.get_fuel().ok())
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl Drop for ModuleHost {
    fn drop(&mut self) {
        tracing::info!(
            "{}",
            ModuleClosed {
                origin: &self.origin,
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::diagnostics::CollectingSink;

    fn image(wat_source: &str) -> ModuleImage {
        ModuleImage::from_bytes(wat::parse_str(wat_source).unwrap(), "inline.wat")
    }

    fn silent() -> HostSettings {
        HostSettings::default().with_sink(crate::host::diagnostics::SilentSink)
    }

    #[test]
    fn open_requires_exported_memory() {
        let result = ModuleHost::open(&image("(module)"), silent());
        match result {
            Err(BridgeError::Instantiation(msg)) => assert!(msg.contains("memory")),
            Err(other) => panic!("Expected Instantiation error, got {:?}", other),
            Ok(_) => panic!("Expected Instantiation error"),
        }
    }

    #[test]
    fn open_rejects_garbage_as_instantiation_error() {
        let garbage = ModuleImage::from_bytes(b"not wasm".to_vec(), "garbage");
        let result = ModuleHost::open(&garbage, silent());
        assert!(matches!(result, Err(BridgeError::Instantiation(_))));
    }

    #[test]
    fn open_rejects_unresolvable_imports() {
        let source = r#"
            (module
                (import "env" "missing" (func))
                (memory (export "memory") 1))
        "#;
        let result = ModuleHost::open(&image(source), silent());
        match result {
            Err(err) => {
                assert!(err.is_fatal());
                assert!(err.to_string().contains("instantiate"));
            }
            Ok(_) => panic!("Expected unresolved import to fail"),
        }
    }

    #[test]
    fn missing_export_is_call_error() {
        let mut host = ModuleHost::open(&image(r#"(module (memory (export "memory") 1))"#), silent())
            .unwrap();
        match host.call(Export::TmdToHtml) {
            Err(BridgeError::Call { function, message }) => {
                assert_eq!(function, "tmd_to_html");
                assert!(message.contains("export unavailable"));
            }
            other => panic!("Expected Call error, got {:?}", other),
        }
        host.close();
    }

    #[test]
    fn wrong_signature_is_call_error() {
        let source = r#"
            (module
                (memory (export "memory") 1)
                (func (export "buffer_offset") (param i32) (result i32) local.get 0))
        "#;
        let mut host = ModuleHost::open(&image(source), silent()).unwrap();
        assert!(matches!(
            host.call(Export::BufferOffset),
            Err(BridgeError::Call { function: "buffer_offset", .. })
        ));
    }

    #[test]
    fn trap_is_call_error_and_host_stays_usable() {
        let source = r#"
            (module
                (memory (export "memory") 1)
                (func (export "tmd_format") (result i32) unreachable)
                (func (export "buffer_offset") (result i32) i32.const 64))
        "#;
        let mut host = ModuleHost::open(&image(source), silent()).unwrap();
        assert!(matches!(
            host.call(Export::TmdFormat),
            Err(BridgeError::Call { function: "tmd_format", .. })
        ));
        assert_eq!(host.call(Export::BufferOffset).unwrap(), 64);
    }

    #[test]
    fn fuel_exhaustion_is_call_error_and_refuels() {
        let source = r#"
            (module
                (memory (export "memory") 1)
                (func (export "tmd_to_html") (result i32)
                    (loop $spin (br $spin))
                    i32.const 0)
                (func (export "buffer_offset") (result i32) i32.const 8))
        "#;
        let settings = silent().with_fuel(Some(1_000_000));
        let mut host = ModuleHost::open(&image(source), settings).unwrap();

        assert!(matches!(
            host.call(Export::TmdToHtml),
            Err(BridgeError::Call { function: "tmd_to_html", .. })
        ));
        // the next call gets a fresh budget
        assert_eq!(host.call(Export::BufferOffset).unwrap(), 8);
        assert!(host.remaining_fuel().unwrap() > 0);
    }

    #[test]
    fn print_reaches_sink() {
        let source = r#"
            (module
                (import "env" "print" (func $print (param i32 i32 i32 i32 i32)))
                (memory (export "memory") 1)
                (data (i32.const 16) "offset=")
                (func (export "buffer_offset") (result i32)
                    (call $print (i32.const 16) (i32.const 7) (i32.const 0) (i32.const 0) (i32.const 4096))
                    i32.const 4096))
        "#;
        let sink = CollectingSink::new();
        let settings = HostSettings::default().with_sink(sink.clone());
        let mut host = ModuleHost::open(&image(source), settings).unwrap();

        assert_eq!(host.call(Export::BufferOffset).unwrap(), 4096);
        assert_eq!(sink.lines(), vec!["offset=4096"]);
    }

    #[test]
    fn buffers_round_trip_through_memory() {
        let mut host =
            ModuleHost::open(&image(r#"(module (memory (export "memory") 1))"#), silent()).unwrap();
        host.write_buffer(100, b"hello").unwrap();
        assert_eq!(host.read_buffer(100).unwrap(), Some(&b"hello"[..]));

        let size = host.memory_size();
        assert_eq!(size, 65536);
        assert!(matches!(
            host.write_buffer(size as u32 - 2, b""),
            Err(BridgeError::MemoryBounds { .. })
        ));
    }
}
