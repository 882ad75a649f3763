// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Calling convention for the module's exported functions.
//!
//! Every export takes no arguments and returns one `i32`:
//! * `r >= 0` - success, `r` is an offset into linear memory (or, for
//!   `buffer_offset`, the value itself)
//! * `r < 0` - failure, a NUL-terminated error message starts at `-r - 1`

use crate::errors::{BridgeError, BridgeResult};
use crate::host::memory::{read_nul_terminated, SharedMemory};
use wasmtime::{Instance, Store, TypedFunc};

/// The exported functions the bridge relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Export {
    LibVersion,
    BufferOffset,
    TmdToHtml,
    TmdFormat,
}

impl Export {
    pub const ALL: [Export; 4] = [
        Export::LibVersion,
        Export::BufferOffset,
        Export::TmdToHtml,
        Export::TmdFormat,
    ];

    /// Export name in the module.
    pub fn name(self) -> &'static str {
        match self {
            Export::LibVersion => "lib_version",
            Export::BufferOffset => "buffer_offset",
            Export::TmdToHtml => "tmd_to_html",
            Export::TmdFormat => "tmd_format",
        }
    }
}

/// One exported `() -> i32` function bound to an instance.
///
/// Binding never fails: an export that is missing or has the wrong signature
/// is remembered and reported as a call error when it is actually used, so a
/// module that lacks an export the caller never needs still works.
pub struct CallGateway {
    export: Export,
    func: Result<TypedFunc<(), i32>, String>,
}

impl CallGateway {
    pub(crate) fn bind<T: 'static>(store: &mut Store<T>, instance: &Instance, export: Export) -> Self {
        let func = instance
            .get_typed_func::<(), i32>(&mut *store, export.name())
            .map_err(|e| format!("export unavailable: {:#}", e));
        Self { export, func }
    }

    pub fn export(&self) -> Export {
        self.export
    }

    /// Reason the export could not be bound, if it could not.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.func.as_ref().err().map(String::as_str)
    }

    /// Call the export and decode its return value.
    ///
    /// Error messages are read from the memory as it is after the call, so
    /// growth during the call is taken into account.
    pub fn call<T: 'static>(
        &self,
        store: &mut Store<T>,
        memory: &SharedMemory,
    ) -> BridgeResult<u32> {
        let name = self.export.name();
        let func = self
            .func
            .as_ref()
            .map_err(|reason| BridgeError::call(name, reason.clone()))?;

        let ret = func
            .call(&mut *store, ())
            .map_err(|e| BridgeError::call(name, format!("{:#}", e)))?;

        decode_return(name, ret, memory.data(store))
    }
}

/// Interpret an export's return value against the current memory contents.
pub fn decode_return(function: &'static str, ret: i32, memory: &[u8]) -> BridgeResult<u32> {
    if ret >= 0 {
        return Ok(ret as u32);
    }

    // i64 so that i32::MIN maps to offset 2^31 - 1 instead of overflowing
    let offset = (-(ret as i64) - 1) as u32;
    let message = read_nul_terminated(memory, offset)?;
    Err(BridgeError::call(
        function,
        String::from_utf8_lossy(message).into_owned(),
    ))
}
