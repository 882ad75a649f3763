// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The `env.print` host import and the sinks its messages go to.
//!
//! The module calls `print(offset1, length1, offset2, length2, value)` to emit
//! a diagnostic line made of two memory spans followed by an integer. Message
//! flow is one-directional: the host hands the raw spans to a
//! [`DiagnosticSink`], nothing is returned to the module.
//!
//! A span outside linear memory means the host and module disagree about the
//! memory layout. Continuing would mean trusting memory that may already be
//! corrupt, so the process is aborted.

use crate::host::memory::read_span;
use crate::host::module_host::HostState;
use crate::observability::messages::module::MemoryDesync;
use std::io::Write;
use std::sync::{Arc, Mutex};
use wasmtime::{Caller, Extern, Linker};

/// Import module name the TapirMD module links `print` from.
pub const PRINT_MODULE: &str = "env";
/// Import name of the diagnostic callback.
pub const PRINT_FUNCTION: &str = "print";

/// Receives diagnostic lines printed by the module.
///
/// A line is the first span, the second span, then `value` in decimal. The
/// spans are raw module bytes and need not be valid UTF-8.
pub trait DiagnosticSink: Send {
    fn emit(&mut self, first: &[u8], second: &[u8], value: i32);
}

/// Writes each line to standard output, spans byte for byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn emit(&mut self, first: &[u8], second: &[u8], value: i32) {
        let mut stdout = std::io::stdout().lock();
        // a closed stdout must not take the module call down with it
        let _ = write_diagnostic(&mut stdout, first, second, value);
    }
}

/// Emits each line as a `tracing` event under the `tmd::module` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, first: &[u8], second: &[u8], value: i32) {
        tracing::info!(target: "tmd::module", "{}", format_diagnostic(first, second, value));
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn emit(&mut self, _first: &[u8], _second: &[u8], _value: i32) {}
}

/// Keeps every line in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines received so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&mut self, first: &[u8], second: &[u8], value: i32) {
        let line = format_diagnostic(first, second, value);
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

/// Write one line as raw bytes: both spans, the integer, a newline.
pub fn write_diagnostic<W: Write>(
    out: &mut W,
    first: &[u8],
    second: &[u8],
    value: i32,
) -> std::io::Result<()> {
    out.write_all(first)?;
    out.write_all(second)?;
    writeln!(out, "{}", value)
}

/// Text form of one line for sinks that need a `String`; invalid UTF-8 is
/// replaced.
pub fn format_diagnostic(first: &[u8], second: &[u8], value: i32) -> String {
    format!(
        "{}{}{}",
        String::from_utf8_lossy(first),
        String::from_utf8_lossy(second),
        value
    )
}

/// Register `env.print` with the linker.
pub(crate) fn register_print(linker: &mut Linker<HostState>) -> wasmtime::Result<()> {
    linker.func_wrap(
        PRINT_MODULE,
        PRINT_FUNCTION,
        |mut caller: Caller<'_, HostState>,
         offset: u32,
         length: u32,
         offset2: u32,
         length2: u32,
         value: i32| {
            let memory = match caller.get_export("memory") {
                Some(Extern::Memory(memory)) => memory,
                _ => abort_on_desync(MemoryDesync {
                    span: 0,
                    offset,
                    length,
                    memory_size: 0,
                }),
            };

            let (data, state) = memory.data_and_store_mut(&mut caller);
            let first = match read_span(data, offset, length) {
                Some(span) => span,
                None => abort_on_desync(MemoryDesync {
                    span: 1,
                    offset,
                    length,
                    memory_size: data.len(),
                }),
            };
            let second = match read_span(data, offset2, length2) {
                Some(span) => span,
                None => abort_on_desync(MemoryDesync {
                    span: 2,
                    offset: offset2,
                    length: length2,
                    memory_size: data.len(),
                }),
            };

            state.sink.emit(first, second, value);
        },
    )?;
    Ok(())
}

fn abort_on_desync(message: MemoryDesync) -> ! {
    tracing::error!("{}", message);
    eprintln!("{}", message);
    std::process::abort()
}
