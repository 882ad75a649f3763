// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for module loading and sandbox lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Module image loading and validation
//! * Instantiation of the sandbox and binding of exports
//! * Closing the sandbox
//! * Memory desynchronization detected by the `env.print` import

use std::fmt::{Display, Formatter};

/// Module image loaded from disk.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tmd_bridge::observability::messages::module::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module_path: "assets/tmd.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module_path: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded WASM module: {} ({} bytes)",
            self.module_path, self.size_bytes
        )
    }
}

/// Module image loading failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use tmd_bridge::observability::messages::module::ModuleLoadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// let msg = ModuleLoadFailed {
///     module_path: "assets/missing.wasm",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ModuleLoadFailed<'a> {
    pub module_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load WASM module '{}': {}",
            self.module_path, self.error
        )
    }
}

/// Sandbox created and module instantiated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tmd_bridge::observability::messages::module::ModuleInstantiated;
///
/// let msg = ModuleInstantiated {
///     origin: "assets/tmd.wasm",
///     image_size: 180_000,
///     memory_size: 1_114_112,
///     fuel: None,
/// };
///
/// assert!(msg.to_string().contains("fuel=unmetered"));
/// ```
pub struct ModuleInstantiated<'a> {
    pub origin: &'a str,
    pub image_size: usize,
    pub memory_size: usize,
    pub fuel: Option<u64>,
}

impl Display for ModuleInstantiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Instantiated WASM module '{}': image={} bytes, memory={} bytes, fuel=",
            self.origin, self.image_size, self.memory_size
        )?;
        match self.fuel {
            Some(fuel) => write!(f, "{}", fuel),
            None => write!(f, "unmetered"),
        }
    }
}

/// Sandbox creation failed; nothing was left open.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InstantiationFailed<'a> {
    pub origin: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for InstantiationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to instantiate WASM module '{}': {}",
            self.origin, self.error
        )
    }
}

/// An expected export is missing or has the wrong signature.
///
/// # Log Level
/// `warn!` - Calls to this export will fail
pub struct ExportUnavailable<'a> {
    pub export: &'a str,
    pub reason: &'a str,
}

impl Display for ExportUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Export '{}' cannot be called: {}", self.export, self.reason)
    }
}

/// Sandbox resources released.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModuleClosed<'a> {
    pub origin: &'a str,
}

impl Display for ModuleClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Closed WASM module '{}'", self.origin)
    }
}

/// The module asked the host to read memory that does not exist.
///
/// `span` is 1 or 2 for the first or second span of `env.print`, and 0 when
/// the module has no exported memory at all.
///
/// # Log Level
/// `error!` - Logged right before the process aborts
///
/// # Example
/// ```
/// use tmd_bridge::observability::messages::module::MemoryDesync;
///
/// let msg = MemoryDesync {
///     span: 2,
///     offset: 70_000,
///     length: 16,
///     memory_size: 65_536,
/// };
///
/// assert!(msg.to_string().contains("span 2"));
/// ```
pub struct MemoryDesync {
    pub span: u8,
    pub offset: u32,
    pub length: u32,
    pub memory_size: usize,
}

impl Display for MemoryDesync {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.span == 0 {
            return write!(
                f,
                "env.print called by a module without exported memory; aborting"
            );
        }
        write!(
            f,
            "env.print span {} out of range: offset={} length={} memory={} bytes; aborting",
            self.span, self.offset, self.length, self.memory_size
        )
    }
}
