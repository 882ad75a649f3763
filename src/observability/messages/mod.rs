// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements the `Display` trait so log text lives in one
//! place instead of being scattered through format strings.
//!
//! # Organization
//!
//! * `module` - Module loading and sandbox lifecycle events
//! * `bridge` - Staging, export calls and results
//! * `commands` - Batch processing in the `gen` and `fmt` commands
//!
//! # Usage Pattern
//!
//! ```rust
//! use tmd_bridge::observability::messages::module::ModuleClosed;
//!
//! let msg = ModuleClosed {
//!     origin: "assets/tmd.wasm",
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod bridge;
pub mod commands;
pub mod module;
