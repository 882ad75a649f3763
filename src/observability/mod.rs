// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! This module provides centralized message types for diagnostic and
//! operational logging throughout the bridge. Message types follow a
//! struct-based pattern with a `Display` implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep log text consistent between call sites
//!
//! Subscriber setup lives in the `tmd` binary; the library only emits events.
//!
//! # Usage
//!
//! ```rust
//! use tmd_bridge::observability::messages::bridge::InputStaged;
//!
//! let msg = InputStaged {
//!     stage: 1,
//!     scratch_offset: 1024,
//!     input_size: 42,
//! };
//!
//! tracing::debug!("{}", msg);
//! ```

pub mod messages;
