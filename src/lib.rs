// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bridge;        // staging, render and reformat
pub mod commands;      // gen / fmt batches
pub mod config;        // config file loading
pub mod errors;        // error handling
pub mod host;          // wasmtime sandbox, memory and exports
pub mod observability;
