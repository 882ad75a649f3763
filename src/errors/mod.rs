// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod bridge;
mod command;
mod config;

pub use bridge::{BridgeError, BridgeResult, WASM_UNSUPPORTED_ENCODING};
pub use command::CommandError;
pub use config::ConfigError;
