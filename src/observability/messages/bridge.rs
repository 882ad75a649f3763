// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for bridge operations: staging, calls, results.

use std::fmt::{Display, Formatter};

/// Input document written to the scratch region.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct InputStaged {
    pub stage: u64,
    pub scratch_offset: u32,
    pub input_size: usize,
}

impl Display for InputStaged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Staged input #{} at offset {}: {} bytes",
            self.stage, self.scratch_offset, self.input_size
        )
    }
}

/// Export returned an output offset.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct CallCompleted<'a> {
    pub function: &'a str,
    pub secondary_size: usize,
    pub output_offset: u32,
}

impl Display for CallCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} returned offset {} (secondary payload {} bytes)",
            self.function, self.output_offset, self.secondary_size
        )
    }
}

/// Export failed, either through its error sentinel or a trap.
///
/// # Log Level
/// `debug!` - The error is returned to the caller, who decides how loud to be
pub struct CallFailed<'a> {
    pub function: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CallFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.function, self.error)
    }
}

/// A staged input handle no longer matches what is in the scratch region.
///
/// # Log Level
/// `warn!` - Caller bug
pub struct StaleInputRejected {
    pub staged: u64,
    pub current: u64,
}

impl Display for StaleInputRejected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected staged input #{}: scratch region holds input #{}",
            self.staged, self.current
        )
    }
}
