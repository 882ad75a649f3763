// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the `gen` and `fmt` commands.

use std::fmt::{Display, Formatter};

/// One file of a batch could not be processed; the batch continues.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use tmd_bridge::observability::messages::commands::FileSkipped;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
/// let msg = FileSkipped { error: &error };
///
/// assert_eq!(msg.to_string(), "not found; skipping");
/// ```
pub struct FileSkipped<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for FileSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}; skipping", self.error)
    }
}

/// A batch finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BatchCompleted<'a> {
    pub command: &'a str,
    pub processed: usize,
    pub written: usize,
    pub failed: usize,
}

impl Display for BatchCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} finished: {} processed, {} written, {} failed",
            self.command, self.processed, self.written, self.failed
        )
    }
}
