// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

/// A single file of a `gen` or `fmt` batch failed; the batch carries on.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("stat TMD file [{}] error: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read TMD file [{}] error: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generate HTML file [{}] error: {source}", path.display())]
    Generate {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("format TMD file [{}] error: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("write {kind} file [{}] error: {source}", path.display())]
    Write {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// The file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            CommandError::Stat { path, .. }
            | CommandError::Read { path, .. }
            | CommandError::Generate { path, .. }
            | CommandError::Format { path, .. }
            | CommandError::Write { path, .. } => path,
        }
    }
}
