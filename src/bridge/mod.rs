// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end operations on the TapirMD module.
//!
//! A [`Bridge`] owns one [`ModuleHost`] and drives the two-phase protocol:
//!
//! 1. [`Bridge::stage_input`] asks the module for its scratch offset and writes
//!    the input document there, returning a [`StagedInput`] handle.
//! 2. [`Bridge::render`] or [`Bridge::reformat`] consumes that handle, writes
//!    the secondary payload right after the input and calls the export.
//!
//! Results borrow the bridge, so they must be copied before the next call.
//!
//! # Example
//! ```no_run
//! use tmd_bridge::bridge::{Bridge, HtmlGenOptions};
//! use tmd_bridge::host::{HostSettings, ModuleImage};
//!
//! let image = ModuleImage::from_file("assets/tmd.wasm")?;
//! let mut bridge = Bridge::open(&image, HostSettings::default())?;
//!
//! let staged = bridge.stage_input(b"### Title\n")?;
//! let html = bridge.render(staged, &HtmlGenOptions::default())?.to_vec();
//! println!("{}", String::from_utf8_lossy(&html));
//! # Ok::<(), tmd_bridge::errors::BridgeError>(())
//! ```

mod frame;
mod options;

pub use frame::{ScratchFrame, StagedInput};
pub use options::{ConfigDocument, HtmlGenOptions, HTML_CUSTOM_APP};

use crate::config::BridgeConfig;
use crate::errors::{BridgeError, BridgeResult};
use crate::host::{Export, HostSettings, ModuleHost, ModuleImage};
use crate::observability::messages::bridge::{CallFailed, InputStaged, StaleInputRejected};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

// shared by all bridges so a handle from one bridge never matches another
static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// Outcome of a reformat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatted<'a> {
    /// The document is already formatted; leave the original untouched.
    Unchanged,
    /// The reformatted document.
    Rewritten(&'a [u8]),
}

impl<'a> Formatted<'a> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Formatted::Unchanged)
    }

    pub fn rewritten(self) -> Option<&'a [u8]> {
        match self {
            Formatted::Unchanged => None,
            Formatted::Rewritten(bytes) => Some(bytes),
        }
    }
}

/// One module instance plus the staging state of its scratch region.
pub struct Bridge {
    host: ModuleHost,
    current_stage: Option<u64>,
}

impl Bridge {
    /// Instantiate `image` and wrap it.
    pub fn open(image: &ModuleImage, settings: HostSettings) -> BridgeResult<Self> {
        Ok(Self::from_host(ModuleHost::open(image, settings)?))
    }

    /// Open a bridge as described by a config file.
    ///
    /// `module_override` (the `--module` flag) wins over `config.module`,
    /// which wins over the embedded image.
    pub fn from_config(
        config: &BridgeConfig,
        module_override: Option<&Path>,
    ) -> BridgeResult<Self> {
        let image = ModuleImage::resolve(&[module_override, config.module.as_deref()])?;
        let settings = HostSettings {
            fuel: config.fuel_limit(),
            sink: config.diagnostics.sink(),
        };
        Self::open(&image, settings)
    }

    pub fn from_host(host: ModuleHost) -> Self {
        Self {
            host,
            current_stage: None,
        }
    }

    pub fn host(&self) -> &ModuleHost {
        &self.host
    }

    /// Release the module instance.
    pub fn close(self) {
        self.host.close();
    }

    /// The module's library version.
    pub fn version(&mut self) -> BridgeResult<String> {
        let offset = traced(Export::LibVersion, self.host.call(Export::LibVersion))?;
        let version = self.host.read_c_string(offset)?;
        Ok(String::from_utf8_lossy(version).into_owned())
    }

    /// Write `input` into the scratch region.
    ///
    /// Any previously staged input is invalidated, even when staging fails.
    pub fn stage_input(&mut self, input: &[u8]) -> BridgeResult<StagedInput> {
        self.current_stage = None;

        let scratch_offset = traced(Export::BufferOffset, self.host.call(Export::BufferOffset))?;
        self.host.write_buffer(scratch_offset, input)?;

        let stamp = NEXT_STAMP.fetch_add(1, Ordering::Relaxed);
        self.current_stage = Some(stamp);

        tracing::debug!(
            "{}",
            InputStaged {
                stage: stamp,
                scratch_offset,
                input_size: input.len(),
            }
        );

        Ok(StagedInput {
            scratch_offset,
            // write_buffer rejects payloads whose length does not fit in u32
            input_len: input.len() as u32,
            stamp,
        })
    }

    /// Render the staged input to HTML.
    ///
    /// A document that renders to nothing yields an empty slice.
    pub fn render(&mut self, staged: StagedInput, options: &HtmlGenOptions) -> BridgeResult<&[u8]> {
        self.claim(&staged)?;
        let frame = ScratchFrame::render(staged, options);
        let offset = traced(Export::TmdToHtml, frame.commit(&mut self.host))?;
        Ok(self.host.read_buffer(offset)?.unwrap_or_default())
    }

    /// Reformat the staged input.
    pub fn reformat(&mut self, staged: StagedInput) -> BridgeResult<Formatted<'_>> {
        self.claim(&staged)?;
        let frame = ScratchFrame::reformat(staged);
        let offset = traced(Export::TmdFormat, frame.commit(&mut self.host))?;
        Ok(match self.host.read_buffer(offset)? {
            Some(bytes) => Formatted::Rewritten(bytes),
            None => Formatted::Unchanged,
        })
    }

    /// Stage `input` and render it.
    pub fn render_document(
        &mut self,
        input: &[u8],
        options: &HtmlGenOptions,
    ) -> BridgeResult<&[u8]> {
        let staged = self.stage_input(input)?;
        self.render(staged, options)
    }

    /// Stage `input` and reformat it.
    pub fn reformat_document(&mut self, input: &[u8]) -> BridgeResult<Formatted<'_>> {
        let staged = self.stage_input(input)?;
        self.reformat(staged)
    }

    /// Check that `staged` is what the scratch region holds, and mark it used.
    fn claim(&mut self, staged: &StagedInput) -> BridgeResult<()> {
        let current = self.current_stage.unwrap_or(0);
        if current != staged.stamp {
            tracing::warn!(
                "{}",
                StaleInputRejected {
                    staged: staged.stamp,
                    current,
                }
            );
            return Err(BridgeError::StaleInput {
                staged: staged.stamp,
                current,
            });
        }
        // the call may reuse the scratch region
        self.current_stage = None;
        Ok(())
    }
}

fn traced<T>(export: Export, result: BridgeResult<T>) -> BridgeResult<T> {
    if let Err(error) = &result {
        tracing::debug!(
            "{}",
            CallFailed {
                function: export.name(),
                error,
            }
        );
    }
    result
}
