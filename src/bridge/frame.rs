// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Staged input handles and the write-then-call scratch frame.
//!
//! During a call the scratch region holds two buffers back to back:
//!
//! ```text
//! [len][input bytes][len][secondary payload]
//! ^ scratch_offset  ^ scratch_offset + 4 + input_len
//! ```
//!
//! The secondary payload is the option document for `tmd_to_html` and an
//! empty buffer for `tmd_format`. Its offset is always derived from the staged
//! input, never queried separately.

use crate::errors::{BridgeError, BridgeResult};
use crate::host::memory::PREFIX_LEN;
use crate::host::{Export, ModuleHost};
use crate::observability::messages::bridge::CallCompleted;

use super::options::HtmlGenOptions;

/// An input document resident in the scratch region.
///
/// Returned by `Bridge::stage_input` and consumed by the next render or
/// reformat. Not `Clone`: one staged input feeds exactly one call.
#[derive(Debug, PartialEq, Eq)]
pub struct StagedInput {
    pub(crate) scratch_offset: u32,
    pub(crate) input_len: u32,
    pub(crate) stamp: u64,
}

impl StagedInput {
    pub fn scratch_offset(&self) -> u32 {
        self.scratch_offset
    }

    pub fn len(&self) -> u32 {
        self.input_len
    }

    pub fn is_empty(&self) -> bool {
        self.input_len == 0
    }

    /// Stage generation this input was written under.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Where the secondary payload starts, or `None` on 32-bit overflow.
    pub fn secondary_offset(&self) -> Option<u32> {
        self.scratch_offset
            .checked_add(PREFIX_LEN as u32)?
            .checked_add(self.input_len)
    }
}

/// Everything one export call needs, written in one go by [`commit`].
///
/// [`commit`]: ScratchFrame::commit
#[derive(Debug)]
pub struct ScratchFrame {
    staged: StagedInput,
    export: Export,
    secondary: Vec<u8>,
}

impl ScratchFrame {
    /// Frame for `tmd_to_html` with the encoded options as secondary payload.
    pub fn render(staged: StagedInput, options: &HtmlGenOptions) -> Self {
        Self {
            staged,
            export: Export::TmdToHtml,
            secondary: options.to_config_document().encode().into_bytes(),
        }
    }

    /// Frame for `tmd_format` with an empty secondary payload.
    pub fn reformat(staged: StagedInput) -> Self {
        Self {
            staged,
            export: Export::TmdFormat,
            secondary: Vec::new(),
        }
    }

    pub fn export(&self) -> Export {
        self.export
    }

    pub fn secondary(&self) -> &[u8] {
        &self.secondary
    }

    /// Write the secondary payload after the staged input, then call the
    /// export. Returns the output offset reported by the module.
    pub fn commit(self, host: &mut ModuleHost) -> BridgeResult<u32> {
        let offset = self.staged.secondary_offset().ok_or_else(|| {
            BridgeError::bounds(
                "locate secondary payload",
                self.staged.scratch_offset as u64,
                PREFIX_LEN as u64 + self.staged.input_len as u64,
                host.memory_size(),
            )
        })?;

        host.write_buffer(offset, &self.secondary)?;
        let output_offset = host.call(self.export)?;

        tracing::debug!(
            "{}",
            CallCompleted {
                function: self.export.name(),
                secondary_size: self.secondary.len(),
                output_offset,
            }
        );
        Ok(output_offset)
    }
}
