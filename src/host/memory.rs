// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared linear memory and the length-prefixed buffer protocol.
//!
//! Payloads cross the host/module boundary as a 4-byte little-endian length
//! followed by the raw bytes. Strings returned by the module (the library
//! version, error messages) are NUL-terminated instead.
//!
//! The protocol functions operate on plain byte slices so they can be checked
//! without a running module; [`SharedMemory`] applies them to the module's
//! exported `memory`. Every offset computation is checked, and a write that
//! would not fit leaves memory untouched.

use crate::errors::{BridgeError, BridgeResult};
use wasmtime::{AsContext, Memory, Store};

/// Size of the length header in front of every buffer.
pub const PREFIX_LEN: usize = 4;

/// Write `bytes` at `offset` as a length-prefixed buffer.
pub fn write_length_prefixed(memory: &mut [u8], offset: u32, bytes: &[u8]) -> BridgeResult<()> {
    let size = memory.len();
    let start = offset as usize;

    let length = u32::try_from(bytes.len()).map_err(|_| {
        BridgeError::bounds(
            "write payload",
            start as u64 + PREFIX_LEN as u64,
            bytes.len() as u64,
            size,
        )
    })?;

    let header_end = start
        .checked_add(PREFIX_LEN)
        .filter(|&end| end <= size)
        .ok_or_else(|| {
            BridgeError::bounds("write length prefix", start as u64, PREFIX_LEN as u64, size)
        })?;

    let payload_end = header_end
        .checked_add(bytes.len())
        .filter(|&end| end <= size)
        .ok_or_else(|| {
            BridgeError::bounds("write payload", header_end as u64, bytes.len() as u64, size)
        })?;

    memory[start..header_end].copy_from_slice(&length.to_le_bytes());
    memory[header_end..payload_end].copy_from_slice(bytes);
    Ok(())
}

/// Read the length-prefixed buffer at `offset`.
///
/// A zero length yields `None`, which the module uses to mean "no output".
pub fn read_length_prefixed(memory: &[u8], offset: u32) -> BridgeResult<Option<&[u8]>> {
    let size = memory.len();
    let start = offset as usize;

    let header = start
        .checked_add(PREFIX_LEN)
        .and_then(|end| memory.get(start..end))
        .ok_or_else(|| {
            BridgeError::bounds("read length prefix", start as u64, PREFIX_LEN as u64, size)
        })?;

    let mut raw = [0u8; PREFIX_LEN];
    raw.copy_from_slice(header);
    let length = u32::from_le_bytes(raw) as usize;
    if length == 0 {
        return Ok(None);
    }

    let payload_start = start + PREFIX_LEN;
    payload_start
        .checked_add(length)
        .and_then(|end| memory.get(payload_start..end))
        .map(Some)
        .ok_or_else(|| {
            BridgeError::bounds("read payload", payload_start as u64, length as u64, size)
        })
}

/// Read the NUL-terminated string starting at `offset`.
///
/// The scan stops at the first zero byte or at the end of memory, whichever
/// comes first. An offset equal to the memory size yields an empty string.
pub fn read_nul_terminated(memory: &[u8], offset: u32) -> BridgeResult<&[u8]> {
    let rest = memory
        .get(offset as usize..)
        .ok_or_else(|| BridgeError::bounds("read string", offset as u64, 0, memory.len()))?;
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    Ok(&rest[..end])
}

/// Resolve an (offset, length) span, or `None` if any byte is out of range.
pub fn read_span(memory: &[u8], offset: u32, length: u32) -> Option<&[u8]> {
    let start = offset as usize;
    let end = start.checked_add(length as usize)?;
    memory.get(start..end)
}

/// The module's exported linear memory.
///
/// A thin handle; the bytes live in the store, so every access goes through a
/// store context and re-reads the current extent. Memory may grow during any
/// call, which is why slices are never cached across calls.
#[derive(Debug, Clone, Copy)]
pub struct SharedMemory {
    memory: Memory,
}

impl SharedMemory {
    pub(crate) fn new(memory: Memory) -> Self {
        Self { memory }
    }

    /// Current size in bytes.
    pub fn size(&self, store: impl AsContext) -> usize {
        self.memory.data_size(store)
    }

    pub fn data<'a, T: 'static>(&self, store: &'a Store<T>) -> &'a [u8] {
        self.memory.data(store)
    }

    pub fn data_mut<'a, T: 'static>(&self, store: &'a mut Store<T>) -> &'a mut [u8] {
        self.memory.data_mut(store)
    }

    pub fn write_buffer<T: 'static>(
        &self,
        store: &mut Store<T>,
        offset: u32,
        bytes: &[u8],
    ) -> BridgeResult<()> {
        write_length_prefixed(self.data_mut(store), offset, bytes)
    }

    pub fn read_buffer<'a, T: 'static>(
        &self,
        store: &'a Store<T>,
        offset: u32,
    ) -> BridgeResult<Option<&'a [u8]>> {
        read_length_prefixed(self.data(store), offset)
    }

    pub fn read_c_string<'a, T: 'static>(
        &self,
        store: &'a Store<T>,
        offset: u32,
    ) -> BridgeResult<&'a [u8]> {
        read_nul_terminated(self.data(store), offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_places_prefix_then_payload() {
        let mut memory = vec![0xAAu8; 16];
        write_length_prefixed(&mut memory, 2, b"abc").unwrap();

        assert_eq!(&memory[2..6], &3u32.to_le_bytes());
        assert_eq!(&memory[6..9], b"abc");
        // bytes outside the buffer are untouched
        assert_eq!(memory[1], 0xAA);
        assert_eq!(memory[9], 0xAA);
    }

    #[test]
    fn write_empty_payload_is_just_a_zero_prefix() {
        let mut memory = vec![0xFFu8; 8];
        write_length_prefixed(&mut memory, 4, b"").unwrap();
        assert_eq!(&memory[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn write_that_does_not_fit_leaves_memory_untouched() {
        let mut memory = vec![0u8; 10];
        let result = write_length_prefixed(&mut memory, 4, b"abc");

        match result {
            Err(BridgeError::MemoryBounds {
                operation,
                offset,
                length,
                memory_size,
            }) => {
                assert_eq!(operation, "write payload");
                assert_eq!(offset, 8);
                assert_eq!(length, 3);
                assert_eq!(memory_size, 10);
            }
            other => panic!("Expected MemoryBounds, got {:?}", other),
        }
        assert!(memory.iter().all(|&b| b == 0));
    }

    #[test]
    fn write_prefix_past_end_fails() {
        let mut memory = vec![0u8; 6];
        let result = write_length_prefixed(&mut memory, 3, b"");
        assert!(matches!(
            result,
            Err(BridgeError::MemoryBounds {
                operation: "write length prefix",
                ..
            })
        ));
    }

    #[test]
    fn write_at_max_offset_does_not_overflow() {
        let mut memory = vec![0u8; 8];
        let result = write_length_prefixed(&mut memory, u32::MAX, b"x");
        assert!(matches!(result, Err(BridgeError::MemoryBounds { .. })));
    }

    #[test]
    fn read_returns_payload() {
        let mut memory = vec![0u8; 32];
        write_length_prefixed(&mut memory, 8, b"<p>hi</p>").unwrap();
        assert_eq!(
            read_length_prefixed(&memory, 8).unwrap(),
            Some(&b"<p>hi</p>"[..])
        );
    }

    #[test]
    fn read_zero_length_is_none() {
        let memory = vec![0u8; 8];
        assert_eq!(read_length_prefixed(&memory, 0).unwrap(), None);
    }

    #[test]
    fn read_length_beyond_memory_fails() {
        let mut memory = vec![0u8; 12];
        memory[0..4].copy_from_slice(&100u32.to_le_bytes());
        let result = read_length_prefixed(&memory, 0);
        assert!(matches!(
            result,
            Err(BridgeError::MemoryBounds {
                operation: "read payload",
                offset: 4,
                length: 100,
                ..
            })
        ));
    }

    #[test]
    fn read_prefix_beyond_memory_fails() {
        let memory = vec![0u8; 12];
        assert!(read_length_prefixed(&memory, 10).is_err());
        assert!(read_length_prefixed(&memory, u32::MAX).is_err());
    }

    #[test]
    fn c_string_stops_at_nul() {
        let memory = b"xx0.5.1\0garbage";
        assert_eq!(read_nul_terminated(memory, 2).unwrap(), b"0.5.1");
    }

    #[test]
    fn c_string_runs_to_end_without_nul() {
        let memory = b"abcdef";
        assert_eq!(read_nul_terminated(memory, 3).unwrap(), b"def");
        assert_eq!(read_nul_terminated(memory, 6).unwrap(), b"");
    }

    #[test]
    fn c_string_past_end_fails() {
        let memory = b"abc";
        assert!(read_nul_terminated(memory, 4).is_err());
    }

    #[test]
    fn span_checks_both_ends() {
        let memory = b"0123456789";
        assert_eq!(read_span(memory, 2, 3), Some(&b"234"[..]));
        assert_eq!(read_span(memory, 10, 0), Some(&b""[..]));
        assert_eq!(read_span(memory, 8, 3), None);
        assert_eq!(read_span(memory, 11, 0), None);
        assert_eq!(read_span(memory, u32::MAX, u32::MAX), None);
    }
}
