// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use std::path::PathBuf;
use tmd_bridge::bridge::Bridge;
use tmd_bridge::host::{HostSettings, ModuleImage, SilentSink};

/// Stand-in for the TapirMD module with the same export surface.
///
/// * scratch region at 1024, outputs at 32768
/// * `tmd_to_html` echoes the secondary payload (the option document), so
///   tests can see exactly what the bridge wrote after the input
/// * `tmd_to_html` on input starting with `!` returns an error sentinel for
///   "bad document"
/// * `tmd_to_html` on input starting with `+` grows memory by one page and
///   places its output in the new page
/// * `tmd_format` traps unless the secondary payload is empty, prints
///   `format: <input length>`, reports "unchanged" for empty input or input
///   ending in a newline, and otherwise appends a newline
pub const FAKE_MODULE: &str = r#"
(module
    (import "env" "print" (func $print (param i32 i32 i32 i32 i32)))
    (memory (export "memory") 2)
    (data (i32.const 16) "0.0.0-fake\00")
    (data (i32.const 64) "bad document\00")
    (data (i32.const 96) "format: ")

    (func $input_len (result i32)
        (i32.load (i32.const 1024)))
    (func $input_ptr (result i32)
        (i32.const 1028))
    (func $secondary_at (result i32)
        (i32.add (call $input_ptr) (call $input_len)))
    (func $first_byte_is (param $byte i32) (result i32)
        (if (result i32) (i32.eqz (call $input_len))
            (then (i32.const 0))
            (else (i32.eq (i32.load8_u (call $input_ptr)) (local.get $byte)))))

    (func (export "lib_version") (result i32)
        (i32.const 16))

    (func (export "buffer_offset") (result i32)
        (i32.const 1024))

    (func (export "tmd_to_html") (result i32)
        (local $secondary i32)
        (local $len i32)
        (local $out i32)
        (if (call $first_byte_is (i32.const 33))
            (then (return (i32.const -65))))
        (local.set $out (i32.const 32768))
        (if (call $first_byte_is (i32.const 43))
            (then
                (local.set $out
                    (i32.mul (memory.grow (i32.const 1)) (i32.const 65536)))))
        (local.set $secondary (call $secondary_at))
        (local.set $len (i32.load (local.get $secondary)))
        (i32.store (local.get $out) (local.get $len))
        (memory.copy
            (i32.add (local.get $out) (i32.const 4))
            (i32.add (local.get $secondary) (i32.const 4))
            (local.get $len))
        (local.get $out))

    (func (export "tmd_format") (result i32)
        (local $len i32)
        (local.set $len (call $input_len))
        (if (i32.ne (i32.load (call $secondary_at)) (i32.const 0))
            (then (unreachable)))
        (call $print (i32.const 96) (i32.const 8) (i32.const 0) (i32.const 0) (local.get $len))
        (if (i32.eqz (local.get $len))
            (then
                (i32.store (i32.const 32768) (i32.const 0))
                (return (i32.const 32768))))
        (if (i32.eq
                (i32.load8_u (i32.sub (i32.add (call $input_ptr) (local.get $len)) (i32.const 1)))
                (i32.const 10))
            (then
                (i32.store (i32.const 32768) (i32.const 0))
                (return (i32.const 32768))))
        (i32.store (i32.const 32768) (i32.add (local.get $len) (i32.const 1)))
        (memory.copy (i32.const 32772) (call $input_ptr) (local.get $len))
        (i32.store8 (i32.add (i32.const 32772) (local.get $len)) (i32.const 10))
        (i32.const 32768))
)
"#;

pub fn fake_image() -> ModuleImage {
    let bytes = wat::parse_str(FAKE_MODULE).expect("fake module must assemble");
    ModuleImage::from_bytes(bytes, "fake.wat")
}

pub fn fake_bridge() -> Bridge {
    fake_bridge_with(HostSettings::default().with_sink(SilentSink))
}

pub fn fake_bridge_with(settings: HostSettings) -> Bridge {
    Bridge::open(&fake_image(), settings).expect("fake module must instantiate")
}

/// The real TapirMD module: `TMD_WASM` at test time, else the embedded image.
pub fn real_image() -> Option<ModuleImage> {
    if let Some(path) = std::env::var_os("TMD_WASM").map(PathBuf::from) {
        if path.is_file() {
            return ModuleImage::from_file(&path).ok();
        }
    }
    ModuleImage::embedded()
}

pub fn real_bridge() -> Option<Bridge> {
    let image = real_image()?;
    let settings = HostSettings::default().with_sink(SilentSink);
    Some(Bridge::open(&image, settings).expect("TapirMD module must instantiate"))
}
