// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;

const DEFAULT_IMAGE: &str = "assets/tmd.wasm";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo::rustc-check-cfg=cfg(tmd_embedded)");
    println!("cargo:rerun-if-env-changed=TMD_WASM");
    println!("cargo:rerun-if-changed={DEFAULT_IMAGE}");

    let source = match env::var_os("TMD_WASM") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(DEFAULT_IMAGE),
    };

    if !source.is_file() {
        // No image available: the crate builds without one and callers
        // must supply a module path at runtime.
        return Ok(());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    std::fs::copy(&source, out_dir.join("tmd.wasm"))?;

    println!("cargo:rerun-if-changed={}", source.display());
    println!("cargo:rustc-cfg=tmd_embedded");
    Ok(())
}
