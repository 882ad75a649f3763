// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod common;

use common::fake_bridge;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tmd_bridge::bridge::{HtmlGenOptions, HTML_CUSTOM_APP};
use tmd_bridge::commands::{format_tmd, generate_html};
use tmd_bridge::errors::CommandError;

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn gen_writes_html_next_to_each_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "notes.TMD", b"hello");
    let options = HtmlGenOptions::default()
        .with_render_root(true)
        .with_custom_app(HTML_CUSTOM_APP);

    let mut bridge = fake_bridge();
    let mut out = Vec::new();
    let report = generate_html(&mut bridge, &[input.clone()], &options, &mut out).unwrap();

    let output = dir.path().join("notes.html");
    let html = fs::read_to_string(&output).unwrap();
    assert_eq!(html, options.to_config_document().encode());

    assert_eq!(report.generated.len(), 1);
    assert!(report.failures.is_empty());
    let generated = &report.generated[0];
    assert_eq!(generated.output, output);
    assert_eq!(generated.input_size, 5);
    assert_eq!(generated.output_size, html.len());

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(
        printed,
        format!(
            "{} (5 bytes)\n-> {} ({} bytes)\n",
            input.display(),
            output.display(),
            html.len()
        )
    );
}

#[test]
fn gen_continues_after_failures() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.tmd");
    let broken = write_file(&dir, "broken.tmd", b"!nope");
    let good = write_file(&dir, "good.tmd", b"fine");

    let mut bridge = fake_bridge();
    let mut out = Vec::new();
    let report = generate_html(
        &mut bridge,
        &[missing.clone(), broken.clone(), good],
        &HtmlGenOptions::default(),
        &mut out,
    )
    .unwrap();

    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(report.failures[0], CommandError::Read { .. }));
    assert_eq!(report.failures[0].path(), missing.as_path());
    assert!(matches!(report.failures[1], CommandError::Generate { .. }));
    assert!(!dir.path().join("broken.html").exists());
    assert!(dir.path().join("good.html").exists());
}

#[test]
fn fmt_rewrites_only_changed_files() {
    let dir = TempDir::new().unwrap();
    let messy = write_file(&dir, "messy.tmd", b"abc");
    let tidy = write_file(&dir, "tidy.tmd", b"done\n");

    let mut bridge = fake_bridge();
    let mut out = Vec::new();
    let report = format_tmd(&mut bridge, &[messy.clone(), tidy.clone()], &mut out).unwrap();

    assert_eq!(fs::read(&messy).unwrap(), b"abc\n");
    assert_eq!(fs::read(&tidy).unwrap(), b"done\n");
    assert_eq!(report.rewritten, vec![messy.clone()]);
    assert_eq!(report.unchanged, vec![tidy]);
    assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", messy.display()));
}

#[test]
fn fmt_reports_missing_file_and_carries_on() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.tmd");
    let present = write_file(&dir, "here.tmd", b"x");

    let mut bridge = fake_bridge();
    let mut out = Vec::new();
    let report = format_tmd(&mut bridge, &[missing, present.clone()], &mut out).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], CommandError::Stat { .. }));
    assert_eq!(report.rewritten, vec![present]);
}

#[cfg(unix)]
#[test]
fn fmt_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "mode.tmd", b"abc");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

    let mut bridge = fake_bridge();
    format_tmd(&mut bridge, &[path.clone()], &mut Vec::new()).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}
