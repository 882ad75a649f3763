// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The `gen` and `fmt` batch commands.
//!
//! Both walk a list of files and keep going when one of them fails: the
//! failure is logged, recorded in the report, and the next file is processed.
//! Progress lines go to the supplied writer so the binary can pass stdout and
//! tests can pass a buffer.

use crate::bridge::{Bridge, Formatted, HtmlGenOptions};
use crate::errors::CommandError;
use crate::observability::messages::commands::{BatchCompleted, FileSkipped};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TMD_EXT: &str = ".tmd";
const HTML_EXT: &str = ".html";

/// One successfully generated HTML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub input: PathBuf,
    pub input_size: usize,
    pub output: PathBuf,
    pub output_size: usize,
}

#[derive(Debug, Default)]
pub struct GenReport {
    pub generated: Vec<GeneratedFile>,
    pub failures: Vec<CommandError>,
}

#[derive(Debug, Default)]
pub struct FmtReport {
    pub rewritten: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub failures: Vec<CommandError>,
}

/// Output path for `input`: a trailing `.tmd` (any case) becomes `.html`,
/// anything else gets `.html` appended.
pub fn html_output_path(input: &Path) -> PathBuf {
    if let Some(text) = input.to_str() {
        let split = text.len().saturating_sub(TMD_EXT.len());
        if text.len() >= TMD_EXT.len()
            && text.is_char_boundary(split)
            && text[split..].eq_ignore_ascii_case(TMD_EXT)
        {
            return PathBuf::from(format!("{}{}", &text[..split], HTML_EXT));
        }
    }
    let mut output = input.as_os_str().to_os_string();
    output.push(HTML_EXT);
    PathBuf::from(output)
}

/// Render every file to HTML next to it.
///
/// Writes `<in> (<n> bytes)` and `-> <out> (<m> bytes)` to `out` for each
/// generated file. Only a failure to write to `out` aborts the batch.
pub fn generate_html<W: Write>(
    bridge: &mut Bridge,
    files: &[PathBuf],
    options: &HtmlGenOptions,
    out: &mut W,
) -> io::Result<GenReport> {
    let mut report = GenReport::default();

    for input in files {
        match generate_one(bridge, input, options) {
            Ok(file) => {
                writeln!(
                    out,
                    "{} ({} bytes)\n-> {} ({} bytes)",
                    file.input.display(),
                    file.input_size,
                    file.output.display(),
                    file.output_size
                )?;
                report.generated.push(file);
            }
            Err(error) => {
                tracing::error!("{}", FileSkipped { error: &error });
                report.failures.push(error);
            }
        }
    }

    tracing::info!(
        "{}",
        BatchCompleted {
            command: "gen",
            processed: files.len(),
            written: report.generated.len(),
            failed: report.failures.len(),
        }
    );
    Ok(report)
}

fn generate_one(
    bridge: &mut Bridge,
    input: &Path,
    options: &HtmlGenOptions,
) -> Result<GeneratedFile, CommandError> {
    let data = fs::read(input).map_err(|source| CommandError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let html = bridge
        .render_document(&data, options)
        .map_err(|source| CommandError::Generate {
            path: input.to_path_buf(),
            source,
        })?;

    let output = html_output_path(input);
    fs::write(&output, html).map_err(|source| CommandError::Write {
        kind: "HTML",
        path: output.clone(),
        source,
    })?;

    Ok(GeneratedFile {
        input: input.to_path_buf(),
        input_size: data.len(),
        output_size: html.len(),
        output,
    })
}

/// Reformat every file in place.
///
/// A file is only written when the module produced a rewrite; its path is
/// then written to `out`. Unchanged files are left alone.
pub fn format_tmd<W: Write>(
    bridge: &mut Bridge,
    files: &[PathBuf],
    out: &mut W,
) -> io::Result<FmtReport> {
    let mut report = FmtReport::default();

    for path in files {
        match format_one(bridge, path) {
            Ok(true) => {
                writeln!(out, "{}", path.display())?;
                report.rewritten.push(path.clone());
            }
            Ok(false) => report.unchanged.push(path.clone()),
            Err(error) => {
                tracing::error!("{}", FileSkipped { error: &error });
                report.failures.push(error);
            }
        }
    }

    tracing::info!(
        "{}",
        BatchCompleted {
            command: "fmt",
            processed: files.len(),
            written: report.rewritten.len(),
            failed: report.failures.len(),
        }
    );
    Ok(report)
}

fn format_one(bridge: &mut Bridge, path: &Path) -> Result<bool, CommandError> {
    fs::metadata(path).map_err(|source| CommandError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    let data = fs::read(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let formatted = bridge
        .reformat_document(&data)
        .map_err(|source| CommandError::Format {
            path: path.to_path_buf(),
            source,
        })?;

    match formatted {
        Formatted::Unchanged => Ok(false),
        Formatted::Rewritten(bytes) => {
            // truncating an existing file keeps its permissions
            fs::write(path, bytes).map_err(|source| CommandError::Write {
                kind: "TMD",
                path: path.to_path_buf(),
                source,
            })?;
            Ok(true)
        }
    }
}
