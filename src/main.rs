// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tmd_bridge::bridge::{Bridge, HTML_CUSTOM_APP};
use tmd_bridge::commands::{format_tmd, generate_html};
use tmd_bridge::config::{load_config, BridgeConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Default)]
#[command(name = "tmd")]
#[command(version, about = "TapirMD toolset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Bridge configuration file (YAML, JSON or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// TapirMD WASM module to use instead of the configured or embedded one
    #[arg(short, long, global = true)]
    module: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an HTML file next to each TMD file
    Gen {
        /// Render raw HTML blocks instead of dropping them
        #[arg(long)]
        support_html_custom_blocks: bool,

        /// TMD files
        files: Vec<PathBuf>,
    },

    /// Format TMD files in place
    Fmt {
        /// TMD files
        files: Vec<PathBuf>,
    },

    /// Print the TapirMD library version
    Version,
}

/// Outcome of reading the command line.
enum Parsed {
    Run(Cli),
    /// A sub-command nobody knows; answered with the usage text, not a failure.
    UnknownSubcommand(String),
}

fn parse_cli<I, T>(args: I) -> Result<Parsed, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Parsed::Run(cli)),
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
            let name = match e.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.clone(),
                _ => String::new(),
            };
            Ok(Parsed::UnknownSubcommand(name))
        }
        Err(e) => Err(e),
    }
}

fn main() -> Result<()> {
    let (cli, unknown) = match parse_cli(std::env::args_os()) {
        Ok(Parsed::Run(cli)) => (cli, None),
        Ok(Parsed::UnknownSubcommand(name)) => (Cli::default(), Some(name)),
        // help, --version and malformed flags keep clap's own output and status
        Err(e) => e.exit(),
    };
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    let mut bridge = Bridge::from_config(&config, cli.module.as_deref())
        .context("opening the TapirMD module")?;
    let version = bridge.version().context("reading the library version")?;

    if let Some(name) = unknown {
        println!("Unknown sub-command: {}", name);
        print_usage(&version);
        bridge.close();
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        None => print_usage(&version),
        Some(Commands::Version) => println!("{}", version),
        Some(Commands::Gen { files, .. }) | Some(Commands::Fmt { files }) if files.is_empty() => {
            print_usage(&version)
        }
        Some(Commands::Gen {
            support_html_custom_blocks,
            files,
        }) => {
            // render_root defaults to true unless the config turns it off
            let mut options = config.render.to_options();
            if support_html_custom_blocks {
                options = options.with_custom_app(HTML_CUSTOM_APP);
            }
            generate_html(&mut bridge, &files, &options, &mut stdout)?;
        }
        Some(Commands::Fmt { files }) => {
            format_tmd(&mut bridge, &files, &mut stdout)?;
        }
    }

    bridge.close();
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage(version: &str) {
    println!("TapirMD toolset v{}\n", version);
    println!("{}", Cli::command().render_usage());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_subcommand_is_not_an_error() {
        match parse_cli(["tmd", "publish", "a.tmd"]) {
            Ok(Parsed::UnknownSubcommand(name)) => assert_eq!(name, "publish"),
            Ok(Parsed::Run(_)) => panic!("Expected UnknownSubcommand, got Run"),
            Err(e) => panic!("Expected UnknownSubcommand, got {:?}", e.kind()),
        }
    }

    #[test]
    fn near_miss_subcommand_is_still_unknown() {
        assert!(matches!(
            parse_cli(["tmd", "gne"]),
            Ok(Parsed::UnknownSubcommand(name)) if name == "gne"
        ));
    }

    #[test]
    fn gen_collects_flag_and_files() {
        let args = ["tmd", "gen", "--support-html-custom-blocks", "a.tmd", "b.tmd"];
        let cli = match parse_cli(args) {
            Ok(Parsed::Run(cli)) => cli,
            _ => panic!("Expected gen to parse"),
        };
        match cli.command {
            Some(Commands::Gen {
                support_html_custom_blocks,
                files,
            }) => {
                assert!(support_html_custom_blocks);
                assert_eq!(files, vec![PathBuf::from("a.tmd"), PathBuf::from("b.tmd")]);
            }
            _ => panic!("Expected the gen command"),
        }
    }

    #[test]
    fn no_subcommand_parses_to_usage() {
        match parse_cli(["tmd"]) {
            Ok(Parsed::Run(cli)) => assert!(cli.command.is_none()),
            _ => panic!("Expected a bare run"),
        }
    }

    #[test]
    fn unknown_flag_stays_a_clap_error() {
        match parse_cli(["tmd", "fmt", "--bogus"]) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::UnknownArgument),
            Ok(_) => panic!("Expected a clap error"),
        }
    }
}
