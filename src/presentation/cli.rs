//! CLI Argument Parsing
//!
//! Global flags (--config, --host, --json, --verbose) are inherited by all
//! subcommands. clap itself exits with status 2 on invalid arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// courier - manifest-driven push/pull and release over SSH
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./courier.toml, then ~/.config/courier/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remote host, overriding config and COURIER_HOST
    #[arg(long, global = true, value_name = "HOST")]
    pub host: Option<String>,

    /// Emit NDJSON events and a JSON summary on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy local files to the remote host (push rules)
    Push {
        /// Manifest file (default from config, then courier.manifest.toml)
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,

        /// Show what would be transferred without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy remote files to the local machine (pull rules)
    Pull {
        /// Manifest file (default from config, then courier.manifest.toml)
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,

        /// Show what would be transferred without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Update the remote checkout, restart the service, wait until healthy
    Deploy {
        /// systemd unit, overriding [release].service
        #[arg(long, value_name = "NAME")]
        service: Option<String>,

        /// Run the push rules first; deploy only if the push did not abort
        #[arg(long)]
        push: bool,

        /// Manifest used by --push
        #[arg(short, long, value_name = "PATH", requires = "push")]
        manifest: Option<PathBuf>,
    },

    /// Validate the manifest and print its rules (no network access)
    Check {
        /// Manifest file (default from config, then courier.manifest.toml)
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
}
