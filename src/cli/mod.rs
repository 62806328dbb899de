//! Command-line interface definitions for the `volumapper` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use camino::Utf8PathBuf;
use clap::Parser;

/// Top-level CLI for the `volumapper` binary.
#[derive(Debug, Parser)]
#[command(
    name = "volumapper",
    about = "Map EBS volumes to the EC2 instances using them and print a table",
    long_about = "Map EBS volumes to the EC2 instances using them and print a table.\n\
                  AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set in the environment."
)]
pub(crate) struct Cli {
    /// Region(s) to poll (repeatable). Defaults to the built-in region list.
    #[arg(short = 'r', long = "region", value_name = "REGION")]
    pub(crate) regions: Vec<String>,
    /// Poll the provider API even when a fresh snapshot exists on disk.
    #[arg(short = 'f', long)]
    pub(crate) force: bool,
    /// Hide volumes that are not attached to any instance.
    #[arg(long)]
    pub(crate) attached_only: bool,
    /// Root of the results tree used for snapshots (defaults to `results`).
    #[arg(long, value_name = "DIR")]
    pub(crate) results_dir: Option<Utf8PathBuf>,
}
