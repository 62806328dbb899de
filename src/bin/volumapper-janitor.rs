//! Results-tree janitor for volumapper.
//!
//! This binary prepares the on-disk results tree the poller writes into and
//! prunes stale snapshots, keeping the newest file per data directory.

use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write as _;
use volumapper::{Janitor, JanitorConfig, PollerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "volumapper-janitor",
    about = "Prepare and prune the volumapper results tree",
    arg_required_else_help = true
)]
struct Cli {
    /// Root of the results tree.
    #[arg(long, default_value = "results", value_name = "DIR")]
    results_dir: Utf8PathBuf,
    /// Ensure the tree exists for this account identifier (usually the AWS
    /// access key ID).
    #[arg(long, value_name = "IDENT")]
    prepare: Option<String>,
    /// Regions to prepare (repeatable). Defaults to the built-in region list.
    #[arg(short = 'r', long = "region", value_name = "REGION", requires = "prepare")]
    regions: Vec<String>,
    /// Delete stale snapshots, keeping the newest per data directory.
    #[arg(short = 'c', long)]
    cleanup: bool,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    if cli.prepare.is_none() && !cli.cleanup {
        return Err(String::from("nothing to do: pass --prepare and/or --cleanup"));
    }

    let config = JanitorConfig::new(cli.results_dir).map_err(|err| err.to_string())?;
    let janitor = Janitor::new(config);
    let mut stdout = std::io::stdout();

    if let Some(ident) = &cli.prepare {
        let regions = PollerConfig::regions(&cli.regions);
        janitor
            .prepare(ident, &regions)
            .map_err(|err| err.to_string())?;
        writeln!(
            stdout,
            "prepared results tree for {ident} ({} regions)",
            regions.len()
        )
        .map_err(|err| err.to_string())?;
    }

    if cli.cleanup {
        let summary = janitor.sweep().map_err(|err| err.to_string())?;
        writeln!(
            stdout,
            "janitor sweep complete: deleted_files={}, retained_files={}",
            summary.deleted_files, summary.retained_files
        )
        .map_err(|err| err.to_string())?;
    }

    Ok(())
}
