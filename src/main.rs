//! Binary entry point for the volumapper poller.

use std::env;
use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use volumapper::{
    AwsBackend, AwsBackendError, AwsCredentials, PollError, PollOrchestrator, PollOutcome,
    PollerConfig, ResultsStore, map_resources, mapping_table,
};

mod cli;

use cli::Cli;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("poll failed: {0}")]
    Poll(#[from] PollError<AwsBackendError>),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    if let Some(result) = fake_poll_from_env(&cli) {
        return result;
    }

    let credentials = AwsCredentials::from_env().map_err(|err| CliError::Config(err.to_string()))?;
    let config =
        PollerConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;

    let results_dir = cli.results_dir.clone().unwrap_or(config.results_dir);
    let regions = PollerConfig::regions(&cli.regions);
    let ident = credentials.access_key_id.clone();

    let orchestrator = PollOrchestrator::new(
        AwsBackend::new(credentials),
        ResultsStore::new(results_dir),
    )
    .with_freshness(Duration::from_secs(config.freshness_secs))
    .with_force_refresh(cli.force);

    let outcome = orchestrator.poll(&ident, &regions).await?;
    render_outcome(io::stdout(), &outcome, cli.attached_only)
}

fn render_outcome(
    mut target: impl Write,
    outcome: &PollOutcome,
    attached_only: bool,
) -> Result<i32, CliError> {
    if outcome.instances.is_empty() && outcome.volumes.is_empty() {
        writeln!(target, "No instances or volumes were found, nothing to map")
            .map_err(|err| CliError::Output(err.to_string()))?;
        return Ok(0);
    }

    let rows = map_resources(&outcome.instances, &outcome.volumes, attached_only);
    writeln!(target, "{}", mapping_table(&rows))
        .map_err(|err| CliError::Output(err.to_string()))?;
    Ok(0)
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

/// CLI test hook: renders canned outcomes when `VOLUMAPPER_FAKE_POLL_MODE`
/// is set, so integration tests can exercise the binary without provider
/// access or a results tree.
fn fake_poll_from_env(cli: &Cli) -> Option<Result<i32, CliError>> {
    let mode = env::var("VOLUMAPPER_FAKE_POLL_MODE").ok()?;
    match mode.as_str() {
        "empty" => Some(render_outcome(
            io::stdout(),
            &PollOutcome::default(),
            cli.attached_only,
        )),
        "sample" => {
            use volumapper::test_support::{instance_fixture, volume_fixture};
            let outcome = PollOutcome {
                instances: vec![instance_fixture("i-1", Some("web"))],
                volumes: vec![
                    volume_fixture("vol-1", Some("i-1")),
                    volume_fixture("vol-2", None),
                ],
            };
            Some(render_outcome(io::stdout(), &outcome, cli.attached_only))
        }
        "prefail-config" => Some(Err(CliError::Config(String::from("fake")))),
        _ => None,
    }
}
