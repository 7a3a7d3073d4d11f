// AreaPod - area team reconciliation

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use areapod_app::{run, Cli};
use areapod_common::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version requests are not usage errors
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    match run_cli(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("Run failed: {:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let plan = match cli.to_plan() {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Run `areapod --help` for usage.");
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Err(err) = config.require_token() {
        eprintln!("{}", err);
        return Ok(ExitCode::FAILURE);
    }

    info!(org = %config.github_org, dry_run = plan.options.dry_run, "Starting area team reconciliation");

    let report = run(&plan, &config).await?;
    print!("{}", report);

    Ok(ExitCode::from(report.exit_code()))
}
