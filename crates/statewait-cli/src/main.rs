//! statewait: poll a shell command until its reported state settles

use clap::Parser;
use statewait::CancellationToken;
use statewait_cli::report::USAGE_EXIT_CODE;
use statewait_cli::{run, Args, OutcomeKind};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling wait");
            cancel_clone.cancel();
        }
    });

    let report = match run(&args, cancel).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Could not start wait");
            eprintln!("error: {e:#}");
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    info!(
        resource = %report.resource,
        outcome = %report.outcome,
        state = ?report.state,
        "Wait finished"
    );

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else if report.outcome == OutcomeKind::Success && report.state.is_some() {
        println!("{}", report.state.as_deref().unwrap_or_default());
    } else {
        eprintln!("{}", report.summary());
    }

    report.exit_code()
}
