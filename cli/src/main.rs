//! CLI entrypoint for govbot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use govbot_application::{
    ErrorReporter, PlatformQuery, ScanVotesInput, ScanVotesUseCase, TriggerKind,
    VoteLifecycleUseCase, VoteOutcome,
};
use govbot_domain::VoteItem;
use govbot_infrastructure::{ConfigLoader, GhCliPlatform, JsonlErrorReporter};
use govbot_presentation::{
    Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level, RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command.clone() else {
        bail!("A command is required. Run `govbot --help` for usage.");
    };

    info!("Starting govbot");

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    file_config.validate().context("invalid configuration")?;

    let config = file_config.repository_config(command.repository());

    // === Dependency Injection ===
    let platform = Arc::new(GhCliPlatform::try_new(config.bot_login.clone()).await?);

    let reporter: Arc<dyn ErrorReporter> = match &file_config.report.path {
        Some(path) => match JsonlErrorReporter::new(path) {
            Some(reporter) => Arc::new(reporter),
            None => {
                warn!("Failure reports will only be logged");
                Arc::new(JsonlErrorReporter::log_only())
            }
        },
        None => Arc::new(JsonlErrorReporter::log_only()),
    };

    let lifecycle = VoteLifecycleUseCase::new(
        platform.clone(),
        platform.clone(),
        platform.clone(),
        platform.clone(),
        file_config.lifecycle_params(),
    )
    .with_reporter(reporter);

    let failed = match command {
        Command::Vote { repo, number } => {
            let item = platform.get_item(&repo, number).await?;
            let outcome = lifecycle
                .handle_vote_event(TriggerKind::Webhook, &item, &config)
                .await;
            print_outcome(cli.output, &item, &outcome);
            outcome.is_failure()
        }
        Command::Scan { concurrency, .. } => {
            let use_case = ScanVotesUseCase::new(platform.clone(), lifecycle);
            let input = ScanVotesInput::new(config).with_concurrency(concurrency);

            let results = if cli.quiet || cli.output == OutputFormat::Json {
                use_case.execute(input).await?
            } else if std::io::stderr().is_terminal() {
                let progress = ProgressReporter::new();
                use_case.execute_with_progress(input, &progress).await?
            } else {
                use_case.execute_with_progress(input, &SimpleProgress).await?
            };

            let output = match cli.output {
                OutputFormat::Text => ConsoleFormatter::format_scan(&results),
                OutputFormat::Json => ConsoleFormatter::format_scan_json(&results),
            };
            println!("{}", output);
            results.iter().any(|(_, outcome)| outcome.is_failure())
        }
        Command::Result {
            repo,
            number,
            comment_id,
        } => {
            let item = platform.get_item(&repo, number).await?;
            let closing = platform.get_comment(&item, &comment_id).await?;
            let mut outcome = lifecycle
                .handle_manual_result_event(item.clone(), closing, config)
                .await;
            while let VoteOutcome::Requeued(handle) = outcome {
                info!("Evaluation of {} in flight, waiting for retry", item.id);
                outcome = handle.await.context("requeued evaluation panicked")?;
            }
            print_outcome(cli.output, &item, &outcome);
            outcome.is_failure()
        }
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_outcome(format: OutputFormat, item: &VoteItem, outcome: &VoteOutcome) {
    let output = match format {
        OutputFormat::Text => ConsoleFormatter::format(item, outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(item, outcome),
    };
    println!("{}", output);
}
