//! OAuth Harness - OAuth2 social-login endpoint test tool
//!
//! A CLI tool for exercising a backend's social-login exchange endpoint
//! (`POST {base_url}/{provider}/`) with candidate tokens and identity
//! provider credentials.
//!
//! ## Features
//!
//! - Catalog of test cases with expected outcomes, run with pacing
//! - Manual single-token requests
//! - Credential exchange flow with session tracking
//! - Multiple output formats (Table, JSON, CSV)
//!
//! ## Usage
//!
//! ```bash
//! # Run the whole catalog
//! oauth-harness run --base-url http://localhost:9000/api/social
//!
//! # Send one token
//! oauth-harness single --provider github --token gho_xxx
//!
//! # Exchange an identity credential
//! oauth-harness exchange --credential eyJhbGciOi...
//!
//! # List test cases and providers
//! oauth-harness list --detailed --providers
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod cli;
mod config;
mod exchange;
mod executor;
mod http;
mod models;
mod output;
mod results;
mod utils;

use cli::{Args, TargetArgs};
use config::AppConfig;
use exchange::{ExchangeFlow, WidgetEvent};
use executor::Sequencer;
use http::HttpClient;
use models::{test_case, Provider};
use output::{OutputFormat, ResultFormatter};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::resolve(args.config.as_deref())?;
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    init_logger(level);

    match args.command {
        cli::Command::Run(run_args) => {
            run_batch(config, run_args).await?;
        }
        cli::Command::Single(single_args) => {
            run_single(config, single_args).await?;
        }
        cli::Command::Exchange(exchange_args) => {
            run_exchange(config, exchange_args).await?;
        }
        cli::Command::List(list_args) => {
            list_tests(list_args);
        }
        cli::Command::Config(config_args) => {
            manage_config(config, config_args)?;
        }
    }

    Ok(())
}

/// Apply command-line overrides on top of the resolved configuration
fn apply_target(config: &mut AppConfig, target: &TargetArgs) -> Result<()> {
    if let Some(base_url) = &target.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(provider) = &target.provider {
        config.provider = Provider::from_str(provider)
            .ok_or_else(|| anyhow::anyhow!("Unknown provider: {provider}"))?;
    }
    if let Some(timeout) = target.timeout {
        config.timeout_secs = timeout;
    }
    config.validate()?;
    Ok(())
}

fn formatter_for(target: &TargetArgs) -> Result<ResultFormatter> {
    let format = OutputFormat::from_str(&target.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", target.format))?;
    let formatter = ResultFormatter::new(format);
    if target.no_color || target.output.is_some() {
        Ok(formatter.no_color())
    } else {
        Ok(formatter)
    }
}

/// Print to stdout or write to the requested file
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            println!("\n✓ Output written to: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn build_sequencer(config: &AppConfig) -> Result<Sequencer> {
    let client = HttpClient::with_timeout(config.timeout_secs)?;
    let sequencer = Sequencer::new(client, config.endpoint()).with_pacing(config.pacing());
    Ok(match config.log_capacity {
        Some(capacity) => sequencer.with_log_capacity(capacity),
        None => sequencer,
    })
}

async fn run_batch(mut config: AppConfig, args: cli::RunArgs) -> Result<()> {
    apply_target(&mut config, &args.target)?;
    if let Some(pacing_ms) = args.pacing_ms {
        config.pacing_ms = pacing_ms;
    }
    let formatter = formatter_for(&args.target)?;
    let sequencer = build_sequencer(&config)?;

    info!(
        "Testing {} ({} cases, {}ms pacing)",
        config.endpoint().endpoint(),
        test_case::catalog().len(),
        config.pacing_ms
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current request");
            on_interrupt.cancel();
        }
    });

    let summary = sequencer.run_batch(&cancel).await?;

    let summary_text = formatter.format_summary(&summary);
    let text = if formatter.format() == OutputFormat::Table {
        format!(
            "{}\n{}",
            formatter.format_entries(&sequencer.results()),
            summary_text
        )
    } else {
        summary_text
    };
    emit(&text, args.target.output.as_deref())
}

async fn run_single(mut config: AppConfig, args: cli::SingleArgs) -> Result<()> {
    apply_target(&mut config, &args.target)?;
    let formatter = formatter_for(&args.target)?;
    let sequencer = build_sequencer(&config)?;

    let entry = match (&args.case, &args.token) {
        (Some(name), _) => {
            let case = test_case::find(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown test case: {name}"))?;
            sequencer.run_case(case).await?
        }
        (None, Some(token)) => sequencer.run_single(token).await?,
        (None, None) => anyhow::bail!("Either --token or --case is required"),
    };

    emit(&formatter.format_entry(&entry), args.target.output.as_deref())
}

async fn run_exchange(mut config: AppConfig, args: cli::ExchangeArgs) -> Result<()> {
    apply_target(&mut config, &args.target)?;
    if let Some(field) = &args.credential_field {
        config.credential_field = field.clone();
        config.validate()?;
    }
    let formatter = formatter_for(&args.target)?;

    let client = HttpClient::with_timeout(config.timeout_secs)?;
    let mut flow = ExchangeFlow::new(client, config.credential_endpoint());

    let event = match args.widget_error {
        Some(reason) => WidgetEvent::Failed(Some(reason)),
        None => WidgetEvent::Credential(args.credential),
    };
    flow.handle_widget_event(event).await;

    if args.logout {
        flow.logout();
    }

    let text = format!(
        "{}\n{}",
        formatter.format_session(flow.state(), flow.session(), flow.last_error()),
        formatter.format_auth_logs(&flow.logs())
    );
    emit(&text, args.target.output.as_deref())
}

fn list_tests(args: cli::ListArgs) {
    let cases = test_case::catalog();
    println!("\nOAuth Test Cases ({} total)\n", cases.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (index, case) in cases.iter().enumerate() {
        let expectation = if case.expect_success {
            "expect success"
        } else {
            "expect failure"
        };
        if args.detailed {
            println!(
                "  {}. {:16} [{}] token: {}",
                index + 1,
                case.name,
                expectation,
                case.display_token()
            );
            println!("     {}", case.description);
        } else {
            println!("  {}. {}", index + 1, case.name);
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if args.providers {
        println!("Supported Providers:\n");
        for provider in Provider::all() {
            println!("  - {:15} {}", provider.slug(), provider.label());
        }
        println!();
    }
}

fn manage_config(config: AppConfig, args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show => {
            let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
            println!("{yaml}");
            println!("Endpoint: {}", config.endpoint().endpoint());
        }
        cli::ConfigAction::Init { path } => {
            if path.exists() {
                anyhow::bail!("Refusing to overwrite existing file: {}", path.display());
            }
            AppConfig::default().save(&path)?;
            println!("✓ Configuration written to: {}", path.display());
        }
        cli::ConfigAction::Env => {
            config::print_env_help();
            println!();
            config::EnvConfig::load().print_summary();
        }
    }
    Ok(())
}
