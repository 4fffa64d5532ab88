//! unitpool - run registered test collections and write a report
//!
//! ## Usage
//!
//! ```bash
//! # Run every collection and write test.report
//! unitpool run
//!
//! # Four workers per collection, JSON report, fail the process on test failures
//! unitpool run --workers 4 --format json --output report.json --strict
//!
//! # List collections and their tests
//! unitpool list --detailed
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

mod cli;
mod suites;

use cli::Args;
use unitpool::config::{print_env_help, AppConfig, EnvConfig};
use unitpool::output::{write_report, OutputFormat, ResultFormatter};
use unitpool::utils::{init_logger, LogLevel};
use unitpool::TestRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        cli::Command::Run(run_args) => {
            run_tests(run_args, args.verbose).await?;
        }
        cli::Command::List(list_args) => {
            init_logger(LogLevel::resolve(args.verbose, "warn"));
            list_tests(list_args)?;
        }
        cli::Command::Env => {
            print_env_help();
        }
    }

    Ok(())
}

fn load_config(args: &cli::RunArgs) -> Result<AppConfig> {
    let env = EnvConfig::load();

    let config = match args.config.as_ref().or(env.config_file.as_ref()) {
        Some(path) => {
            AppConfig::load(path).with_context(|| format!("Failed to load config {path}"))?
        }
        None => AppConfig::default(),
    };
    let mut config = config.merge_env(&env);

    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(output) = &args.output {
        config.report_path = output.clone();
    }
    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if args.strict {
        config.strict_exit = true;
    }

    Ok(config)
}

async fn run_tests(args: cli::RunArgs, verbose: bool) -> Result<()> {
    let config = load_config(&args)?;
    init_logger(LogLevel::resolve(verbose, &config.log_level));

    let format = OutputFormat::from_str(&config.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown report format: {}", config.format))?;

    let mut registry = TestRegistry::with_workers(config.workers);
    suites::register_all(&mut registry)?;

    info!(
        "Running {} collections with {} workers",
        registry.len(),
        registry.workers()
    );
    registry.run_all().await?;

    let report = ResultFormatter::new(format).render(&mut registry).await?;
    write_report(&config.report_path, &report)?;
    info!("Report written to {}", config.report_path);

    let console = ResultFormatter::new(OutputFormat::Text);
    let mut failed = 0;
    let mut total = 0;
    for summary in registry.summaries().await? {
        println!("{}", console.format_summary(&summary));
        failed += summary.failed;
        total += summary.total;
    }

    if failed > 0 {
        warn!("{} of {} tests failed", failed, total);
        if config.strict_exit {
            anyhow::bail!("{failed} of {total} tests failed");
        }
    }

    Ok(())
}

fn list_tests(args: cli::ListArgs) -> Result<()> {
    let mut registry = TestRegistry::with_workers(1);
    suites::register_all(&mut registry)?;

    println!("\nRegistered Test Collections ({} total)\n", registry.len());

    for collection in registry.collections() {
        println!("  {} ({} tests)", collection.name(), collection.len());
        if args.detailed {
            for name in collection.unit_names() {
                println!("    - {name}");
            }
        }
    }
    println!();

    registry.reset();
    Ok(())
}
