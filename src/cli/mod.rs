//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Minimal unit-test execution engine
#[derive(Parser, Debug)]
#[command(name = "unitpool")]
#[command(version)]
#[command(about = "Run registered test collections on a worker pool and write a report")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every registered collection and write the report
    Run(RunArgs),

    /// List registered collections and their tests
    List(ListArgs),

    /// Show supported environment variables
    Env,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Report file path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Number of tests run concurrently within a collection
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Report format (text, json, json-pretty, csv)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Exit with an error status when any test fails
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show test names for each collection
    #[arg(short, long)]
    pub detailed: bool,
}
