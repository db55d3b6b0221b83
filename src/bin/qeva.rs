//! qeva CLI
//!
//! Compile QGL, score TGIR graphs and validate deliverables from the shell.
//! Every command prints the JSON reply and exits non-zero when `ok` is false.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value as Json};
use tracing_subscriber::EnvFilter;

use qeva::api::{handle_compile, handle_score, handle_validate};
use qeva::Config;

#[derive(Parser)]
#[command(name = "qeva")]
#[command(about = "QGL compiler, TGIR scorer and deliverable validator", long_about = None)]
struct Cli {
    /// JSON config file (defaults come from the environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `qeva=debug`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a QGL program into TGIR
    Compile {
        /// QGL source file, stdin when omitted or `-`
        input: Option<PathBuf>,
    },
    /// Score a TGIR graph
    Score {
        /// TGIR JSON file, stdin when omitted or `-`
        input: Option<PathBuf>,
        /// Treat the input as QGL source and compile it first
        #[arg(long)]
        qgl: bool,
    },
    /// Validate a SlideDeck, OnePager or Flashcards document
    Validate {
        /// Document JSON file, stdin when omitted or `-`
        input: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = match &cli.config {
        Some(path) => {
            let src = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_json_str(&src)?
        }
        None => Config::from_env()?,
    };
    tracing::debug!(?config, "loaded configuration");

    let text = read_input(cli.command.input())?;
    let reply = run(&cli.command, &text, &config)?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(if succeeded(&reply) { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

impl Commands {
    fn input(&self) -> Option<&PathBuf> {
        match self {
            Commands::Compile { input } | Commands::Score { input, .. } | Commands::Validate { input } => {
                input.as_ref()
            }
        }
    }
}

/// Run one command over its input text and return the JSON reply.
///
/// Only unreadable input is an `Err`; every domain failure is a reply with
/// `ok: false`.
fn run(command: &Commands, text: &str, config: &Config) -> Result<Json> {
    let reply = match command {
        Commands::Compile { .. } => handle_compile(&json!({ "source": text }), config),
        Commands::Score { qgl: true, .. } => {
            let compiled = handle_compile(&json!({ "source": text }), config);
            if !succeeded(&compiled) {
                return Ok(compiled);
            }
            handle_score(&json!({ "tgir": compiled["tgir"] }), config)
        }
        Commands::Score { qgl: false, .. } => handle_score(&json!({ "tgir": parse_json(text)? }), config),
        Commands::Validate { .. } => handle_validate(&parse_json(text)?, config),
    };
    Ok(reply)
}

/// The process exits zero only for a reply with `ok: true`.
fn succeeded(reply: &Json) -> bool {
    reply["ok"] == json!(true)
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qeva=info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn parse_json(text: &str) -> Result<Json> {
    serde_json::from_str(text).context("input is not valid JSON")
}
