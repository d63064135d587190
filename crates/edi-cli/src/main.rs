//! # edi-cli
//!
//! The `x12` command-line tool.
//!
//! Parses raw interchanges to JSON, validates their envelope structure,
//! generates enveloped outbound documents from JSON or YAML input and
//! administers the persisted control-number counters.

mod config;

use anyhow::{Context, Result, anyhow, ensure};
use clap::{Parser, Subcommand};
use config::CliConfig;
use edi_adapter_x12::{
    ControlNumberAllocator, CounterOverrides, Delimiters, FileControlNumberAllocator,
    OutboundDocument, PartyId, TransactionSetType, X12Generator, X12Parser,
};
use edi_validation::{StrictnessLevel, ValidationConfig, ValidationEngine, ValidationReporter};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status for an input that failed validation
const EXIT_INVALID: u8 = 1;
/// Exit status for a fatal error (bad config, unreadable input, ...)
const EXIT_FATAL: u8 = 3;

#[derive(Parser)]
#[command(name = "x12")]
#[command(about = "ANSI X12 parser, validator and generator")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Control-number file, overriding the configuration
    #[arg(long, global = true)]
    counters: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an X12 file and print the outcome as JSON
    Parse {
        /// Input file path, or - for stdin
        input: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Check envelope structure and trailer counts
    Validate {
        /// Input file path, or - for stdin
        input: PathBuf,

        /// Treat warnings as failures
        #[arg(long, conflicts_with = "lenient")]
        strict: bool,

        /// Report broken envelope nesting as warnings
        #[arg(long)]
        lenient: bool,

        /// Stop collecting errors after this many (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        max_errors: usize,
    },

    /// Generate an enveloped document from JSON or YAML input
    Generate {
        /// Input file path (.json, .yaml or .yml), or - for JSON on stdin
        input: PathBuf,

        /// Transaction set code (810, 855, 856, 940, 945, 947)
        #[arg(short, long)]
        doc_type: String,

        /// Interchange sender as ID or QUALIFIER:ID
        #[arg(long)]
        sender: Option<PartyId>,

        /// Interchange receiver as ID or QUALIFIER:ID
        #[arg(long)]
        receiver: Option<PartyId>,

        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change the persisted control numbers
    Counters {
        #[command(subcommand)]
        action: CounterAction,
    },
}

#[derive(Subcommand)]
enum CounterAction {
    /// Print the next control numbers as JSON
    Show,
    /// Set the next value of one or more counters
    Set {
        #[arg(long)]
        interchange: Option<u64>,
        #[arg(long)]
        group: Option<u64>,
        #[arg(long)]
        transaction: Option<u64>,
    },
    /// Restart every counter at 1
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("ERROR: {error:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { input, pretty } => {
            let raw = read_input(&input)?;
            let outcome = X12Parser::with_options(config.parse_options()).parse(&raw);
            let json = if pretty {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string(&outcome)?
            };
            println!("{json}");
            eprintln!(
                "Parse summary: interchanges={}, transactions={}, anomalies={}, errors={}",
                outcome.interchanges.len(),
                outcome.transactions().count(),
                outcome.anomalies.len(),
                outcome.errors.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate {
            input,
            strict,
            lenient,
            max_errors,
        } => {
            let strictness = if strict {
                StrictnessLevel::Strict
            } else if lenient {
                StrictnessLevel::Lenient
            } else {
                StrictnessLevel::Moderate
            };
            let raw = read_input(&input)?;
            let outcome = X12Parser::with_options(config.parse_options()).parse(&raw);
            let result = ValidationEngine::with_config(ValidationConfig {
                strictness,
                max_errors,
            })
            .validate(&outcome);

            print!("{}", ValidationReporter::new().render(&result));
            Ok(if result.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_INVALID)
            })
        }
        Commands::Generate {
            input,
            doc_type,
            sender,
            receiver,
            output,
        } => {
            let kind = TransactionSetType::from_code(&doc_type)
                .ok_or_else(|| anyhow!("unknown transaction set code {doc_type}"))?;
            let sender = sender
                .or_else(|| config.sender.clone())
                .context("no sender given on the command line or in the config")?;
            let receiver = receiver
                .or_else(|| config.receiver.clone())
                .context("no receiver given on the command line or in the config")?;

            let document = OutboundDocument::from_value(kind, read_document(&input)?)
                .with_context(|| format!("invalid {kind} input {}", input.display()))?;

            let allocator = open_counters(&config, cli.counters.as_deref())?;
            let generator = X12Generator::new(Arc::new(allocator))
                .with_delimiters(Delimiters::default().with_overrides(&config.delimiters))
                .with_options(config.envelope.clone());
            let edi = generator.generate(&document, &sender, &receiver)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &edi)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), transaction_set = kind.code(), "Wrote interchange");
                }
                None => print!("{edi}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Counters { action } => {
            let allocator = open_counters(&config, cli.counters.as_deref())?;
            match action {
                CounterAction::Show => {}
                CounterAction::Set {
                    interchange,
                    group,
                    transaction,
                } => {
                    let overrides = CounterOverrides {
                        interchange,
                        group,
                        transaction,
                    };
                    ensure!(
                        overrides != CounterOverrides::default(),
                        "counters set needs at least one of --interchange, --group, --transaction"
                    );
                    allocator.set_counters(overrides)?;
                }
                CounterAction::Reset => allocator.reset()?,
            }
            println!("{}", serde_json::to_string_pretty(&allocator.current()?)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_counters(config: &CliConfig, explicit: Option<&Path>) -> Result<FileControlNumberAllocator> {
    let path = config.counter_file(explicit);
    debug!(path = %path.display(), "Opening control-number file");
    FileControlNumberAllocator::new(&path)
        .with_context(|| format!("opening control numbers {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Structured document input; YAML by extension, JSON otherwise
fn read_document(path: &Path) -> Result<serde_json::Value> {
    let text = read_input(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}
