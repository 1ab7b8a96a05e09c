//! Command-line front end for pokeui.
//!
//! Loads documents from a directory and inspects or tests them by label.
//!
//! # Usage
//!
//! ```bash
//! # List every candidate element and its labels
//! pokeui --root site labels test-pages/matching.html
//!
//! # Only buttons
//! pokeui --root site labels test-pages/matching.html --category button
//!
//! # Count matches, failing unless there are exactly two
//! pokeui --root site count test-pages/matching.html button '^=Button' --expect 2
//!
//! # Regex labels
//! pokeui --root site count test-pages/matching.html area 'region' --regex --flags i
//!
//! # Run a JSON plan (documents resolve against the plan's directory)
//! pokeui run plans/smoke.json
//!
//! # Machine-readable output
//! pokeui --format json run plans/smoke.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pokeui_core::config::EngineConfig;
use pokeui_core::host::DirectoryHost;
use pokeui_core::label::{candidates_of, ElementCategory};
use pokeui_core::navigation::Location;
use pokeui_core::pattern::MatchExpression;
use pokeui_core::plan::Plan;
use pokeui_core::suite::{Outcome, RunReport};
use pokeui_core::ui::Ui;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Label-driven UI testing from the command line.
#[derive(Parser)]
#[command(name = "pokeui")]
#[command(about = "Inspect and test documents by the labels people see")]
#[command(version)]
struct Cli {
    /// Directory documents are loaded from
    #[arg(short, long, global = true, env = "POKEUI_ROOT")]
    root: Option<PathBuf>,

    /// Engine settings file (defaults to ~/.pokeui/config.json)
    #[arg(short, long, global = true, env = "POKEUI_CONFIG")]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List candidate elements and their labels
    Labels {
        /// Document path relative to the root
        page: String,
        /// Only this category: button, "form field", area, decoration, link or *
        #[arg(short = 'C', long, default_value = "*")]
        category: ElementCategory,
    },

    /// Count elements matching a label
    Count {
        /// Document path relative to the root
        page: String,
        /// Category: button, "form field", area, decoration, link or *
        category: ElementCategory,
        /// Label text, optionally prefixed with ^=, $= or *=
        label: String,
        /// Treat the label as a regular expression
        #[arg(long)]
        regex: bool,
        /// Regex flags, e.g. "i"
        #[arg(long, default_value = "")]
        flags: String,
        /// Fail unless exactly this many elements match
        #[arg(short, long)]
        expect: Option<usize>,
    },

    /// Run a JSON plan
    Run {
        /// Path to the plan file
        plan: PathBuf,
    },
}

#[derive(Debug)]
enum CliError {
    Failed(String),
    Load(String),
    Plan(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Failed(_) => ExitCode::from(1),
            CliError::Load(_) => ExitCode::from(2),
            CliError::Plan(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Failed(msg) => write!(f, "Check failed: {}", msg),
            CliError::Load(msg) => write!(f, "Load error: {}", msg),
            CliError::Plan(msg) => write!(f, "Plan error: {}", msg),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => EngineConfig::load_from(path)
            .map_err(|e| CliError::Load(format!("Cannot read config {}: {}", path.display(), e))),
        None => Ok(EngineConfig::load()),
    }
}

async fn load_ui(root: &Path, page: &str, config: EngineConfig) -> Result<Ui, CliError> {
    let host = Arc::new(DirectoryHost::new(root));
    let location = Location::parse(page).map_err(|e| CliError::Load(e.to_string()))?;
    debug!(root = %root.display(), %location, "loading document");
    Ui::load(host, location, config)
        .await
        .map_err(|e| CliError::Load(e.to_string()))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Command::Labels { ref page, category } => {
            let ui = load_ui(&root, page, config).await?;
            let doc = ui.document();
            let candidates = candidates_of(doc, category, ui.config().area_policy);
            if cli.format == OutputFormat::Json {
                let json: Vec<_> = candidates
                    .iter()
                    .map(|candidate| {
                        serde_json::json!({
                            "node": candidate.node,
                            "element": doc.describe(candidate.node),
                            "labels": candidate.labels,
                        })
                    })
                    .collect();
                print_json(serde_json::Value::Array(json))?;
            } else {
                for candidate in &candidates {
                    println!("{}\t{}", doc.describe(candidate.node), candidate.labels.join(" | "));
                }
                if !cli.quiet {
                    eprintln!("{} {} candidates", candidates.len(), category);
                }
            }
            Ok(())
        }

        Command::Count {
            ref page,
            category,
            ref label,
            regex,
            ref flags,
            expect,
        } => {
            let expr = if regex {
                MatchExpression::regex(label, flags).map_err(|e| CliError::Load(e.to_string()))?
            } else {
                MatchExpression::from(label.as_str())
            };
            let ui = load_ui(&root, page, config).await?;
            let matches = ui.matching(category, &expr);

            if cli.format == OutputFormat::Json {
                print_json(serde_json::json!({
                    "category": category,
                    "label": expr,
                    "count": matches.len(),
                    "matches": matches.iter().map(|found| serde_json::json!({
                        "node": found.node,
                        "element": ui.document().describe(found.node),
                        "label": found.label,
                    })).collect::<Vec<_>>(),
                }))?;
            } else {
                println!("{}", matches.len());
                if !cli.quiet {
                    for found in &matches {
                        eprintln!("  {}\t{}", ui.document().describe(found.node), found.label);
                    }
                }
            }

            match expect {
                Some(expected) if expected != matches.len() => Err(CliError::Failed(format!(
                    "Expected {} {} elements matching {}, found {}",
                    expected,
                    category,
                    expr,
                    matches.len()
                ))),
                _ => Ok(()),
            }
        }

        Command::Run { ref plan } => {
            let loaded = Plan::load(plan).await.map_err(|e| CliError::Plan(e.to_string()))?;
            let root = match cli.root {
                Some(ref root) => root.clone(),
                None => plan
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };
            debug!(root = %root.display(), use_cases = loaded.use_case_count(), "running plan");

            let host = Arc::new(DirectoryHost::new(root));
            let report = loaded.into_runner(host, config).run().await;

            if cli.format == OutputFormat::Json {
                print_json(serde_json::to_value(&report).map_err(|e| CliError::Load(e.to_string()))?)?;
            } else {
                print_report(&report, cli.quiet);
            }

            if report.passed() {
                Ok(())
            } else {
                Err(CliError::Failed(format!("{} use-case(s) failed", report.failed_count())))
            }
        }
    }
}

fn print_json(value: serde_json::Value) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&value).map_err(|e| CliError::Load(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_report(report: &RunReport, quiet: bool) {
    if !quiet {
        for suite in &report.suites {
            let cleared = if suite.cleared { " (cleared)" } else { "" };
            println!("{}{}", suite.document, cleared);
            for use_case in &suite.use_cases {
                match &use_case.outcome {
                    Outcome::Passed => println!("  PASS {} ({}ms)", use_case.name, use_case.duration_ms),
                    Outcome::Failed(message) => println!("  FAIL {}: {}", use_case.name, message),
                    Outcome::Skipped => println!("  SKIP {}", use_case.name),
                }
            }
        }
    }
    println!(
        "{} passed, {} failed, {} skipped",
        report.passed_count(),
        report.failed_count(),
        report.skipped_count()
    );
}
