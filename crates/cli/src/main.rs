//! CLI for the CareFund escrow guards.
//!
//! `evaluate`: one `{purpose, action, context}` document -> verdict.
//! `replay`: ledger snapshot + NDJSON transactions -> report.

use carefund_core::{CarefundError, GuardConfig};
use carefund_guards::{guard_for, Transition, Verdict};
use carefund_ledger::sink::json_stream::JsonStreamSink;
use carefund_ledger::{LedgerState, LedgerTx, MemoryLedger, ReplayReport};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "carefund", version, about = "Medical crowdfunding escrow guards")]
struct Cli {
    /// Guard configuration (TOML). Built-in defaults when omitted.
    #[arg(short, long, global = true, env = "CAREFUND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a single transition. Exits non-zero when denied.
    Evaluate {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Replay a transaction stream through the reference ledger.
    Replay {
        /// Ledger snapshot (JSON).
        #[arg(short, long)]
        snapshot: PathBuf,

        /// One transaction per line.
        #[arg(short, long)]
        txs: PathBuf,

        /// Sink output: "ndjson" writes NDJSON to stdout,
        /// "ndjson:/path/to/file" writes to file.
        #[arg(long)]
        sink: Option<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum SinkTarget {
    Stdout,
    File(PathBuf),
}

impl SinkTarget {
    fn parse(value: &str) -> Result<Self, CarefundError> {
        if value == "ndjson" {
            Ok(SinkTarget::Stdout)
        } else if let Some(path) = value.strip_prefix("ndjson:") {
            Ok(SinkTarget::File(PathBuf::from(path)))
        } else {
            Err(CarefundError::Config(format!(
                "unknown sink: {value}. Use 'ndjson' or 'ndjson:/path'"
            )))
        }
    }
}

/// Machine-readable verdict for `evaluate --json`.
#[derive(Debug, Serialize)]
struct VerdictOutput {
    guard: String,
    action: &'static str,
    permitted: bool,
    kind: Option<String>,
    reason: Option<String>,
}

impl VerdictOutput {
    fn new(transition: &Transition, verdict: &Verdict) -> Self {
        let (kind, reason) = match verdict {
            Ok(()) => (None, None),
            Err(denial) => (Some(denial.kind().to_string()), Some(denial.to_string())),
        };
        Self {
            guard: guard_for(&transition.purpose).to_string(),
            action: transition.action.name(),
            permitted: verdict.is_ok(),
            kind,
            reason,
        }
    }

    fn render(&self) -> String {
        match (&self.kind, &self.reason) {
            (Some(kind), Some(reason)) => {
                format!("DENY   {} guard / {}: [{kind}] {reason}", self.guard, self.action)
            }
            _ => format!("PERMIT {} guard / {}", self.guard, self.action),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GuardConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let config = GuardConfig::from_toml_str(&text)?;
            tracing::info!(path = %path.display(), "loaded guard config");
            Ok(config)
        }
        None => Ok(GuardConfig::default()),
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate { input, json } => {
            let text = std::fs::read_to_string(&input)?;
            let transition: Transition = serde_json::from_str(&text).map_err(|e| {
                CarefundError::InvalidInput(format!("{}: {e}", input.display()))
            })?;

            let verdict = transition.evaluate(&config);
            let output = VerdictOutput::new(&transition, &verdict);
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", output.render());
            }

            Ok(if output.permitted {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Replay {
            snapshot,
            txs,
            sink,
        } => {
            let sink = sink.as_deref().map(SinkTarget::parse).transpose()?;

            let state = LedgerState::from_json(&std::fs::read_to_string(&snapshot)?)?;
            let txs = LedgerTx::parse_ndjson(&std::fs::read_to_string(&txs)?)?;
            tracing::info!(
                campaigns = state.campaigns.len(),
                txs = txs.len(),
                "starting replay"
            );

            let mut ledger = MemoryLedger::from_state(state, config)?;
            let (report, rows) = ReplayReport::replay(&mut ledger, &txs);
            tracing::info!(
                committed = report.committed,
                aborted = report.total - report.committed,
                elapsed_ms = report.elapsed.as_millis(),
                "replay complete"
            );

            match sink {
                Some(SinkTarget::Stdout) => {
                    let mut s = JsonStreamSink::stdout();
                    s.write_outcomes(&rows)?;
                    s.write_summary(&report.to_summary_row())?;
                    let n = s.finish()?;
                    tracing::info!(rows = n, "ndjson sink: wrote to stdout");
                    // Keep the report visible without polluting the stream.
                    eprint!("{}", report.render());
                }
                Some(SinkTarget::File(path)) => {
                    let file = std::fs::File::create(&path)?;
                    let mut s = JsonStreamSink::new(file);
                    s.write_outcomes(&rows)?;
                    s.write_summary(&report.to_summary_row())?;
                    let n = s.finish()?;
                    tracing::info!(rows = n, path = %path.display(), "ndjson sink: wrote to file");
                    print!("{}", report.render());
                }
                None => print!("{}", report.render()),
            }

            Ok(ExitCode::SUCCESS)
        }
    }
}
