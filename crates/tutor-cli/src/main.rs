//! Tutor CLI
//!
//! Evaluates a single sandbox result from the command line, or serves the
//! session API over HTTP.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tutor_feedback::{CodeEvalResult, FeedbackConfig, FeedbackEngine, Question, Snapshot, Submission};
use tutor_session::{create_router, AppState};

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 3000;

/// Tutor - feedback for programming exercises
///
/// Turns sandbox evaluation results into hints, explanations and completion
/// messages for students.
#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: tutor.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce feedback for one evaluation result
    Evaluate {
        /// Question file the result was produced for
        #[arg(short, long, value_name = "FILE")]
        question: PathBuf,

        /// Evaluation result, either a bare result or a submission with a line map
        #[arg(short, long, value_name = "FILE")]
        result: PathBuf,

        /// Snapshot recorded by the previous run, for hint escalation
        #[arg(long, value_name = "FILE")]
        previous: Option<PathBuf>,

        /// Write this run's snapshot here
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,

        /// Override the configured execution time limit in seconds
        #[arg(long, value_name = "SECONDS")]
        time_limit: Option<u32>,
    },

    /// Serve the session API
    Serve {
        /// Port for the HTTP API server
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, "Config file");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Evaluate {
            question,
            result,
            previous,
            record,
            time_limit,
        } => {
            if let Some(time_limit) = time_limit {
                config.time_limit_secs = time_limit;
            }
            config.validate()?;

            let feedback = evaluate(
                config,
                &question,
                &result,
                previous.as_deref(),
                record.as_deref(),
            )?;
            println!("{feedback}");
            Ok(())
        }
        Command::Serve { port } => serve(config, port).await,
    }
}

/// Runs one evaluation and returns the feedback as pretty JSON.
fn evaluate(
    config: FeedbackConfig,
    question_path: &Path,
    result_path: &Path,
    previous_path: Option<&Path>,
    record_path: Option<&Path>,
) -> anyhow::Result<String> {
    tracing::info!(question = %question_path.display(), "Loading question");
    let question = Question::load(question_path, config.max_question_size_kb)?;

    let submission = read_submission(result_path)?;
    let previous = previous_path.map(read_snapshot).transpose()?;

    let engine = FeedbackEngine::new(config);
    let feedback = engine.evaluate(&question.tasks, &submission, previous.as_ref())?;

    if let Some(path) = record_path {
        let snapshot = Snapshot::new(submission.result, feedback.clone());
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot to '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "Snapshot recorded");
    }

    Ok(serde_json::to_string_pretty(&feedback)?)
}

/// Reads a submission, accepting a bare evaluation result as well.
fn read_submission(path: &Path) -> anyhow::Result<Submission> {
    let contents = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read result file '{}'\n\nSuggestion: Check the path passed with --result",
            path.display()
        )
    })?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid JSON in result file '{}'", path.display()))?;

    if value.get("result").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        let result: CodeEvalResult = serde_json::from_value(value)?;
        Ok(Submission::new(result))
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let contents = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read snapshot '{}'\n\nSuggestion: Pass the file written by --record on the previous run",
            path.display()
        )
    })?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid snapshot in '{}'", path.display()))
}

/// Serves the session API until Ctrl+C.
async fn serve(config: FeedbackConfig, port: u16) -> anyhow::Result<()> {
    let engine = FeedbackEngine::new(config);
    print_config(engine.config());

    let router = create_router(AppState::new(engine));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port")
    })?;

    println!("Session API running on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, shutting down");
            }
        })
        .await?;
    Ok(())
}

/// Loads configuration from file or defaults.
fn load_config(config_path: Option<&str>) -> anyhow::Result<FeedbackConfig> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            FeedbackConfig::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => FeedbackConfig::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

fn print_config(config: &FeedbackConfig) {
    println!("Configuration loaded:");
    println!("  Time limit: {}s", config.time_limit_secs);
    println!("  Supported libraries: {}", config.supported_libraries_list());
    println!("  Max question size: {}KB", config.max_question_size_kb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_evaluate_args() {
        let args = Args::try_parse_from([
            "tutor",
            "evaluate",
            "--question",
            "q.json",
            "--result",
            "r.json",
            "--time-limit",
            "3",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Command::Evaluate {
                question,
                time_limit,
                previous,
                ..
            } => {
                assert_eq!(question, PathBuf::from("q.json"));
                assert_eq!(time_limit, Some(3));
                assert!(previous.is_none());
            }
            Command::Serve { .. } => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_parse_serve_default_port() {
        let args = Args::try_parse_from(["tutor", "serve"]).unwrap();
        assert!(matches!(args.command, Command::Serve { port: DEFAULT_PORT }));
    }

    #[test]
    fn test_evaluate_records_and_escalates() {
        let question = write_temp(
            "tutor_cli_question.json",
            r#"{"id": "q", "tasks": [{"buggyOutputTests": [
                {"id": "b", "reference": "r", "hints": ["h0", "h1"]}
            ]}]}"#,
        );
        let first = write_temp(
            "tutor_cli_result_1.json",
            r#"{"preprocessedCode": "S1", "taskResults": [{"buggyOutputs": [true]}]}"#,
        );
        let second = write_temp(
            "tutor_cli_result_2.json",
            r#"{"result": {"preprocessedCode": "S2", "taskResults": [{"buggyOutputs": [true]}]}}"#,
        );
        let snapshot = std::env::temp_dir().join("tutor_cli_snapshot.json");

        let output = evaluate(
            FeedbackConfig::default(),
            &question,
            &first,
            None,
            Some(&snapshot),
        )
        .unwrap();
        assert!(output.contains(r#""hintIndex": 0"#));

        let output = evaluate(
            FeedbackConfig::default(),
            &question,
            &second,
            Some(&snapshot),
            None,
        )
        .unwrap();
        assert!(output.contains(r#""hintIndex": 1"#));
        assert!(output.contains("h1"));

        for path in [question, first, second, snapshot] {
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some("/nonexistent/tutor.json")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
