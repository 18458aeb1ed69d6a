//! Roundtable - round-robin multi-agent code development CLI
//!
//! The `roundtable` command passes a programming task around a fixed roster
//! (writer, reviewer, optimizer) for a fixed number of rounds.
//!
//! ## Commands
//!
//! - `run`: develop code for one task
//! - `demo`: run the built-in Fibonacci task, optionally followed by `interactive`
//! - `interactive`: read tasks from the terminal until `quit`

mod console;
mod personas;
mod render;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use roundtable_core::{ChatClient, RunReport, TurnSequencer, METRICS};
use roundtable_gemini::{GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use tracing::{info, Level};

use console::SharedLines;
use personas::Role;
use session::{RunSettings, SAMPLE_TASK};

#[derive(Parser)]
#[command(name = "roundtable")]
#[command(author = "Roundtable Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Round-robin multi-agent code development", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Model and roster settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "ROUNDTABLE_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Gemini API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Extra attempts for retryable model errors
    #[arg(long, default_value_t = 2, global = true)]
    max_retries: u32,

    /// Sampling temperature
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Speaking order, comma separated
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values = ["writer", "reviewer", "optimizer"],
        global = true
    )]
    roster: Vec<Role>,

    /// Full passes through the roster per task
    #[arg(long, default_value_t = 3, global = true)]
    max_rounds: u32,

    /// Exact number of turns per task; overrides --max-rounds
    #[arg(long, global = true)]
    max_turns: Option<u32>,

    /// Wall-clock budget for a whole run, in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl ModelArgs {
    fn settings(&self) -> RunSettings {
        let settings = match self.max_turns {
            Some(max_turns) => RunSettings::turns(max_turns),
            None => RunSettings::rounds(self.max_rounds, self.roster.len()),
        };
        settings.with_timeout(self.timeout_secs.map(Duration::from_secs))
    }

    fn gemini_config(&self) -> Result<GeminiConfig> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            bail!("GEMINI_API_KEY is not set; export it or pass --api-key");
        };
        let mut config = GeminiConfig::new(api_key)
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_max_retries(self.max_retries);
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Develop code for one task
    Run {
        /// Task description
        #[arg(short, long, conflicts_with = "task_file", required_unless_present = "task_file")]
        task: Option<String>,

        /// Read the task description from a file
        #[arg(long)]
        task_file: Option<PathBuf>,

        /// Write the run report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the transcript as Markdown
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Run the built-in Fibonacci sample task
    Demo {
        /// Continue with an interactive session afterwards
        #[arg(long)]
        then_interactive: bool,
    },

    /// Read tasks from the terminal until `quit`, `exit` or EOF
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    roundtable_core::init_tracing(cli.json, level);

    let input = console::stdin_lines();
    let sequencer = build_sequencer(&cli.model, &input)?;
    let settings = cli.model.settings();

    let result = match cli.command {
        Commands::Run {
            task,
            task_file,
            output,
            markdown,
        } => {
            let task = resolve_task(task, task_file.as_deref())?;
            cmd_run(&sequencer, &task, settings, output.as_deref(), markdown.as_deref()).await
        }
        Commands::Demo { then_interactive } => {
            cmd_demo(&sequencer, settings, then_interactive.then_some(&input)).await
        }
        Commands::Interactive => cmd_interactive(&sequencer, settings, &input).await,
    };

    METRICS.flush();
    result
}

fn build_sequencer(args: &ModelArgs, input: &SharedLines) -> Result<TurnSequencer> {
    let client: Option<Arc<dyn ChatClient>> = if personas::needs_model(&args.roster) {
        let config = args.gemini_config()?;
        info!(model = %config.model, "using gemini");
        Some(Arc::new(
            GeminiClient::new(config).context("Failed to create Gemini client")?,
        ))
    } else {
        None
    };

    let roster = personas::build_roster(&args.roster, client, input)?;
    TurnSequencer::new(roster).context("Invalid roster")
}

fn resolve_task(task: Option<String>, task_file: Option<&Path>) -> Result<String> {
    let task = match (task, task_file) {
        (Some(task), _) => task,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file: {:?}", path))?,
        (None, None) => bail!("either --task or --task-file is required"),
    };
    let task = task.trim().to_string();
    if task.is_empty() {
        bail!("task is empty");
    }
    Ok(task)
}

/// Develop code for one task; fails when the run ends in a failed turn.
async fn cmd_run(
    sequencer: &TurnSequencer,
    task: &str,
    settings: RunSettings,
    output: Option<&Path>,
    markdown: Option<&Path>,
) -> Result<()> {
    let report = session::execute_task(sequencer, task, settings).await?;
    save_report(&report, output, markdown)?;

    if let Some(failure) = report.failure() {
        bail!("run {} failed: {failure}", report.run_id);
    }
    Ok(())
}

fn save_report(report: &RunReport, output: Option<&Path>, markdown: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        roundtable_core::write_report_json(path, report)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        println!("Report written to {:?}", path);
    }
    if let Some(path) = markdown {
        roundtable_core::write_transcript_md(path, report)
            .with_context(|| format!("Failed to write transcript: {:?}", path))?;
        println!("Transcript written to {:?}", path);
    }
    Ok(())
}

/// Run the sample task, optionally followed by an interactive session.
async fn cmd_demo(
    sequencer: &TurnSequencer,
    settings: RunSettings,
    then_interactive: Option<&SharedLines>,
) -> Result<()> {
    let report = session::execute_task(sequencer, SAMPLE_TASK, settings).await?;
    if let Some(input) = then_interactive {
        session::interactive_session(sequencer, settings, input).await?;
    }
    if let Some(failure) = report.failure() {
        bail!("demo run {} failed: {failure}", report.run_id);
    }
    Ok(())
}

async fn cmd_interactive(
    sequencer: &TurnSequencer,
    settings: RunSettings,
    input: &SharedLines,
) -> Result<()> {
    session::interactive_session(sequencer, settings, input).await?;
    Ok(())
}
