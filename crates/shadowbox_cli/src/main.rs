//! SHADOWBOX CLI
//!
//! Demo harness: drives a snapshot sandbox over a JSON target and prints the
//! target after every step.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod logging;
mod script;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use logging::LogFormat;
use script::{Script, ScriptRunner, TranscriptEntry};
use shadowbox_sandbox::SandboxConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shadowbox")]
#[command(about = "SHADOWBOX - snapshot sandbox demo harness", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,
    /// Log every sandbox transition
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in window walkthrough
    Demo,
    /// Run a step script against a target
    Run {
        /// JSON object used as the shared target
        #[arg(short, long)]
        target: PathBuf,
        /// JSON array of steps
        #[arg(short, long)]
        script: PathBuf,
        /// Leave baseline keys the guest deleted in place
        #[arg(long)]
        keep_deletions: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Demo => {
            let config = SandboxConfig::new().with_label("demo");
            let mut runner = ScriptRunner::new(&script::demo_target(), config);
            let transcript = runner.run(&Script::demo())?;
            print_transcript(&transcript)
        }
        Commands::Run {
            target,
            script: script_path,
            keep_deletions,
        } => {
            let target_json = script::read_json(&target)?;
            let steps = Script::load(&script_path)?;
            let config = SandboxConfig::new()
                .with_label(script_path.display().to_string())
                .with_restore_deleted_keys(!keep_deletions);
            let mut runner = ScriptRunner::new(&target_json, config);
            let transcript = runner.run(&steps)?;
            tracing::info!(
                sandbox = %runner.sandbox().id(),
                steps = transcript.len(),
                pending = runner.sandbox().pending_changes().len(),
                "script finished"
            );
            print_transcript(&transcript)
        }
    }
}

fn print_transcript(transcript: &[TranscriptEntry]) -> Result<()> {
    for entry in transcript {
        println!(
            "{:>3} {:<10} [{}] {}",
            entry.step,
            entry.op,
            entry.state,
            serde_json::to_string(&entry.target)?
        );
    }
    Ok(())
}
