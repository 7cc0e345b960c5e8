use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use rhythm_combo::config::StageConfig;
use rhythm_combo::replay::{InputScript, ReplaySession};
use rhythm_combo::util::logging::init_logging;

/// Replay a scripted press log through a stage and print each judgement.
#[derive(Debug, Parser)]
#[command(name = "rhythm-combo", version)]
struct Args {
    /// Stage configuration (JSON). Defaults apply when the file is missing.
    #[arg(short, long, default_value = "stage.json")]
    config: PathBuf,

    /// Press log to replay (JSON).
    #[arg(short, long)]
    script: PathBuf,

    /// Also write logs to a daily-rolling file in this directory.
    #[arg(long, env = "RHYTHM_COMBO_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Show debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_dir.as_deref(), args.verbose)?;

    let config = StageConfig::load_from(&args.config)?;
    debug!(commands = config.commands.len(), "loaded stage config");
    let script = InputScript::load_from(&args.script)?;

    let mut session = ReplaySession::new(&config)?;
    let report = session.run(&script)?;

    for result in &report.results {
        println!("{}", serde_json::to_string(result)?);
    }
    println!(
        "{}",
        serde_json::json!({
            "commands": report.commands,
            "passed_targets": report.passed_targets,
            "score": report.score,
            "accuracy": report.score.accuracy(),
            "gauge": report.gauge,
        })
    );
    Ok(())
}
