//! stagehand - staged copy/move with conflict-free paste and undo.
//!
//! Usage:
//!   stagehand [SCRIPT]            Run commands from SCRIPT (or stdin)
//!   stagehand --json [SCRIPT]     Print results as JSON
//!   stagehand --help              Show help
//!
//! Type `help` at the prompt for the command list.

mod command;

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use stagehand_core::EngineConfig;
use stagehand_ops::{BatchReport, ItemOutcome, Session, UndoOutcome};

use crate::command::{Command, HELP, parse_line};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "STAGEHAND_LOG";

#[derive(Parser)]
#[command(
    name = "stagehand",
    version,
    about = "Staged copy/move with conflict-free paste and undo",
    long_about = "stagehand reads file commands, one per line, from a script or stdin.\n\n\
                  Stage paths with `copy` or `cut`, drop them somewhere with `paste`, \
                  and step back with `undo`. Pasting never overwrites: clashing names \
                  become `name (1).ext`, `name (2).ext`, ..."
)]
struct Cli {
    /// Script to run (defaults to stdin)
    script: Option<PathBuf>,

    /// Config file (defaults to the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of operations that can be undone (0 disables undo)
    #[arg(long)]
    history_limit: Option<usize>,

    /// Delete permanently instead of moving to the trash
    #[arg(long)]
    permanent_delete: bool,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!(?config, "loaded configuration");

    let mut session = Session::new(&config);
    let interactive = cli.script.is_none() && io::stdin().is_terminal();
    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Cannot open script {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut failures = 0usize;
    let mut lines = input.lines();
    loop {
        if interactive {
            print!("stagehand> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;

        let outcome = parse_line(&line)
            .and_then(|command| match command {
                Some(command) => run_command(&mut session, command, cli.json),
                None => Ok(()),
            });
        if let Err(e) = outcome {
            failures += 1;
            eprintln!("error: {e:#}");
        }
    }

    info!(failures, "script finished");
    if failures > 0 && !interactive {
        bail!("{failures} command(s) failed");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the config file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_default()?,
    };

    if let Some(limit) = cli.history_limit {
        config = config.with_history_limit(limit);
    }
    if cli.permanent_delete {
        config = config.with_trash(false);
    }
    config.validate()?;
    Ok(config)
}

fn run_command(session: &mut Session, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Copy(paths) => {
            session.copy(paths);
            print_staged(session, json);
        }
        Command::Cut(paths) => {
            session.cut(paths);
            print_staged(session, json);
        }
        Command::Paste(dir) => {
            if !session.clipboard().has_staged() {
                bail!("clipboard is empty");
            }
            let report = session.paste(&dir);
            print_report("Pasted", &report, json)?;
        }
        Command::Undo => print_undo("undo", "Reverted", session.undo(), json)?,
        Command::Redo => print_undo("redo", "Reapplied", session.redo(), json)?,
        Command::Delete(path) => {
            let bytes = session
                .delete(&path)
                .with_context(|| format!("Cannot delete {}", path.display()))?;
            let verb = if session.uses_trash() {
                "Trashed"
            } else {
                "Deleted"
            };
            print_path_result(verb, &path, Some(bytes), json);
        }
        Command::Rename { path, name } => {
            let new_path = session
                .rename(&path, &name)
                .with_context(|| format!("Cannot rename {}", path.display()))?;
            print_path_result("Renamed to", &new_path, None, json);
        }
        Command::Touch(path) => {
            session
                .create_file(&path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            print_path_result("Created", &path, None, json);
        }
        Command::Mkdir(path) => {
            session
                .create_directory(&path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            print_path_result("Created", &path, None, json);
        }
        Command::Dup(path) => {
            let copy = session
                .duplicate(&path)
                .with_context(|| format!("Cannot duplicate {}", path.display()))?;
            print_path_result("Duplicated to", &copy, None, json);
        }
        Command::Status => print_status(session, json),
        Command::History => print_history(session, json)?,
        Command::Clear => {
            session.clear_clipboard();
            print_staged(session, json);
        }
        Command::Help => println!("{HELP}"),
    }
    Ok(())
}

fn print_staged(session: &Session, json: bool) {
    let clipboard = session.clipboard();
    let mode = clipboard.mode().map(|m| m.to_string());
    if json {
        println!(
            "{}",
            json!({ "clipboard": { "mode": mode, "items": clipboard.items() } })
        );
    } else if clipboard.has_staged() {
        println!(
            "Staged {} item(s) for {}",
            clipboard.len(),
            mode.unwrap_or_default()
        );
    } else {
        println!("Clipboard is empty");
    }
}

fn print_report(verb: &str, report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!(
        "{} {} of {} items ({})",
        verb,
        report.succeeded(),
        report.total(),
        format_size(report.bytes_processed())
    );
    for outcome in &report.outcomes {
        match outcome {
            ItemOutcome::Done {
                source,
                destination: Some(destination),
                ..
            } => println!("  {} -> {}", source.display(), destination.display()),
            ItemOutcome::Done { source, .. } => println!("  {}", source.display()),
            ItemOutcome::Skipped { path, reason } => {
                println!("  skipped {}: {}", path.display(), reason)
            }
        }
    }
    Ok(())
}

fn print_undo(action: &str, verb: &str, outcome: UndoOutcome, json: bool) -> Result<()> {
    match outcome {
        UndoOutcome::Nothing => {
            if json {
                println!("{}", json!({ action: "nothing" }));
            } else {
                println!("Nothing to {action}");
            }
        }
        UndoOutcome::Applied { record, report } => {
            if json {
                println!(
                    "{}",
                    json!({ action: "applied", "record": record, "report": report })
                );
            } else {
                println!("{}: {}", capitalize(action), record.description);
                print_report(verb, &report, false)?;
            }
        }
        UndoOutcome::Unsupported { record, reason } => {
            if json {
                println!(
                    "{}",
                    json!({ action: "unsupported", "record": record, "reason": reason.to_string() })
                );
            } else {
                println!("{reason} ({})", record.description);
            }
        }
    }
    Ok(())
}

fn print_path_result(verb: &str, path: &Path, bytes: Option<u64>, json: bool) {
    if json {
        println!(
            "{}",
            json!({ "action": verb.to_lowercase(), "path": path, "bytes": bytes })
        );
    } else if let Some(bytes) = bytes {
        println!("{verb} {} ({})", path.display(), format_size(bytes));
    } else {
        println!("{verb} {}", path.display());
    }
}

fn print_status(session: &Session, json: bool) {
    let clipboard = session.clipboard();
    let history = session.history();

    if json {
        println!(
            "{}",
            json!({
                "clipboard": {
                    "mode": clipboard.mode().map(|m| m.to_string()),
                    "items": clipboard.items(),
                },
                "history": {
                    "undo": history.undo_len(),
                    "redo": history.redo_len(),
                    "limit": history.max_size(),
                },
            })
        );
        return;
    }

    match clipboard.mode() {
        Some(mode) if clipboard.has_staged() => {
            println!("Clipboard: {} item(s) to {}", clipboard.len(), mode);
            for item in clipboard.items() {
                println!("  {}", item.display());
            }
        }
        _ => println!("Clipboard: empty"),
    }

    println!(
        "History: {} undoable, {} redoable (limit {})",
        history.undo_len(),
        history.redo_len(),
        history.max_size()
    );
    if let Some(record) = history.peek_undo() {
        println!("  next undo: {}", record.kind.undo_description());
    }
    if let Some(record) = history.peek_redo() {
        println!("  next redo: {}", record.description);
    }
}

fn print_history(session: &Session, json: bool) -> Result<()> {
    let history = session.history();
    if json {
        let records: Vec<_> = history.iter().collect();
        println!("{}", serde_json::to_string(&records)?);
        return Ok(());
    }

    if history.undo_len() == 0 {
        println!("No undoable operations");
        return Ok(());
    }
    for record in history.iter().rev() {
        println!(
            "{:>4}  {}  {}",
            record.id,
            record.recorded_at.format("%H:%M:%S"),
            record.description
        );
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
