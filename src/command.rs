//! Script command parsing.

use std::path::PathBuf;

use color_eyre::eyre::{Result, bail};

/// One line of a stagehand script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Copy(Vec<PathBuf>),
    Cut(Vec<PathBuf>),
    Paste(PathBuf),
    Undo,
    Redo,
    Delete(PathBuf),
    Rename { path: PathBuf, name: String },
    Touch(PathBuf),
    Mkdir(PathBuf),
    Dup(PathBuf),
    Status,
    History,
    Clear,
    Help,
}

pub const HELP: &str = "\
Commands:
  copy PATH...       stage paths for copying
  cut PATH...        stage paths for moving
  paste DIR          paste the staged paths into DIR
  undo               undo the last operation
  redo               redo the last undone operation
  delete PATH        delete PATH (to the trash unless --permanent-delete)
  rename PATH NAME   rename PATH to NAME within its directory
  touch PATH         create an empty file
  mkdir PATH         create a directory
  dup PATH           copy PATH next to itself
  status             show the clipboard and history state
  history            list undoable operations
  clear              clear the clipboard
  help               show this help

Arguments containing spaces can be wrapped in double quotes.
Lines starting with '#' are ignored.";

/// Split a line into words, keeping double-quoted runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse one script line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words = tokenize(trimmed)?;
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (name.to_lowercase().as_str(), args) {
        ("copy", paths) if !paths.is_empty() => Command::Copy(to_paths(paths)),
        ("cut", paths) if !paths.is_empty() => Command::Cut(to_paths(paths)),
        ("copy" | "cut", _) => bail!("{name} needs at least one path"),
        ("paste", [dir]) => Command::Paste(dir.into()),
        ("undo", []) => Command::Undo,
        ("redo", []) => Command::Redo,
        ("delete" | "rm", [path]) => Command::Delete(path.into()),
        ("rename" | "mv", [path, new_name]) => Command::Rename {
            path: path.into(),
            name: new_name.clone(),
        },
        ("touch", [path]) => Command::Touch(path.into()),
        ("mkdir", [path]) => Command::Mkdir(path.into()),
        ("dup", [path]) => Command::Dup(path.into()),
        ("status", []) => Command::Status,
        ("history", []) => Command::History,
        ("clear", []) => Command::Clear,
        ("help", []) => Command::Help,
        (
            "paste" | "undo" | "redo" | "delete" | "rm" | "rename" | "mv" | "touch" | "mkdir"
            | "dup" | "status" | "history" | "clear" | "help",
            _,
        ) => bail!("wrong number of arguments for '{name}' (try 'help')"),
        _ => bail!("unknown command '{name}' (try 'help')"),
    };

    Ok(Some(command))
}

fn to_paths(words: &[String]) -> Vec<PathBuf> {
    words.iter().map(PathBuf::from).collect()
}
