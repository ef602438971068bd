//! Interactive command dispatcher.
//! Loads/merges config, initializes logging, installs the signal handler,
//! builds the session, then runs the prompt loop (or a one-shot command
//! line given with -c). Every command prints the textual message of the
//! outcome it got back from the core.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::debug;

use filedeck::config::{self, Config, LoadResult};
use filedeck::errors::status_message;
use filedeck::listing::ListOptions;
use filedeck::output as out;
use filedeck::session::{EntityProps, Session};
use filedeck::shutdown;

use crate::cli::Args;
use crate::logging::init_tracing;

const HELP: &str = "\
Options:
[pwd] Print Working Directory
[cd] Change Directory
[find] Search Directory (Add -h to search among hidden files too)
[prop] File Properties
[open] Open File
[ls] List (Add -h to list hidden files too)
[touch] Create File
[mkdir] Create Folder
[cp] Copy File/Folder (names..., destination)
[slowcp] Non-parallel copy (for demo purposes)
[mv] Move File/Folder
[rename] Rename File/Folder
[rm] Delete File/Folder
[clear] Clears screen
[exit] Exit
[help] Shows this message
";

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        match config::default_config_path() {
            Ok(p) => {
                out::print_info(&format!("filedeck config path:\n  {}", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info("No config file exists there yet; one will be created on the next run.");
                }
            }
            Err(e) => out::print_error(&format!("Could not determine a config path: {e}")),
        }
        return Ok(());
    }

    let mut cfg = match config::load_or_init()? {
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!("A template filedeck config was written to: {}", path.display()));
            out::print_info("Edit it to set `start_dir`, `log_level`, `log_file`, `show_hidden` and `worker_threads`.");
            Config::default()
        }
        LoadResult::Loaded(cfg) => cfg,
    };
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so it can be dropped (and
    // flushed) on interrupt.
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)?;
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })?;
    }

    let start_dir = cfg
        .start_dir
        .clone()
        .map(Ok)
        .unwrap_or_else(std::env::current_dir)?;
    let mut session = match Session::new(&start_dir) {
        Ok(s) => s,
        Err(e) => {
            out::print_error(&format!("Cannot open session in '{}': {}", start_dir.display(), e));
            anyhow::bail!("session start failed");
        }
    };
    debug!(start = %session.pwd(), "session opened");

    if let Some(line) = args.command.as_deref() {
        for command in line.split(';') {
            if dispatch(&mut session, &cfg, command) == Flow::Exit {
                break;
            }
        }
        return Ok(());
    }

    out::print_user(HELP);
    let stdin = std::io::stdin();
    let mut input = String::new();
    loop {
        if shutdown::is_requested() {
            break;
        }
        print!("Prompt: ");
        let _ = std::io::stdout().flush();

        input.clear();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(_) => {
                // Interrupted read; the shutdown flag decides on the next turn.
                continue;
            }
        }
        if dispatch(&mut session, &cfg, &input) == Flow::Exit {
            break;
        }
        out::print_user("");
    }

    session.drain();
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    Ok(())
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Exit,
}

fn list_opts(cfg: &Config, args: &[&str]) -> ListOptions {
    ListOptions {
        show_hidden: cfg.show_hidden || args.contains(&"-h"),
    }
}

fn dispatch(session: &mut Session, cfg: &Config, line: &str) -> Flow {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&cmd, rest)) = words.split_first() else {
        return Flow::Continue;
    };

    match cmd.to_ascii_lowercase().as_str() {
        "pwd" => out::print_user(&session.pwd()),

        "cd" => match rest {
            [] => out::print_user(&status_message(&session.cd("~"))),
            [dest] => out::print_user(&status_message(&session.cd(dest))),
            _ => out::print_user("Too many arguments"),
        },

        "find" => {
            let pattern: Vec<&str> = rest.iter().copied().filter(|a| *a != "-h").collect();
            match pattern.as_slice() {
                [] => out::print_user("Missing Arguments"),
                [pattern] => match session.find(pattern, list_opts(cfg, rest)) {
                    Ok(found) if found.is_empty() => out::print_user("Not Found"),
                    Ok(found) => {
                        for name in found {
                            out::print_user(&format!("Found {name}"));
                        }
                    }
                    Err(e) => out::print_user(&e.to_string()),
                },
                _ => out::print_user("Too many arguments"),
            }
        }

        "prop" => match rest {
            [] => out::print_user("Missing Arguments"),
            [name] => match session.properties(name) {
                Ok(props) => print_props(&props),
                Err(e) => out::print_user(&e.to_string()),
            },
            _ => out::print_user("Too many arguments"),
        },

        "open" => match rest {
            [] => out::print_user("Missing Arguments"),
            [name] => out::print_user(&status_message(&session.open_external(name))),
            _ => out::print_user("Too many arguments"),
        },

        "ls" => {
            if rest.len() > 1 || (rest.len() == 1 && rest[0] != "-h") {
                out::print_user("Invalid argument");
                return Flow::Continue;
            }
            let opts = list_opts(cfg, rest);
            match (session.list_dirs(opts), session.list_files(opts)) {
                (Ok(dirs), Ok(files)) => {
                    if dirs.is_empty() {
                        out::print_user("No Folders here");
                    } else {
                        out::print_user("Folders:");
                        for d in dirs {
                            out::print_user(&d);
                        }
                        out::print_user("");
                    }
                    if files.is_empty() {
                        out::print_user("No Files here");
                    } else {
                        out::print_user("Files:");
                        for f in files {
                            out::print_user(&f);
                        }
                    }
                }
                (Err(e), _) | (_, Err(e)) => out::print_user(&e.to_string()),
            }
        }

        "touch" => match owned(rest) {
            names if names.is_empty() => out::print_user("Missing Arguments"),
            names => out::print_user(&status_message(&session.create_files(".", &names))),
        },

        "mkdir" => match owned(rest) {
            names if names.is_empty() => out::print_user("Missing Arguments"),
            names => out::print_user(&status_message(&session.create_dirs(".", &names))),
        },

        "cp" => match split_dest(rest) {
            Some((names, dest)) => out::print_user(&status_message(&session.copy(&names, dest))),
            None => out::print_user("Insufficient Arguments"),
        },

        "slowcp" => match split_dest(rest) {
            Some((names, dest)) => {
                out::print_user(&status_message(&session.copy_sync(&names, dest)))
            }
            None => out::print_user("Insufficient Arguments"),
        },

        "mv" => match split_dest(rest) {
            Some((names, dest)) => {
                out::print_user(&status_message(&session.move_entries(&names, dest)))
            }
            None => out::print_user("Insufficient Arguments"),
        },

        "rename" => match rest {
            [old, new] => out::print_user(&status_message(&session.rename(old, new))),
            [] | [_] => out::print_user("Insufficient Arguments"),
            _ => out::print_user("Too many Arguments"),
        },

        "rm" => match owned(rest) {
            names if names.is_empty() => out::print_user("Missing Arguments"),
            names => out::print_user(&status_message(&session.delete(&names))),
        },

        "clear" => {
            // ANSI escape sequence to clear the screen and home the cursor.
            print!("\x1b[H\x1b[2J");
            let _ = std::io::stdout().flush();
        }

        "exit" => return Flow::Exit,

        "help" => out::print_user(HELP),

        _ => out::print_user("Invalid Choice"),
    }
    Flow::Continue
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// `cp`/`mv` style argument split: all but the last word are names, the
/// last is the destination. Needs at least one of each.
fn split_dest<'a>(args: &[&'a str]) -> Option<(Vec<String>, &'a str)> {
    match args.split_last() {
        Some((&dest, names)) if !names.is_empty() => Some((owned(names), dest)),
        _ => None,
    }
}

fn fmt_time(t: Option<SystemTime>) -> String {
    match t {
        Some(t) => DateTime::<Local>::from(t).format("%d/%m/%y %H:%M:%S").to_string(),
        None => "unavailable".to_string(),
    }
}

fn print_props(props: &EntityProps) {
    out::print_user(&format!("Name: {}", props.name));
    out::print_user(&format!(
        "Type: {}",
        if props.is_dir { "Folder" } else { "File" }
    ));
    out::print_user(&format!("Size: {} bytes", props.size));
    out::print_user(&format!("Creation time: {}", fmt_time(props.created)));
    out::print_user(&format!("Last access time: {}", fmt_time(props.accessed)));
    out::print_user(&format!("Last modified time: {}", fmt_time(props.modified)));
    out::print_user(&format!("Writable: {}", !props.readonly));
}
