//! Helpers shared by every command.

use std::error::Error;
use std::io::{self, BufRead, Write};

use daymark_core::{AppState, ConfirmKind, Confirmation, Config, SqliteStore};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Log to stderr, filtered by `DAYMARK_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("DAYMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Open the on-disk store with the user's configuration.
pub fn open_app() -> CliResult<AppState<SqliteStore>> {
    let config = Config::load_or_default();
    let store = SqliteStore::open()?;
    Ok(AppState::load(store, config))
}

/// Show a confirmation and read the answer from stdin. Warnings are only
/// shown; they never confirm anything.
pub fn confirm(prompt: &Confirmation, yes: bool) -> io::Result<bool> {
    let mut err = io::stderr().lock();
    writeln!(err, "{}", prompt.title)?;
    writeln!(err, "{}", prompt.message)?;
    if prompt.kind == ConfirmKind::Warning {
        return Ok(false);
    }
    if yes {
        return Ok(true);
    }
    drop(err);

    let answer = ask_line("[y/N]: ")?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Print `prompt` to stderr and read one trimmed line. EOF reads as empty.
pub fn ask_line(prompt: &str) -> io::Result<String> {
    let mut err = io::stderr().lock();
    write!(err, "{prompt}")?;
    err.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
