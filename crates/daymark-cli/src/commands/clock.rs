//! Foreground focus timer and stopwatch.
//!
//! The clock runs in the terminal: a [`Ticker`] drives `tick`, stdin
//! carries commands, and Ctrl-C behaves like `q`.

use std::io::Write;

use clap::Args;
use daymark_core::stats::format_duration;
use daymark_core::timer::{format_clock, parse_clock_input};
use daymark_core::{
    AppState, Confirmation, Event, Gate, KvStore, Panel, ScheduleFilter, Ticker, ViewRequest,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::common::{open_app, CliResult};

#[derive(Args)]
pub struct FocusArgs {
    /// Length as minutes ("25") or minutes:seconds ("12:30")
    #[arg(long, short = 'l')]
    length: Option<String>,
    /// One of the configured preset lengths, in minutes
    #[arg(long, conflicts_with = "length")]
    preset: Option<u64>,
    /// Use the length of a schedule item that has a start and end time
    #[arg(long, conflicts_with_all = ["length", "preset"])]
    item: Option<String>,
    /// Tag recorded with every logged session
    #[arg(long)]
    tag: Option<String>,
}

#[derive(Args)]
pub struct StopwatchArgs {
    /// Tag recorded with every logged session
    #[arg(long)]
    tag: Option<String>,
}

const HELP: &str = "p: pause/resume  f: finish  s MM:SS: set time  t TAG: tag  q: quit";

/// Check `minutes` against the configured presets.
fn preset_secs(presets: &[u64], minutes: u64) -> Result<u64, String> {
    if presets.contains(&minutes) {
        return Ok(minutes * 60);
    }
    let known: Vec<String> = presets.iter().map(u64::to_string).collect();
    Err(format!(
        "no {minutes}-minute preset (configured: {})",
        known.join(", ")
    ))
}

pub async fn run_focus(args: FocusArgs, yes: bool) -> CliResult {
    let mut app = open_app()?;

    let request = match &args.item {
        Some(id) => {
            let item = app
                .schedule()
                .get(id)
                .ok_or_else(|| format!("item not found: {id}"))?;
            ViewRequest::focus_item(item)
                .ok_or_else(|| format!("item {id} needs a start and an end time"))?
        }
        None => ViewRequest::Toggle(Panel::Focus),
    };
    app.request_view(request);

    if let Some(length) = &args.length {
        let secs = parse_clock_input(length).ok_or_else(|| format!("invalid length: {length}"))?;
        app.set_timer_duration(secs)?;
    }
    if let Some(minutes) = args.preset {
        let secs = preset_secs(&app.config().timer.presets, minutes)?;
        app.set_timer_duration(secs)?;
    }
    app.select_tag(args.tag.as_deref())?;

    drive(&mut app, yes).await
}

pub async fn run_stopwatch(args: StopwatchArgs, yes: bool) -> CliResult {
    let mut app = open_app()?;
    app.request_view(ViewRequest::Toggle(Panel::Stopwatch));
    app.select_tag(args.tag.as_deref())?;
    drive(&mut app, yes).await
}

fn render<S: KvStore>(app: &AppState<S>) {
    if let Some(timer) = app.view().timer() {
        let clock = timer.clock();
        let tag = timer.tag().unwrap_or("untagged");
        print!("\r{}  [{tag}]   ", format_clock(clock.display_secs(), clock.mode()));
        let _ = std::io::stdout().flush();
    }
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::SessionCommitted { session } => {
                println!("\nlogged {}", format_duration(session.duration));
            }
            Event::ClockCompleted { .. } => println!("\ntime's up"),
            _ => tracing::debug!(?event, "clock event"),
        }
    }
}

fn show_prompt(prompt: &Confirmation) -> CliResult {
    print!("\n{}\n{}\n[y/N]: ", prompt.title, prompt.message);
    std::io::stdout().flush()?;
    Ok(())
}

/// Ask to leave the clock view. Returns true when the view was left at once;
/// otherwise the answer arrives later on stdin while the clock keeps ticking.
fn request_quit<S: KvStore>(app: &mut AppState<S>, yes: bool) -> CliResult<bool> {
    match app.request_view(ViewRequest::Filter(ScheduleFilter::Today)) {
        Gate::Applied(_) => Ok(true),
        Gate::NeedsConfirmation(_) if yes => {
            app.confirm()?;
            Ok(true)
        }
        Gate::NeedsConfirmation(prompt) => {
            show_prompt(&prompt)?;
            Ok(false)
        }
    }
}

/// Settle a parked quit. A running clock is discarded only on "y".
fn answer_quit<S: KvStore>(app: &mut AppState<S>, answer: &str) -> CliResult<bool> {
    if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        app.confirm()?;
        Ok(true)
    } else {
        app.decline();
        Ok(false)
    }
}

fn run_command<S: KvStore>(app: &mut AppState<S>, line: &str) -> daymark_core::error::Result<Vec<Event>> {
    let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
    match cmd {
        "p" if app.view().is_clock_running() => app.pause_timer(),
        "p" => app.start_timer(),
        "f" => app.finish_timer(),
        "s" => match parse_clock_input(arg) {
            Some(secs) => app.set_timer_remaining(secs).map(|()| Vec::new()),
            None => {
                eprintln!("invalid time: {arg}");
                Ok(Vec::new())
            }
        },
        "t" => {
            let tag = (!arg.trim().is_empty()).then_some(arg.trim());
            app.select_tag(tag).map(|()| Vec::new())
        }
        "" => Ok(Vec::new()),
        _ => {
            println!("{HELP}");
            Ok(Vec::new())
        }
    }
}

async fn drive<S: KvStore>(app: &mut AppState<S>, yes: bool) -> CliResult {
    let mut ticker = Ticker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut awaiting_answer = false;

    println!("{HELP}");
    report(&app.start_timer()?);
    if app.view().is_clock_running() {
        ticker.start();
    }
    render(app);

    loop {
        tokio::select! {
            Some(()) = ticker.next(), if ticker.is_active() => {
                let events = app.tick_timer()?;
                report(&events);
                if !awaiting_answer {
                    render(app);
                }
            }
            line = lines.next_line(), if stdin_open => {
                let line = match line? {
                    Some(line) => line,
                    None => {
                        stdin_open = false;
                        String::new()
                    }
                };
                let line = line.trim();
                if awaiting_answer {
                    awaiting_answer = false;
                    if answer_quit(app, line)? {
                        break;
                    }
                } else if line == "q" {
                    if request_quit(app, yes)? {
                        break;
                    }
                    awaiting_answer = true;
                } else {
                    match run_command(app, line) {
                        Ok(events) => report(&events),
                        Err(e) => eprintln!("error: {e}"),
                    }
                }
                if !awaiting_answer {
                    render(app);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if request_quit(app, yes)? {
                    break;
                }
                // With stdin closed there is nobody to answer.
                awaiting_answer = stdin_open;
                if !stdin_open {
                    app.decline();
                }
            }
        }

        if app.view().is_clock_running() {
            if !ticker.is_active() {
                ticker.start();
            }
        } else {
            ticker.stop();
            // Nothing left to count and no more commands coming.
            if !stdin_open {
                break;
            }
        }
    }

    ticker.stop();
    println!();
    Ok(())
}
