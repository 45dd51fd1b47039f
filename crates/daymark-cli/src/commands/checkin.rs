use chrono::{Datelike, NaiveDate};
use clap::Subcommand;
use daymark_core::checkin::{CalendarCell, DayState};
use daymark_core::{AppState, SqliteStore};

use crate::common::{confirm, open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Check in (or undo a check-in) for a day
    Toggle {
        /// Theme id or name (default: first theme)
        #[arg(long)]
        theme: Option<String>,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Current streak per theme
    Streak {
        /// Theme id or name (default: every theme)
        #[arg(long)]
        theme: Option<String>,
    },
    /// Month calendar for a theme
    Calendar {
        /// Theme id or name (default: first theme)
        #[arg(long)]
        theme: Option<String>,
        /// YYYY-MM (default: this month)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage check-in themes
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Add a theme
    Add { name: String },
    /// Delete a theme and all of its check-ins
    Delete { theme: String },
    /// Reorder themes; every theme id must be listed once
    Reorder { ids: Vec<String> },
    /// List themes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Accept a theme id, or a name matched case-insensitively.
fn resolve_theme(app: &AppState<SqliteStore>, arg: Option<&str>) -> CliResult<String> {
    let tracker = app.checkin();
    let Some(arg) = arg else {
        return Ok(tracker.selected().id.clone());
    };
    tracker
        .themes()
        .iter()
        .find(|t| t.id == arg)
        .or_else(|| tracker.themes().iter().find(|t| t.name.eq_ignore_ascii_case(arg)))
        .map(|t| t.id.clone())
        .ok_or_else(|| format!("theme not found: {arg}").into())
}

fn parse_month(arg: &str) -> CliResult<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{arg}-01"), "%Y-%m-%d")
        .map_err(|_| format!("invalid month (expected YYYY-MM): {arg}"))?;
    Ok((first.year(), first.month()))
}

pub fn run(action: CheckinAction, yes: bool) -> CliResult {
    let mut app = open_app()?;

    match action {
        CheckinAction::Toggle { theme, date } => {
            let theme_id = resolve_theme(&app, theme.as_deref())?;
            let date = match date {
                Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {d}"))?,
                None => app.today(),
            };
            let prompt = app.request_checkin_toggle(&theme_id, date)?;
            if !confirm(&prompt, yes)? {
                app.decline();
                return Ok(());
            }
            app.confirm()?;
            let state = if app.checkin().is_checked(&theme_id, date) {
                "checked in"
            } else {
                "check-in removed"
            };
            println!("{date}: {state} (streak {})", app.streak(&theme_id));
        }
        CheckinAction::Streak { theme } => {
            let ids = match theme {
                Some(arg) => vec![resolve_theme(&app, Some(&arg))?],
                None => app.checkin().themes().iter().map(|t| t.id.clone()).collect(),
            };
            for id in ids {
                let name = app.checkin().theme(&id).map(|t| t.name.as_str()).unwrap_or(&id);
                println!("{name:<20} {}", app.streak(&id));
            }
        }
        CheckinAction::Calendar { theme, month, json } => {
            let theme_id = resolve_theme(&app, theme.as_deref())?;
            let today = app.today();
            let (year, month) = match month {
                Some(m) => parse_month(&m)?,
                None => (today.year(), today.month()),
            };
            let calendar = app.checkin().calendar(&theme_id, year, month, today)?;
            if json {
                return print_json(&calendar);
            }

            println!("{}  (streak {})", calendar.title(), app.streak(&theme_id));
            println!(" Su  Mo  Tu  We  Th  Fr  Sa");
            for week in calendar.weeks() {
                let row: String = week
                    .iter()
                    .map(|cell| match cell {
                        CalendarCell::Blank => "    ".to_string(),
                        CalendarCell::Day { date, state } => match state {
                            DayState::Checked => format!("[{:>2}]", date.day()),
                            DayState::Unchecked => format!(" {:>2} ", date.day()),
                            DayState::Future => "  . ".to_string(),
                        },
                    })
                    .collect();
                println!("{}", row.trim_end());
            }
        }
        CheckinAction::Theme { action } => run_theme(&mut app, action, yes)?,
    }
    Ok(())
}

fn run_theme(app: &mut AppState<SqliteStore>, action: ThemeAction, yes: bool) -> CliResult {
    match action {
        ThemeAction::Add { name } => {
            let theme = app.add_theme(&name)?;
            println!("{}  {}", theme.id, theme.name);
        }
        ThemeAction::Delete { theme } => {
            let id = resolve_theme(app, Some(&theme))?;
            let prompt = app.request_delete_theme(&id)?;
            if !confirm(&prompt, yes)? {
                app.decline();
                return Ok(());
            }
            app.confirm()?;
            println!("deleted {theme}");
        }
        ThemeAction::Reorder { ids } => {
            app.reorder_themes(&ids)?;
        }
        ThemeAction::List { json } => {
            if json {
                return print_json(app.checkin().themes());
            }
            for theme in app.checkin().themes() {
                println!("{}  {}", theme.id, theme.name);
            }
        }
    }
    Ok(())
}
