use clap::Subcommand;
use daymark_core::stats::{format_duration, UNTAGGED};
use serde_json::json;

use crate::common::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's sessions and per-tag totals
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// All-time total and whole-day milestones
    All {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one logged session
    Delete { id: String },
}

pub fn run(action: StatsAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        StatsAction::Today { json } => {
            let summary = app.today_summary();
            if json {
                return print_json(&summary);
            }
            println!("Today: {}", format_duration(summary.total_seconds));
            for total in &summary.by_tag {
                println!("  {:<16} {}", total.name, format_duration(total.seconds));
            }
            if !summary.sessions.is_empty() {
                println!();
            }
            for session in &summary.sessions {
                let at = session.completed_at.with_timezone(&chrono::Local);
                println!(
                    "{}  {}  {:<16} {}",
                    session.id,
                    at.format("%H:%M"),
                    session.tag.as_deref().unwrap_or(UNTAGGED),
                    format_duration(session.duration)
                );
            }
        }
        StatsAction::All { json } => {
            let total = app.sessions().all_time_total();
            let milestones = app.milestones();
            if json {
                return print_json(&json!({
                    "total_seconds": total,
                    "sessions": app.sessions().len(),
                    "milestones": milestones,
                }));
            }
            println!("All time: {}", format_duration(total));
            println!(
                "Full days focused: {} ({:.0}% toward the next)",
                milestones.completed_count,
                milestones.progress_fraction * 100.0
            );
        }
        StatsAction::Delete { id } => {
            if !app.delete_session(&id)? {
                return Err(format!("session not found: {id}").into());
            }
            println!("deleted {id}");
        }
    }
    Ok(())
}
