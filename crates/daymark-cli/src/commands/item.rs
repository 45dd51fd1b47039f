use std::time::Instant;

use clap::{Subcommand, ValueEnum};
use daymark_core::schedule::END_TIME_CLEARED_NOTICE;
use daymark_core::{ItemDraft, ScheduleFilter, ScheduleItem};

use crate::common::{confirm, open_app, print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    Today,
    All,
    Completed,
}

impl From<FilterArg> for ScheduleFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Today => ScheduleFilter::Today,
            FilterArg::All => ScheduleFilter::All,
            FilterArg::Completed => ScheduleFilter::Completed,
        }
    }
}

#[derive(Subcommand)]
pub enum ItemAction {
    /// Add an item
    Add {
        title: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Start time, HH:mm. Omit for an all-day item
        #[arg(long)]
        time: Option<String>,
        /// End time, HH:mm
        #[arg(long = "end")]
        end_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// work, personal, health, fitness, shopping, social, finance, travel, study
        #[arg(long)]
        category: Option<String>,
    },
    /// Edit an item; unspecified fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long = "end")]
        end_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Remove the start (and end) time
        #[arg(long, conflicts_with_all = ["time", "end_time"])]
        all_day: bool,
    },
    /// Delete an item
    Delete { id: String },
    /// Toggle an item's completion
    Done { id: String },
    /// List items
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::Today)]
        filter: FilterArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn describe(item: &ScheduleItem) -> String {
    let when = match (item.time, item.end_time) {
        (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        (Some(start), None) => start.format("%H:%M").to_string(),
        _ => "all day".to_string(),
    };
    let mut line = format!("{}  {} {:<11}  {}", item.id, item.date, when, item.title);
    if let Some(category) = item.category {
        line.push_str(&format!(" [{category}]"));
    }
    if item.completed {
        line.push_str("  (done)");
    }
    line
}

pub async fn run(action: ItemAction, yes: bool) -> CliResult {
    let mut app = open_app()?;

    match action {
        ItemAction::Add {
            title,
            date,
            time,
            end_time,
            description,
            category,
        } => {
            let draft = ItemDraft {
                title,
                description: description.unwrap_or_default(),
                date: date.unwrap_or_else(|| app.today().to_string()),
                time: time.unwrap_or_default(),
                end_time: end_time.unwrap_or_default(),
                category: category.unwrap_or_default(),
            };
            let id = app.add_draft(&draft)?;
            println!("{id}");
        }
        ItemAction::Edit {
            id,
            title,
            date,
            time,
            end_time,
            description,
            category,
            all_day,
        } => {
            let item = app
                .schedule()
                .get(&id)
                .ok_or_else(|| format!("item not found: {id}"))?;
            let mut draft = ItemDraft::from_item(item);
            if let Some(v) = title {
                draft.title = v;
            }
            if let Some(v) = date {
                draft.date = v;
            }
            if let Some(v) = description {
                draft.description = v;
            }
            if let Some(v) = category {
                draft.category = v;
            }
            if let Some(v) = end_time {
                draft.end_time = v;
            }
            let clear = all_day || time.as_deref().is_some_and(|t| t.trim().is_empty());
            if clear {
                if draft.clear_time() {
                    eprintln!("{END_TIME_CLEARED_NOTICE}");
                }
            } else if let Some(v) = time {
                draft.time = v;
            }
            app.update_item(&id, &draft)?;
            println!("updated {id}");
        }
        ItemAction::Delete { id } => {
            let prompt = app.request_delete_item(&id)?;
            if confirm(&prompt, yes)? {
                app.confirm()?;
                println!("deleted {id}");
            } else {
                app.decline();
            }
        }
        ItemAction::Done { id } => {
            if !app.press_complete(&id, Instant::now()) {
                return Err(format!("item not found: {id}").into());
            }
            let shown = app.shown_completed(&id).unwrap_or_default();
            println!("{}", if shown { "completed" } else { "reopened" });
            tokio::time::sleep(app.config().completion_delay()).await;
            app.settle_completions(Instant::now())?;
        }
        ItemAction::List { filter, json } => {
            let filter = ScheduleFilter::from(filter);
            let items = app.project(filter);
            if json {
                print_json(&items)?;
            } else if items.is_empty() {
                println!("{}", filter.empty_message());
            } else {
                for item in items {
                    println!("{}", describe(item));
                }
            }
        }
    }
    Ok(())
}
