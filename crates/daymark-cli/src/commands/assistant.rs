use clap::Subcommand;
use daymark_core::{GeminiAssistant, ScheduleItem, ScheduleItemData};

use super::item::describe;
use crate::common::{ask_line, open_app, CliResult};

#[derive(Subcommand)]
pub enum AssistantAction {
    /// Ask a question about the schedule
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Turn free text into proposed items and add the ones you pick
    Suggest {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Save the assistant API key; an empty key removes it
    Key { key: String },
}

/// `all`, or 1-based numbers separated by commas or spaces. Returns 0-based
/// indices; an empty answer selects nothing.
fn parse_selection(answer: &str, count: usize) -> Result<Vec<usize>, String> {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("all") || answer.eq_ignore_ascii_case("a") {
        return Ok((0..count).collect());
    }
    let mut picked = Vec::new();
    for part in answer.split(|c: char| c == ',' || c.is_whitespace()) {
        if part.is_empty() {
            continue;
        }
        let n: usize = part.parse().map_err(|_| format!("not a number: {part}"))?;
        if n == 0 || n > count {
            return Err(format!("no suggestion numbered {n}"));
        }
        if !picked.contains(&(n - 1)) {
            picked.push(n - 1);
        }
    }
    Ok(picked)
}

fn preview(index: usize, data: &ScheduleItemData) -> String {
    let line = describe(&ScheduleItem::from_data(String::new(), data.clone()));
    format!("{:>2}. {}", index + 1, line.trim_start())
}

pub async fn run(action: AssistantAction, yes: bool) -> CliResult {
    let mut app = open_app()?;

    match action {
        AssistantAction::Key { key } => {
            app.set_api_key(&key)?;
            if key.trim().is_empty() {
                println!("API key removed");
            } else {
                println!("API key saved");
            }
        }
        AssistantAction::Ask { prompt } => {
            let assistant = GeminiAssistant::from_store(app.store(), &app.config().assistant)?;
            if let Some(answer) = app.ask_assistant(&assistant, &prompt.join(" ")).await? {
                println!("{answer}");
            }
        }
        AssistantAction::Suggest { prompt } => {
            let assistant = GeminiAssistant::from_store(app.store(), &app.config().assistant)?;
            let Some(proposals) = app.suggest_items(&assistant, &prompt.join(" ")).await? else {
                return Ok(());
            };
            for (i, data) in proposals.iter().enumerate() {
                println!("{}", preview(i, data));
            }

            let selected = if yes {
                (0..proposals.len()).collect()
            } else {
                let answer = ask_line("Add which? (all, 1,3 ... or empty to cancel): ")?;
                parse_selection(&answer, proposals.len())?
            };
            if selected.is_empty() {
                println!("nothing added");
                return Ok(());
            }
            let ids = app.accept_suggestions(proposals, &selected)?;
            for id in &ids {
                println!("{id}");
            }
            println!("added {} item(s)", ids.len());
        }
    }
    Ok(())
}
