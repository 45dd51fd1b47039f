use clap::Subcommand;

use crate::common::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum TagAction {
    /// Add a tag
    Add { tag: String },
    /// Delete a tag; logged sessions keep their label
    Delete { tag: String },
    /// Reorder tags; every tag must be listed once
    Reorder { tags: Vec<String> },
    /// List tags
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TagAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        TagAction::Add { tag } => match app.add_tag(&tag)? {
            Some(added) => println!("added {added}"),
            None => println!("unchanged: tag is empty or already exists"),
        },
        TagAction::Delete { tag } => {
            if !app.delete_tag(&tag)? {
                return Err(format!("tag not found: {tag}").into());
            }
            println!("deleted {tag}");
        }
        TagAction::Reorder { tags } => app.reorder_tags(&tags)?,
        TagAction::List { json } => {
            if json {
                return print_json(app.tags().tags());
            }
            for tag in app.tags().tags() {
                println!("{tag}");
            }
        }
    }
    Ok(())
}
