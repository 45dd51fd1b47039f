use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "daymark", version, about = "Daymark CLI")]
struct Cli {
    /// Answer "yes" to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule items
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Run the focus timer in the foreground
    Focus(commands::clock::FocusArgs),
    /// Run the stopwatch in the foreground
    Stopwatch(commands::clock::StopwatchArgs),
    /// Focus session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Daily check-ins and themes
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Focus tags
    Tag {
        #[command(subcommand)]
        action: commands::tag::TagAction,
    },
    /// AI scheduling assistant
    Assistant {
        #[command(subcommand)]
        action: commands::assistant::AssistantAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    common::init_tracing();

    let cli = Cli::parse();
    let yes = cli.yes;
    let result = match cli.command {
        Commands::Item { action } => commands::item::run(action, yes).await,
        Commands::Focus(args) => commands::clock::run_focus(args, yes).await,
        Commands::Stopwatch(args) => commands::clock::run_stopwatch(args, yes).await,
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Checkin { action } => commands::checkin::run(action, yes),
        Commands::Tag { action } => commands::tag::run(action),
        Commands::Assistant { action } => commands::assistant::run(action, yes).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
