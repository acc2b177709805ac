use std::path::PathBuf;

use anyhow::Context;
use booklist_app::screen::format_entry;
use booklist_app::{BookId, ReadingListController};
use booklist_kernel::{settings::Settings, StorageBackend};
use clap::{Parser, Subcommand};

/// Keep a personal reading list from the command line.
#[derive(Debug, Parser)]
#[command(name = "booklist", version, about)]
struct Cli {
    /// Directory holding the saved list (implies the file backend)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the list, optionally filtered by title or author
    List {
        #[arg(long, short)]
        search: Option<String>,
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an unread book and print its id
    Add { title: String, author: String },
    /// Mark a book read or unread
    Toggle { id: String },
    /// Remove a book
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load booklist settings")?;
    if let Some(dir) = cli.data_dir {
        settings.storage.backend = StorageBackend::File;
        settings.storage.data_dir = dir;
    }
    booklist_telemetry::init(&settings.telemetry)
        .with_context(|| "failed to initialize telemetry")?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "booklist CLI starting");

    let mut list = booklist_app::open_reading_list(&settings).await?;
    let result = execute(&mut list, cli.command);
    list.shutdown().await;
    result
}

fn execute(list: &mut ReadingListController, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { search, json } => {
            let entries = list.filtered_view(search.as_deref().unwrap_or_default());
            if json {
                let rendered = serde_json::to_string_pretty(&entries)
                    .with_context(|| "failed to render books as JSON")?;
                println!("{rendered}");
            } else {
                for entry in entries {
                    println!("{}  {}", entry.id(), format_entry(entry));
                }
            }
        }
        Command::Add { title, author } => match list.add(title, author) {
            Some(id) => println!("{id}"),
            None => eprintln!("nothing added: title and author must not be empty"),
        },
        Command::Toggle { id } => match list.toggle_read(&BookId::from(id.as_str())) {
            Some(true) => println!("read"),
            Some(false) => println!("unread"),
            None => eprintln!("no book with id {id}"),
        },
        Command::Delete { id } => {
            if list.delete(&BookId::from(id.as_str())) {
                println!("deleted");
            } else {
                eprintln!("no book with id {id}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_data_dir_after_subcommand() {
        let cli = Cli::try_parse_from(["booklist", "add", "Dune", "Herbert", "--data-dir", "/tmp/x"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::Add { .. }));
    }
}
