//! Line-oriented rendering of the reading list for a terminal.
//!
//! The screen only reads controller state and forwards user intents; it
//! never touches the list directly. It redraws when the controller reports
//! a change to the visible list.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::modules::books::{BookEntry, BookId, ReadingListController, StateChange};

const CANCEL: &str = ":cancel";

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add,
    Search(String),
    Toggle(String),
    Delete(String),
    List,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line.trim_start(), ""),
    };

    match word {
        "" => Command::Empty,
        "add" | "a" => Command::Add,
        "search" | "s" => Command::Search(rest.trim_start().to_string()),
        "toggle" | "t" => Command::Toggle(rest.trim().to_string()),
        "delete" | "d" => Command::Delete(rest.trim().to_string()),
        "list" | "l" => Command::List,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Resolve a 1-based row of the visible list, or fall back to treating the
/// target as a raw id.
pub fn resolve_target(list: &ReadingListController, target: &str) -> Option<BookId> {
    if target.is_empty() {
        return None;
    }
    if let Ok(row) = target.parse::<usize>() {
        if let Some(entry) = row.checked_sub(1).and_then(|i| list.visible_entries().get(i).copied()) {
            return Some(entry.id().clone());
        }
    }
    Some(BookId::from(target))
}

pub fn render(list: &ReadingListController, out: &mut impl Write) -> io::Result<()> {
    let visible = list.visible_entries();
    let search = list.state().search_text();

    if search.is_empty() {
        writeln!(out, "Booklist ({} books)", list.len())?;
    } else {
        writeln!(
            out,
            "Booklist ({} of {} books, search: {:?})",
            visible.len(),
            list.len(),
            search
        )?;
    }

    if visible.is_empty() {
        writeln!(out, "  (no books)")?;
    }
    for (row, entry) in visible.iter().enumerate() {
        writeln!(out, "  {:>2}. {}", row + 1, format_entry(entry))?;
    }
    Ok(())
}

pub fn format_entry(entry: &BookEntry) -> String {
    let mark = if entry.is_read() { 'x' } else { ' ' };
    format!("[{}] {} by {}", mark, entry.book_name(), entry.author_name())
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  add               add a book (blank line or {CANCEL} cancels)")?;
    writeln!(out, "  search <text>     filter by title or author; no text clears")?;
    writeln!(out, "  toggle <n|id>     mark read/unread")?;
    writeln!(out, "  delete <n|id>     remove a book")?;
    writeln!(out, "  list              show the list")?;
    writeln!(out, "  quit              leave")
}

/// Drive the screen until `quit` or end of input.
pub async fn run<R, W>(list: &mut ReadingListController, input: R, mut out: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut changes = list.subscribe();

    render(list, &mut out)?;
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => print_help(&mut out)?,
            Command::List => render(list, &mut out)?,
            Command::Search(text) => list.set_search_text(text),
            Command::Toggle(target) => match resolve_target(list, &target) {
                Some(id) => {
                    if list.toggle_read(&id).is_none() {
                        writeln!(out, "No book matches {target:?}.")?;
                    }
                }
                None => writeln!(out, "Usage: toggle <n|id>")?,
            },
            Command::Delete(target) => match resolve_target(list, &target) {
                Some(id) => {
                    if !list.delete(&id) {
                        writeln!(out, "No book matches {target:?}.")?;
                    }
                }
                None => writeln!(out, "Usage: delete <n|id>")?,
            },
            Command::Add => {
                if !add_dialog(list, &mut lines, &mut out).await? {
                    break;
                }
            }
            Command::Unknown(word) => {
                writeln!(out, "Unknown command {word:?}; type 'help'.")?;
            }
        }

        if redraw_pending(&mut changes) {
            render(list, &mut out)?;
        }
    }

    if list.state().is_adding() {
        list.close_add_dialog();
    }
    Ok(())
}

/// Returns `false` when input ended inside the dialog.
async fn add_dialog<R, W>(
    list: &mut ReadingListController,
    lines: &mut tokio::io::Lines<R>,
    out: &mut W,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    list.open_add_dialog();

    let Some(book_name) = prompt(lines, out, "Title: ").await? else {
        return Ok(false);
    };
    if is_cancel(&book_name) {
        list.close_add_dialog();
        writeln!(out, "Cancelled.")?;
        return Ok(true);
    }
    list.set_book_name(book_name);

    let Some(author_name) = prompt(lines, out, "Author: ").await? else {
        return Ok(false);
    };
    if is_cancel(&author_name) {
        list.close_add_dialog();
        writeln!(out, "Cancelled.")?;
        return Ok(true);
    }
    list.set_author_name(author_name);

    if list.submit_add().is_none() {
        list.close_add_dialog();
    }
    Ok(true)
}

/// Drain queued notifications, reporting whether any touched the visible list.
fn redraw_pending(changes: &mut broadcast::Receiver<StateChange>) -> bool {
    let mut redraw = false;
    loop {
        match changes.try_recv() {
            Ok(change) => redraw |= shows_in_list(&change),
            // Missed notifications may have been list changes.
            Err(TryRecvError::Lagged(_)) => redraw = true,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return redraw,
        }
    }
}

fn shows_in_list(change: &StateChange) -> bool {
    matches!(
        change,
        StateChange::Loaded { .. }
            | StateChange::Added(_)
            | StateChange::Deleted(_)
            | StateChange::ReadToggled { .. }
            | StateChange::SearchChanged
    )
}

async fn prompt<R, W>(
    lines: &mut tokio::io::Lines<R>,
    out: &mut W,
    label: &str,
) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{label}")?;
    out.flush()?;
    lines.next_line().await
}

fn is_cancel(text: &str) -> bool {
    text.is_empty() || text == CANCEL
}
