//! One function per menu command. Each asks for its parameters, performs a
//! single remote operation (plus a title lookup where a sheet id is needed)
//! and reports the outcome.

use crate::address::{self, WriteTarget};
use crate::commands::{Prompt, Session};
use crate::error::{ConsoleError, Result};
use crate::locator::locate_append_row;
use crate::table;
use std::io::{BufRead, Write};

/// Fetches `range` and prints it as a table, or `No data found.`.
pub fn show_range<R: BufRead, W: Write>(
    session: &Session,
    prompt: &mut Prompt<R, W>,
    range: &str,
) -> Result<()> {
    let grid = session.api.fetch_range(&session.spreadsheet_id, range)?;
    if grid.is_empty() {
        prompt.say("No data found.")
    } else {
        prompt.say("Data from Google Sheets:")?;
        prompt.say(table::render(&grid).trim_end_matches('\n'))
    }
}

/// Lists the sheet titles and lets the user pick one by number.
fn choose_sheet<R: BufRead, W: Write>(
    session: &Session,
    prompt: &mut Prompt<R, W>,
    heading: &str,
    question: &str,
) -> Result<String> {
    let titles = session.api.list_sheet_titles(&session.spreadsheet_id)?;
    if titles.is_empty() {
        return Err(ConsoleError::invalid_input("No sheets found."));
    }

    prompt.say(heading)?;
    for (i, title) in titles.iter().enumerate() {
        prompt.say(&format!("{}. {}", i + 1, title))?;
    }
    let answer = prompt.ask(question)?;
    let index = parse_choice(&answer, titles.len())?;
    Ok(titles[index - 1].clone())
}

/// 1-based menu choice within `1..=count`.
pub fn parse_choice(answer: &str, count: usize) -> Result<usize> {
    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n),
        _ => Err(ConsoleError::invalid_input(
            "Invalid input. Please select a valid sheet.",
        )),
    }
}

fn ask_value<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>, question: &str) -> Result<String> {
    let value = prompt.ask(question)?;
    if value.is_empty() {
        return Err(ConsoleError::invalid_input("Value must not be empty."));
    }
    Ok(value)
}

pub fn load_range<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let sheet = prompt.ask("Enter sheet name: ")?;
    let sheet = address::validate_sheet_name(&sheet)?.to_string();
    let range = prompt.ask("Enter sheet range (e.g., A1:D5): ")?;
    let range = address::validate_range(&range)?;
    show_range(session, prompt, &address::qualify(&sheet, range))
}

pub fn load_sheet<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let title = choose_sheet(
        session,
        prompt,
        "Select the sheet to load data from:",
        "Enter the number of the sheet to load data from: ",
    )?;
    prompt.say(&format!("Loading data from sheet '{title}'..."))?;
    show_range(session, prompt, &address::sheet_range(&title))?;
    prompt.say(&format!("Sheet '{title}' loaded successfully."))
}

/// Writes a value into the first free row of a column.
pub fn add_data<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    prompt.say("Adding data to Google Sheets...")?;
    let sheet = prompt.ask("Enter the sheet name (e.g., Sheet1): ")?;
    let sheet = address::validate_sheet_name(&sheet)?.to_string();
    let column = prompt.ask("Enter the column letter (e.g., A): ")?;
    let column = address::normalize_column(&column)?;
    let value = ask_value(prompt, "Enter the value to add to the sheet (e.g., 100): ")?;

    let existing = session
        .api
        .fetch_range(&session.spreadsheet_id, &address::column_range(&sheet, &column))?;
    let row = locate_append_row(&existing);
    let target = WriteTarget::new(&sheet, &column, row, &value);
    session
        .api
        .write_cell(&session.spreadsheet_id, &target.address(), &target.value)?;

    log::info!("appended value at {target}");
    prompt.say(&format!("Value '{}' added to {}.", target.value, target))
}

pub fn create_sheet<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let title = prompt.ask("Enter the name of the new sheet to create: ")?;
    let title = address::validate_sheet_name(&title)?;
    session.api.create_sheet(&session.spreadsheet_id, title)?;
    log::info!("created sheet {title}");
    prompt.say(&format!("Sheet '{title}' created successfully."))
}

pub fn update_data<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let sheet = prompt.ask("Enter sheet name: ")?;
    let sheet = address::validate_sheet_name(&sheet)?.to_string();
    let cell = prompt.ask("Enter cell (e.g., A1): ")?;
    let cell = address::validate_cell(&cell)?.to_ascii_uppercase();
    let value = ask_value(prompt, "Enter the new value (e.g., 100): ")?;

    let target = address::qualify(&sheet, &cell);
    session
        .api
        .write_cell(&session.spreadsheet_id, &target, &value)?;
    log::info!("updated {target}");
    prompt.say(&format!("Cell {target} updated to '{value}'."))
}

pub fn rename_sheet<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let current = prompt.ask("Enter the sheet which you want to rename: ")?;
    let current = address::validate_sheet_name(&current)?.to_string();
    let new_title = prompt.ask("Enter the new name: ")?;
    let new_title = address::validate_sheet_name(&new_title)?;

    let sheet_id = session
        .api
        .resolve_sheet_id(&session.spreadsheet_id, &current)?;
    session
        .api
        .rename_sheet(&session.spreadsheet_id, sheet_id, new_title)?;
    log::info!("renamed sheet {current} ({sheet_id}) to {new_title}");
    prompt.say(&format!("Sheet '{new_title}' renamed successfully."))
}

pub fn delete_sheet<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let title = choose_sheet(
        session,
        prompt,
        "Select the sheet to delete:",
        "Enter the number of the sheet to delete: ",
    )?;
    let sheet_id = session.api.resolve_sheet_id(&session.spreadsheet_id, &title)?;
    session.api.delete_sheet(&session.spreadsheet_id, sheet_id)?;
    log::info!("deleted sheet {title} ({sheet_id})");
    prompt.say(&format!("Sheet '{title}' deleted successfully."))
}

pub fn delete_data<R: BufRead, W: Write>(session: &Session, prompt: &mut Prompt<R, W>) -> Result<()> {
    let sheet = prompt.ask("Enter sheet name: ")?;
    let sheet = address::validate_sheet_name(&sheet)?.to_string();
    let range = prompt.ask("Enter sheet range (e.g., A1:D5): ")?;
    let range = address::validate_range(&range)?;

    let target = address::qualify(&sheet, range);
    session.api.clear_range(&session.spreadsheet_id, &target)?;
    log::info!("cleared {target}");
    prompt.say(&format!(
        "Data in range '{range}' on sheet '{sheet}' has been deleted."
    ))
}
