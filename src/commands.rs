use crate::error::{ConsoleError, Result};
use crate::handlers;
use crate::sheets::SheetsApi;
use std::io::{BufRead, Write};
use std::str::FromStr;

const WELCOME: &str = "Welcome to the Google Sheets Console App!";
const ACTION_PROMPT: &str = "Enter an action (load, create, add, update, delete) or 'exit' to quit: ";
const GOODBYE: &str = "Exiting the program.";

/// What every operation gets to work with: the API handle and the target
/// spreadsheet. Nothing in here changes between operations.
pub struct Session<'a> {
    pub api: &'a dyn SheetsApi,
    pub spreadsheet_id: String,
}

impl<'a> Session<'a> {
    pub fn new(api: &'a dyn SheetsApi, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            api,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }
}

/// Line-oriented prompt over any reader/writer pair.
pub struct Prompt<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Prints `question` and reads one trimmed line; `None` at end of input.
    pub fn ask_line(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim().to_string()))
    }

    /// Like `ask_line`, but running out of input is an input error.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        self.ask_line(question)?
            .ok_or_else(|| ConsoleError::invalid_input("Unexpected end of input."))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// Top-level menu keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Create,
    Add,
    Update,
    Delete,
    Exit,
}

impl FromStr for Action {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "load" => Ok(Action::Load),
            "create" => Ok(Action::Create),
            "add" => Ok(Action::Add),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "exit" => Ok(Action::Exit),
            _ => Err(ConsoleError::invalid_input(
                "Invalid action. Please specify a valid action (load, create, add, update, delete, exit).",
            )),
        }
    }
}

/// A fully selected operation: action plus sub-option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LoadData,
    LoadSheet,
    AddData,
    CreateSheet,
    UpdateData,
    RenameSheet,
    DeleteSheet,
    DeleteData,
}

impl Action {
    /// Sub-option question, or `None` for `exit`.
    pub fn option_prompt(self) -> Option<&'static str> {
        match self {
            Action::Load => Some("Enter load option (data, sheet): "),
            Action::Create => Some("Enter create option (sheet): "),
            Action::Add => Some("Enter add option (data): "),
            Action::Update => Some("Enter update data option or rename sheet (data, rename): "),
            Action::Delete => Some("Enter delete option (sheet, data): "),
            Action::Exit => None,
        }
    }

    pub fn command(self, option: &str) -> Result<Command> {
        let command = match (self, option.trim()) {
            (Action::Load, "data") => Command::LoadData,
            (Action::Load, "sheet") => Command::LoadSheet,
            (Action::Add, "data") => Command::AddData,
            (Action::Create, "sheet") => Command::CreateSheet,
            (Action::Update, "data") => Command::UpdateData,
            (Action::Update, "rename") => Command::RenameSheet,
            (Action::Delete, "sheet") => Command::DeleteSheet,
            (Action::Delete, "data") => Command::DeleteData,
            (action, _) => {
                return Err(ConsoleError::invalid_input(format!(
                    "Invalid {} option.",
                    action.keyword()
                )))
            }
        };
        Ok(command)
    }

    fn keyword(self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Create => "create",
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Exit => "exit",
        }
    }
}

pub fn execute<R: BufRead, W: Write>(
    command: Command,
    session: &Session,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    match command {
        Command::LoadData => handlers::load_range(session, prompt),
        Command::LoadSheet => handlers::load_sheet(session, prompt),
        Command::AddData => handlers::add_data(session, prompt),
        Command::CreateSheet => handlers::create_sheet(session, prompt),
        Command::UpdateData => handlers::update_data(session, prompt),
        Command::RenameSheet => handlers::rename_sheet(session, prompt),
        Command::DeleteSheet => handlers::delete_sheet(session, prompt),
        Command::DeleteData => handlers::delete_data(session, prompt),
    }
}

/// Handles one action keyword; `Ok(false)` means the user asked to leave.
fn run_action<R: BufRead, W: Write>(
    input: &str,
    session: &Session,
    prompt: &mut Prompt<R, W>,
) -> Result<bool> {
    let action: Action = input.parse()?;
    let Some(question) = action.option_prompt() else {
        return Ok(false);
    };
    let option = prompt.ask(question)?;
    let command = action.command(&option)?;
    execute(command, session, prompt)?;
    Ok(true)
}

/// Runs the menu loop until `exit` or end of input.
///
/// Input mistakes are echoed to the user and remote failures are logged; in
/// both cases the loop keeps going. Only I/O errors on the console itself end
/// the session early.
pub fn handle_commands<R: BufRead, W: Write>(
    session: &Session,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    prompt.say(WELCOME)?;
    loop {
        let Some(input) = prompt.ask_line(ACTION_PROMPT)? else {
            prompt.say("")?;
            break;
        };

        match run_action(&input, session, prompt) {
            Ok(true) => {}
            Ok(false) => break,
            Err(ConsoleError::Io(e)) => return Err(ConsoleError::Io(e)),
            Err(err) if err.is_user_error() => prompt.say(&err.to_string())?,
            Err(err) => log::error!("{err}"),
        }
    }
    prompt.say(GOODBYE)
}
