use clap::Parser;
use sheets_console::auth::{Authenticator, ServiceAccountKey};
use sheets_console::config::Config;
use sheets_console::{handle_commands, Prompt, Session, SheetsClient};
use std::io;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Interactive console for a Google Sheets spreadsheet.
///
/// Reads SPREAD_SHEET_ID, SHEETS_CREDENTIALS_FILE and SHEETS_API_BASE from
/// the environment or a .env file.
#[derive(Parser)]
#[command(version, about)]
struct Cli {}

fn run() -> sheets_console::Result<()> {
    let config = Config::from_env()?;
    log::debug!("using spreadsheet {}", config.spreadsheet_id);

    let http = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let key = ServiceAccountKey::from_file(&config.credentials_path)?;
    let auth = Authenticator::new(key, http.clone())?;
    let client = SheetsClient::new(http, &config.api_base, auth);

    let session = Session::new(&client, config.spreadsheet_id.clone());
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompt = Prompt::new(stdin.lock(), stdout.lock());
    handle_commands(&session, &mut prompt)
}

fn main() {
    let _cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
