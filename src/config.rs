use crate::error::{ConsoleError, Result};
use std::path::PathBuf;

pub const SPREADSHEET_ID_VAR: &str = "SPREAD_SHEET_ID";
pub const CREDENTIALS_VAR: &str = "SHEETS_CREDENTIALS_FILE";
pub const API_BASE_VAR: &str = "SHEETS_API_BASE";

pub const DEFAULT_CREDENTIALS_FILE: &str = "./credentials.json";
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Runtime settings, read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub spreadsheet_id: String,
    pub credentials_path: PathBuf,
    pub api_base: String,
}

impl Config {
    /// Loads `.env` (if present) and then reads the environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConsoleError::Config(format!("unable to load .env: {e}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let spreadsheet_id = get(SPREADSHEET_ID_VAR).ok_or_else(|| {
            ConsoleError::Config(format!("{SPREADSHEET_ID_VAR} is not set"))
        })?;
        let credentials_path = get(CREDENTIALS_VAR)
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
            .into();
        let api_base = get(API_BASE_VAR)
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            spreadsheet_id,
            credentials_path,
            api_base,
        })
    }
}
