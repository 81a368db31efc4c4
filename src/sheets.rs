use crate::auth::Authenticator;
use crate::error::{ConsoleError, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rows of cell values as returned by the values endpoint.
pub type Grid = Vec<Vec<Value>>;

/// How `write_cell` asks the API to store values: literally, no formula or
/// number parsing.
pub const RAW_INPUT: &str = "RAW";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
}

/// One entry of a `batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddSheet {
        properties: NewSheet,
    },
    UpdateSheetProperties {
        properties: SheetTitle,
        fields: String,
    },
    DeleteSheet {
        #[serde(rename = "sheetId")]
        sheet_id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSheet {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTitle {
    pub sheet_id: i64,
    pub title: String,
}

/// Remote operations the console needs. `spreadsheet_id` selects the
/// document; ranges are A1 expressions such as `Sheet1!A1:D5`.
pub trait SheetsApi {
    fn fetch_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid>;

    /// Writes one value in raw input mode.
    fn write_cell(&self, spreadsheet_id: &str, address: &str, value: &str) -> Result<()>;

    fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()>;

    fn sheet_properties(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>>;

    fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Request>) -> Result<()>;

    fn list_sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        Ok(self
            .sheet_properties(spreadsheet_id)?
            .into_iter()
            .map(|p| p.title)
            .collect())
    }

    fn resolve_sheet_id(&self, spreadsheet_id: &str, title: &str) -> Result<i64> {
        self.sheet_properties(spreadsheet_id)?
            .into_iter()
            .find(|p| p.title == title)
            .map(|p| p.sheet_id)
            .ok_or_else(|| ConsoleError::SheetNotFound(title.to_string()))
    }

    fn create_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<()> {
        self.batch_update(
            spreadsheet_id,
            vec![Request::AddSheet {
                properties: NewSheet {
                    title: title.to_string(),
                },
            }],
        )
    }

    fn rename_sheet(&self, spreadsheet_id: &str, sheet_id: i64, new_title: &str) -> Result<()> {
        self.batch_update(
            spreadsheet_id,
            vec![Request::UpdateSheetProperties {
                properties: SheetTitle {
                    sheet_id,
                    title: new_title.to_string(),
                },
                fields: "title".to_string(),
            }],
        )
    }

    fn delete_sheet(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<()> {
        self.batch_update(spreadsheet_id, vec![Request::DeleteSheet { sheet_id }])
    }
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Grid,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Sheets v4 over HTTPS with a service-account token.
pub struct SheetsClient {
    http: Client,
    api_base: String,
    auth: Authenticator,
}

impl SheetsClient {
    pub fn new(http: Client, api_base: &str, auth: Authenticator) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// `{base}/v4/spreadsheets/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base).map_err(|e| {
            ConsoleError::Config(format!("invalid API base '{}': {e}", self.api_base))
        })?;
        url.path_segments_mut()
            .map_err(|_| ConsoleError::Config(format!("invalid API base '{}'", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.auth.token()?;
        let response = request.bearer_auth(token).send()?;
        check_status(response)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ConsoleError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Pulls `error.message` out of an API error body, falling back to the raw text.
pub fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().to_string(),
    }
}

impl SheetsApi for SheetsClient {
    fn fetch_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid> {
        log::debug!("GET values {range}");
        let url = self.url(&[spreadsheet_id, "values", range])?;
        let response = self.send(self.http.get(url))?;
        let body: ValueRange = response.json()?;
        Ok(body.values)
    }

    fn write_cell(&self, spreadsheet_id: &str, address: &str, value: &str) -> Result<()> {
        log::debug!("PUT values {address}");
        let mut url = self.url(&[spreadsheet_id, "values", address])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", RAW_INPUT);
        let body = serde_json::json!({
            "range": address,
            "majorDimension": "ROWS",
            "values": [[value]],
        });
        self.send(self.http.put(url).json(&body))?;
        Ok(())
    }

    fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        log::debug!("POST values {range}:clear");
        let target = format!("{range}:clear");
        let url = self.url(&[spreadsheet_id, "values", target.as_str()])?;
        self.send(self.http.post(url).json(&serde_json::json!({})))?;
        Ok(())
    }

    fn sheet_properties(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>> {
        log::debug!("GET spreadsheet {spreadsheet_id}");
        let mut url = self.url(&[spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties");
        let response = self.send(self.http.get(url))?;
        let meta: SpreadsheetMeta = response.json()?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Request>) -> Result<()> {
        log::debug!("POST batchUpdate with {} request(s)", requests.len());
        let target = format!("{spreadsheet_id}:batchUpdate");
        let url = self.url(&[target.as_str()])?;
        let body = serde_json::json!({ "requests": requests });
        self.send(self.http.post(url).json(&body))?;
        Ok(())
    }
}
