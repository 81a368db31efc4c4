//! Wire-level checks for `SheetsClient` and the token exchange, run against a
//! local mock server.

use serde_json::{json, Value};
use sheets_console::auth::{Authenticator, ServiceAccountKey};
use sheets_console::{ConsoleError, SheetsApi, SheetsClient};
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");
const GRANT: &str = "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";

/// The mock server runs on its own thread; the runtime is only needed to
/// drive wiremock's async setup and inspection calls.
struct Harness {
    rt: Runtime,
    server: MockServer,
}

impl Harness {
    fn new() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Harness { rt, server }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn with_token(self, expected_exchanges: u64) -> Self {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .and(body_string_contains(GRANT))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": "tok-1",
                    "expires_in": 3600,
                    "token_type": "Bearer"
                })))
                .expect(expected_exchanges),
        );
        self
    }

    fn respond(&self, verb: &str, status: u16, body: Value) {
        self.mount(
            Mock::given(method(verb))
                .and(path_regex("^/v4/"))
                .respond_with(ResponseTemplate::new(status).set_body_json(body)),
        );
    }

    fn client(&self) -> SheetsClient {
        let key = json!({
            "type": "service_account",
            "private_key_id": "k1",
            "private_key": PRIVATE_KEY,
            "client_email": "console@demo.iam.gserviceaccount.com",
            "token_uri": format!("{}/token", self.server.uri()),
        });
        let key = ServiceAccountKey::from_json(&key.to_string()).unwrap();
        let http = reqwest::blocking::Client::new();
        let auth = Authenticator::new(key, http.clone()).unwrap();
        SheetsClient::new(http, &self.server.uri(), auth)
    }

    fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    fn api_requests(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() != "/token")
            .collect()
    }
}

fn query(req: &Request, key: &str) -> Option<String> {
    req.url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn bearer(req: &Request) -> Option<String> {
    req.headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[test]
fn fetch_range_encodes_sheet_title_and_sends_bearer() {
    let h = Harness::new().with_token(1);
    h.respond(
        "GET",
        200,
        json!({"range": "'My Sheet'!A1:B2", "majorDimension": "ROWS", "values": [["x", "y"], ["z"]]}),
    );

    let grid = h.client().fetch_range("doc", "'My Sheet'!A1:B2").unwrap();
    assert_eq!(grid, vec![vec![json!("x"), json!("y")], vec![json!("z")]]);

    let reqs = h.api_requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method.as_str(), "GET");
    assert_eq!(reqs[0].url.path(), "/v4/spreadsheets/doc/values/'My%20Sheet'!A1:B2");
    assert_eq!(bearer(&reqs[0]).as_deref(), Some("Bearer tok-1"));
}

#[test]
fn slash_and_hash_stay_inside_the_range_segment() {
    let h = Harness::new().with_token(1);
    h.respond("GET", 200, json!({"range": "x"}));

    let grid = h.client().fetch_range("doc", "'A/B #1'!A1").unwrap();
    assert!(grid.is_empty());
    assert_eq!(
        h.api_requests()[0].url.path(),
        "/v4/spreadsheets/doc/values/'A%2FB%20%231'!A1"
    );
}

#[test]
fn write_cell_puts_one_raw_value() {
    let h = Harness::new().with_token(1);
    h.respond("PUT", 200, json!({"updatedCells": 1}));

    h.client().write_cell("doc", "Sheet1!B4", "=1+1").unwrap();

    let req = &h.api_requests()[0];
    assert_eq!(req.method.as_str(), "PUT");
    assert_eq!(req.url.path(), "/v4/spreadsheets/doc/values/Sheet1!B4");
    assert_eq!(query(req, "valueInputOption").as_deref(), Some("RAW"));
    assert_eq!(
        req.body_json::<Value>().unwrap(),
        json!({"range": "Sheet1!B4", "majorDimension": "ROWS", "values": [["=1+1"]]})
    );
}

#[test]
fn clear_and_batch_update_use_colon_verbs() {
    let h = Harness::new().with_token(1);
    h.respond("POST", 200, json!({}));

    let client = h.client();
    client.clear_range("doc", "Sheet1!A1:D5").unwrap();
    client.create_sheet("doc", "Fresh").unwrap();

    let reqs = h.api_requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].url.path(), "/v4/spreadsheets/doc/values/Sheet1!A1:D5:clear");
    assert_eq!(reqs[1].url.path(), "/v4/spreadsheets/doc:batchUpdate");
    assert_eq!(
        reqs[1].body_json::<Value>().unwrap(),
        json!({"requests": [{"addSheet": {"properties": {"title": "Fresh"}}}]})
    );
}

#[test]
fn sheet_metadata_is_requested_with_field_mask() {
    let h = Harness::new().with_token(1);
    h.respond(
        "GET",
        200,
        json!({"sheets": [
            {"properties": {"sheetId": 0, "title": "Sheet1"}},
            {"properties": {"sheetId": 41, "title": "Q1"}}
        ]}),
    );

    let client = h.client();
    assert_eq!(client.list_sheet_titles("doc").unwrap(), vec!["Sheet1", "Q1"]);
    assert_eq!(client.resolve_sheet_id("doc", "Q1").unwrap(), 41);

    let reqs = h.api_requests();
    assert_eq!(reqs[0].url.path(), "/v4/spreadsheets/doc");
    assert_eq!(query(&reqs[0], "fields").as_deref(), Some("sheets.properties"));
}

#[test]
fn api_errors_carry_status_and_message() {
    let h = Harness::new().with_token(1);
    h.respond(
        "GET",
        400,
        json!({"error": {"code": 400, "message": "Unable to parse range: Nope!A1", "status": "INVALID_ARGUMENT"}}),
    );

    let err = h.client().fetch_range("doc", "Nope!A1").unwrap_err();
    match err {
        ConsoleError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Unable to parse range: Nope!A1");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[test]
fn token_is_fetched_once_and_reused() {
    let h = Harness::new().with_token(1);
    h.respond("GET", 200, json!({"values": [["1"]]}));

    let client = h.client();
    client.fetch_range("doc", "Sheet1!A:A").unwrap();
    client.fetch_range("doc", "Sheet1!B:B").unwrap();

    let reqs = h.requests();
    let exchanges = reqs.iter().filter(|r| r.url.path() == "/token").count();
    assert_eq!(exchanges, 1);
    let api = h.api_requests();
    assert_eq!(api.len(), 2);
    assert!(api
        .iter()
        .all(|r| bearer(r).as_deref() == Some("Bearer tok-1")));
}

#[test]
fn assertion_is_a_signed_jwt() {
    let h = Harness::new().with_token(1);
    h.respond("GET", 200, json!({}));
    h.client().fetch_range("doc", "Sheet1!A1").unwrap();

    let exchange = h
        .requests()
        .into_iter()
        .find(|r| r.url.path() == "/token")
        .unwrap();
    let body = String::from_utf8(exchange.body).unwrap();
    let assertion = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("assertion="))
        .unwrap();
    assert_eq!(assertion.split('.').count(), 3);
}

#[test]
fn rejected_token_exchange_is_an_auth_error() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant")),
    );

    let err = h.client().fetch_range("doc", "Sheet1!A1").unwrap_err();
    assert!(matches!(err, ConsoleError::Auth(ref m) if m.contains("invalid_grant")));
    assert!(h.api_requests().is_empty());
}
