//! Service-account OAuth for the Sheets API.
//!
//! A signed JWT assertion is exchanged for a bearer token at the key's token
//! URI. The token is kept until shortly before it expires.

use crate::error::{ConsoleError, Result};
use chrono::{DateTime, Duration, TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service account key file that we need.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ConsoleError::Credentials(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(raw)
            .map_err(|e| ConsoleError::Credentials(format!("invalid key file: {e}")))?;
        if !key.key_type.is_empty() && key.key_type != "service_account" {
            return Err(ConsoleError::Credentials(format!(
                "expected a service_account key, found '{}'",
                key.key_type
            )));
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(key: &ServiceAccountKey, scope: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: key.client_email.clone(),
            scope: scope.to_string(),
            aud: key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// When a token issued at `now` with a lifetime of `expires_in` seconds runs out.
fn expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| ConsoleError::Auth(format!("token lifetime out of range: {expires_in}s")))
}

/// Hands out bearer tokens for one service account.
pub struct Authenticator {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    http: reqwest::blocking::Client,
    cached: RefCell<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(key: ServiceAccountKey, http: reqwest::blocking::Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ConsoleError::Credentials(format!("invalid private key: {e}")))?;
        Ok(Self {
            key,
            encoding_key,
            scope: SPREADSHEETS_SCOPE.to_string(),
            http,
            cached: RefCell::new(None),
        })
    }

    /// Signed assertion for the token exchange.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let claims = Claims::new(&self.key, &self.scope, now);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ConsoleError::Auth(format!("unable to sign assertion: {e}")))
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub fn token(&self) -> Result<String> {
        let now = Utc::now();
        if let Some(cached) = self.cached.borrow().as_ref() {
            if cached.is_fresh(now) {
                return Ok(cached.value.clone());
            }
        }

        log::debug!("requesting access token for {}", self.key.client_email);
        let assertion = self.assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ConsoleError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = response.json()?;
        let cached = CachedToken {
            value: token.access_token,
            expires_at: expiry(now, token.expires_in)?,
        };
        let value = cached.value.clone();
        *self.cached.borrow_mut() = Some(cached);
        Ok(value)
    }
}
