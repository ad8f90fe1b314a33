use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::LeadStore;
use crate::errors::{AppError, StoreError};
use crate::models::LeadRecord;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_LIFETIME_SECS: u64 = 3600;
// Refresh a cached token this long before it expires.
const TOKEN_SKEW_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Credentials(format!("invalid service account file {}: {e}", path.display()))
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: u64,
}

/// Appends leads as rows of a Google Sheet using a service account.
pub struct GoogleSheetsStore {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    spreadsheet_id: String,
    range: String,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsStore {
    pub fn new(
        key: ServiceAccountKey,
        spreadsheet_id: String,
        range: String,
    ) -> Result<Self, AppError> {
        if spreadsheet_id.is_empty() {
            return Err(AppError::Config(
                "GOOGLE_SHEETS_SPREADSHEET_ID must be set".to_string(),
            ));
        }
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::Credentials(format!("invalid service account key: {e}")))?;

        Ok(Self {
            key,
            encoding_key,
            spreadsheet_id,
            range,
            client: reqwest::Client::new(),
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let now = unix_now();
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > now + TOKEN_SKEW_SECS {
                return Ok(token.value.clone());
            }
        }

        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))?;

        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange failed ({status}): {body}")));
        }
        let token: TokenResponse = resp.json().await?;

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        });
        tracing::debug!("refreshed Google access token");

        Ok(value)
    }

    fn append_url(&self) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(SHEETS_API)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("invalid Sheets API base url".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}:append", self.range));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

#[async_trait]
impl LeadStore for GoogleSheetsStore {
    async fn append(&self, record: &LeadRecord) -> Result<String, StoreError> {
        let token = self.access_token().await?;
        let body = json!({ "values": [record.to_row()] });

        let resp = self
            .client
            .post(self.append_url()?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let result = parse_append_response(status, &body);
        if matches!(result, Err(StoreError::Auth(_))) {
            self.token.lock().await.take();
        }
        result
    }
}

/// Status is checked before the body is decoded, so error pages need not be JSON.
fn parse_append_response(status: reqwest::StatusCode, body: &str) -> Result<String, StoreError> {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(StoreError::Auth(format!("Sheets API rejected credentials ({status})")));
    }
    if !status.is_success() {
        return Err(StoreError::Unavailable(format!("Sheets API error ({status}): {body}")));
    }
    let data: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| StoreError::Unavailable(format!("invalid Sheets API response: {e}")))?;
    Ok(updated_range(&data))
}

fn updated_range(data: &serde_json::Value) -> String {
    data["updates"]["updatedRange"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
