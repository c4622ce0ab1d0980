//! Sink: append the extracted mapping to a Google Sheet, or print it.
//!
//! Mode selection is the presence of the service-account credential file.
//! With the file, the client mints an RS256 JWT assertion, exchanges it for
//! an access token, looks up the spreadsheet's first sheet, and appends one
//! four-column row. Without it, the full mapping is pretty-printed to
//! stdout and no network call is made.
//!
//! Append failures are logged and reported as [`SinkOutcome::Failed`];
//! they never abort the pipeline.

use crate::config::ExtractionConfig;
use crate::error::PipelineError;
use crate::output::{FieldMap, SinkOutcome};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const SPREADSHEET_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

// ── Credential and wire types ────────────────────────────────────────────

/// The subset of a Google service-account key file the sink needs.
#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

// ── Client ───────────────────────────────────────────────────────────────

/// A minimal Sheets v4 client scoped to "append one row".
pub struct SheetsClient {
    client: reqwest::Client,
    api_base: String,
}

impl SheetsClient {
    /// Client against the production Google endpoint.
    pub fn new() -> Result<Self, PipelineError> {
        Self::with_api_base(SHEETS_API_BASE)
    }

    /// Client against an alternative Sheets host. Tests point this at a
    /// local mock server; the token endpoint is taken from the credential
    /// file itself.
    pub fn with_api_base(base: impl Into<String>) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_base: base.into(),
        })
    }

    fn load_key(path: &Path) -> Result<ServiceAccountKey, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::Credentials {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| PipelineError::Credentials {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Sign a one-hour JWT assertion for the spreadsheet scope.
    fn signed_assertion(key: &ServiceAccountKey) -> Result<String, PipelineError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| PipelineError::Internal(e.to_string()))?
            .as_secs();
        let claims = Claims {
            iss: &key.client_email,
            scope: SPREADSHEET_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?)
    }

    async fn access_token(&self, key: &ServiceAccountKey) -> Result<String, PipelineError> {
        let assertion = Self::signed_assertion(key)?;
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", JWT_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::TokenExchange {
                detail: format!("HTTP {status}: {body}"),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| PipelineError::TokenExchange {
                    detail: e.to_string(),
                })?;
        Ok(token.access_token)
    }

    /// Resolve the title of the spreadsheet's first sheet.
    async fn first_sheet_title(
        &self,
        token: &str,
        sheet_id: &str,
    ) -> Result<String, PipelineError> {
        let url = format!("{}/v4/spreadsheets/{}", self.api_base, sheet_id);
        let response = self
            .client
            .get(&url)
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let meta: SpreadsheetMeta = response.json().await?;
        meta.sheets
            .first()
            .map(|s| s.properties.title.clone())
            .ok_or_else(|| PipelineError::MissingSheet {
                sheet_id: sheet_id.to_string(),
            })
    }

    /// Append `fields` as one row after the last row of the first sheet.
    pub async fn append_row(
        &self,
        config: &ExtractionConfig,
        fields: &FieldMap,
    ) -> Result<(), PipelineError> {
        let key = Self::load_key(&config.credentials_path)?;
        let token = self.access_token(&key).await?;
        let title = self.first_sheet_title(&token, &config.sheet_id).await?;

        let row = build_row(fields);
        debug!("Row to append: {row:?}");
        debug!("Field keys: {:?}", fields.keys().collect::<Vec<_>>());

        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}!A1:append",
            self.api_base, config.sheet_id, title
        );
        let body = serde_json::json!({ "values": [row] });
        let response = self
            .client
            .post(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        info!("Row appended to sheet '{title}'");
        Ok(())
    }
}

// ── Row building ─────────────────────────────────────────────────────────

/// Look `keys` up in order and flatten the first present value.
///
/// The key list encodes alias fallbacks ("Full Name" then "Name"); a key
/// that is present with a null value still wins the lookup and flattens
/// to `""`.
pub fn row_value(fields: &FieldMap, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| fields.get(*k))
        .map(flatten)
        .unwrap_or_default()
}

fn flatten(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Build the fixed four-column row: name, phone, date, email.
pub fn build_row(fields: &FieldMap) -> Vec<String> {
    vec![
        row_value(fields, &["Full Name", "Name"]),
        row_value(fields, &["Phone", "Contact", "Contact #"]),
        row_value(fields, &["Date"]),
        row_value(fields, &["Email", "E-mail"]),
    ]
}

// ── Entry point ──────────────────────────────────────────────────────────

/// Persist the mapping.
///
/// Spreadsheet mode when `config.credentials_path` exists, console mode
/// otherwise. Console mode prints the full mapping, not just the four row
/// columns, and touches no network.
pub async fn persist(fields: &FieldMap, config: &ExtractionConfig) -> SinkOutcome {
    if !config.credentials_path.exists() {
        warn!(
            "Credential file '{}' not found; printing the mapping instead",
            config.credentials_path.display()
        );
        print_fields(fields);
        return SinkOutcome::Printed;
    }

    let client = match SheetsClient::new() {
        Ok(c) => c,
        Err(e) => {
            error!("Error writing to sheet: {e}");
            return SinkOutcome::Failed;
        }
    };
    match client.append_row(config, fields).await {
        Ok(()) => SinkOutcome::Appended,
        Err(e) => {
            error!("Error writing to sheet: {e}");
            SinkOutcome::Failed
        }
    }
}

/// Pretty-print the full mapping to stdout as indented JSON.
pub fn print_fields(fields: &FieldMap) {
    match serde_json::to_string_pretty(fields) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Could not serialise fields: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn alias_fallback_name_for_full_name() {
        let f = fields(&[("Name", json!("Jane Roe"))]);
        let row = build_row(&f);
        assert_eq!(row[0], "Jane Roe");
    }

    #[test]
    fn primary_key_wins_over_alias() {
        let f = fields(&[("Full Name", json!("A")), ("Name", json!("B"))]);
        assert_eq!(build_row(&f)[0], "A");
    }

    #[test]
    fn list_values_flatten_comma_joined() {
        let f = fields(&[("Phone", json!(["a", "b"]))]);
        assert_eq!(build_row(&f)[1], "a, b");
    }

    #[test]
    fn null_and_absent_become_empty() {
        let f = fields(&[("Date", Value::Null)]);
        let row = build_row(&f);
        assert_eq!(row[2], ""); // null
        assert_eq!(row[3], ""); // absent
    }

    #[test]
    fn present_null_still_wins_the_alias_lookup() {
        let f = fields(&[("Full Name", Value::Null), ("Name", json!("B"))]);
        assert_eq!(build_row(&f)[0], "");
    }

    #[test]
    fn non_string_scalars_stringify() {
        let f = fields(&[("Phone", json!(5551234)), ("Date", json!([1, 2]))]);
        let row = build_row(&f);
        assert_eq!(row[1], "5551234");
        assert_eq!(row[2], "1, 2");
    }

    #[test]
    fn row_has_four_columns_in_order() {
        let f = fields(&[
            ("Full Name", json!("N")),
            ("Phone", json!("P")),
            ("Date", json!("D")),
            ("Email", json!("E")),
            ("DOB", json!("ignored")),
        ]);
        assert_eq!(build_row(&f), vec!["N", "P", "D", "E"]);
    }

    #[test]
    fn contact_and_e_mail_aliases() {
        let f = fields(&[("Contact #", json!("555")), ("E-mail", json!("a@b.c"))]);
        let row = build_row(&f);
        assert_eq!(row[1], "555");
        assert_eq!(row[3], "a@b.c");
    }

    #[tokio::test]
    async fn console_mode_without_credentials() {
        let config = ExtractionConfig::builder()
            .credentials_path("/definitely/not/here.json")
            .build()
            .unwrap();
        let f = fields(&[("Full Name", json!("X"))]);
        assert_eq!(persist(&f, &config).await, SinkOutcome::Printed);
    }

    #[tokio::test]
    async fn unreadable_credentials_fail_softly() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        file.write_all(b"{\"client_email\":\"a@b\",\"private_key\":\"garbage\"}")
            .unwrap();
        let config = ExtractionConfig::builder()
            .credentials_path(file.path())
            .sheet_id("some-sheet")
            .build()
            .unwrap();
        let f = fields(&[("Full Name", json!("X"))]);
        assert_eq!(persist(&f, &config).await, SinkOutcome::Failed);
    }
}
