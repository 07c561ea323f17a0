// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tavola_app::Row;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

pub const APP_NAME: &str = "tavola";

const SAVED_TABLES_RESOURCE: &str = "rest/v1/saved_tables";

/// An authenticated backend session. Held by the runtime for the lifetime of
/// the process and optionally cached on disk between launches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
}

/// Outcome of fetching the caller's saved row set. Every variant is
/// non-fatal; transport and server failures are the `Err` path instead.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Vec<Row>),
    NoSavedData,
    InvalidFormat,
}

/// Checks credentials before any network call is made. Messages are shown
/// inline in the sign-in form.
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        bail!("Email is required.");
    }
    if !email.contains('@') {
        bail!("Invalid email format.");
    }
    if password.is_empty() {
        bail!("Password is required.");
    }
    if password.chars().count() < 6 {
        bail!("Password must be at least 6 characters long.");
    }
    Ok(())
}

/// Maps raw provider error text to one of a fixed set of user-facing
/// messages. Unrecognized text falls back to a generic failure line.
pub fn map_auth_error(message: &str) -> &'static str {
    let msg = message.to_lowercase();

    if msg.contains("missing email or phone") {
        return "Please enter your email address.";
    }
    if msg.contains("invalid login credentials") {
        return "Invalid email or password.";
    }
    if msg.contains("email not confirmed") {
        return "Please confirm your email address.";
    }
    if msg.contains("user already registered") {
        return "This account already exists. Please sign in.";
    }
    if msg.contains("password should be at least") {
        return "Password must be at least 6 characters long.";
    }

    "Authentication failed. Please try again."
}

/// Classifies a saved-table payload. Well-formed means a `rows` field holding
/// an array of row-shaped records; anything else is a distinguishable,
/// non-fatal `InvalidFormat`.
pub fn parse_saved_payload(payload: &Value) -> LoadOutcome {
    let Some(rows) = payload.get("rows") else {
        return LoadOutcome::InvalidFormat;
    };
    if !rows.is_array() {
        return LoadOutcome::InvalidFormat;
    }
    match serde_json::from_value::<Vec<Row>>(rows.clone()) {
        Ok(rows) => LoadOutcome::Loaded(rows),
        Err(_) => LoadOutcome::InvalidFormat,
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    anon_key: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("cloud.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("cloud.base_url must use http or https, got {base_url:?}");
        }
        if anon_key.trim().is_empty() {
            bail!("cloud.anon_key must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            anon_key: anon_key.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        validate_credentials(email, password)?;
        let email = email.trim();

        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.anon_key)
            .json(&CredentialsRequest { email, password })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(mapped_auth_error(status, &body));
        }

        let token: TokenResponse = response.json().context("decode sign-in response")?;
        Ok(Session {
            access_token: token.access_token,
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_owned()),
        })
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        validate_credentials(email, password)?;
        let email = email.trim();

        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&CredentialsRequest { email, password })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(mapped_auth_error(status, &body));
        }
        Ok(())
    }

    /// Fetches the saved row set associated with the session's user. One row
    /// set per user; absence and malformed content are outcomes, not errors.
    pub fn load_row_set(&self, session: &Session) -> Result<LoadOutcome> {
        let response = self
            .http
            .get(format!(
                "{}/{}?user_id=eq.{}&select=data",
                self.base_url, SAVED_TABLES_RESOURCE, session.user_id
            ))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(rest_error(status, &body));
        }

        let records: Vec<SavedTableRecord> =
            response.json().context("decode saved table response")?;
        let Some(record) = records.into_iter().next() else {
            return Ok(LoadOutcome::NoSavedData);
        };
        let Some(payload) = record.data else {
            return Ok(LoadOutcome::NoSavedData);
        };
        Ok(parse_saved_payload(&payload))
    }

    /// Upserts the row set keyed by the session's user, stamping the write
    /// time. Later saves overwrite earlier ones.
    pub fn save_row_set(&self, session: &Session, rows: &[Row]) -> Result<()> {
        let updated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("format save timestamp")?;

        let response = self
            .http
            .post(format!("{}/{}", self.base_url, SAVED_TABLES_RESOURCE))
            .header("apikey", &self.anon_key)
            .header("Prefer", "resolution=merge-duplicates")
            .bearer_auth(&session.access_token)
            .json(&SaveRequest {
                user_id: &session.user_id,
                data: RowSetPayload { rows },
                updated_at: &updated_at,
            })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(rest_error(status, &body));
        }
        Ok(())
    }
}

/// Where the session cache lives: `TAVOLA_SESSION_PATH` if set, otherwise
/// the platform data directory.
pub fn default_session_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("TAVOLA_SESSION_PATH") {
        return Ok(PathBuf::from(path));
    }

    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TAVOLA_SESSION_PATH to the session file")
    })?;
    Ok(data_root.join(APP_NAME).join("session.json"))
}

pub fn store_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create session directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_string_pretty(session).context("encode session")?;
    fs::write(path, encoded).with_context(|| format!("write session file {}", path.display()))
}

/// Restores a cached session. A missing or corrupt cache reads as no
/// session; it never fails the caller.
pub fn load_cached_session(path: &Path) -> Option<Session> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

pub fn clear_session(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => {
            Err(error).with_context(|| format!("remove session file {}", path.display()))
        }
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!("cannot reach {} ({} )", base_url, error)
}

fn mapped_auth_error(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<AuthErrorEnvelope>(body)
        && let Some(text) = parsed.text()
    {
        return anyhow!("{}", map_auth_error(&text));
    }

    anyhow!("{} (status {})", map_auth_error(""), status.as_u16())
}

fn rest_error(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<RestErrorEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if body.len() < 100 && !body.contains('{') && !body.is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SavedTableRecord {
    data: Option<Value>,
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    user_id: &'a str,
    data: RowSetPayload<'a>,
    updated_at: &'a str,
}

#[derive(Debug, Serialize)]
struct RowSetPayload<'a> {
    rows: &'a [Row],
}

// The auth provider spreads its message across different fields depending on
// the endpoint and failure kind.
#[derive(Debug, Deserialize)]
struct AuthErrorEnvelope {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl AuthErrorEnvelope {
    fn text(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RestErrorEnvelope {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{
        LoadOutcome, Session, clear_session, load_cached_session, map_auth_error,
        parse_saved_payload, store_session, validate_credentials,
    };
    use anyhow::Result;
    use serde_json::json;
    use tavola_testkit::{row, row_set_payload};

    #[test]
    fn validate_credentials_accepts_well_formed_input() {
        assert!(validate_credentials("user@example.com", "secret1").is_ok());
        assert!(validate_credentials("  user@example.com  ", "123456").is_ok());
    }

    #[test]
    fn validate_credentials_rejects_each_malformed_field() {
        let cases = [
            ("", "secret1", "Email is required."),
            ("   ", "secret1", "Email is required."),
            ("userexample.com", "secret1", "Invalid email format."),
            ("user@example.com", "", "Password is required."),
            (
                "user@example.com",
                "12345",
                "Password must be at least 6 characters long.",
            ),
        ];
        for (email, password, expected) in cases {
            let error = validate_credentials(email, password)
                .expect_err("malformed credentials should fail");
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn auth_errors_map_to_fixed_messages() {
        let cases = [
            ("Missing email or phone", "Please enter your email address."),
            ("Invalid login credentials", "Invalid email or password."),
            ("Email not confirmed", "Please confirm your email address."),
            (
                "User already registered",
                "This account already exists. Please sign in.",
            ),
            (
                "Password should be at least 6 characters",
                "Password must be at least 6 characters long.",
            ),
            (
                "something else entirely",
                "Authentication failed. Please try again.",
            ),
        ];
        for (raw, expected) in cases {
            assert_eq!(map_auth_error(raw), expected);
        }
    }

    #[test]
    fn well_formed_payload_parses_to_rows() {
        let rows = vec![row(1, "A", "Alpha", 2.0, 120.0), row(2, "B", "Beta", 1.0, 200.0)];
        let outcome = parse_saved_payload(&row_set_payload(&rows));
        assert_eq!(outcome, LoadOutcome::Loaded(rows));
    }

    #[test]
    fn payload_without_rows_field_is_invalid() {
        assert_eq!(
            parse_saved_payload(&json!({ "columns": [] })),
            LoadOutcome::InvalidFormat
        );
    }

    #[test]
    fn payload_with_non_array_rows_is_invalid() {
        assert_eq!(
            parse_saved_payload(&json!({ "rows": "oops" })),
            LoadOutcome::InvalidFormat
        );
    }

    #[test]
    fn payload_with_malformed_row_records_is_invalid() {
        assert_eq!(
            parse_saved_payload(&json!({ "rows": [{ "id": "not-a-number" }] })),
            LoadOutcome::InvalidFormat
        );
    }

    #[test]
    fn empty_rows_array_is_a_valid_empty_row_set() {
        assert_eq!(
            parse_saved_payload(&json!({ "rows": [] })),
            LoadOutcome::Loaded(Vec::new())
        );
    }

    #[test]
    fn session_cache_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("session.json");
        let session = Session {
            access_token: "token-123".to_owned(),
            user_id: "user-9".to_owned(),
            email: "user@example.com".to_owned(),
        };

        store_session(&path, &session)?;
        assert_eq!(load_cached_session(&path), Some(session));

        clear_session(&path)?;
        assert_eq!(load_cached_session(&path), None);

        // Clearing an already-absent cache is fine.
        clear_session(&path)?;
        Ok(())
    }

    #[test]
    fn corrupt_session_cache_reads_as_absent() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{{not json")?;
        assert_eq!(load_cached_session(&path), None);
        Ok(())
    }
}
