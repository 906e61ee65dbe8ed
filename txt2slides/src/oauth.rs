//! # OAuth2 for Google APIs
//!
//! Loads an installed-app client secret, then produces a usable access token:
//!
//! - a cached token file is reused while it is valid,
//! - an expired token with a refresh token is refreshed and written back,
//! - otherwise, when `force_web` is set, the user is sent through the consent
//!   page and pastes the authorisation code back, and the resulting token is
//!   cached.
//!
//! The token file layout (`access_token`, `token_type`, `refresh_token`,
//! `expiry`) is shared with other Google OAuth tooling, so existing token files
//! keep working.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead};
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// Scopes needed to copy the template (Drive) and edit the copy (Slides).
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/presentations",
];

const AUTH_STATE: &str = "state-token";

/// Tokens expiring within this window are treated as expired.
const EXPIRY_LEEWAY_SECS: i64 = 10;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("reading client secret file failed: {0}")]
    ReadCredentials(#[source] io::Error),

    #[error("parsing client secret file to config failed: {0}")]
    ParseCredentials(String),

    #[error("could not get token from {path}: {source}")]
    TokenUnavailable {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read authorization code: {0}")]
    ReadCode(#[source] io::Error),

    #[error("failed to retrieve token from web: {0}")]
    Exchange(String),

    #[error("failed to refresh token: {0}")]
    Refresh(String),

    #[error("failed to cache OAuth token: {0}")]
    SaveToken(#[source] io::Error),

    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth client registration, as found under `installed` or `web` in the
/// credentials file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn from_json(raw: &[u8]) -> Result<Self, OAuthError> {
        let file: CredentialsFile = serde_json::from_slice(raw)
            .map_err(|e| OAuthError::ParseCredentials(e.to_string()))?;
        let secret = file
            .installed
            .or(file.web)
            .ok_or_else(|| OAuthError::ParseCredentials("no credentials found".to_string()))?;
        if secret.redirect_uris.is_empty() {
            return Err(OAuthError::ParseCredentials(
                "missing redirect URL in the client credentials".to_string(),
            ));
        }
        Ok(secret)
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris.first().map(String::as_str).unwrap_or_default()
    }

    /// Consent page URL requesting offline access for [`SCOPES`].
    pub fn auth_code_url(&self, state: &str) -> Result<Url, OAuthError> {
        let scope = SCOPES.join(" ");
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::ParseCredentials(format!("invalid auth_uri: {e}")))
    }
}

/// Cached OAuth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// A missing expiry, or the zero timestamp some writers emit, means the
    /// token never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) if expiry.timestamp() > 0 => {
                expiry <= now + Duration::seconds(EXPIRY_LEEWAY_SECS)
            }
            _ => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<String>) -> Token {
        Token {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Authorised access to Google APIs.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    token: Token,
}

impl OAuthClient {
    /// Loads credentials and obtains a valid token, running the interactive
    /// flow (reading the authorisation code from `code_input`) only when
    /// `force_web` is set.
    pub async fn new<R: BufRead>(
        credentials_path: &Path,
        token_path: &Path,
        force_web: bool,
        code_input: R,
    ) -> Result<Self, OAuthError> {
        let raw = fs::read(credentials_path).map_err(|e| {
            error!(error = %e, path = %credentials_path.display(), "Failed to read client secret file");
            OAuthError::ReadCredentials(e)
        })?;
        let secret = ClientSecret::from_json(&raw)?;
        let http = Client::builder().build()?;
        let path_display = token_path.display().to_string();

        let token = match token_from_file(token_path) {
            Ok(token) if !token.is_expired() => {
                debug!(path = %path_display, "Using cached OAuth token");
                token
            }
            Ok(Token {
                refresh_token: Some(refresh),
                ..
            }) => {
                info!(path = %path_display, "Cached OAuth token expired, refreshing");
                let fresh = refresh_token(&http, &secret, &refresh).await?;
                save_token(token_path, &fresh)?;
                fresh
            }
            Ok(_) if !force_web => {
                return Err(OAuthError::TokenUnavailable {
                    path: path_display,
                    source: "token expired and refresh token is not set".into(),
                });
            }
            Err(e) if !force_web => {
                error!(error = %e, path = %path_display, "No usable OAuth token");
                return Err(OAuthError::TokenUnavailable {
                    path: path_display,
                    source: e,
                });
            }
            _ => {
                let token = token_from_web(&http, &secret, code_input).await?;
                println!("Saving credential file to: {path_display}");
                save_token(token_path, &token)?;
                token
            }
        };

        Ok(OAuthClient { token })
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }
}

/// Retrieves a token from a local file.
pub fn token_from_file(path: &Path) -> Result<Token, BoxError> {
    let raw = fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Saves a token to a file path, readable only by the owner on unix.
pub fn save_token(path: &Path, token: &Token) -> Result<(), OAuthError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(path).map_err(OAuthError::SaveToken)?;
    serde_json::to_writer(file, token)
        .map_err(|e| OAuthError::SaveToken(io::Error::new(io::ErrorKind::Other, e)))?;
    info!(path = %path.display(), "Cached OAuth token");
    Ok(())
}

/// Prints the consent URL, reads the code and exchanges it for a token.
async fn token_from_web<R: BufRead>(
    http: &Client,
    secret: &ClientSecret,
    mut code_input: R,
) -> Result<Token, OAuthError> {
    let auth_url = secret.auth_code_url(AUTH_STATE)?;
    println!(
        "Go to the following link in your browser then type the authorization code: \n{auth_url}"
    );

    let mut line = String::new();
    code_input.read_line(&mut line).map_err(OAuthError::ReadCode)?;
    let code = line.trim();
    if code.is_empty() {
        return Err(OAuthError::ReadCode(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no authorization code provided",
        )));
    }

    exchange_code(http, secret, code).await
}

pub async fn exchange_code(
    http: &Client,
    secret: &ClientSecret,
    code: &str,
) -> Result<Token, OAuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", secret.client_id.as_str()),
        ("client_secret", secret.client_secret.as_str()),
        ("redirect_uri", secret.redirect_uri()),
    ];
    let response = post_token_request(http, &secret.token_uri, &params)
        .await
        .map_err(|e| {
            error!(error = %e, "Authorization code exchange failed");
            OAuthError::Exchange(e)
        })?;
    info!("Retrieved OAuth token from web");
    Ok(response.into_token(None))
}

/// Trades `refresh` for a new access token. The refresh token is carried over
/// when the response does not rotate it.
pub async fn refresh_token(
    http: &Client,
    secret: &ClientSecret,
    refresh: &str,
) -> Result<Token, OAuthError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh),
        ("client_id", secret.client_id.as_str()),
        ("client_secret", secret.client_secret.as_str()),
    ];
    let response = post_token_request(http, &secret.token_uri, &params)
        .await
        .map_err(|e| {
            error!(error = %e, "Token refresh failed");
            OAuthError::Refresh(e)
        })?;
    Ok(response.into_token(Some(refresh.to_string())))
}

async fn post_token_request(
    http: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let response = http
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("token endpoint returned {status}: {body}"));
    }
    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| format!("invalid token response: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> ClientSecret {
        ClientSecret::from_json(
            br#"{"installed": {
                "client_id": "client_id.apps.googleusercontent.com",
                "client_secret": "secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn web_credentials_are_accepted() {
        let parsed = ClientSecret::from_json(
            br#"{"web": {"client_id": "id", "client_secret": "s", "auth_uri": "https://a", "token_uri": "https://t", "redirect_uris": ["http://localhost"]}}"#,
        )
        .unwrap();
        assert_eq!(parsed.client_id, "id");
    }

    #[test]
    fn credentials_without_redirect_are_rejected() {
        let err = ClientSecret::from_json(
            br#"{"installed": {"client_id": "id", "client_secret": "s", "auth_uri": "https://a", "token_uri": "https://t"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing redirect URL"));
    }

    #[test]
    fn auth_url_requests_offline_access_for_both_scopes() {
        let url = secret().auth_code_url("state-token").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("state".into(), "state-token".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost".into())));
        assert!(pairs.contains(&(
            "scope".into(),
            "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/presentations"
                .into()
        )));
    }

    #[test]
    fn zero_expiry_never_expires() {
        let token: Token = serde_json::from_str(
            r#"{"access_token":"at","token_type":"Bearer","expiry":"0001-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(!token.is_expired());
    }

    #[test]
    fn expiry_within_leeway_counts_as_expired() {
        let now = Utc::now();
        let token = Token {
            access_token: "at".into(),
            token_type: "Bearer".into(),
            refresh_token: None,
            expiry: Some(now + Duration::seconds(5)),
        };
        assert!(token.is_expired_at(now));
        assert!(!token.is_expired_at(now - Duration::seconds(60)));
    }

    #[test]
    fn refresh_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".into(),
            token_type: "Bearer".into(),
            refresh_token: None,
            expires_in: Some(3600),
        };
        let token = response.into_token(Some("keep-me".into()));
        assert_eq!(token.refresh_token.as_deref(), Some("keep-me"));
        assert!(!token.is_expired());
    }
}
