use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use yup_oauth2::storage::{TokenInfo, TokenStorage};

use crate::error::{Error, Result};

/// Cached OAuth token as kept in `token.json`.
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

impl From<TokenInfo> for Token {
    fn from(info: TokenInfo) -> Self {
        Self {
            access_token: info.access_token.unwrap_or_default(),
            token_type: "Bearer".to_string(),
            refresh_token: info.refresh_token,
            expiry: info
                .expires_at
                .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond())),
        }
    }
}

impl From<Token> for TokenInfo {
    fn from(token: Token) -> Self {
        Self {
            access_token: Some(token.access_token).filter(|t| !t.is_empty()),
            refresh_token: token.refresh_token,
            expires_at: token
                .expiry
                .and_then(|at| OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()),
            id_token: None,
        }
    }
}

pub fn load_token(path: &Path) -> Result<Token> {
    debug!("Loading token from: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Auth(format!("malformed token file {}: {e}", path.display())))
}

/// Writes the token create-or-truncate, readable by the owner only.
pub fn save_token(path: &Path, token: &Token) -> Result<()> {
    println!("Saving credential file to: {}", path.display());

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| Error::io(path, e))?;
    let json = serde_json::to_string(token)
        .map_err(|e| Error::Auth(format!("could not encode token: {e}")))?;
    writeln!(file, "{json}").map_err(|e| Error::io(path, e))?;

    info!("Cached OAuth token at {}", path.display());
    Ok(())
}

/// Token storage for the authenticator backed by the token file.
///
/// A missing or unreadable file reads as "no token", which sends the
/// authenticator through the consent flow.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        save_token(&self.path, &Token::from(token))?;
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        match load_token(&self.path) {
            Ok(token) => Some(token.into()),
            Err(Error::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!("No cached token at {}", self.path.display());
                None
            }
            Err(e) => {
                warn!("No usable cached token: {}", e);
                None
            }
        }
    }
}
