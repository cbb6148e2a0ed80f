// Credential file loading.
//
// The file is plain `key=value` text with one pair per line. Loading is
// best effort: nothing here returns an error, a bad or missing file just
// yields empty tokens.

use serde_json::{Map, Value};
use std::path::Path;

use crate::config::home_file;

/// File name looked up in the home directory when none is given.
pub const DEFAULT_CREDENTIALS_FILE: &str = ".terminal-apikeys";

pub const USER_TOKEN_KEY: &str = "user_token";
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// The two tokens every API call carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user_token: String,
    pub access_token: String,
}

impl Credentials {
    pub fn new(user_token: &str, access_token: &str) -> Self {
        Credentials {
            user_token: user_token.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// The tokens as a JSON object, the base layer of every request payload.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(USER_TOKEN_KEY.into(), Value::String(self.user_token.clone()));
        map.insert(ACCESS_TOKEN_KEY.into(), Value::String(self.access_token.clone()));
        map
    }
}

/// How much of the credentials file could be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    Partial,
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsLoad {
    pub credentials: Credentials,
    pub status: LoadStatus,
}

/// Parse credential file contents.
///
/// Each line is split on its first `=`. Keys must match exactly, values
/// are trimmed. A line with no `=` stops parsing; whatever was read
/// before it is kept.
pub fn parse_credentials(text: &str) -> CredentialsLoad {
    let mut credentials = Credentials::default();
    let mut seen_user = false;
    let mut seen_access = false;
    let mut malformed = false;

    for (idx, line) in text.lines().enumerate() {
        let Some((key, value)) = line.split_once('=') else {
            log::warn!("credentials: line {} has no '=', ignoring the rest", idx + 1);
            malformed = true;
            break;
        };
        match key {
            USER_TOKEN_KEY => {
                credentials.user_token = value.trim().to_string();
                seen_user = true;
            }
            ACCESS_TOKEN_KEY => {
                credentials.access_token = value.trim().to_string();
                seen_access = true;
            }
            _ => {}
        }
    }

    let status = match (seen_user, seen_access) {
        (false, false) => LoadStatus::Defaulted,
        (true, true) if !malformed => LoadStatus::Loaded,
        _ => LoadStatus::Partial,
    };
    CredentialsLoad { credentials, status }
}

/// Read and parse a credentials file at an explicit path. Bytes that are
/// not valid UTF-8 are replaced, so a bad value on one line does not
/// cost the tokens on the others.
pub fn load_credentials_from(path: &Path) -> CredentialsLoad {
    match std::fs::read(path) {
        Ok(bytes) => parse_credentials(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            log::debug!("credentials: cannot read {}: {}", path.display(), e);
            CredentialsLoad {
                credentials: Credentials::default(),
                status: LoadStatus::Defaulted,
            }
        }
    }
}

/// Load credentials from `filename` in the home directory. Never fails.
pub fn load_credentials(filename: &str) -> Credentials {
    load_credentials_from(&home_file(filename)).credentials
}
