// Connection settings for the remote terminal service. A `Session` takes
// one of these at construction and never changes it afterwards.

use std::path::PathBuf;

use crate::credentials::DEFAULT_CREDENTIALS_FILE;

pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_HOST: &str = "api.terminal.com";
pub const DEFAULT_VERSION: &str = "v0.1";

/// Where to reach the API and where to look for the credentials file.
///
/// `credentials_path` is `None` by default, meaning
/// `<home>/.terminal-apikeys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub protocol: String,
    pub host: String,
    pub version: String,
    pub credentials_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            protocol: DEFAULT_PROTOCOL.into(),
            host: DEFAULT_HOST.into(),
            version: DEFAULT_VERSION.into(),
            credentials_path: None,
        }
    }
}

impl ApiConfig {
    pub fn with_protocol(mut self, protocol: &str) -> Self {
        self.protocol = protocol.to_string();
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Full URL of one endpoint: `{protocol}://{host}/{version}/{name}`.
    pub fn endpoint_url(&self, name: &str) -> String {
        format!("{}://{}/{}/{}", self.protocol, self.host, self.version, name)
    }

    /// The credentials file this config points at. Falls back to the
    /// current directory when the home directory cannot be resolved.
    pub fn resolved_credentials_path(&self) -> PathBuf {
        match &self.credentials_path {
            Some(p) => p.clone(),
            None => home_file(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

/// Join `filename` onto the current user's home directory.
pub(crate) fn home_file(filename: &str) -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(filename)
}
