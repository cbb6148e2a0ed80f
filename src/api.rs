// API session: a small blocking HTTP client for the terminal service.
//
// Every endpoint goes through the same path: tokens, positional args and
// keyword args are merged into one payload, POSTed as a form to
// `{protocol}://{host}/{version}/{endpoint}`, and the JSON reply is
// handed back untouched. One attempt per call, errors go to the caller.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::{Map, Value};

use crate::config::ApiConfig;
use crate::credentials::{load_credentials_from, Credentials, ACCESS_TOKEN_KEY, USER_TOKEN_KEY};
use crate::endpoints::{find_endpoint, Endpoint};
use crate::error::ApiError;

/// Arguments for one call. Positional values are matched to the
/// endpoint's parameter names in order; keyword values are applied last
/// and win on conflict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keyword: Map<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kw(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.to_string(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &Map<String, Value> {
        &self.keyword
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Args {
            positional,
            keyword: Map::new(),
        }
    }
}

/// A fully assembled request, built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub payload: Map<String, Value>,
}

impl ApiRequest {
    /// The payload as form fields. Strings go as-is, `null` as an empty
    /// string, everything else as its compact JSON text. Booleans are
    /// therefore `true`/`false`, not the `True`/`False`/`None` the Python
    /// client sends.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.payload
            .iter()
            .map(|(k, v)| (k.clone(), form_value(v)))
            .collect()
    }
}

fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Authenticated session. Holds the HTTP client, the connection settings
/// and the two tokens, which are fixed for the session's lifetime.
#[derive(Clone)]
pub struct Session {
    client: Client,
    config: ApiConfig,
    user_token: String,
    access_token: String,
}

impl Session {
    /// Create a session against the public API. Missing tokens are read
    /// from `~/.terminal-apikeys`.
    pub fn new(user_token: Option<&str>, access_token: Option<&str>) -> Result<Self> {
        Self::with_config(ApiConfig::default(), user_token, access_token)
    }

    /// Create a session with explicit settings. An empty token counts as
    /// not given; each missing token falls back to the credentials file,
    /// then to an empty string.
    pub fn with_config(
        config: ApiConfig,
        user_token: Option<&str>,
        access_token: Option<&str>,
    ) -> Result<Self> {
        let user_token = user_token.filter(|t| !t.is_empty());
        let access_token = access_token.filter(|t| !t.is_empty());

        let stored = if user_token.is_none() || access_token.is_none() {
            let load = load_credentials_from(&config.resolved_credentials_path());
            log::debug!("credentials file status: {:?}", load.status);
            load.credentials
        } else {
            Credentials::default()
        };

        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Session {
            client,
            config,
            user_token: user_token.map_or(stored.user_token, str::to_string),
            access_token: access_token.map_or(stored.access_token, str::to_string),
        })
    }

    /// Current tokens, rebuilt from the session fields on every access.
    pub fn tokens(&self) -> Credentials {
        Credentials::new(&self.user_token, &self.access_token)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Assemble the URL and payload for one call without sending it.
    /// Positional values beyond the endpoint's parameter list are dropped.
    pub fn build_request(&self, endpoint: &Endpoint, args: Args) -> ApiRequest {
        let mut payload = self.tokens().to_map();
        for (name, value) in endpoint.params.iter().zip(args.positional) {
            payload.insert((*name).to_string(), value);
        }
        payload.extend(args.keyword);
        ApiRequest {
            url: self.config.endpoint_url(endpoint.name),
            payload,
        }
    }

    /// Call an endpoint and return the decoded JSON reply.
    pub fn call(&self, endpoint: &Endpoint, args: Args) -> Result<Value> {
        let request = self.build_request(endpoint, args);
        self.send(endpoint.name, &request)
    }

    /// Same as `call`, looking the endpoint up by name.
    pub fn call_by_name(&self, name: &str, args: Args) -> Result<Value> {
        let endpoint = find_endpoint(name).ok_or_else(|| ApiError::UnknownEndpoint(name.into()))?;
        self.call(endpoint, args)
    }

    fn send(&self, name: &str, request: &ApiRequest) -> Result<Value> {
        let fields: Vec<&str> = request
            .payload
            .keys()
            .map(String::as_str)
            .filter(|k| *k != USER_TOKEN_KEY && *k != ACCESS_TOKEN_KEY)
            .collect();
        log::debug!("calling {} with fields {:?}", request.url, fields);

        let res = self
            .client
            .post(&request.url)
            .form(&request.form_fields())
            .send()
            .with_context(|| format!("Failed to send {name} request"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(ApiError::Status {
                endpoint: name.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = res
            .text()
            .with_context(|| format!("Failed to read {name} response"))?;
        let value: Value = serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(value)
    }
}
