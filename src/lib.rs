// Library root
// ------------
// Blocking client for the terminal.com compute-terminal API.
//
// Module responsibilities:
// - `config`: where the API lives (protocol, host, version) and where the
//   credentials file is.
// - `credentials`: best-effort loading of `user_token` / `access_token`
//   from `~/.terminal-apikeys`.
// - `endpoints`: the table of remote operations and their parameter
//   order. Each row also becomes a method on `Session`.
// - `api`: `Session`, request assembly and the HTTP round-trip.
// - `error`: failures for bad statuses, bad JSON and unknown endpoints.
//
// Typical use:
//
//     let session = Session::new(None, None)?;
//     let me = session.who_am_i(Args::new())?;
//     let snap = session.get_snapshot(Args::new().arg("snap123"))?;
pub mod api;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;

pub use api::{ApiRequest, Args, Session};
pub use config::ApiConfig;
pub use credentials::{
    load_credentials, load_credentials_from, parse_credentials, Credentials, CredentialsLoad,
    LoadStatus, DEFAULT_CREDENTIALS_FILE,
};
pub use endpoints::{find_endpoint, Endpoint, ENDPOINTS};
pub use error::ApiError;
