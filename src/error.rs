// Failures raised by API calls that are not plain transport errors.
//
// Connection problems come straight from `reqwest` inside the
// `anyhow::Error` chain. The variants here cover the cases where the
// server did answer but the answer is unusable, plus asking for an
// endpoint that does not exist.

use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body is not valid JSON.
    Decode { endpoint: String, message: String },

    /// `call_by_name` was given a name missing from the endpoint table.
    UnknownEndpoint(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status {
                endpoint,
                status,
                body,
            } => write!(f, "{endpoint} failed: HTTP {status} - {body}"),
            ApiError::Decode { endpoint, message } => {
                write!(f, "{endpoint} returned invalid JSON: {message}")
            }
            ApiError::UnknownEndpoint(name) => write!(f, "unknown endpoint: {name}"),
        }
    }
}

impl std::error::Error for ApiError {}
