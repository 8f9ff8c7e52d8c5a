//! Error types for the OhMySMTP client.

use std::fmt;

/// Category of a failed API call.
///
/// Derived from the HTTP status the service answered with. Failures that never
/// produced a response are always [`ErrorKind::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Base kind. Used for 404 and for transport failures without a response.
    Generic,
    /// 401: the server token was rejected.
    InvalidCredentials,
    /// 422: the service refused the payload.
    InvalidInput,
    /// 500
    InternalServerError,
    /// 503
    ServiceUnavailable,
    /// Any other status.
    Unknown,
}

impl ErrorKind {
    /// Map an HTTP status code onto a kind.
    ///
    /// 404 deliberately stays [`ErrorKind::Generic`]; there is no not-found kind.
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            401 => ErrorKind::InvalidCredentials,
            404 => ErrorKind::Generic,
            422 => ErrorKind::InvalidInput,
            500 => ErrorKind::InternalServerError,
            503 => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Generic => "api error",
            ErrorKind::InvalidCredentials => "invalid credentials",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::InternalServerError => "internal server error",
            ErrorKind::ServiceUnavailable => "service unavailable",
            ErrorKind::Unknown => "unknown error",
        };
        f.write_str(label)
    }
}

/// A classified failure returned by the OhMySMTP API or the transport beneath it.
///
/// `error_code` and `status_code` are `0` when the service did not supply them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (status {status_code}, code {error_code}): {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    error_code: i64,
    status_code: u16,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, error_code: i64, status_code: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            error_code,
            status_code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Service-defined error code from the response body's `ErrorCode` field.
    pub fn error_code(&self) -> i64 {
        self.error_code
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

/// Errors that can occur when using the OhMySMTP client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A send failed; see [`ApiError::kind`] for the category.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The builder was given an unusable setting.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The server token or user agent is not a valid header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl Error {
    /// The classified API error, if this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}
