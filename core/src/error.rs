use std::fmt;
use thiserror::Error;

/// The error type for reqchain operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request would carry credentials over a non-https connection.
    ///
    /// Raised before anything is sent; opt out per request with
    /// `RequestContext::with_enforce_https(false)`.
    InsecureTransport,

    /// The credential failed to provide a token.
    Authentication,

    /// The request could not be sent (connection, DNS, TLS, ...).
    ServiceRequest,

    /// The response could not be received or read.
    ServiceResponse,

    /// The redirect budget of the request was exhausted.
    TooManyRedirects,

    /// The deadline of the request elapsed.
    Timeout,

    /// The request was cancelled by the caller.
    Cancelled,

    /// Request cannot be built (invalid uri, header, etc.)
    RequestInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Unexpected errors
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Check if this error happened on the wire and sending again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ServiceRequest | ErrorKind::ServiceResponse | ErrorKind::Timeout
        )
    }
}

// Convenience constructors
impl Error {
    /// Create an insecure transport error
    pub fn insecure_transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsecureTransport, message)
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a service request error
    pub fn service_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceRequest, message)
    }

    /// Create a service response error
    pub fn service_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceResponse, message)
    }

    /// Create a too many redirects error
    pub fn too_many_redirects(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooManyRedirects, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a cancelled error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InsecureTransport => write!(f, "insecure transport"),
            ErrorKind::Authentication => write!(f, "authentication failed"),
            ErrorKind::ServiceRequest => write!(f, "service request failed"),
            ErrorKind::ServiceResponse => write!(f, "service response failed"),
            ErrorKind::TooManyRedirects => write!(f, "too many redirects"),
            ErrorKind::Timeout => write!(f, "timed out"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
