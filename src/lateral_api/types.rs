use crate::lateral_api::resources::{FunctionError, ServiceErrorInfo};
use std::fmt;

/// Lateral SDK error type
///
/// Every public operation returns this error. The two remote failure kinds
/// are kept apart: [`ServiceError`] means the API rejected the request,
/// [`RuntimeError`] means the request was accepted but the cloud function
/// itself failed.
#[derive(Debug)]
pub enum LateralError {
    /// The API answered with a non-success status
    Service(ServiceError),
    /// The invoked cloud function reported an error in its result
    Runtime(RuntimeError),
    /// Token signing failed (missing secret, bad expiry literal, ...)
    Signing(String),
    /// Transport failure or unreadable success response
    Api(ApiError),
    /// Configuration error
    Config(String),
}

impl fmt::Display for LateralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LateralError::Service(err) => write!(f, "{}", err),
            LateralError::Runtime(err) => write!(f, "{}", err),
            LateralError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
            LateralError::Api(err) => write!(f, "API error: {}", err),
            LateralError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for LateralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LateralError::Service(err) => Some(err),
            LateralError::Runtime(err) => Some(err),
            LateralError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl LateralError {
    /// HTTP status carried by a service error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            LateralError::Service(err) => Some(err.status),
            _ => None,
        }
    }
}

impl From<ServiceError> for LateralError {
    fn from(err: ServiceError) -> Self {
        LateralError::Service(err)
    }
}

impl From<RuntimeError> for LateralError {
    fn from(err: RuntimeError) -> Self {
        LateralError::Runtime(err)
    }
}

impl From<ApiError> for LateralError {
    fn from(err: ApiError) -> Self {
        LateralError::Api(err)
    }
}

impl From<jsonwebtoken::errors::Error> for LateralError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        LateralError::Signing(err.to_string())
    }
}

/// Failure reported by the Lateral API about the request itself
/// (authentication, routing, validation, or an unreadable error body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    pub title: String,
    pub message: Option<String>,
}

impl ServiceError {
    /// Title used when the error body could not be read
    pub const UNHANDLED_TITLE: &'static str = "Unhandled Error";

    pub fn new(status: u16, title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status,
            title: title.into(),
            message: message.filter(|m| !m.is_empty()),
        }
    }

    /// Synthesized error for a response whose body carried no usable `errors` entry
    pub fn unhandled(status: u16) -> Self {
        Self::new(status, Self::UNHANDLED_TITLE, None)
    }

    /// Build from an entry of the API's `errors` array, using the HTTP
    /// status when the entry does not carry one
    pub fn from_info(info: ServiceErrorInfo, http_status: u16) -> Self {
        ServiceError::new(info.status.unwrap_or(http_status), info.title, info.message)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.title, message),
            None => write!(f, "{}", self.title),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Failure raised by the cloud function itself, as reported in a
/// successful operation's result.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    function_error: FunctionError,
}

impl RuntimeError {
    pub fn new(function_error: FunctionError) -> Self {
        Self { function_error }
    }

    /// The error object exactly as the function reported it
    pub fn function_error(&self) -> &FunctionError {
        &self.function_error
    }

    pub fn name(&self) -> &str {
        &self.function_error.name
    }

    pub fn message(&self) -> &str {
        &self.function_error.message
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.function_error.name, self.function_error.message
        )
    }
}

impl std::error::Error for RuntimeError {}

/// Transport-level errors
#[derive(Debug)]
pub enum ApiError {
    /// Network error (connection, timeout, etc.)
    Network(String),
    /// Failed to read or parse a success response
    Parse(String),
    /// Request building failed
    Request(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timeout".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
