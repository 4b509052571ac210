//! Interpretation of cloud function responses
//!
//! The interpreter is a pure function of the HTTP status, the raw body and
//! the resolved [`RunOptions`]. It never fails: every response maps onto one
//! [`Interpretation`], and [`Interpretation::into_outcome`] turns that into
//! the `Result` handed back to callers.

use crate::lateral_api::options::RunOptions;
use crate::lateral_api::resources::{ErrorsBody, Operation, OperationEnvelope, OperationResult};
use crate::lateral_api::types::{ApiError, LateralError, RuntimeError, ServiceError};
use serde_json::Value;

/// Statuses on `run` that mean "nothing to report" rather than failure
const SOFT_FAILURE_STATUSES: [u16; 2] = [404, 409];

/// Successful result of a `run` call
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The body's `operation` field exactly as received (`return_operation`
    /// was set). `None` when the body had no such field.
    Operation(Option<Value>),
    /// `result.response` of a completed operation; `None` when the result
    /// carried no response
    Response(Option<Value>),
    /// The operation had no truthy `result`. Carries the value that was
    /// found there (`None` when the field was absent).
    NoResult(Option<Value>),
    /// The service answered 404 or 409
    Skipped { status: u16 },
}

impl RunOutcome {
    /// The plain value of this outcome: the operation, the function
    /// response, the passthrough value, or `None`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            RunOutcome::Operation(value)
            | RunOutcome::Response(value)
            | RunOutcome::NoResult(value) => value,
            RunOutcome::Skipped { .. } => None,
        }
    }

    /// The raw operation value, if this outcome carries one
    pub fn operation(&self) -> Option<&Value> {
        match self {
            RunOutcome::Operation(value) => value.as_ref(),
            _ => None,
        }
    }

    /// The operation read as an [`Operation`]; `None` when there is none or
    /// it is not a JSON object
    pub fn parsed_operation(&self) -> Option<Operation> {
        self.operation()
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }
}

/// Every way a `run` response can end
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Operation(Option<Value>),
    Response(Option<Value>),
    NoResult(Option<Value>),
    Skipped(u16),
    ServiceFailure(ServiceError),
    RuntimeFailure(RuntimeError),
    /// Success status whose body is not an operation envelope
    Malformed(String),
}

impl Interpretation {
    pub fn into_outcome(self) -> Result<RunOutcome, LateralError> {
        match self {
            Interpretation::Operation(operation) => Ok(RunOutcome::Operation(operation)),
            Interpretation::Response(value) => Ok(RunOutcome::Response(value)),
            Interpretation::NoResult(value) => Ok(RunOutcome::NoResult(value)),
            Interpretation::Skipped(status) => Ok(RunOutcome::Skipped { status }),
            Interpretation::ServiceFailure(err) => Err(LateralError::Service(err)),
            Interpretation::RuntimeFailure(err) => Err(LateralError::Runtime(err)),
            Interpretation::Malformed(msg) => Err(LateralError::Api(ApiError::Parse(msg))),
        }
    }
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Build the service error for a non-success response
///
/// Uses the first entry of the body's `errors` array. A body that is not
/// JSON, or has no usable entry, yields an "Unhandled Error" carrying the
/// HTTP status.
pub fn service_error(status: u16, body: &str) -> ServiceError {
    serde_json::from_str::<ErrorsBody>(body)
        .ok()
        .and_then(|errors| errors.first())
        .map(|info| ServiceError::from_info(info, status))
        .unwrap_or_else(|| ServiceError::unhandled(status))
}

/// Interpret the response to a `run` request
pub fn interpret_run_response(status: u16, body: &str, options: &RunOptions) -> Interpretation {
    if !is_success(status) {
        if SOFT_FAILURE_STATUSES.contains(&status) {
            return Interpretation::Skipped(status);
        }
        return Interpretation::ServiceFailure(service_error(status, body));
    }

    if options.return_operation {
        return match serde_json::from_str::<Value>(body) {
            Ok(Value::Null) => Interpretation::Malformed("Response body is null".to_string()),
            Ok(value) => Interpretation::Operation(value.get("operation").cloned()),
            Err(e) => Interpretation::Malformed(format!("Failed to parse response JSON: {}", e)),
        };
    }

    let operation = match serde_json::from_str::<OperationEnvelope>(body) {
        Ok(OperationEnvelope {
            operation: Some(operation),
        }) => operation,
        Ok(_) => {
            return Interpretation::Malformed("Response body has no operation".to_string());
        }
        Err(e) => {
            return Interpretation::Malformed(format!("Failed to parse response JSON: {}", e));
        }
    };

    match operation.outcome() {
        OperationResult::Missing(value) => Interpretation::NoResult(value),
        OperationResult::Failed(error) => Interpretation::RuntimeFailure(RuntimeError::new(error)),
        OperationResult::Completed(response) => Interpretation::Response(response),
    }
}
