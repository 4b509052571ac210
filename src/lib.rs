//! Lateral SDK
//!
//! A Rust library for invoking Lateral cloud functions.
//!
//! This SDK provides:
//! - Synchronous and asynchronous cloud function invocation by event name
//! - Account deletion
//! - Pre-authenticated editor URLs, built locally
//! - Short-lived HS256 tokens signed from the application ID and secret
//! - Layered configuration (built-in defaults, stored values, updates)
//!
//! # Example
//!
//! ```no_run
//! use lateral_sdk::{ConfigOverrides, LateralClient, LateralError, RunOutcome, RunRequest};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let client = LateralClient::new(
//!     ConfigOverrides::new()
//!         .with_app_id("app_123")
//!         .with_app_secret("s3cret"),
//! );
//!
//! // Fire and forget: returns the operation envelope
//! let outcome = client
//!     .run_async(RunRequest::new("acct_1", "user.signup").with_data(json!({"plan": "pro"})))
//!     .await?;
//! if let Some(operation) = outcome.parsed_operation() {
//!     println!("Queued operation {:?}", operation.id);
//! }
//!
//! // Wait for the function result
//! match client.run_sync(RunRequest::new("acct_1", "invoice.total")).await {
//!     Ok(RunOutcome::Response(value)) => println!("Result: {:?}", value),
//!     Ok(other) => println!("Nothing returned: {:?}", other),
//!     Err(LateralError::Runtime(e)) => eprintln!("Function failed: {}", e),
//!     Err(e) => return Err(e),
//! }
//!
//! // Link into the hosted editor
//! let url = client.generate_editor_url(Some("acct_1"), None)?;
//! println!("{}", url);
//! # Ok::<(), LateralError>(())
//! # });
//! ```

pub mod lateral_api;

// Re-export commonly used types and functions
pub use lateral_api::{
    client::{LateralClient, RunRequest, DEFAULT_EDITOR_TOKEN_EXPIRES_IN},
    config::{Config, ConfigOverrides, ConfigStore, DEFAULT_TOKEN_EXPIRES_IN, DEFAULT_URL},
    jwt::{parse_expires_in, sign_token, TokenClaims},
    options::{resolve_run_options, RunOptionOverrides, RunOptions},
    resources::{
        ErrorsBody, FunctionError, Operation, OperationEnvelope, OperationResult,
        ServiceErrorInfo,
    },
    response::{interpret_run_response, service_error, Interpretation, RunOutcome},
    types::{ApiError, LateralError, RuntimeError, ServiceError},
};
