use crate::lateral_api::config::{Config, ConfigOverrides, ConfigStore};
use crate::lateral_api::jwt::sign_token;
use crate::lateral_api::options::{resolve_run_options, RunOptionOverrides, RunOptions};
use crate::lateral_api::response::{interpret_run_response, is_success, service_error, RunOutcome};
use crate::lateral_api::types::{ApiError, LateralError};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Token lifetime used for editor URLs unless the caller picks one
pub const DEFAULT_EDITOR_TOKEN_EXPIRES_IN: &str = "24h";

/// HTTP client for the Lateral cloud functions API
///
/// Every call signs a fresh short-lived token from the configured
/// application ID and secret and performs exactly one request. Nothing is
/// cached or retried. Clones share the same configuration.
#[derive(Debug, Clone)]
pub struct LateralClient {
    config: Arc<ConfigStore>,
    client: reqwest::Client,
}

/// One cloud function invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Account the function runs for (becomes the token subject)
    pub account: String,
    /// Event name the cloud functions are registered under
    pub event: String,
    /// Payload handed to the function
    pub data: Option<Value>,
    pub options: RunOptionOverrides,
}

impl RunRequest {
    pub fn new(account: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            event: event.into(),
            data: None,
            options: RunOptionOverrides::default(),
        }
    }

    /// Set the payload (builder pattern)
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Run asynchronously or wait for the result (builder pattern)
    pub fn with_async(mut self, asynchronous: bool) -> Self {
        self.options.asynchronous = Some(asynchronous);
        self
    }

    /// Return the operation envelope instead of its result (builder pattern)
    pub fn with_return_operation(mut self, return_operation: bool) -> Self {
        self.options.return_operation = Some(return_operation);
        self
    }

    /// Token lifetime for this call only (builder pattern)
    pub fn with_token_expires_in(mut self, expires_in: impl Into<String>) -> Self {
        self.options.token_expires_in = Some(expires_in.into());
        self
    }
}

/// Body of a run request
#[derive(Debug, Serialize)]
struct RunPayload<'a> {
    #[serde(rename = "async")]
    asynchronous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
}

impl LateralClient {
    /// Create a client from the built-in defaults overlaid with `config`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lateral_sdk::{ConfigOverrides, LateralClient};
    ///
    /// let client = LateralClient::new(
    ///     ConfigOverrides::new()
    ///         .with_app_id("app_123")
    ///         .with_app_secret("s3cret"),
    /// );
    /// ```
    pub fn new(config: ConfigOverrides) -> Self {
        Self::from_store(ConfigStore::new(config))
    }

    /// Create a client whose configuration layers start from `defaults`
    pub fn with_defaults(defaults: Config, config: ConfigOverrides) -> Self {
        Self::from_store(ConfigStore::with_defaults(defaults, config))
    }

    /// Create a client configured from `LATERAL_*` environment variables
    pub fn from_env() -> Self {
        Self::new(ConfigOverrides::from_env())
    }

    fn from_store(store: ConfigStore) -> Self {
        Self {
            config: Arc::new(store),
            client: reqwest::Client::new(),
        }
    }

    /// Apply a timeout to every request made by this client
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LateralError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(self)
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Merge `overrides` into the live configuration
    pub fn update_config(&self, overrides: ConfigOverrides) -> Result<(), LateralError> {
        self.config.update(overrides)
    }

    /// Full URL for `path` (which must start with `/`) under the configured base URL
    pub fn build_url(&self, path: &str) -> Result<String, LateralError> {
        let config = self.config.get()?;
        Ok(endpoint(&config, path))
    }

    /// Resolve per-call options against the current configuration
    pub fn resolve_options(
        &self,
        overrides: &RunOptionOverrides,
    ) -> Result<RunOptions, LateralError> {
        let config = self.config.get()?;
        Ok(resolve_run_options(overrides, &config))
    }

    /// Invoke the cloud functions registered for an event
    ///
    /// Options default to an asynchronous run that returns the operation
    /// envelope. A synchronous run returns the function's response instead,
    /// or fails with [`LateralError::Runtime`] when the function failed.
    /// 404 and 409 answers are not errors here: they come back as
    /// [`RunOutcome::Skipped`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lateral_sdk::{ConfigOverrides, LateralClient, RunOutcome, RunRequest};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = LateralClient::new(
    ///     ConfigOverrides::new().with_app_id("app_123").with_app_secret("s3cret"),
    /// );
    ///
    /// let request = RunRequest::new("acct_1", "order.created")
    ///     .with_data(json!({"order_id": 42}));
    ///
    /// if let RunOutcome::Response(Some(value)) = client.run_sync(request).await? {
    ///     println!("Function returned {}", value);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome, LateralError> {
        let config = self.config.get()?;
        let options = resolve_run_options(&request.options, &config);
        let token = sign_token(
            &config,
            Some(request.account.as_str()),
            &options.token_expires_in,
        )?;
        let url = endpoint(
            &config,
            &format!("/api/cloud_functions/by_event/{}/run", request.event),
        );

        tracing::debug!(
            "Running cloud functions for event={}: url={}, async={}, return_operation={}",
            request.event,
            url,
            options.asynchronous,
            options.return_operation
        );

        let payload = RunPayload {
            asynchronous: options.asynchronous,
            data: request.data.as_ref(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send run request for event {}: {}", request.event, e);
                ApiError::from(e)
            })?;

        let status = response.status().as_u16();
        tracing::debug!("Received response with status: {}", status);
        let body = read_body(response, status).await?;

        let outcome = interpret_run_response(status, &body, &options).into_outcome();
        match &outcome {
            Ok(RunOutcome::Skipped { status }) => {
                tracing::warn!(
                    "Run for event {} answered HTTP {}, nothing to report",
                    request.event,
                    status
                );
            }
            Ok(_) => tracing::info!("Ran cloud functions for event {}", request.event),
            Err(e) => tracing::error!("Run for event {} failed: {}", request.event, e),
        }
        outcome
    }

    /// [`run`](Self::run) with `async` forced on, whatever the request says
    pub async fn run_async(&self, mut request: RunRequest) -> Result<RunOutcome, LateralError> {
        request.options.asynchronous = Some(true);
        self.run(request).await
    }

    /// [`run`](Self::run) with `async` forced off, whatever the request says
    pub async fn run_sync(&self, mut request: RunRequest) -> Result<RunOutcome, LateralError> {
        request.options.asynchronous = Some(false);
        self.run(request).await
    }

    /// Build a pre-authenticated editor URL
    ///
    /// No request is made. Without an account the token has no subject. The
    /// token lifetime defaults to 24 hours.
    pub fn generate_editor_url(
        &self,
        account: Option<&str>,
        token_expires_in: Option<&str>,
    ) -> Result<String, LateralError> {
        let config = self.config.get()?;
        let expires_in = token_expires_in.unwrap_or(DEFAULT_EDITOR_TOKEN_EXPIRES_IN);
        let token = sign_token(&config, account, expires_in)?;

        tracing::debug!("Generated editor URL for account {:?}", account);
        Ok(endpoint(&config, &format!("/editor?token={}", token)))
    }

    /// Delete an account and everything stored for it
    ///
    /// The token carries no subject. Any non-success status is a
    /// [`LateralError::Service`], including 404 and 409. On success the
    /// response body is returned as-is.
    pub async fn delete_account(
        &self,
        account: impl Into<String>,
        token_expires_in: Option<&str>,
    ) -> Result<Value, LateralError> {
        let account = account.into();
        let config = self.config.get()?;
        let expires_in = token_expires_in.unwrap_or(config.token_expires_in.as_str());
        let token = sign_token(&config, None, expires_in)?;
        let url = endpoint(
            &config,
            &format!("/api/accounts/{}", urlencoding::encode(&account)),
        );

        tracing::info!("Deleting account {}", account);
        tracing::debug!("Sending delete request to: {}", url);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send delete request for account {}: {}", account, e);
                ApiError::from(e)
            })?;

        let status = response.status().as_u16();
        let body = read_body(response, status).await?;

        if !is_success(status) {
            let err = service_error(status, &body);
            tracing::error!("Deleting account {} failed: HTTP {} - {}", account, status, err);
            return Err(LateralError::Service(err));
        }

        let deleted: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse delete response: {}", e);
            ApiError::Parse(format!("Failed to parse response JSON: {}", e))
        })?;

        tracing::info!("Deleted account {}", account);
        Ok(deleted)
    }
}

/// `config.url` followed by `path`, unmodified
fn endpoint(config: &Config, path: &str) -> String {
    format!("{}{}", config.url, path)
}

/// Read the body as text. An unreadable error body is treated as empty so
/// that it degrades to an "Unhandled Error".
async fn read_body(response: reqwest::Response, status: u16) -> Result<String, LateralError> {
    match response.text().await {
        Ok(body) => Ok(body),
        Err(e) if is_success(status) => {
            tracing::error!("Failed to read response body: {}", e);
            Err(ApiError::Parse(format!("Failed to read response: {}", e)).into())
        }
        Err(e) => {
            tracing::debug!("Ignoring unreadable error body: {}", e);
            Ok(String::new())
        }
    }
}
