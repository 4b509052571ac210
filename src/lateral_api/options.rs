use crate::lateral_api::config::Config;

/// Per-call options as supplied by the caller; unset fields are resolved
/// against the client configuration by [`resolve_run_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptionOverrides {
    /// Run asynchronously (default: `true`)
    pub asynchronous: Option<bool>,
    /// Token lifetime for this call (default: the configured lifetime)
    pub token_expires_in: Option<String>,
    /// Return the operation envelope instead of its result
    /// (default: whatever `asynchronous` resolves to)
    pub return_operation: Option<bool>,
}

/// Fully resolved options for one `run` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub asynchronous: bool,
    pub token_expires_in: String,
    pub return_operation: bool,
}

/// Resolve caller options against the configuration.
///
/// Precedence: `{ async: true, tokenExpiresIn: config }`, then the caller's
/// values. `return_operation` follows the resolved `asynchronous` unless the
/// caller set it explicitly.
pub fn resolve_run_options(overrides: &RunOptionOverrides, config: &Config) -> RunOptions {
    let asynchronous = overrides.asynchronous.unwrap_or(true);
    let token_expires_in = overrides
        .token_expires_in
        .clone()
        .unwrap_or_else(|| config.token_expires_in.clone());

    RunOptions {
        asynchronous,
        token_expires_in,
        return_operation: overrides.return_operation.unwrap_or(asynchronous),
    }
}
