/// Lateral cloud functions API module
///
/// ## Call Flow
///
/// 1. Per-call options are resolved against the client configuration
/// 2. A short-lived HS256 token is signed with the application secret
///    (`iss` = application ID, `sub` = account)
/// 3. One request is sent to the Lateral service
/// 4. The response is interpreted into a single outcome or error
pub mod client;
pub mod config;
pub mod jwt;
pub mod options;
pub mod resources;
pub mod response;
pub mod types;

pub use client::{LateralClient, RunRequest};
pub use config::{Config, ConfigOverrides, ConfigStore};
pub use options::{RunOptionOverrides, RunOptions};
pub use resources::*;
pub use response::RunOutcome;
pub use types::{ApiError, LateralError, RuntimeError, ServiceError};
