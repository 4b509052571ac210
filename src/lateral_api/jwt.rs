use crate::lateral_api::config::Config;
use crate::lateral_api::types::LateralError;
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = MS_PER_SECOND * 60.0;
const MS_PER_HOUR: f64 = MS_PER_MINUTE * 60.0;
const MS_PER_DAY: f64 = MS_PER_HOUR * 24.0;
const MS_PER_WEEK: f64 = MS_PER_DAY * 7.0;
const MS_PER_YEAR: f64 = MS_PER_DAY * 365.25;

/// Longest duration literal accepted
const MAX_LITERAL_LEN: usize = 100;

static DURATION_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(-?(?:\d+)?\.?\d+) *(milliseconds?|msecs?|ms|seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?|y)?$",
    )
    .expect("duration literal pattern is valid")
});

/// Claims carried by every Lateral token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer - the application ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject - the account the call acts for; absent for app-level calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Parse a duration literal such as `"30s"`, `"24h"`, `"2 days"` or
/// `"1.5h"` into milliseconds. A bare number is taken as milliseconds.
pub fn parse_expires_in(literal: &str) -> Result<f64, LateralError> {
    let invalid = || {
        LateralError::Signing(format!(
            "expiresIn should be a string representing a timespan, got {:?}",
            literal
        ))
    };

    if literal.is_empty() || literal.len() > MAX_LITERAL_LEN {
        return Err(invalid());
    }

    let captures = DURATION_LITERAL.captures(literal).ok_or_else(invalid)?;
    let value: f64 = captures[1].parse().map_err(|_| invalid())?;
    let unit = captures
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| "ms".to_string());

    let scale = match unit.as_str() {
        "years" | "year" | "yrs" | "yr" | "y" => MS_PER_YEAR,
        "weeks" | "week" | "w" => MS_PER_WEEK,
        "days" | "day" | "d" => MS_PER_DAY,
        "hours" | "hour" | "hrs" | "hr" | "h" => MS_PER_HOUR,
        "minutes" | "minute" | "mins" | "min" | "m" => MS_PER_MINUTE,
        "seconds" | "second" | "secs" | "sec" | "s" => MS_PER_SECOND,
        "milliseconds" | "millisecond" | "msecs" | "msec" | "ms" => 1.0,
        _ => return Err(invalid()),
    };

    Ok(value * scale)
}

/// Build the claims for a token issued now
pub fn build_claims(
    issuer: Option<&str>,
    subject: Option<&str>,
    expires_in: &str,
) -> Result<TokenClaims, LateralError> {
    let lifetime_ms = parse_expires_in(expires_in)?;
    let iat = chrono::Utc::now().timestamp();
    let exp = (iat as f64 + lifetime_ms / MS_PER_SECOND).floor() as i64;

    Ok(TokenClaims {
        iss: issuer.map(str::to_string),
        sub: subject.map(str::to_string),
        iat,
        exp,
    })
}

/// Sign claims with an HMAC secret (HS256)
///
/// Fails when the secret is missing or empty.
pub fn sign_claims(claims: &TokenClaims, secret: Option<&str>) -> Result<String, LateralError> {
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LateralError::Signing("app secret must have a value".to_string()))?;

    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Sign a token for the configured application
///
/// The token is issued by `config.app_id`, acts for `account` (omitted
/// from the claims when `None`), and expires after `expires_in`.
pub fn sign_token(
    config: &Config,
    account: Option<&str>,
    expires_in: &str,
) -> Result<String, LateralError> {
    let claims = build_claims(config.app_id.as_deref(), account, expires_in)?;
    let token = sign_claims(&claims, config.app_secret.as_deref())?;

    tracing::debug!(
        "Signed token: sub={:?}, expires_in={}, length={}",
        claims.sub,
        expires_in,
        token.len()
    );
    Ok(token)
}
