use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keep an explicit JSON `null` as `Some(Value::Null)`; only a missing
/// field becomes `None` (via `#[serde(default)]`).
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JavaScript-style truthiness of a JSON value
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Success body of a cloud function invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationEnvelope {
    #[serde(default)]
    pub operation: Option<Operation>,
}

/// Operation envelope returned by the Lateral service for one invocation
///
/// Only `result` is interpreted by the client. Every other field is kept
/// verbatim in `extra` and re-serialized unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What an operation's `result` field says about the function execution
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// `result` is missing or falsy; carries the value exactly as received
    Missing(Option<Value>),
    /// The function failed
    Failed(FunctionError),
    /// The function completed; carries `result.response` if present
    Completed(Option<Value>),
}

impl Operation {
    /// Classify the `result` field
    pub fn outcome(&self) -> OperationResult {
        let result = match &self.result {
            Some(result) if is_truthy(result) => result,
            other => return OperationResult::Missing(other.clone()),
        };

        if let Some(error) = result.get("error").filter(|e| is_truthy(e)) {
            return OperationResult::Failed(FunctionError::from_value(error));
        }

        OperationResult::Completed(result.get("response").cloned())
    }

    /// The operation ID as a string, when the service sent one
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().and_then(Value::as_str)
    }

    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }
}

/// Error object reported by a failed cloud function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionError {
    #[serde(default = "default_function_error_name")]
    pub name: String,
    #[serde(default)]
    pub message: String,
    /// Any further fields (stack, code, ...) as sent by the function
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_function_error_name() -> String {
    "Error".to_string()
}

impl FunctionError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// Read an `error` value of any shape. Objects are deserialized; a bare
    /// string becomes the message; anything else is rendered as JSON.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => serde_json::from_value(value.clone()).unwrap_or_else(|_| {
                // name/message present but not strings
                let text = |key: &str| {
                    map.get(key).map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                };
                FunctionError {
                    name: text("name").unwrap_or_else(default_function_error_name),
                    message: text("message").unwrap_or_default(),
                    extra: map
                        .iter()
                        .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "message")
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                }
            }),
            Value::String(s) => FunctionError::new(default_function_error_name(), s.clone()),
            other => FunctionError::new(default_function_error_name(), other.to_string()),
        }
    }
}

/// Failure body returned by the Lateral API for non-success statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsBody {
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl ErrorsBody {
    /// First entry of `errors`, if it has the expected shape
    pub fn first(&self) -> Option<ServiceErrorInfo> {
        self.errors
            .first()
            .and_then(|entry| serde_json::from_value(entry.clone()).ok())
    }
}

/// One entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorInfo {
    #[serde(
        default,
        deserialize_with = "status_code",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<u16>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Accept the status as a number or as a numeric string
fn status_code<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
