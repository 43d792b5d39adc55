use serde::{Deserialize, Serialize};
use serde_json::{Deserializer, Value, value::RawValue};

use super::{DispatchError, Result};

#[cfg(test)]
mod tests;

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Body written when the request envelope cannot be parsed at all.
pub const INVALID_REQUEST_BODY: &str =
    r#"{"jsonrpc": "2.0", "id":null, "error":"Invalid JSON-RPC."}"#;

#[derive(Debug, Deserialize)]
pub struct RequestMessage<'a> {
    #[serde(borrow, default)]
    pub id: Option<&'a RawValue>,
    #[serde(default)]
    pub method: String,
    #[serde(borrow, default)]
    pub params: Option<Vec<&'a RawValue>>,
}

impl<'a> RequestMessage<'a> {
    /// Parses the first JSON value in `body` as a request object.
    ///
    /// Anything after the first value is ignored.
    pub fn parse(body: &'a [u8]) -> Result<Self> {
        let raw = Deserializer::from_slice(body)
            .into_iter::<&'a RawValue>()
            .next()
            .ok_or(DispatchError::InvalidRequest)?
            .map_err(|_| DispatchError::InvalidRequest)?;
        if !raw.get().starts_with('{') {
            return Err(DispatchError::InvalidRequest);
        }
        serde_json::from_str(raw.get()).map_err(|_| DispatchError::InvalidRequest)
    }

    /// Splits `method` into service and method names at the first `.`.
    pub fn service_method(&self) -> Option<(&str, &str)> {
        self.method.split_once('.')
    }

    pub fn params(&self) -> &[&'a RawValue] {
        self.params.as_deref().unwrap_or_default()
    }
}

/// The outbound envelope. Exactly one of `result` and `error` is present.
#[derive(Debug, Serialize)]
pub struct ResponseMessage<'a> {
    pub id: Option<&'a RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> ResponseMessage<'a> {
    pub fn from_result(id: Option<&'a RawValue>, result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self {
                id,
                result: Some(value),
                error: None,
            },
            Err(e) => Self {
                id,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}
