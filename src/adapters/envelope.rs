use serde::Deserialize;
use serde_json::{Map, Value};

use crate::adapters::AdapterError;

const INVALID_BODY: &str = "Invalid request body format. Expected a JSON object.";

/// The request payload as delivered by the invocation transport.
///
/// HTTP gateways hand the handler a JSON-encoded string under `body`, direct
/// invocations an already-structured object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Body {
    Encoded(String),
    Structured(Map<String, Value>),
}

/// Resolve an invocation event to a plain JSON object, exactly once.
///
/// An event carrying a `body` field nests the real payload there; otherwise
/// the event itself is the payload.
pub(crate) fn resolve(event: Value) -> Result<Map<String, Value>, AdapterError> {
    let Value::Object(mut event) = event else {
        return Err(AdapterError::InvalidFormat(INVALID_BODY.into()));
    };

    let Some(body) = event.remove("body") else {
        return Ok(event);
    };

    match serde_json::from_value::<Body>(body) {
        Ok(Body::Structured(map)) => Ok(map),
        Ok(Body::Encoded(text)) => serde_json::from_str::<Map<String, Value>>(&text)
            .map_err(|_| AdapterError::InvalidFormat(INVALID_BODY.into())),
        Err(_) => Err(AdapterError::InvalidFormat(INVALID_BODY.into())),
    }
}
