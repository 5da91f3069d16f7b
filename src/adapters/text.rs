use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::adapters::{envelope, AdapterError};
use crate::endpoint::InvokeEndpoint;

const NO_INSTANCES: &str = "No instances provided in the event.";
const INVALID_INSTANCES: &str = "Invalid format for 'instances'. Expected a list of text strings.";

#[derive(Serialize, Debug)]
pub struct TextResponse {
    pub predictions: Value,
}

#[derive(Serialize, Debug)]
struct ClassifyPayload<'a> {
    instances: &'a [String],
}

/// Validates a batch of text strings and relays it to a classification
/// endpoint as a JSON envelope.
pub struct TextAdapter<E> {
    endpoint: E,
}

impl<E: InvokeEndpoint> TextAdapter<E> {
    pub fn new(endpoint: E) -> Self {
        TextAdapter { endpoint }
    }

    pub async fn handle(&self, event: Value) -> Result<Value, AdapterError> {
        let payload = envelope::resolve(event)?;
        let instances = parse_instances(&payload)?;
        debug!("Relaying {} instances for classification", instances.len());
        let body = serde_json::to_vec(&ClassifyPayload {
            instances: &instances,
        })?;

        Ok(self.endpoint.invoke(body).await?)
    }
}

fn parse_instances(payload: &Map<String, Value>) -> Result<Vec<String>, AdapterError> {
    let Some(value) = payload.get("instances") else {
        return Err(AdapterError::InvalidFormat(NO_INSTANCES.into()));
    };

    let instances: Vec<String> = serde_json::from_value(value.clone())
        .map_err(|_| AdapterError::InvalidFormat(INVALID_INSTANCES.into()))?;
    if instances.is_empty() {
        return Err(AdapterError::InvalidFormat(NO_INSTANCES.into()));
    }

    Ok(instances)
}
