use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::adapters::{envelope, AdapterError};
use crate::endpoint::InvokeEndpoint;

const INVALID_INSTANCES: &str = "Invalid format for 'instances'. Expected a list of lists.";
const NON_NUMERIC: &str = "Invalid value in 'instances'. Rows may only contain numbers.";
const JAGGED: &str = "Invalid shape for 'instances'. All rows must have the same length.";

#[derive(Serialize, Debug)]
pub struct TabularResponse {
    pub prediction: Value,
}

/// Validates a batch of numeric rows and relays it to a regression endpoint
/// as delimited text.
pub struct TabularAdapter<E> {
    endpoint: E,
}

impl<E: InvokeEndpoint> TabularAdapter<E> {
    pub fn new(endpoint: E) -> Self {
        TabularAdapter { endpoint }
    }

    pub async fn handle(&self, event: Value) -> Result<Value, AdapterError> {
        let payload = envelope::resolve(event)?;
        let rows = parse_instances(&payload)?;
        let body = encode_rows(&rows);
        debug!("Encoded {} rows into {} bytes", rows.len(), body.len());

        Ok(self.endpoint.invoke(body.into_bytes()).await?)
    }
}

/// Cells stay as `serde_json::Number` so values keep the textual form they
/// arrived in.
fn parse_instances(payload: &Map<String, Value>) -> Result<Vec<Vec<Number>>, AdapterError> {
    let Some(Value::Array(rows)) = payload.get("instances") else {
        return Err(AdapterError::InvalidFormat(INVALID_INSTANCES.into()));
    };

    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let Value::Array(cells) = row else {
            return Err(AdapterError::InvalidFormat(INVALID_INSTANCES.into()));
        };
        let mut fields = Vec::with_capacity(cells.len());
        for cell in cells {
            match cell {
                Value::Number(n) => fields.push(n.clone()),
                _ => return Err(AdapterError::InvalidFormat(NON_NUMERIC.into())),
            }
        }
        parsed.push(fields);
    }

    if let Some(first) = parsed.first() {
        if parsed.iter().any(|row| row.len() != first.len()) {
            return Err(AdapterError::InvalidFormat(JAGGED.into()));
        }
    }

    Ok(parsed)
}

/// Fields separated by commas, rows terminated by CRLF, no header row.
fn encode_rows(rows: &[Vec<Number>]) -> String {
    let mut out = String::new();
    for row in rows {
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&field.to_string());
        }
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::adapters::testing::FakeEndpoint;

    fn adapter(endpoint: FakeEndpoint) -> TabularAdapter<FakeEndpoint> {
        TabularAdapter::new(endpoint)
    }

    fn decode_rows(text: &str) -> Vec<Vec<Number>> {
        text.split_terminator("\r\n")
            .map(|line| {
                line.split(',')
                    .filter(|field| !field.is_empty())
                    .map(|field| serde_json::from_str(field).unwrap())
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn encodes_rows_as_delimited_text() {
        let relay = adapter(FakeEndpoint::replying(json!([0.42])));

        let prediction = relay
            .handle(json!({"instances": [[1, 2, 3], [4, 5, 6]]}))
            .await
            .unwrap();

        assert_eq!(prediction, json!([0.42]));
        assert_eq!(relay.endpoint.calls(), vec![b"1,2,3\r\n4,5,6\r\n".to_vec()]);
    }

    #[tokio::test]
    async fn accepts_an_event_nesting_the_payload_under_body() {
        let relay = adapter(FakeEndpoint::replying(json!({"score": 1.0})));

        let prediction = relay
            .handle(json!({"body": "{\"instances\": [[2.5, -3]]}"}))
            .await
            .unwrap();

        assert_eq!(prediction, json!({"score": 1.0}));
        assert_eq!(relay.endpoint.calls(), vec![b"2.5,-3\r\n".to_vec()]);
    }

    #[tokio::test]
    async fn empty_batch_produces_an_empty_payload() {
        let relay = adapter(FakeEndpoint::replying(json!([])));

        relay.handle(json!({"instances": []})).await.unwrap();

        assert_eq!(relay.endpoint.calls(), vec![Vec::<u8>::new()]);
    }

    #[tokio::test]
    async fn rejects_a_row_that_is_not_a_list() {
        let relay = adapter(FakeEndpoint::replying(json!([])));

        let err = relay
            .handle(json!({"instances": [[1, 2], "bad"]}))
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::InvalidFormat(_)));
        assert!(err.to_string().contains("Invalid format"));
        assert!(relay.endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn rejects_missing_instances() {
        let relay = adapter(FakeEndpoint::replying(json!([])));

        let err = relay.handle(json!({"rows": [[1]]})).await.unwrap_err();

        assert!(matches!(err, AdapterError::InvalidFormat(_)));
        assert!(relay.endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn rejects_non_numeric_cells() {
        let relay = adapter(FakeEndpoint::replying(json!([])));

        let err = relay
            .handle(json!({"instances": [[1, "two"]]}))
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn rejects_jagged_batches() {
        let relay = adapter(FakeEndpoint::replying(json!([])));

        let err = relay
            .handle(json!({"instances": [[1, 2], [3]]}))
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::InvalidFormat(_)));
        assert!(relay.endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn surfaces_endpoint_failures() {
        let relay = adapter(FakeEndpoint::failing("connection reset"));

        let err = relay.handle(json!({"instances": [[1]]})).await.unwrap_err();

        assert!(matches!(err, AdapterError::Endpoint(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn encoding_round_trips_numeric_batches() {
        let batches = [
            vec![vec![json!(1), json!(2), json!(3)], vec![json!(4), json!(5), json!(6)]],
            vec![vec![json!(-7.25), json!(0.5)], vec![json!(1e3), json!(0)]],
            vec![],
        ];

        for batch in batches {
            let rows: Vec<Vec<Number>> = batch
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.as_number().unwrap().clone())
                        .collect()
                })
                .collect();
            assert_eq!(decode_rows(&encode_rows(&rows)), rows);
        }
    }
}
