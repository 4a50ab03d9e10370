//! Upstream Request Sources
//!
//! Where pending requests come from when the cache has nothing usable.

use std::future::Future;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::geo::GeoPoint;

// == Request Source Trait ==
/// Fetches the pending requests visible from a location.
///
/// Records are passed through as opaque JSON; neither the cache nor the
/// service looks inside them.
pub trait RequestSource: Send + Sync {
    fn fetch_pending(&self, point: GeoPoint) -> impl Future<Output = Result<Vec<Value>>> + Send;
}

// == HTTP Source ==
/// Reads pending requests from the upstream REST API.
///
/// Issues `GET {base_url}/requests/pending?latitude=..&longitude=..` and
/// accepts either a bare JSON array or an envelope `{ "data": [...] }`.
#[derive(Debug, Clone)]
pub struct HttpRequestSource {
    client: Client,
    base_url: String,
}

impl HttpRequestSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pending_cache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The endpoint pending requests are read from.
    pub fn endpoint(&self) -> String {
        format!("{}/requests/pending", self.base_url)
    }
}

impl RequestSource for HttpRequestSource {
    fn fetch_pending(&self, point: GeoPoint) -> impl Future<Output = Result<Vec<Value>>> + Send {
        let request = self.client.get(self.endpoint()).query(&[
            ("latitude", point.latitude),
            ("longitude", point.longitude),
        ]);

        async move {
            let response = request.send().await?.error_for_status()?;
            let body: Value = response.json().await?;
            let records = extract_records(body)?;
            debug!(records = records.len(), "Fetched pending requests from upstream");
            Ok(records)
        }
    }
}

/// Pulls the record list out of an upstream response body.
fn extract_records(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            Some(Value::Null) => Ok(Vec::new()),
            _ => Err(ServiceError::Upstream(
                "response object has no `data` array".to_string(),
            )),
        },
        other => Err(ServiceError::Upstream(format!(
            "expected a JSON array of requests, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_bare_array() {
        let records = extract_records(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], 2);
    }

    #[test]
    fn test_extract_envelope() {
        let records = extract_records(json!({"data": [{"id": 7}], "total": 1})).unwrap();
        assert_eq!(records, vec![json!({"id": 7})]);

        let empty = extract_records(json!({"data": null})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_extract_rejects_other_shapes() {
        assert!(matches!(
            extract_records(json!({"items": []})),
            Err(ServiceError::Upstream(_))
        ));
        assert!(matches!(
            extract_records(json!("nope")),
            Err(ServiceError::Upstream(msg)) if msg.contains("a string")
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let source = HttpRequestSource::with_client(Client::new(), "http://upstream:8080/");
        assert_eq!(source.endpoint(), "http://upstream:8080/requests/pending");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_upstream_error() {
        // Port 9 (discard) on localhost is not expected to be listening
        let source = HttpRequestSource::new("http://127.0.0.1:9").unwrap();
        let result = source.fetch_pending(GeoPoint::new(40.7128, -74.0060)).await;
        assert!(matches!(result, Err(ServiceError::Upstream(_))));
    }
}
