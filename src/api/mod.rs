pub mod accuracy;
pub mod contract_status;
pub mod location;
pub mod signals;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::Endpoints;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned malformed JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} did not return an array")]
    NotAnArray { url: String },
}

/// HTTP client for the dashboard's read-only endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoints.timeout_secs.max(1)))
            .build()
            .map_err(|source| ApiError::Transport {
                url: String::new(),
                source,
            })?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET `url` and return the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET a JSON array of `T`.
    async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, ApiError> {
        let value = self.get_json(url).await?;
        decode_list(url, value)
    }
}

/// Decode an array payload element by element. Non-arrays are an error;
/// elements that fail to decode are skipped with a warning.
pub fn decode_list<T: DeserializeOwned>(url: &str, value: Value) -> Result<Vec<T>, ApiError> {
    let Value::Array(items) = value else {
        return Err(ApiError::NotAnArray {
            url: url.to_string(),
        });
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(url, index = i, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();

    tracing::debug!(url, total, kept = decoded.len(), "decoded list");
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;
    use serde_json::json;

    #[test]
    fn test_decode_list_rejects_object() {
        let err = decode_list::<Signal>("u", json!({"error": "down"})).unwrap_err();
        assert!(matches!(err, ApiError::NotAnArray { .. }));
    }

    #[test]
    fn test_decode_list_skips_bad_elements() {
        let value = json!([
            {"pairName": "CAKE/USDT", "signal": "Buy"},
            "garbage",
            {"pairName": "ETH/USDT", "signal": "Hold"}
        ]);
        let items = decode_list::<Signal>("u", value).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].pair_name, "ETH/USDT");
    }

    #[test]
    fn test_decode_empty_array() {
        let items = decode_list::<Signal>("u", json!([])).unwrap();
        assert!(items.is_empty());
    }
}
