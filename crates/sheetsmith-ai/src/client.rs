//! HTTP client for the cell map backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FillError, GENERIC_FAILURE};

/// Backend reference (`c{col}r{row}`, 1-based) -> cell value
pub type CellMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRequest {
    pub prompt: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

#[derive(Clone)]
pub struct CellMapClient {
    http: reqwest::Client,
    base_url: String,
}

impl CellMapClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FillError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("sheetsmith/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// POST the prompt to `/generate-cellmap` and return the raw cell map
    pub async fn generate(&self, request: &FillRequest) -> Result<CellMap, FillError> {
        let url = format!("{}/generate-cellmap", self.base_url);
        tracing::debug!(%url, model = %request.model, "Requesting cell map");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .and_then(detail_text)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());

            tracing::warn!(status = status.as_u16(), %detail, "Cell map backend returned an error");
            return Err(FillError::Remote {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(FillError::MalformedResponse(format!(
                "expected an object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(FillError::MalformedResponse(e.to_string())),
        }
    }
}

fn detail_text(detail: Value) -> Option<String> {
    match detail {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
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
    use httpmock::prelude::*;
    use serde_json::json;

    fn request() -> FillRequest {
        FillRequest {
            prompt: "two greetings".into(),
            model: "test-model".into(),
        }
    }

    #[tokio::test]
    async fn test_generate_posts_prompt_and_model() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/generate-cellmap")
                    .json_body(json!({"prompt": "two greetings", "model": "test-model"}));
                then.status(200).json_body(json!({"c1r1": "Hello", "c2r1": "World"}));
            })
            .await;

        let client = CellMapClient::new(server.base_url()).unwrap();
        let map = client.generate(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(map.get("c1r1"), Some(&json!("Hello")));
        assert_eq!(map.len(), 2);
    }

    #[tokio::test]
    async fn test_error_detail_is_passed_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate-cellmap");
                then.status(500).json_body(json!({"detail": "model overloaded"}));
            })
            .await;

        let client = CellMapClient::new(server.base_url()).unwrap();
        let err = client.generate(&request()).await.unwrap_err();

        assert!(matches!(
            &err,
            FillError::Remote { status: 500, detail } if detail == "model overloaded"
        ));
        assert_eq!(err.to_string(), "model overloaded");
    }

    #[tokio::test]
    async fn test_unreadable_error_body_uses_generic_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate-cellmap");
                then.status(502).body("<html>bad gateway</html>");
            })
            .await;

        let client = CellMapClient::new(format!("{}/", server.base_url())).unwrap();
        let err = client.generate(&request()).await.unwrap_err();

        assert_eq!(err.to_string(), GENERIC_FAILURE);
        assert_eq!(err.code(), "AI_REMOTE");
    }

    #[tokio::test]
    async fn test_non_object_body_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate-cellmap");
                then.status(200).json_body(json!(["c1r1"]));
            })
            .await;

        let client = CellMapClient::new(server.base_url()).unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, FillError::MalformedResponse(_)));
    }
}
