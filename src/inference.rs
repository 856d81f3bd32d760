//! Client for the X-ray inference API.
//!
//! One multipart POST per image, no retries. Failures map onto the four
//! user-facing messages the front-ends display verbatim.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

#[derive(Error, Debug)]
pub enum InferenceError {
    /// Server answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("No response from server. Please check if the API server is running and the URL is correct.")]
    NoResponse,

    #[error("CORS error: The API server needs to allow requests from this origin. Please check CORS settings on the backend server.")]
    CrossOrigin,

    /// The request could not be built (bad URL, bad header, bad MIME type).
    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Inference API abstraction (allows mocking)
pub trait InferenceClient {
    /// Upload one image and return the raw prediction payload.
    fn predict(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, InferenceError>;

    fn predict_file(&self, path: &Path) -> Result<Value, InferenceError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.predict(&file_name, bytes)
    }
}

/// ngrok tunnels need a header to skip their browser interstitial.
pub fn is_ngrok_url(url: &str) -> bool {
    url.contains("ngrok-free.dev") || url.contains("ngrok.io")
}

/// Blocking HTTP client for the `/predict` endpoint.
pub struct HttpInferenceClient {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpInferenceClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, InferenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl InferenceClient for HttpInferenceClient {
    fn predict(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, InferenceError> {
        tracing::info!(
            url = %self.url,
            file_name,
            size = bytes.len(),
            "Uploading image for inference"
        );

        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| InferenceError::Request(e.to_string()))?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.url).multipart(form);
        if is_ngrok_url(&self.url) {
            request = request.header(NGROK_SKIP_HEADER, "true");
        }

        let response = request.send().map_err(|e| {
            let mapped = transport_error(&e);
            tracing::warn!(url = %self.url, error = %e, "Inference request failed");
            mapped
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = server_error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %message, "Inference server returned an error");
            return Err(InferenceError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response
            .json()
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;
        tracing::info!(status = status.as_u16(), "Inference completed");
        Ok(payload)
    }
}

fn transport_error(e: &reqwest::Error) -> InferenceError {
    if e.is_builder() {
        return InferenceError::Request(e.to_string());
    }
    if e.to_string().contains("CORS") {
        return InferenceError::CrossOrigin;
    }
    InferenceError::NoResponse
}

/// First of `detail`, `message`, `error` in the body, else the status line.
pub fn server_error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let from_body = parsed.as_ref().and_then(|json| {
        ["detail", "message", "error"]
            .iter()
            .filter_map(|key| json.get(*key))
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Null | Value::Bool(false) | Value::String(_) => None,
                other => Some(other.to_string()),
            })
    });

    from_body.unwrap_or_else(|| {
        format!(
            "Server error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string()
    })
}

/// Test double: returns a fixed payload or a fixed server error.
pub struct MockInferenceClient {
    response: Value,
    failure: Option<(u16, String)>,
    uploads: Mutex<Vec<String>>,
}

impl MockInferenceClient {
    pub fn new(response: Value) -> Self {
        Self {
            response,
            failure: None,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            response: Value::Null,
            failure: Some((status, message.to_string())),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// File names seen so far, in call order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default()
    }
}

impl InferenceClient for MockInferenceClient {
    fn predict(&self, file_name: &str, _bytes: Vec<u8>) -> Result<Value, InferenceError> {
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(file_name.to_string());
        }
        match &self.failure {
            Some((status, message)) => Err(InferenceError::Server {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(self.response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_message_prefers_detail() {
        let body = r#"{"detail": "Invalid image", "message": "ignored"}"#;
        assert_eq!(
            server_error_message(StatusCode::BAD_REQUEST, body),
            "Invalid image"
        );
    }

    #[test]
    fn server_message_falls_through_keys() {
        let body = r#"{"detail": "", "error": "model not loaded"}"#;
        assert_eq!(
            server_error_message(StatusCode::SERVICE_UNAVAILABLE, body),
            "model not loaded"
        );
    }

    #[test]
    fn server_message_stringifies_structured_detail() {
        let body = r#"{"detail": [{"loc": ["body", "file"], "msg": "field required"}]}"#;
        let message = server_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(message.contains("field required"));
    }

    #[test]
    fn server_message_falls_back_to_status_line() {
        assert_eq!(
            server_error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Server error: 500 Internal Server Error"
        );
        assert_eq!(
            server_error_message(StatusCode::BAD_GATEWAY, "{}"),
            "Server error: 502 Bad Gateway"
        );
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(
            InferenceError::NoResponse.to_string(),
            "No response from server. Please check if the API server is running and the URL is correct."
        );
        assert!(InferenceError::CrossOrigin.to_string().starts_with("CORS error:"));
        assert_eq!(
            InferenceError::Request("bad url".into()).to_string(),
            "Request error: bad url"
        );
        let server = InferenceError::Server {
            status: 400,
            message: "Invalid image".into(),
        };
        assert_eq!(server.to_string(), "Invalid image");
    }

    #[test]
    fn ngrok_detection() {
        assert!(is_ngrok_url("https://abc.ngrok-free.dev/predict"));
        assert!(is_ngrok_url("https://abc.ngrok.io/predict"));
        assert!(!is_ngrok_url("http://localhost:8000/predict"));
    }

    #[test]
    fn invalid_url_is_a_request_error() {
        let client = HttpInferenceClient::new("not a url", 5).unwrap();
        let err = client.predict("chest.png", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, InferenceError::Request(_)), "{err:?}");
    }

    #[test]
    fn refused_connection_is_no_response() {
        let client = HttpInferenceClient::new("http://127.0.0.1:9/predict", 5).unwrap();
        let err = client.predict("chest.png", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, InferenceError::NoResponse), "{err:?}");
    }

    #[test]
    fn mock_records_uploads() {
        let mock = MockInferenceClient::new(json!({"results": {}}));
        let payload = mock.predict("a.png", Vec::new()).unwrap();
        assert_eq!(payload, json!({"results": {}}));
        mock.predict("b.jpg", Vec::new()).unwrap();
        assert_eq!(mock.uploads(), vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn mock_failure_surfaces_server_error() {
        let mock = MockInferenceClient::failing(503, "model not loaded");
        let err = mock.predict("a.png", Vec::new()).unwrap_err();
        assert!(matches!(err, InferenceError::Server { status: 503, .. }));
    }

    #[test]
    fn predict_file_reads_and_names_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mock = MockInferenceClient::new(json!({"Pneumonia": 0.8}));
        mock.predict_file(&path).unwrap();
        assert_eq!(mock.uploads(), vec!["scan.png"]);

        let missing = mock.predict_file(&dir.path().join("missing.png"));
        assert!(matches!(missing, Err(InferenceError::Io(_))));
    }
}
