use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const COMPLETIONS_PATH: &str = "/api/v3/chat/completions";

/// Model reply used when nothing else is scripted. Wrapped in prose the way
/// the model sometimes answers, so the JSON has to be extracted.
pub const SAMPLE_ANALYSIS_REPLY: &str = r#"Here is the check result:
{
  "total_char_count": 4,
  "full_transcription": "我爱学习",
  "confidence_score": 0.92,
  "response_language": "zh-CN",
  "errors": [
    {
      "wrong_char": "爰",
      "suggested_char": "爱",
      "confidence": "HIGH",
      "error_type": "STROKE",
      "context": "我爰学习",
      "position": {"line": 1, "char": 2}
    }
  ],
  "quality_issues": []
}
Let me know if you need anything else."#;

pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}}
        ]
    })
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Stand-in for the vision chat-completion endpoint
#[derive(Default)]
pub struct MockVisionApi {
    scripted: Mutex<VecDeque<(u16, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockVisionApi {
    /// Queue a reply; unscripted requests get a successful sample analysis
    pub fn push_response(&self, status: u16, body: Value) {
        self.scripted.lock().push_back((status, body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().len()
    }

    /// Bearer keys seen, in order
    pub fn keys_used(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.authorization.as_deref())
            .map(|auth| auth.trim_start_matches("Bearer ").to_string())
            .collect()
    }
}

async fn handle(
    State(mock): State<Arc<MockVisionApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.requests.lock().push(RecordedRequest {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let (status, reply) = mock
        .scripted
        .lock()
        .pop_front()
        .unwrap_or_else(|| (200, completion(SAMPLE_ANALYSIS_REPLY)));

    (
        StatusCode::from_u16(status).expect("scripted status is valid"),
        Json(reply),
    )
}

/// Serve the mock on an ephemeral port and return the endpoint URL
pub async fn spawn_mock_vision_api(mock: Arc<MockVisionApi>) -> String {
    let app = Router::new()
        .route(COMPLETIONS_PATH, post(handle))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock listener");
    let addr = listener.local_addr().expect("Failed to get mock addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}{}", addr, COMPLETIONS_PATH)
}
