//! Scriptable stand-in for the caption service, served by axum on an
//! ephemeral local port.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

/// A canned HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    /// JSON reply from literal text, so key order is kept as written.
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Replies to hand out and requests received, per endpoint.
pub struct FakeService {
    pub submit_reply: Mutex<Reply>,
    pub submit_bodies: Mutex<Vec<Value>>,
    pub status_replies: Mutex<VecDeque<Reply>>,
    pub status_calls: AtomicUsize,
    pub load_reply: Mutex<Reply>,
    pub load_bodies: Mutex<Vec<Value>>,
    pub caption_bodies: Mutex<Vec<Value>>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            submit_reply: Mutex::new(Reply::json(
                StatusCode::OK,
                r#"{"message": "Captioning process started in the background", "files": []}"#,
            )),
            submit_bodies: Mutex::new(Vec::new()),
            status_replies: Mutex::new(VecDeque::new()),
            status_calls: AtomicUsize::new(0),
            load_reply: Mutex::new(Reply::json(
                StatusCode::OK,
                r#"{"message": "Service 'm1' started successfully"}"#,
            )),
            load_bodies: Mutex::new(Vec::new()),
            caption_bodies: Mutex::new(Vec::new()),
        }
    }
}

impl FakeService {
    pub fn set_submit_reply(&self, reply: Reply) {
        *self.submit_reply.lock().unwrap() = reply;
    }

    pub fn push_status(&self, reply: Reply) {
        self.status_replies.lock().unwrap().push_back(reply);
    }

    pub fn set_load_reply(&self, reply: Reply) {
        *self.load_reply.lock().unwrap() = reply;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

/// Serve `service` on `127.0.0.1:0` and return its base URL.
pub async fn spawn(service: Arc<FakeService>) -> String {
    let app = Router::new()
        .route("/caption_directory", post(submit))
        .route("/caption_directory_status", get(status))
        .route("/load_model_service", post(load_model))
        .route("/stop_model_service", post(stop_model))
        .route("/stop_job", post(stop_job))
        .route("/available_models", get(available_models))
        .route("/available_prompts", get(available_prompts))
        .route("/caption", post(caption))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake service");
    });

    format!("http://{addr}")
}

async fn submit(State(service): State<Arc<FakeService>>, Json(body): Json<Value>) -> Reply {
    service.submit_bodies.lock().unwrap().push(body);
    service.submit_reply.lock().unwrap().clone()
}

/// Scripted replies in order; once they run out, behave like a service
/// with no job.
async fn status(State(service): State<Arc<FakeService>>) -> Reply {
    service.status_calls.fetch_add(1, Ordering::SeqCst);
    service
        .status_replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| {
            Reply::json(
                StatusCode::CONFLICT,
                r#"{"detail": "No captioning job is in progress"}"#,
            )
        })
}

async fn load_model(State(service): State<Arc<FakeService>>, Json(body): Json<Value>) -> Reply {
    service.load_bodies.lock().unwrap().push(body);
    service.load_reply.lock().unwrap().clone()
}

async fn stop_model() -> Reply {
    Reply::json(StatusCode::OK, r#"{"message": "Model service stopped"}"#)
}

async fn stop_job() -> Reply {
    Reply::json(StatusCode::OK, r#"{"message": "Job stopped"}"#)
}

async fn available_models() -> Reply {
    Reply::json(
        StatusCode::OK,
        r#"{"available_models": {
            "Qwen3-VLM-8B-Ollama": "Qwen3-VLM-8B using local Ollama server.",
            "microsoft/Florence-2-base-ft": "Local Florence-2 using Huggingface transformers.",
            "MiniCPM-V-2.6-8b-Ollama": "Mini-CPM-V-2.6 8B using local Ollama server."
        }}"#,
    )
}

async fn available_prompts() -> Reply {
    Reply::json(
        StatusCode::OK,
        r#"{"available_prompts": {
            "detailed": "Describe the image in detail in one paragraph.",
            "short": "Provide a brief description of the image within 40 words or less.",
            "tags": "Provide a comma delimited list of tags that describe the image."
        }}"#,
    )
}

async fn caption(State(service): State<Arc<FakeService>>, Json(body): Json<Value>) -> Reply {
    service.caption_bodies.lock().unwrap().push(body);
    Reply::json(StatusCode::OK, r#"{"caption": "A tabby cat asleep on a windowsill"}"#)
}
