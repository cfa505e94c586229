use std::sync::{Arc, Mutex};

use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing,
};
use serde_json::Value;

use crate::{MockServer, Result};

struct ExtractorState {
	status: StatusCode,
	body: String,
	requests: Mutex<Vec<Value>>,
}

/// Natural-language extraction endpoint replying with a fixed status and raw body.
pub struct ExtractorMock {
	server: MockServer,
	state: Arc<ExtractorState>,
}
impl ExtractorMock {
	pub async fn start(status: StatusCode, body: impl Into<String>) -> Result<Self> {
		let state = Arc::new(ExtractorState {
			status,
			body: body.into(),
			requests: Mutex::new(Vec::new()),
		});
		let app = Router::new()
			.route("/api/process-query", routing::post(extract_handler))
			.with_state(state.clone());
		let server = MockServer::start(app).await?;

		Ok(Self { server, state })
	}

	pub async fn json(status: StatusCode, body: &Value) -> Result<Self> {
		Self::start(status, body.to_string()).await
	}

	pub fn api_base(&self) -> &str {
		self.server.url()
	}

	pub fn requests(&self) -> Vec<Value> {
		self.state.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

async fn extract_handler(
	State(state): State<Arc<ExtractorState>>,
	Json(payload): Json<Value>,
) -> Response {
	state.requests.lock().unwrap_or_else(|err| err.into_inner()).push(payload);

	(state.status, [("content-type", "application/json")], state.body.clone()).into_response()
}
