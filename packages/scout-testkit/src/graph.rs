use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing,
};
use serde_json::Value;

use crate::{MockServer, Result};

/// Describes the one schema shape the mock backend understands.
#[derive(Debug, Clone)]
pub struct GraphMockConfig {
	/// Document fragment of the only accepted login mutation, e.g. `signIn(input:`.
	pub auth_signature: String,
	/// Envelope field holding the candidate array, `items` or `data`.
	pub list_field: String,
	/// Envelope field holding pagination metadata, `pagination` or `meta`.
	pub meta_field: String,
	pub candidates: Vec<Value>,
	pub reject_logins: bool,
	pub login_delay: Duration,
}
impl GraphMockConfig {
	pub fn new(auth_signature: &str, list_field: &str, meta_field: &str) -> Self {
		Self {
			auth_signature: auth_signature.to_string(),
			list_field: list_field.to_string(),
			meta_field: meta_field.to_string(),
			candidates: crate::sample_candidates(45),
			reject_logins: false,
			login_delay: Duration::ZERO,
		}
	}
}

#[derive(Debug, Clone)]
pub struct RecordedOperation {
	pub operation_name: String,
	pub mutation: bool,
	pub authorization: Option<String>,
	pub variables: Value,
}

struct GraphState {
	config: GraphMockConfig,
	token_generation: AtomicUsize,
	operations: Mutex<Vec<RecordedOperation>>,
}
impl GraphState {
	fn current_token(&self) -> String {
		format!("token-{}", self.token_generation.load(Ordering::SeqCst))
	}

	fn record(&self, operation: RecordedOperation) {
		self.operations.lock().unwrap_or_else(|err| err.into_inner()).push(operation);
	}

	async fn login(&self, document: &str, variables: &Value) -> Response {
		if !self.config.login_delay.is_zero() {
			tokio::time::sleep(self.config.login_delay).await;
		}

		let has_credentials = ["email", "password"].iter().all(|key| {
			variables.get(key).and_then(Value::as_str).map(|v| !v.is_empty()).unwrap_or(false)
		});

		if !has_credentials {
			return graph_error(StatusCode::OK, "Invalid credentials.", "BAD_USER_INPUT");
		}
		if self.config.reject_logins || !document.contains(&self.config.auth_signature) {
			return graph_error(
				StatusCode::BAD_REQUEST,
				"Unknown argument or field on type \"Mutation\".",
				"GRAPHQL_VALIDATION_FAILED",
			);
		}

		let field = self.config.auth_signature.split('(').next().unwrap_or_default();

		data_response(serde_json::json!({ field: { "token": self.current_token() } }))
	}

	fn lookup(&self, variables: &Value) -> Response {
		let id = variables.get("id").and_then(Value::as_str).unwrap_or_default();
		let found = self
			.config
			.candidates
			.iter()
			.find(|candidate| candidate.get("id").and_then(Value::as_str) == Some(id))
			.cloned()
			.unwrap_or(Value::Null);

		data_response(serde_json::json!({ "candidate": found }))
	}

	fn list(&self, document: &str, variables: &Value) -> Response {
		let list_marker = format!("{} {{", self.config.list_field);
		let meta_marker = format!("{} {{", self.config.meta_field);

		if !document.contains(&list_marker) || !document.contains(&meta_marker) {
			return graph_error(
				StatusCode::BAD_REQUEST,
				"Cannot query field on type \"CandidateConnection\".",
				"GRAPHQL_VALIDATION_FAILED",
			);
		}

		let page = variables.get("page").and_then(Value::as_u64).unwrap_or(1).max(1) as usize;
		let page_size = variables.get("pageSize").and_then(Value::as_u64).unwrap_or(20) as usize;
		let search = variables
			.get("search")
			.and_then(Value::as_str)
			.map(str::to_lowercase)
			.unwrap_or_default();
		let matching: Vec<&Value> = self
			.config
			.candidates
			.iter()
			.filter(|candidate| {
				candidate
					.get("name")
					.and_then(Value::as_str)
					.map(|name| name.to_lowercase().contains(&search))
					.unwrap_or(false)
			})
			.collect();
		let items: Vec<Value> =
			matching.iter().skip((page - 1) * page_size).take(page_size).map(|v| (*v).clone()).collect();

		data_response(serde_json::json!({
			"candidates": {
				self.config.list_field.as_str(): items,
				self.config.meta_field.as_str(): {
					"total": matching.len(),
					"page": page,
					"pageSize": page_size,
				},
			}
		}))
	}
}

/// In-process graph backend that accepts exactly one auth shape and one envelope shape.
pub struct GraphMock {
	server: MockServer,
	state: Arc<GraphState>,
}
impl GraphMock {
	pub async fn start(config: GraphMockConfig) -> Result<Self> {
		let state = Arc::new(GraphState {
			config,
			token_generation: AtomicUsize::new(1),
			operations: Mutex::new(Vec::new()),
		});
		let app = Router::new().route("/graphql", routing::post(graph_handler)).with_state(state.clone());
		let server = MockServer::start(app).await?;

		Ok(Self { server, state })
	}

	pub fn endpoint(&self) -> String {
		format!("{}/graphql", self.server.url())
	}

	pub fn current_token(&self) -> String {
		self.state.current_token()
	}

	/// Invalidates every token issued so far.
	pub fn rotate_token(&self) {
		self.state.token_generation.fetch_add(1, Ordering::SeqCst);
	}

	pub fn operations(&self) -> Vec<RecordedOperation> {
		self.state.operations.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn operation_names(&self) -> Vec<String> {
		self.operations().into_iter().map(|op| op.operation_name).collect()
	}

	pub fn mutation_count(&self) -> usize {
		self.operations().iter().filter(|op| op.mutation).count()
	}
}

async fn graph_handler(
	State(state): State<Arc<GraphState>>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Response {
	let document = payload.get("query").and_then(Value::as_str).unwrap_or_default().to_string();
	let variables = payload.get("variables").cloned().unwrap_or(Value::Null);
	let authorization =
		headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
	let mutation = document.trim_start().starts_with("mutation");

	state.record(RecordedOperation {
		operation_name: payload
			.get("operationName")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string(),
		mutation,
		authorization: authorization.clone(),
		variables: variables.clone(),
	});

	if mutation {
		return state.login(&document, &variables).await;
	}
	if authorization != Some(format!("Bearer {}", state.current_token())) {
		return graph_error(StatusCode::OK, "Not authenticated.", "UNAUTHENTICATED");
	}
	if document.contains("candidate(id:") {
		return state.lookup(&variables);
	}

	state.list(&document, &variables)
}

fn data_response(data: Value) -> Response {
	(StatusCode::OK, Json(serde_json::json!({ "data": data }))).into_response()
}

fn graph_error(status: StatusCode, message: &str, code: &str) -> Response {
	let body = serde_json::json!({
		"errors": [{ "message": message, "extensions": { "code": code } }],
	});

	(status, Json(body)).into_response()
}
