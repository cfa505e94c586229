use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
	pub operation_name: String,
	pub query: String,
	pub variables: Value,
}

/// Thin transport over a single graph endpoint. It knows nothing about schemas.
#[derive(Debug, Clone)]
pub struct GraphClient {
	client: Client,
	endpoint: String,
	default_headers: Map<String, Value>,
}
impl GraphClient {
	pub fn new(cfg: &scout_config::GraphConfig) -> Result<Self> {
		if cfg.endpoint.trim().is_empty() {
			return Err(Error::InvalidConfig {
				message: "Graph endpoint must be non-empty.".to_string(),
			});
		}

		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			client,
			endpoint: cfg.endpoint.clone(),
			default_headers: cfg.default_headers.clone(),
		})
	}

	/// Posts one operation and returns its `data` object.
	pub async fn execute(&self, request: &GraphRequest, token: Option<&str>) -> Result<Value> {
		let mut res = self
			.client
			.post(&self.endpoint)
			.headers(crate::auth_headers(token, &self.default_headers)?)
			.json(request)
			.send()
			.await?;

		// Graph servers report validation failures as 400 with an `errors` body.
		if res.status() != StatusCode::BAD_REQUEST {
			res = res.error_for_status()?;
		}

		let json: Value = res.json().await?;

		tracing::trace!(operation = %request.operation_name, "Graph response received.");

		parse_graph_response(json)
	}
}

pub fn parse_graph_response(json: Value) -> Result<Value> {
	if let Some(errors) = json.get("errors").and_then(|v| v.as_array())
		&& !errors.is_empty()
	{
		let message = errors
			.iter()
			.filter_map(|err| err.get("message").and_then(|m| m.as_str()))
			.collect::<Vec<_>>()
			.join("; ");
		let code = errors
			.iter()
			.find_map(|err| err.pointer("/extensions/code").and_then(|c| c.as_str()))
			.map(str::to_string);

		return Err(Error::Graph {
			message: if message.is_empty() { "Unknown graph error.".to_string() } else { message },
			code,
		});
	}

	match json.get("data") {
		Some(data @ Value::Object(_)) => Ok(data.clone()),
		_ => Err(Error::InvalidResponse { message: "Graph response is missing data.".to_string() }),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn surfaces_graph_errors_with_code() {
		let json = serde_json::json!({
			"errors": [
				{ "message": "Cannot query field \"signIn\".", "extensions": { "code": "GRAPHQL_VALIDATION_FAILED" } },
				{ "message": "Second problem." }
			]
		});
		let err = parse_graph_response(json).expect_err("expected graph error");

		match err {
			Error::Graph { message, code } => {
				assert_eq!(message, "Cannot query field \"signIn\".; Second problem.");
				assert_eq!(code.as_deref(), Some("GRAPHQL_VALIDATION_FAILED"));
			},
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn recognizes_unauthenticated_errors() {
		let json = serde_json::json!({
			"errors": [{ "message": "Access denied.", "extensions": { "code": "UNAUTHENTICATED" } }]
		});
		let err = parse_graph_response(json).expect_err("expected graph error");

		assert!(err.is_unauthorized());
	}

	#[test]
	fn requires_data_object() {
		assert!(parse_graph_response(serde_json::json!({ "data": null })).is_err());

		let data = parse_graph_response(serde_json::json!({ "data": { "login": { "token": "t" } } }))
			.expect("parse failed");

		assert_eq!(data.pointer("/login/token"), Some(&serde_json::json!("t")));
	}
}
