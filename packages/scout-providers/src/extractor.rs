use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Field description sent alongside every query so the remote side knows the target shape.
pub const FILTER_FIELD_SCHEMA: &str = "\
status: String (Active, Interview, Rejected, Offer)
city: String
education: String
minSalary: Number
maxSalary: Number
minScore: Number
maxScore: Number
joinDateStart: ISO Date String
joinDateEnd: ISO Date String
Use null for any field the query does not constrain.";

pub async fn extract(cfg: &scout_config::ExtractorProviderConfig, query: &str) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "query": query, "schema": FILTER_FIELD_SCHEMA });
	let res = client
		.post(&url)
		.headers(crate::auth_headers(None, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_extractor_response(json)
}

/// Accepts `{"filters": {...}}`, a bare filter object, or a chat-completion envelope whose
/// message content is one of those as a JSON string.
pub fn parse_extractor_response(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(content).map_err(|_| Error::InvalidResponse {
			message: "Extractor content is not valid JSON.".to_string(),
		})?;

		return unwrap_filters(parsed);
	}

	unwrap_filters(json)
}

fn unwrap_filters(json: Value) -> Result<Value> {
	match json {
		Value::Object(mut obj) => match obj.remove("filters") {
			Some(filters @ Value::Object(_)) => Ok(filters),
			Some(_) => Err(Error::InvalidResponse {
				message: "Extractor filters must be an object.".to_string(),
			}),
			None => Ok(Value::Object(obj)),
		},
		_ => Err(Error::InvalidResponse {
			message: "Extractor response is not a JSON object.".to_string(),
		}),
	}
}
