use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub graph: GraphConfig,
	/// Optional. Without it every natural-language query is resolved by the local rules.
	pub extractor: Option<ExtractorProviderConfig>,
	#[serde(default)]
	pub list: ListConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: default_log_level() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
	pub endpoint: String,
	pub email: String,
	pub password: String,
	#[serde(default = "default_graph_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorProviderConfig {
	pub api_base: String,
	#[serde(default = "default_extractor_path")]
	pub path: String,
	#[serde(default = "default_extractor_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl ExtractorProviderConfig {
	pub fn with_api_base(api_base: impl Into<String>) -> Self {
		Self {
			api_base: api_base.into(),
			path: default_extractor_path(),
			timeout_ms: default_extractor_timeout_ms(),
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListConfig {
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
}
impl Default for ListConfig {
	fn default() -> Self {
		Self { page_size: default_page_size(), debounce_ms: default_debounce_ms() }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_graph_timeout_ms() -> u64 {
	10_000
}

fn default_extractor_path() -> String {
	"/api/process-query".to_string()
}

fn default_extractor_timeout_ms() -> u64 {
	8_000
}

fn default_page_size() -> u32 {
	20
}

fn default_debounce_ms() -> u64 {
	300
}
