mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, ExtractorProviderConfig, GraphConfig, ListConfig, Service};

use std::{env, fs, path::Path};

use serde_json::Map;

pub const ENV_LOG_LEVEL: &str = "SCOUT_LOG_LEVEL";
pub const ENV_GRAPH_ENDPOINT: &str = "SCOUT_GRAPH_ENDPOINT";
pub const ENV_GRAPH_EMAIL: &str = "SCOUT_GRAPH_EMAIL";
pub const ENV_GRAPH_PASSWORD: &str = "SCOUT_GRAPH_PASSWORD";
pub const ENV_EXTRACTOR_URL: &str = "SCOUT_EXTRACTOR_URL";

const MAX_PAGE_SIZE: u32 = 200;
const MAX_DEBOUNCE_MS: u64 = 10_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env(&mut cfg, |key| env::var(key).ok());
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Builds a config from defaults and `SCOUT_*` environment variables alone.
pub fn from_env() -> Result<Config> {
	from_lookup(|key| env::var(key).ok())
}

pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let mut cfg = Config {
		service: Service::default(),
		graph: GraphConfig {
			endpoint: String::new(),
			email: String::new(),
			password: String::new(),
			timeout_ms: 10_000,
			default_headers: Map::new(),
		},
		extractor: None,
		list: ListConfig::default(),
	};

	apply_env(&mut cfg, lookup);
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Overlays environment-supplied values on top of a parsed config.
pub fn apply_env<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

	if let Some(level) = lookup(ENV_LOG_LEVEL) {
		cfg.service.log_level = level;
	}
	if let Some(endpoint) = lookup(ENV_GRAPH_ENDPOINT) {
		cfg.graph.endpoint = endpoint;
	}
	if let Some(email) = lookup(ENV_GRAPH_EMAIL) {
		cfg.graph.email = email;
	}
	if let Some(password) = lookup(ENV_GRAPH_PASSWORD) {
		cfg.graph.password = password;
	}
	if let Some(url) = lookup(ENV_EXTRACTOR_URL) {
		match cfg.extractor.as_mut() {
			Some(extractor) => extractor.api_base = url,
			None => cfg.extractor = Some(ExtractorProviderConfig::with_api_base(url)),
		}
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("graph.endpoint", &cfg.graph.endpoint),
		("graph.email", &cfg.graph.email),
		("graph.password", &cfg.graph.password),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.graph.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "graph.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.list.page_size == 0 || cfg.list.page_size > MAX_PAGE_SIZE {
		return Err(Error::Validation {
			message: format!("list.page_size must be in the range 1-{MAX_PAGE_SIZE}."),
		});
	}
	if cfg.list.debounce_ms > MAX_DEBOUNCE_MS {
		return Err(Error::Validation {
			message: format!("list.debounce_ms must be {MAX_DEBOUNCE_MS} or less."),
		});
	}

	validate_headers("graph.default_headers", &cfg.graph.default_headers)?;

	if let Some(extractor) = cfg.extractor.as_ref() {
		if !extractor.path.starts_with('/') {
			return Err(Error::Validation {
				message: "extractor.path must start with '/'.".to_string(),
			});
		}
		if extractor.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "extractor.timeout_ms must be greater than zero.".to_string(),
			});
		}

		validate_headers("extractor.default_headers", &extractor.default_headers)?;
	}

	Ok(())
}

fn validate_headers(label: &str, headers: &Map<String, serde_json::Value>) -> Result<()> {
	if headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation { message: format!("{label} values must be strings.") });
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.graph.endpoint = cfg.graph.endpoint.trim().trim_end_matches('/').to_string();

	if cfg.extractor.as_ref().map(|extractor| extractor.api_base.trim().is_empty()).unwrap_or(false)
	{
		cfg.extractor = None;
	}
	if let Some(extractor) = cfg.extractor.as_mut() {
		extractor.api_base = extractor.api_base.trim().trim_end_matches('/').to_string();
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
