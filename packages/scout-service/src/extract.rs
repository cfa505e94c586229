use std::sync::Arc;

use scout_config::Config;
use scout_domain::{FilterSet, rules};

use crate::{ExtractorProvider, HttpExtractor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSource {
	Remote,
	Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
	pub filters: FilterSet,
	pub source: ExtractionSource,
}

/// Natural-language to [`FilterSet`] resolution with a local rule fallback.
///
/// The remote provider is preferred. Any transport failure, non-success status or malformed
/// payload degrades to [`rules::extract_filters`], so callers always receive a usable set.
#[derive(Clone, Default)]
pub struct FilterExtractor {
	provider: Option<Arc<dyn ExtractorProvider>>,
}
impl FilterExtractor {
	pub fn new(provider: Arc<dyn ExtractorProvider>) -> Self {
		Self { provider: Some(provider) }
	}

	/// An extractor that never leaves the process.
	pub fn offline() -> Self {
		Self { provider: None }
	}

	pub fn from_config(cfg: &Config) -> Self {
		match &cfg.extractor {
			Some(extractor) => Self::new(Arc::new(HttpExtractor::new(extractor.clone()))),
			None => Self::offline(),
		}
	}

	pub fn is_remote(&self) -> bool {
		self.provider.is_some()
	}

	pub async fn extract(&self, query: &str) -> FilterSet {
		self.extract_detailed(query).await.filters
	}

	pub async fn extract_detailed(&self, query: &str) -> Extraction {
		if query.trim().is_empty() {
			return Extraction {
				filters: FilterSet::default(),
				source: ExtractionSource::Fallback { reason: "Query is empty.".to_string() },
			};
		}

		let Some(provider) = &self.provider else {
			tracing::debug!("No remote extractor configured; using local rules.");

			return fallback(query, "No remote extractor configured.".to_string());
		};
		let reason = match provider.extract(query).await {
			Ok(raw) => match FilterSet::from_json(&raw) {
				Ok(filters) => {
					tracing::debug!(fields = filters.active_count(), "Remote filter extraction succeeded.");

					return Extraction { filters, source: ExtractionSource::Remote };
				},
				Err(err) => format!("Malformed extractor payload at {err}."),
			},
			Err(err) => err.to_string(),
		};

		tracing::warn!(%reason, "Remote filter extraction failed; using local rules.");

		fallback(query, reason)
	}
}

fn fallback(query: &str, reason: String) -> Extraction {
	Extraction {
		filters: rules::extract_filters(query),
		source: ExtractionSource::Fallback { reason },
	}
}

#[cfg(test)]
mod tests {
	use serde_json::Value;

	use super::*;
	use crate::BoxFuture;

	struct FixedProvider(Option<Value>);

	impl ExtractorProvider for FixedProvider {
		fn extract<'a>(&'a self, _: &'a str) -> BoxFuture<'a, scout_providers::Result<Value>> {
			Box::pin(async move {
				self.0.clone().ok_or_else(|| scout_providers::Error::InvalidResponse {
					message: "Extractor unavailable.".to_string(),
				})
			})
		}
	}

	fn extractor(reply: Option<Value>) -> FilterExtractor {
		FilterExtractor::new(Arc::new(FixedProvider(reply)))
	}

	#[tokio::test]
	async fn remote_filters_win_when_valid() {
		let extraction = extractor(Some(serde_json::json!({ "city": "Ankara", "minScore": 80 })))
			.extract_detailed("Candidates from Istanbul")
			.await;

		assert_eq!(extraction.source, ExtractionSource::Remote);
		assert_eq!(extraction.filters.city(), Some("Ankara"));
		assert_eq!(extraction.filters.min_score(), Some(80.0));
	}

	#[tokio::test]
	async fn provider_failure_falls_back_to_rules() {
		let extractor = extractor(None);

		assert!(extractor.is_remote());

		let extraction = extractor.extract_detailed("Candidates from Istanbul").await;

		assert!(matches!(extraction.source, ExtractionSource::Fallback { .. }));
		assert_eq!(extraction.filters, FilterSet::default().with_city("Istanbul"));
	}

	#[tokio::test]
	async fn malformed_payload_falls_back_to_rules() {
		let extraction = extractor(Some(serde_json::json!({ "minSalary": "lots" })))
			.extract_detailed("Active candidates with salary above 35000")
			.await;

		assert!(matches!(extraction.source, ExtractionSource::Fallback { .. }));
		assert_eq!(extraction.filters.status(), Some("Active"));
		assert_eq!(extraction.filters.min_salary(), Some(35_000.0));
	}

	#[tokio::test]
	async fn blank_query_yields_empty_set_without_remote_call() {
		let filters = extractor(Some(serde_json::json!({ "city": "Ankara" }))).extract("   ").await;

		assert!(filters.is_empty());
	}

	#[tokio::test]
	async fn offline_extractor_uses_rules() {
		let extractor = FilterExtractor::offline();

		assert!(!extractor.is_remote());

		let filters = extractor.extract("Active candidates").await;

		assert_eq!(filters.status(), Some("Active"));
		assert_eq!(filters.active_count(), 1);
	}
}
