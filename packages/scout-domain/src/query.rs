use serde::{Deserialize, Serialize};

use crate::{Candidate, FilterSet, SortSpec};

/// Canonical list request, independent of the backend's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuery {
	pub page: u32,
	pub page_size: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sort: Option<SortSpec>,
	#[serde(default, skip_serializing_if = "FilterSet::is_empty")]
	pub filters: FilterSet,
}
impl CandidateQuery {
	pub fn new(page: u32, page_size: u32) -> Self {
		Self { page: page.max(1), page_size, search: None, sort: None, filters: FilterSet::default() }
	}

	pub fn with_search(mut self, search: &str) -> Self {
		let search = search.trim();

		self.search = (!search.is_empty()).then(|| search.to_string());

		self
	}

	pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
		self.sort = sort;

		self
	}

	pub fn with_filters(mut self, filters: FilterSet) -> Self {
		self.filters = filters;

		self
	}
}

/// One page of candidates, normalized from whichever envelope the backend used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePage {
	pub items: Vec<Candidate>,
	pub total: u64,
	pub page: u32,
	pub page_size: u32,
}
impl CandidatePage {
	/// An empty page always ends pagination, whatever `total` claims.
	pub fn has_more(&self) -> bool {
		if self.items.is_empty() {
			return false;
		}

		u64::from(self.page) * u64::from(self.page_size) < self.total
	}
}
