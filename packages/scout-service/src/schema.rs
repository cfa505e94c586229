//! Wire adapters for the graph backend.
//!
//! The backend's exact schema is unknown ahead of time, so each supported shape is a variant that
//! encodes canonical input into a [`GraphRequest`]. Responses are decoded through one normalizer.

use serde::Deserialize;
use serde_json::{Map, Value};

use scout_domain::{CANDIDATE_FIELDS, Candidate, CandidatePage, CandidateQuery};
use scout_providers::{Error as ProviderError, Result as ProviderResult, graph::GraphRequest};

use crate::Credentials;

/// Known login mutation shapes, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthVariant {
	AuthenticateCredentials,
	LoginInput,
	SignInInput,
	LoginCredentials,
}
impl AuthVariant {
	pub const ALL: [Self; 4] =
		[Self::AuthenticateCredentials, Self::LoginInput, Self::SignInInput, Self::LoginCredentials];

	pub fn name(self) -> &'static str {
		match self {
			Self::AuthenticateCredentials => "authenticate(credentials)",
			Self::LoginInput => "login(input)",
			Self::SignInInput => "signIn(input)",
			Self::LoginCredentials => "login(credentials)",
		}
	}

	/// Probe order with `preferred` moved to the front.
	pub fn probe_order(preferred: Option<Self>) -> Vec<Self> {
		let mut order = Vec::with_capacity(Self::ALL.len());

		order.extend(preferred);
		order.extend(Self::ALL.into_iter().filter(|variant| Some(*variant) != preferred));

		order
	}

	pub fn encode(self, credentials: &Credentials) -> GraphRequest {
		let (operation, field, argument) = self.parts();

		GraphRequest {
			operation_name: operation.to_string(),
			query: format!(
				"mutation {operation}($email: String!, $password: String!) {{\n\t{field}({argument}: {{ email: $email, password: $password }}) {{\n\t\ttoken\n\t}}\n}}"
			),
			variables: serde_json::json!({
				"email": credentials.email,
				"password": credentials.password,
			}),
		}
	}

	/// Extracts a non-empty token, or `None` when the mutation answered without one.
	pub fn decode(self, data: &Value) -> Option<String> {
		let (_, field, _) = self.parts();

		data.get(field)
			.and_then(|payload| payload.get("token"))
			.and_then(Value::as_str)
			.filter(|token| !token.is_empty())
			.map(str::to_string)
	}

	fn parts(self) -> (&'static str, &'static str, &'static str) {
		match self {
			Self::AuthenticateCredentials => ("Authenticate", "authenticate", "credentials"),
			Self::LoginInput => ("Login", "login", "input"),
			Self::SignInInput => ("SignIn", "signIn", "input"),
			Self::LoginCredentials => ("LoginWithCredentials", "login", "credentials"),
		}
	}
}

/// Known list query shapes, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryVariant {
	/// `items` plus `pagination`, sort passed as one `{ field, direction }` object.
	ItemsPagination,
	/// `data` plus `meta`, sort assembled in the document from separate field and direction strings.
	DataMeta,
}
impl QueryVariant {
	pub const ALL: [Self; 2] = [Self::ItemsPagination, Self::DataMeta];

	pub fn name(self) -> &'static str {
		match self {
			Self::ItemsPagination => "items/pagination",
			Self::DataMeta => "data/meta",
		}
	}

	pub fn encode(self, query: &CandidateQuery) -> GraphRequest {
		let fields = CANDIDATE_FIELDS.join("\n\t\t\t");
		let mut variables = Map::new();

		variables.insert("page".to_string(), Value::from(query.page));
		variables.insert("pageSize".to_string(), Value::from(query.page_size));

		if let Some(search) = &query.search {
			variables.insert("search".to_string(), Value::from(search.as_str()));
		}
		if let Some(filters) = query.filters.to_graph_filter() {
			variables.insert("filters".to_string(), filters);
		}

		let query_document = match self {
			Self::ItemsPagination => {
				if let Some(sort) = &query.sort {
					variables.insert(
						"sort".to_string(),
						serde_json::json!({ "field": sort.field, "direction": sort.direction.as_str() }),
					);
				}

				format!(
					"query GetCandidates($page: Int!, $pageSize: Int!, $search: String, $sort: SortInput, $filters: CandidateFilterInput) {{\n\tcandidates(\n\t\tpagination: {{ page: $page, pageSize: $pageSize }}\n\t\tsearch: $search\n\t\tsort: $sort\n\t\tfilter: $filters\n\t) {{\n\t\titems {{\n\t\t\t{fields}\n\t\t}}\n\t\tpagination {{\n\t\t\ttotal\n\t\t\tpage\n\t\t\tpageSize\n\t\t}}\n\t}}\n}}"
				)
			},
			Self::DataMeta => {
				if let Some(sort) = &query.sort {
					variables.insert("sortBy".to_string(), Value::from(sort.field.as_str()));
					variables.insert("sortDirection".to_string(), Value::from(sort.direction.as_str()));
				}

				format!(
					"query GetCandidatesPage($page: Int!, $pageSize: Int!, $search: String, $sortBy: String, $sortDirection: String, $filters: CandidateFiltersInput) {{\n\tcandidates(\n\t\tpagination: {{ page: $page, pageSize: $pageSize }}\n\t\tsearch: $search\n\t\tsort: {{ field: $sortBy, direction: $sortDirection }}\n\t\tfilters: $filters\n\t) {{\n\t\tdata {{\n\t\t\t{fields}\n\t\t}}\n\t\tmeta {{\n\t\t\ttotal\n\t\t\tpage\n\t\t\tpageSize\n\t\t}}\n\t}}\n}}"
				)
			},
		};

		GraphRequest {
			operation_name: match self {
				Self::ItemsPagination => "GetCandidates",
				Self::DataMeta => "GetCandidatesPage",
			}
			.to_string(),
			query: query_document,
			variables: Value::Object(variables),
		}
	}
}

/// Normalizes either list envelope into a [`CandidatePage`].
///
/// Items come from `items` or `data`, metadata from `pagination` or `meta`. Missing metadata
/// defaults to the item count and the requested page and size. Items that fail to decode are
/// logged and skipped; `total` still reflects the backend's count.
pub fn decode_candidate_page(data: &Value, query: &CandidateQuery) -> ProviderResult<CandidatePage> {
	let envelope = data.get("candidates").filter(|value| value.is_object()).ok_or_else(|| {
		ProviderError::InvalidResponse { message: "Response is missing candidates.".to_string() }
	})?;
	let raw_items = ["items", "data"]
		.iter()
		.find_map(|key| envelope.get(*key).and_then(Value::as_array))
		.map(Vec::as_slice)
		.unwrap_or_default();
	let items: Vec<Candidate> = raw_items
		.iter()
		.filter_map(|raw| match Candidate::deserialize(raw) {
			Ok(candidate) => Some(candidate),
			Err(err) => {
				let id = raw.get("id").map(Value::to_string).unwrap_or_default();

				tracing::warn!(%id, error = %err, "Skipping undecodable candidate.");

				None
			},
		})
		.collect();
	let meta = ["pagination", "meta"]
		.iter()
		.find_map(|key| envelope.get(*key).filter(|value| value.is_object()));
	let meta_u64 = |key: &str| meta.and_then(|meta| meta.get(key)).and_then(Value::as_u64);
	let total = meta_u64("total").unwrap_or(items.len() as u64);
	let page = meta_u64("page").and_then(|v| u32::try_from(v).ok()).unwrap_or(query.page);
	let page_size =
		meta_u64("pageSize").and_then(|v| u32::try_from(v).ok()).unwrap_or(query.page_size);

	Ok(CandidatePage { items, total, page, page_size })
}

pub fn candidate_request(id: &str) -> GraphRequest {
	let fields = CANDIDATE_FIELDS.join("\n\t\t");

	GraphRequest {
		operation_name: "GetCandidate".to_string(),
		query: format!(
			"query GetCandidate($id: ID!) {{\n\tcandidate(id: $id) {{\n\t\t{fields}\n\t}}\n}}"
		),
		variables: serde_json::json!({ "id": id }),
	}
}

/// `Ok(None)` when the backend answered with a null candidate.
pub fn decode_candidate(data: &Value) -> ProviderResult<Option<Candidate>> {
	match data.get("candidate") {
		None | Some(Value::Null) => Ok(None),
		Some(raw) => Ok(Some(serde_json::from_value(raw.clone())?)),
	}
}

#[cfg(test)]
mod tests {
	use scout_domain::{FilterSet, SortSpec};

	use super::*;

	fn credentials() -> Credentials {
		Credentials::new("operator@example.com", "secret")
	}

	#[test]
	fn preferred_variant_is_probed_first_once() {
		let order = AuthVariant::probe_order(Some(AuthVariant::SignInInput));

		assert_eq!(
			order,
			vec![
				AuthVariant::SignInInput,
				AuthVariant::AuthenticateCredentials,
				AuthVariant::LoginInput,
				AuthVariant::LoginCredentials,
			]
		);
		assert_eq!(AuthVariant::probe_order(None), AuthVariant::ALL.to_vec());
	}

	#[test]
	fn auth_variants_use_distinct_documents() {
		let documents: Vec<String> =
			AuthVariant::ALL.iter().map(|variant| variant.encode(&credentials()).query).collect();

		assert!(documents[0].contains("authenticate(credentials:"));
		assert!(documents[1].contains("login(input:"));
		assert!(documents[2].contains("signIn(input:"));
		assert!(documents[3].contains("login(credentials:"));
	}

	#[test]
	fn auth_decode_requires_non_empty_token() {
		let data = serde_json::json!({ "signIn": { "token": "abc" } });

		assert_eq!(AuthVariant::SignInInput.decode(&data), Some("abc".to_string()));
		assert_eq!(AuthVariant::LoginInput.decode(&data), None);
		assert_eq!(
			AuthVariant::SignInInput.decode(&serde_json::json!({ "signIn": { "token": "" } })),
			None
		);
	}

	#[test]
	fn query_variants_encode_sort_differently() {
		let query = CandidateQuery::new(2, 20)
			.with_search("ali")
			.with_sort(Some(SortSpec::ascending("score")))
			.with_filters(FilterSet::new().with_city("Istanbul"));
		let items = QueryVariant::ItemsPagination.encode(&query);
		let data = QueryVariant::DataMeta.encode(&query);

		assert!(items.query.contains("items {") && items.query.contains("pagination {"));
		assert_eq!(items.variables["sort"], serde_json::json!({ "field": "score", "direction": "asc" }));
		assert_eq!(items.variables["filters"], serde_json::json!({ "city": { "in": ["Istanbul"] } }));
		assert!(data.query.contains("data {") && data.query.contains("meta {"));
		assert!(data.query.starts_with(
			"query GetCandidatesPage($page: Int!, $pageSize: Int!, $search: String, $sortBy: String, $sortDirection: String, $filters: CandidateFiltersInput) {"
		));
		assert!(data.query.contains("pagination: { page: $page, pageSize: $pageSize }"));
		assert!(data.query.contains("sort: { field: $sortBy, direction: $sortDirection }"));
		assert!(data.query.contains("filters: $filters"));
		assert!(!data.query.contains("sortBy: $sortBy"));
		assert_eq!(data.variables["sortBy"], "score");
		assert_eq!(data.variables["sortDirection"], "asc");
		assert_eq!(data.variables["page"], 2);
		assert_eq!(data.variables["search"], "ali");
	}

	#[test]
	fn unconstrained_query_omits_optional_variables() {
		let request = QueryVariant::ItemsPagination.encode(&CandidateQuery::new(1, 20));

		assert_eq!(request.variables, serde_json::json!({ "page": 1, "pageSize": 20 }));
	}

	#[test]
	fn normalizes_meta_envelope_with_defaults() {
		let data = serde_json::json!({
			"candidates": {
				"data": [{
					"id": "7",
					"name": "Ayse",
					"email": "ayse@example.com",
					"status": "Active",
					"expectedSalary": 40000,
					"joinDate": "2024-02-01",
					"score": 88
				}],
				"meta": { "total": 41 }
			}
		});
		let page = decode_candidate_page(&data, &CandidateQuery::new(3, 20)).expect("decode failed");

		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].name, "Ayse");
		assert_eq!(page.total, 41);
		assert_eq!(page.page, 3);
		assert_eq!(page.page_size, 20);
	}

	#[test]
	fn malformed_items_are_skipped_without_failing_the_page() {
		let data = serde_json::json!({
			"candidates": {
				"items": [
					{
						"id": "1",
						"name": "Epoch",
						"email": "epoch@example.com",
						"status": "Active",
						"expectedSalary": 52000,
						"joinDate": 1_704_067_200_000_i64,
						"score": null
					},
					{ "id": "2", "name": "Broken", "status": "Active", "joinDate": "yesterday" },
					{
						"id": "3",
						"name": "Plain",
						"email": "plain@example.com",
						"status": "Offer",
						"expectedSalary": null,
						"joinDate": "2023-06-01",
						"score": 64
					}
				],
				"pagination": { "total": 3, "page": 1, "pageSize": 20 }
			}
		});
		let page = decode_candidate_page(&data, &CandidateQuery::new(1, 20)).expect("decode failed");
		let ids: Vec<&str> = page.items.iter().map(|candidate| candidate.id.as_str()).collect();

		assert_eq!(ids, vec!["1", "3"]);
		assert_eq!(page.items[0].score, 0.0);
		assert_eq!(page.items[1].expected_salary, 0.0);
		assert_eq!(page.total, 3);
	}

	#[test]
	fn missing_envelope_is_an_error() {
		assert!(decode_candidate_page(&serde_json::json!({}), &CandidateQuery::new(1, 20)).is_err());
	}

	#[test]
	fn null_candidate_decodes_to_none() {
		let data = serde_json::json!({ "candidate": null });

		assert!(decode_candidate(&data).expect("decode failed").is_none());
	}
}
