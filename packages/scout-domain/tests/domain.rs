use serde_json::Value;
use time::macros::datetime;

use scout_domain::{FilterField, FilterSet, rules};

const NOW: time::OffsetDateTime = datetime!(2025-05-20 14:45:00 UTC);

fn extract(text: &str) -> FilterSet {
	rules::extract_filters_at(text, NOW)
}

#[test]
fn active_with_salary_floor() {
	let filters = extract("Active candidates with salary above 35000");

	assert_eq!(filters.fields(), vec![FilterField::Status, FilterField::MinSalary]);
	assert_eq!(filters.status(), Some("Active"));
	assert_eq!(filters.min_salary(), Some(35_000.0));
}

#[test]
fn city_is_capitalized() {
	let filters = extract("Candidates from Istanbul");

	assert_eq!(filters.fields(), vec![FilterField::City]);
	assert_eq!(filters.city(), Some("Istanbul"));
}

#[test]
fn only_the_highest_priority_status_is_inferred() {
	let filters = extract("Rejected or active people with an offer");

	assert_eq!(filters.status(), Some("Active"));

	let filters = extract("Interview stage, not rejected");

	assert_eq!(filters.status(), Some("Interview"));
}

#[test]
fn salary_range_overrides_salary_floor() {
	let filters = extract("salary above 10000 and salary between 30000 and 45000");

	assert_eq!(filters.min_salary(), Some(30_000.0));
	assert_eq!(filters.max_salary(), Some(45_000.0));
}

#[test]
fn score_and_recent_joins_accumulate() {
	let filters = extract("Candidates joined in the last 3 months with a score over 80%");

	assert_eq!(filters.min_score(), Some(80.0));
	assert_eq!(filters.join_date_start(), Some(datetime!(2025-02-20 00:00:00 UTC)));
	assert_eq!(filters.fields(), vec![FilterField::MinScore, FilterField::JoinDateStart]);

	let filters = extract("joined in past 12 months");

	assert_eq!(filters.join_date_start(), Some(datetime!(2024-05-20 00:00:00 UTC)));
}

#[test]
fn unmatched_text_yields_empty_set() {
	let filters = extract("show me everybody please");

	assert!(filters.is_empty());
	assert_eq!(serde_json::to_value(&filters).expect("encode failed"), serde_json::json!({}));
}

#[test]
fn fallback_never_emits_empty_values() {
	let queries = [
		"Active candidates with salary above 35000",
		"Candidates from Istanbul",
		"from   ",
		"salary above",
		"score more than 99999999999999999999999 from x",
		"Offer candidates joined in the last 999999999999 months",
		"salary between 1 and 2, score above 50, from ankara, rejected",
	];

	for query in queries {
		let encoded = serde_json::to_value(extract(query)).expect("encode failed");
		let Value::Object(map) = encoded else {
			panic!("FilterSet must encode as an object.");
		};

		for (key, value) in map {
			assert!(!value.is_null(), "{query}: {key} is null");
			assert_ne!(value, Value::String(String::new()), "{query}: {key} is empty");
		}
	}
}

#[test]
fn extraction_is_idempotent() {
	for query in ["Candidates joined in the last 2 months from izmir", "offer, score above 70"] {
		assert_eq!(extract(query), extract(query));
	}
}

#[test]
fn extractor_payload_round_trips_through_deserialize() {
	let raw = r#"{"status":"Offer","city":null,"minScore":85,"joinDateEnd":"2024-12-31"}"#;
	let filters: FilterSet = serde_json::from_str(raw).expect("decode failed");

	assert_eq!(filters.status(), Some("Offer"));
	assert_eq!(filters.min_score(), Some(85.0));
	assert_eq!(filters.join_date_end(), Some(datetime!(2024-12-31 00:00:00 UTC)));
	assert_eq!(filters.active_count(), 3);
}
