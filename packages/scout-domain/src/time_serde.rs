pub mod option;

use serde::{Deserialize, Deserializer, Serializer};
use time::{
	Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

/// Accepts anything [`parse_timestamp`] does, plus integer epoch milliseconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	match RawTimestamp::deserialize(deserializer)? {
		RawTimestamp::Text(raw) => parse_timestamp(&raw)
			.ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
		RawTimestamp::Millis(millis) => from_unix_millis(millis)
			.ok_or_else(|| serde::de::Error::custom(format!("timestamp {millis} ms is out of range"))),
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
	Text(String),
	Millis(i64),
}

fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(value);
	}

	Date::parse(raw, format_description!("[year]-[month]-[day]"))
		.ok()
		.map(|date| date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn parses_rfc3339_and_bare_dates() {
		assert_eq!(
			parse_timestamp("2023-01-15T08:30:00Z"),
			Some(datetime!(2023-01-15 08:30:00 UTC))
		);
		assert_eq!(parse_timestamp("2023-01-15"), Some(datetime!(2023-01-15 00:00:00 UTC)));
		assert_eq!(parse_timestamp("last tuesday"), None);
	}

	#[derive(Debug, Deserialize)]
	struct Stamped {
		#[serde(with = "crate::time_serde")]
		at: OffsetDateTime,
	}

	#[test]
	fn deserializes_epoch_milliseconds() {
		let stamped: Stamped = serde_json::from_value(serde_json::json!({ "at": 1_704_067_200_000_i64 }))
			.expect("Failed to decode epoch milliseconds.");

		assert_eq!(stamped.at, datetime!(2024-01-01 00:00:00 UTC));

		let stamped: Stamped = serde_json::from_value(serde_json::json!({ "at": "2024-01-01" }))
			.expect("Failed to decode bare date.");

		assert_eq!(stamped.at, datetime!(2024-01-01 00:00:00 UTC));
		assert!(serde_json::from_value::<Stamped>(serde_json::json!({ "at": true })).is_err());
	}
}
