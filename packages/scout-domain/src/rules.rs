//! Deterministic natural-language filter rules, used whenever the remote extractor is unavailable.

use regex::{Captures, Regex};
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::FilterSet;

const STATUS_KEYWORDS: [(&str, &str); 4] = [
	("active", "Active"),
	("interview", "Interview"),
	("rejected", "Rejected"),
	("offer", "Offer"),
];

const CITY_PATTERN: &str = r"from\s+([a-z]+)";
const SALARY_ABOVE_PATTERN: &str = r"salary\s+(above|over|more than)\s+(\d+)";
const SALARY_BETWEEN_PATTERN: &str = r"salary\s+between\s+(\d+)\s+and\s+(\d+)";
const SCORE_ABOVE_PATTERN: &str = r"score\s+(above|over|more than)\s+(\d+)";
const JOINED_RECENTLY_PATTERN: &str = r"joined\s+in\s+(the\s+)?(last|past)\s+(\d+)\s+months";

pub fn extract_filters(text: &str) -> FilterSet {
	extract_filters_at(text, OffsetDateTime::now_utc())
}

/// Applies every rule to `text`; relative dates are resolved against `now`.
///
/// Relative join dates are truncated to midnight UTC so repeated extraction of the same text on
/// the same day yields the same set.
pub fn extract_filters_at(text: &str, now: OffsetDateTime) -> FilterSet {
	let text = text.to_lowercase();
	let mut filters = FilterSet::new();

	if let Some((_, status)) = STATUS_KEYWORDS.iter().find(|(keyword, _)| text.contains(keyword)) {
		filters.set_status(*status);
	}
	if let Some(city) = captures(CITY_PATTERN, &text).and_then(|caps| caps.get(1)) {
		filters.set_city(capitalize(city.as_str()));
	}
	if let Some(min) = captures(SALARY_ABOVE_PATTERN, &text).and_then(|caps| number(&caps, 2)) {
		filters.set_min_salary(min);
	}
	if let Some(caps) = captures(SALARY_BETWEEN_PATTERN, &text)
		&& let (Some(min), Some(max)) = (number(&caps, 1), number(&caps, 2))
	{
		filters.set_min_salary(min);
		filters.set_max_salary(max);
	}
	if let Some(min) = captures(SCORE_ABOVE_PATTERN, &text).and_then(|caps| number(&caps, 2)) {
		filters.set_min_score(min);
	}
	if let Some(start) = captures(JOINED_RECENTLY_PATTERN, &text)
		.and_then(|caps| caps.get(3)?.as_str().parse::<u32>().ok())
		.and_then(|months| months_before(now, months))
	{
		filters.set_join_date_start(start);
	}

	filters
}

fn captures<'t>(pattern: &str, text: &'t str) -> Option<Captures<'t>> {
	Regex::new(pattern).ok()?.captures(text)
}

fn number(caps: &Captures<'_>, group: usize) -> Option<f64> {
	caps.get(group)?.as_str().parse::<u64>().ok().map(|value| value as f64)
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Calendar-month subtraction; the day is clamped to the length of the target month.
fn months_before(now: OffsetDateTime, months: u32) -> Option<OffsetDateTime> {
	let now = now.to_offset(UtcOffset::UTC);
	let index = now.year() * 12 + i32::from(u8::from(now.month())) - 1;
	let index = index.checked_sub(i32::try_from(months).ok()?)?;
	let year = index.div_euclid(12);
	let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
	let date = (1..=now.day())
		.rev()
		.find_map(|day| Date::from_calendar_date(year, month, day).ok())?;

	Some(date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn month_subtraction_clamps_and_wraps_years() {
		assert_eq!(
			months_before(datetime!(2024-03-31 15:00:00 UTC), 1),
			Some(datetime!(2024-02-29 00:00:00 UTC))
		);
		assert_eq!(
			months_before(datetime!(2024-02-10 09:00:00 UTC), 3),
			Some(datetime!(2023-11-10 00:00:00 UTC))
		);
		assert_eq!(
			months_before(datetime!(2024-02-10 09:00:00 UTC), 0),
			Some(datetime!(2024-02-10 00:00:00 UTC))
		);
	}

	#[test]
	fn capitalizes_first_letter_only() {
		assert_eq!(capitalize("istanbul"), "Istanbul");
		assert_eq!(capitalize(""), "");
	}
}
