use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Structured predicates narrowing the candidate list.
///
/// A key is present only while it carries a meaningful value: blank strings and non-finite
/// numbers are never stored, and clearing a field removes it, so serialized sets never carry
/// placeholder constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct FilterSet {
	#[serde(skip_serializing_if = "Option::is_none")]
	status: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	city: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	education: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	min_salary: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	max_salary: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	min_score: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	max_score: Option<f64>,
	#[serde(
		serialize_with = "crate::time_serde::option::serialize",
		skip_serializing_if = "Option::is_none"
	)]
	join_date_start: Option<OffsetDateTime>,
	#[serde(
		serialize_with = "crate::time_serde::option::serialize",
		skip_serializing_if = "Option::is_none"
	)]
	join_date_end: Option<OffsetDateTime>,
}
impl FilterSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a loosely typed filter object, as produced by a remote extractor.
	///
	/// `null`, blank strings and unknown keys are ignored. Numbers may be JSON numbers or numeric
	/// strings; dates may be RFC 3339 timestamps or `YYYY-MM-DD`.
	pub fn from_json(raw: &Value) -> Result<Self, FilterParseError> {
		let obj = raw.as_object().ok_or_else(|| FilterParseError {
			path: "$".to_string(),
			message: "filters must be an object.".to_string(),
		})?;
		let mut filters = Self::default();

		for field in FilterField::ALL {
			let Some(value) = obj.get(field.as_str()) else {
				continue;
			};

			filters.apply_json(field, value)?;
		}

		Ok(filters)
	}

	pub fn status(&self) -> Option<&str> {
		self.status.as_deref()
	}

	pub fn city(&self) -> Option<&str> {
		self.city.as_deref()
	}

	pub fn education(&self) -> Option<&str> {
		self.education.as_deref()
	}

	pub fn min_salary(&self) -> Option<f64> {
		self.min_salary
	}

	pub fn max_salary(&self) -> Option<f64> {
		self.max_salary
	}

	pub fn min_score(&self) -> Option<f64> {
		self.min_score
	}

	pub fn max_score(&self) -> Option<f64> {
		self.max_score
	}

	pub fn join_date_start(&self) -> Option<OffsetDateTime> {
		self.join_date_start
	}

	pub fn join_date_end(&self) -> Option<OffsetDateTime> {
		self.join_date_end
	}

	pub fn set_status(&mut self, value: impl Into<String>) {
		self.status = non_blank(value.into());
	}

	pub fn set_city(&mut self, value: impl Into<String>) {
		self.city = non_blank(value.into());
	}

	pub fn set_education(&mut self, value: impl Into<String>) {
		self.education = non_blank(value.into());
	}

	pub fn set_min_salary(&mut self, value: f64) {
		self.min_salary = value.is_finite().then_some(value);
	}

	pub fn set_max_salary(&mut self, value: f64) {
		self.max_salary = value.is_finite().then_some(value);
	}

	pub fn set_min_score(&mut self, value: f64) {
		self.min_score = value.is_finite().then_some(value);
	}

	pub fn set_max_score(&mut self, value: f64) {
		self.max_score = value.is_finite().then_some(value);
	}

	pub fn set_join_date_start(&mut self, value: OffsetDateTime) {
		self.join_date_start = Some(value);
	}

	pub fn set_join_date_end(&mut self, value: OffsetDateTime) {
		self.join_date_end = Some(value);
	}

	pub fn with_status(mut self, value: impl Into<String>) -> Self {
		self.set_status(value);

		self
	}

	pub fn with_city(mut self, value: impl Into<String>) -> Self {
		self.set_city(value);

		self
	}

	pub fn with_education(mut self, value: impl Into<String>) -> Self {
		self.set_education(value);

		self
	}

	pub fn with_salary_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
		self.min_salary = min.filter(|value| value.is_finite());
		self.max_salary = max.filter(|value| value.is_finite());

		self
	}

	pub fn with_score_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
		self.min_score = min.filter(|value| value.is_finite());
		self.max_score = max.filter(|value| value.is_finite());

		self
	}

	pub fn with_join_date_range(
		mut self,
		start: Option<OffsetDateTime>,
		end: Option<OffsetDateTime>,
	) -> Self {
		self.join_date_start = start;
		self.join_date_end = end;

		self
	}

	pub fn remove(&mut self, field: FilterField) {
		match field {
			FilterField::Status => self.status = None,
			FilterField::City => self.city = None,
			FilterField::Education => self.education = None,
			FilterField::MinSalary => self.min_salary = None,
			FilterField::MaxSalary => self.max_salary = None,
			FilterField::MinScore => self.min_score = None,
			FilterField::MaxScore => self.max_score = None,
			FilterField::JoinDateStart => self.join_date_start = None,
			FilterField::JoinDateEnd => self.join_date_end = None,
		}
	}

	pub fn contains(&self, field: FilterField) -> bool {
		match field {
			FilterField::Status => self.status.is_some(),
			FilterField::City => self.city.is_some(),
			FilterField::Education => self.education.is_some(),
			FilterField::MinSalary => self.min_salary.is_some(),
			FilterField::MaxSalary => self.max_salary.is_some(),
			FilterField::MinScore => self.min_score.is_some(),
			FilterField::MaxScore => self.max_score.is_some(),
			FilterField::JoinDateStart => self.join_date_start.is_some(),
			FilterField::JoinDateEnd => self.join_date_end.is_some(),
		}
	}

	pub fn fields(&self) -> Vec<FilterField> {
		FilterField::ALL.into_iter().filter(|field| self.contains(*field)).collect()
	}

	pub fn active_count(&self) -> usize {
		self.fields().len()
	}

	pub fn is_empty(&self) -> bool {
		self.active_count() == 0
	}

	/// Encodes the set as the backend's filter input, or `None` when nothing is constrained.
	pub fn to_graph_filter(&self) -> Option<Value> {
		let mut filter = Map::new();

		for (key, value) in [
			("status", &self.status),
			("city", &self.city),
			("education", &self.education),
		] {
			if let Some(value) = value {
				filter.insert(key.to_string(), serde_json::json!({ "in": [value] }));
			}
		}

		let ranges = [
			(
				"expectedSalary",
				range_value(self.min_salary.map(Value::from), self.max_salary.map(Value::from)),
			),
			("score", range_value(self.min_score.map(Value::from), self.max_score.map(Value::from))),
			(
				"joinDate",
				range_value(
					self.join_date_start.and_then(rfc3339),
					self.join_date_end.and_then(rfc3339),
				),
			),
		];

		for (key, range) in ranges.into_iter().filter_map(|(key, range)| Some((key, range?))) {
			filter.insert(key.to_string(), range);
		}

		(!filter.is_empty()).then_some(Value::Object(filter))
	}

	fn apply_json(&mut self, field: FilterField, value: &Value) -> Result<(), FilterParseError> {
		if value.is_null() {
			return Ok(());
		}

		let path = format!("$.{}", field.as_str());

		match field {
			FilterField::Status => self.status = json_string(value, &path)?,
			FilterField::City => self.city = json_string(value, &path)?,
			FilterField::Education => self.education = json_string(value, &path)?,
			FilterField::MinSalary => self.min_salary = json_number(value, &path)?,
			FilterField::MaxSalary => self.max_salary = json_number(value, &path)?,
			FilterField::MinScore => self.min_score = json_number(value, &path)?,
			FilterField::MaxScore => self.max_score = json_number(value, &path)?,
			FilterField::JoinDateStart => self.join_date_start = json_timestamp(value, &path)?,
			FilterField::JoinDateEnd => self.join_date_end = json_timestamp(value, &path)?,
		}

		Ok(())
	}
}

impl TryFrom<Value> for FilterSet {
	type Error = FilterParseError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		Self::from_json(&value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
	Status,
	City,
	Education,
	MinSalary,
	MaxSalary,
	MinScore,
	MaxScore,
	JoinDateStart,
	JoinDateEnd,
}
impl FilterField {
	pub const ALL: [Self; 9] = [
		Self::Status,
		Self::City,
		Self::Education,
		Self::MinSalary,
		Self::MaxSalary,
		Self::MinScore,
		Self::MaxScore,
		Self::JoinDateStart,
		Self::JoinDateEnd,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Status => "status",
			Self::City => "city",
			Self::Education => "education",
			Self::MinSalary => "minSalary",
			Self::MaxSalary => "maxSalary",
			Self::MinScore => "minScore",
			Self::MaxScore => "maxScore",
			Self::JoinDateStart => "joinDateStart",
			Self::JoinDateEnd => "joinDateEnd",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError {
	path: String,
	message: String,
}
impl Display for FilterParseError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.path, self.message)
	}
}

impl std::error::Error for FilterParseError {}

fn non_blank(value: String) -> Option<String> {
	let trimmed = value.trim();

	(!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn rfc3339(value: OffsetDateTime) -> Option<Value> {
	value.format(&time::format_description::well_known::Rfc3339).ok().map(Value::String)
}

fn range_value(gte: Option<Value>, lte: Option<Value>) -> Option<Value> {
	let mut range = Map::new();

	if let Some(gte) = gte {
		range.insert("gte".to_string(), gte);
	}
	if let Some(lte) = lte {
		range.insert("lte".to_string(), lte);
	}

	(!range.is_empty()).then_some(Value::Object(range))
}

fn json_string(value: &Value, path: &str) -> Result<Option<String>, FilterParseError> {
	match value {
		Value::String(raw) => Ok(non_blank(raw.clone())),
		Value::Number(number) => Ok(Some(number.to_string())),
		_ => Err(FilterParseError {
			path: path.to_string(),
			message: "expected a string.".to_string(),
		}),
	}
}

fn json_number(value: &Value, path: &str) -> Result<Option<f64>, FilterParseError> {
	let number = match value {
		Value::Number(number) => number.as_f64(),
		Value::String(raw) if raw.trim().is_empty() => return Ok(None),
		Value::String(raw) => raw.trim().parse::<f64>().ok(),
		_ => None,
	};

	match number {
		Some(number) if number.is_finite() => Ok(Some(number)),
		_ => Err(FilterParseError {
			path: path.to_string(),
			message: "expected a number.".to_string(),
		}),
	}
}

fn json_timestamp(value: &Value, path: &str) -> Result<Option<OffsetDateTime>, FilterParseError> {
	let Some(raw) = value.as_str() else {
		return Err(FilterParseError {
			path: path.to_string(),
			message: "expected a date string.".to_string(),
		});
	};

	if raw.trim().is_empty() {
		return Ok(None);
	}

	crate::time_serde::parse_timestamp(raw).map(Some).ok_or_else(|| FilterParseError {
		path: path.to_string(),
		message: format!("'{raw}' is not an ISO-8601 date."),
	})
}
