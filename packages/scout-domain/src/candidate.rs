use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Fields requested for every candidate, in wire order.
pub const CANDIDATE_FIELDS: [&str; 10] = [
	"id",
	"name",
	"email",
	"avatarUrl",
	"status",
	"education",
	"city",
	"expectedSalary",
	"joinDate",
	"score",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
	pub id: String,
	pub name: String,
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar_url: Option<String>,
	pub status: CandidateStatus,
	#[serde(default)]
	pub education: String,
	#[serde(default)]
	pub city: String,
	#[serde(default, deserialize_with = "null_as_zero")]
	pub expected_salary: f64,
	/// RFC 3339 text, a bare date, or epoch milliseconds on the wire.
	#[serde(with = "crate::time_serde")]
	pub join_date: OffsetDateTime,
	/// Nominally 0-100; the backend is authoritative and the value is not clamped.
	#[serde(default, deserialize_with = "null_as_zero")]
	pub score: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Candidate pipeline status. Unknown labels from the backend are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CandidateStatus {
	Active,
	Interview,
	Rejected,
	Offer,
	Other(String),
}
impl CandidateStatus {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Active => "Active",
			Self::Interview => "Interview",
			Self::Rejected => "Rejected",
			Self::Offer => "Offer",
			Self::Other(raw) => raw,
		}
	}
}

impl From<String> for CandidateStatus {
	fn from(raw: String) -> Self {
		match raw.as_str() {
			"Active" => Self::Active,
			"Interview" => Self::Interview,
			"Rejected" => Self::Rejected,
			"Offer" => Self::Offer,
			_ => Self::Other(raw),
		}
	}
}

impl From<CandidateStatus> for String {
	fn from(status: CandidateStatus) -> Self {
		match status {
			CandidateStatus::Other(raw) => raw,
			known => known.as_str().to_string(),
		}
	}
}

impl Display for CandidateStatus {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
