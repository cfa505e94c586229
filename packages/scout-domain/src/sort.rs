use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}
impl SortDirection {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}

	pub fn flipped(self) -> Self {
		match self {
			Self::Asc => Self::Desc,
			Self::Desc => Self::Asc,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
	pub field: String,
	pub direction: SortDirection,
}
impl SortSpec {
	pub fn ascending(field: impl Into<String>) -> Self {
		Self { field: field.into(), direction: SortDirection::Asc }
	}

	/// Column-header semantics: the same field flips direction, a new field starts ascending.
	pub fn toggle(current: Option<&Self>, field: &str) -> Self {
		match current {
			Some(current) if current.field == field =>
				Self { field: current.field.clone(), direction: current.direction.flipped() },
			_ => Self::ascending(field),
		}
	}
}
