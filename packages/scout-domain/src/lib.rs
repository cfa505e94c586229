pub mod candidate;
pub mod filter;
pub mod query;
pub mod rules;
pub mod sort;
pub mod time_serde;

pub use candidate::{CANDIDATE_FIELDS, Candidate, CandidateStatus};
pub use filter::{FilterField, FilterParseError, FilterSet};
pub use query::{CandidatePage, CandidateQuery};
pub use sort::{SortDirection, SortSpec};
