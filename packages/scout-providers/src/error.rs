use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("Graph error: {message}")]
	Graph { message: String, code: Option<String> },
}
impl Error {
	/// Whether the remote side rejected the bearer token rather than the request shape.
	pub fn is_unauthorized(&self) -> bool {
		match self {
			Self::Reqwest(err) => matches!(
				err.status(),
				Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
			),
			Self::Graph { message, code } => {
				let code = code.as_deref().unwrap_or_default();
				let message = message.to_lowercase();

				matches!(code, "UNAUTHENTICATED" | "UNAUTHORIZED" | "FORBIDDEN")
					|| message.contains("unauthorized")
					|| message.contains("not authenticated")
					|| message.contains("invalid token")
			},
			_ => false,
		}
	}
}
