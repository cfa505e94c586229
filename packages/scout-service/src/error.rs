pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Authentication failed: {message}")]
	AuthenticationFailed { message: String },
	#[error("Query failed: {message}")]
	QueryFailed { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error(transparent)]
	Provider(#[from] scout_providers::Error),
}
