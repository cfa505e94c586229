use std::{
	fmt::{Debug, Formatter},
	sync::{Arc, OnceLock},
};

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use scout_config::GraphConfig;
use scout_domain::{Candidate, CandidatePage, CandidateQuery};
use scout_providers::graph::{GraphClient, GraphRequest};

use crate::{
	AuthVariant, BoxFuture, CandidateSource, Error, GraphTransport, QueryVariant, Result, schema,
};

static SHARED: OnceLock<Arc<SessionClient>> = OnceLock::new();

#[derive(Clone)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}
impl Credentials {
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}

impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials").field("email", &self.email).field("password", &"***").finish()
	}
}

/// A bearer token together with the login shape that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub token: String,
	pub schema_variant: AuthVariant,
}

#[derive(Debug, Default)]
struct SessionState {
	current: Option<Arc<Session>>,
	known_variant: Option<AuthVariant>,
	/// Completed negotiations, successful or not.
	negotiations: u64,
	last_failure: Option<String>,
}

enum QueryError {
	Unauthorized(String),
	Exhausted(String),
}
impl QueryError {
	fn into_error(self) -> Error {
		match self {
			Self::Unauthorized(message) => Error::AuthenticationFailed { message },
			Self::Exhausted(message) => Error::QueryFailed { message },
		}
	}
}

/// Authenticated access to a graph backend whose schema shape is discovered at runtime.
///
/// The first successful login shape is remembered and tried first on every later
/// re-authentication. List queries probe every known envelope shape on each call. Concurrent
/// callers needing a session share a single negotiation.
pub struct SessionClient {
	transport: Arc<dyn GraphTransport>,
	credentials: Credentials,
	state: RwLock<SessionState>,
	negotiation: Mutex<()>,
}
impl SessionClient {
	pub fn new(transport: Arc<dyn GraphTransport>, credentials: Credentials) -> Self {
		Self {
			transport,
			credentials,
			state: RwLock::new(SessionState::default()),
			negotiation: Mutex::new(()),
		}
	}

	pub fn from_config(cfg: &GraphConfig) -> Result<Self> {
		let transport = GraphClient::new(cfg)?;

		Ok(Self::new(Arc::new(transport), Credentials::new(&cfg.email, &cfg.password)))
	}

	/// The process-wide client. The first call builds it from `cfg`; later calls ignore `cfg`.
	pub fn shared(cfg: &GraphConfig) -> Result<Arc<Self>> {
		if let Some(client) = SHARED.get() {
			return Ok(client.clone());
		}

		let client = Arc::new(Self::from_config(cfg)?);

		Ok(SHARED.get_or_init(|| client).clone())
	}

	pub async fn session(&self) -> Option<Arc<Session>> {
		self.state.read().await.current.clone()
	}

	pub async fn known_variant(&self) -> Option<AuthVariant> {
		self.state.read().await.known_variant
	}

	/// Returns the current session, negotiating a new one when none is held.
	///
	/// Callers that queue behind a running negotiation share its outcome, failure included.
	pub async fn authenticate(&self) -> Result<Arc<Session>> {
		let observed = {
			let state = self.state.read().await;

			if let Some(session) = &state.current {
				return Ok(session.clone());
			}

			state.negotiations
		};
		let _negotiation = self.negotiation.lock().await;
		let preferred = {
			let state = self.state.read().await;

			if let Some(session) = &state.current {
				return Ok(session.clone());
			}
			if state.negotiations != observed
				&& let Some(message) = &state.last_failure
			{
				return Err(Error::AuthenticationFailed { message: message.clone() });
			}

			state.known_variant
		};
		let outcome = self.negotiate(preferred).await;
		let mut state = self.state.write().await;

		state.negotiations += 1;

		match outcome {
			Ok(session) => {
				let session = Arc::new(session);

				state.known_variant = Some(session.schema_variant);
				state.current = Some(session.clone());
				state.last_failure = None;

				Ok(session)
			},
			Err(message) => {
				state.last_failure = Some(message.clone());

				Err(Error::AuthenticationFailed { message })
			},
		}
	}

	/// Drops `stale` if it is still the current session. A newer session is left alone.
	pub async fn invalidate(&self, stale: &Session) {
		let mut state = self.state.write().await;

		if state.current.as_deref().is_some_and(|current| current.token == stale.token) {
			state.current = None;
		}
	}

	pub async fn query(&self, request: &CandidateQuery) -> Result<CandidatePage> {
		let session = self.authenticate().await?;

		match self.query_once(&session, request).await {
			Err(QueryError::Unauthorized(message)) => {
				tracing::info!(%message, "Session rejected; re-authenticating.");

				self.invalidate(&session).await;

				let session = self.authenticate().await?;

				self.query_once(&session, request).await.map_err(QueryError::into_error)
			},
			result => result.map_err(QueryError::into_error),
		}
	}

	pub async fn candidate(&self, id: &str) -> Result<Candidate> {
		let id = id.trim();

		if id.is_empty() {
			return Err(Error::InvalidRequest { message: "Candidate id must be non-empty.".to_string() });
		}

		let data = self.execute_authorized(&schema::candidate_request(id)).await?;

		schema::decode_candidate(&data)
			.map_err(|err| Error::QueryFailed { message: err.to_string() })?
			.ok_or_else(|| Error::NotFound { message: format!("Candidate '{id}' does not exist.") })
	}

	async fn negotiate(&self, preferred: Option<AuthVariant>) -> Result<Session, String> {
		let mut last_error = None;

		for variant in AuthVariant::probe_order(preferred) {
			let request = variant.encode(&self.credentials);

			match self.transport.execute(&request, None).await {
				Ok(data) => match variant.decode(&data) {
					Some(token) => {
						tracing::info!(variant = variant.name(), "Authenticated.");

						return Ok(Session { token, schema_variant: variant });
					},
					None => last_error = Some(format!("{} returned no token.", variant.name())),
				},
				Err(err) => {
					tracing::debug!(variant = variant.name(), error = %err, "Login shape rejected.");

					last_error = Some(err.to_string());
				},
			}
		}

		let message = last_error.unwrap_or_else(|| "No login shapes to try.".to_string());

		tracing::warn!(%message, "Every login shape failed.");

		Err(message)
	}

	async fn query_once(
		&self,
		session: &Session,
		request: &CandidateQuery,
	) -> Result<CandidatePage, QueryError> {
		let mut last_error = None;

		for variant in QueryVariant::ALL {
			let wire = variant.encode(request);
			let outcome = match self.transport.execute(&wire, Some(&session.token)).await {
				Ok(data) => schema::decode_candidate_page(&data, request),
				Err(err) => Err(err),
			};

			match outcome {
				Ok(page) => {
					tracing::debug!(
						variant = variant.name(),
						page = page.page,
						items = page.items.len(),
						total = page.total,
						"Candidate page fetched."
					);

					return Ok(page);
				},
				Err(err) if err.is_unauthorized() =>
					return Err(QueryError::Unauthorized(err.to_string())),
				Err(err) => {
					tracing::debug!(variant = variant.name(), error = %err, "Query shape rejected.");

					last_error = Some(err.to_string());
				},
			}
		}

		let message = last_error.unwrap_or_else(|| "No query shapes to try.".to_string());

		tracing::warn!(%message, "Every query shape failed.");

		Err(QueryError::Exhausted(message))
	}

	/// Runs one operation with the current token, re-authenticating once if it is rejected.
	async fn execute_authorized(&self, request: &GraphRequest) -> Result<Value> {
		let session = self.authenticate().await?;
		let result = match self.transport.execute(request, Some(&session.token)).await {
			Err(err) if err.is_unauthorized() => {
				tracing::info!(error = %err, "Session rejected; re-authenticating.");

				self.invalidate(&session).await;

				let session = self.authenticate().await?;

				self.transport.execute(request, Some(&session.token)).await
			},
			result => result,
		};

		result.map_err(|err| {
			if err.is_unauthorized() {
				Error::AuthenticationFailed { message: err.to_string() }
			} else {
				Error::QueryFailed { message: err.to_string() }
			}
		})
	}
}

impl Debug for SessionClient {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionClient").field("credentials", &self.credentials).finish_non_exhaustive()
	}
}

impl CandidateSource for SessionClient {
	fn fetch<'a>(&'a self, query: &'a CandidateQuery) -> BoxFuture<'a, Result<CandidatePage>> {
		Box::pin(self.query(query))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex as StdMutex;

	use super::*;

	/// Accepts one login shape and one list shape; every token other than the latest is stale.
	struct ScriptedTransport {
		auth: AuthVariant,
		list_marker: &'static str,
		generation: StdMutex<u32>,
		calls: StdMutex<Vec<String>>,
	}
	impl ScriptedTransport {
		fn new(auth: AuthVariant, list_marker: &'static str) -> Arc<Self> {
			Arc::new(Self {
				auth,
				list_marker,
				generation: StdMutex::new(1),
				calls: StdMutex::new(Vec::new()),
			})
		}

		fn calls(&self) -> Vec<String> {
			self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
		}

		fn token(&self) -> String {
			format!("t{}", self.generation.lock().unwrap_or_else(|err| err.into_inner()))
		}

		fn respond(
			&self,
			request: &GraphRequest,
			token: Option<&str>,
		) -> scout_providers::Result<Value> {
			let rejected = || scout_providers::Error::Graph {
				message: "Unknown field.".to_string(),
				code: Some("GRAPHQL_VALIDATION_FAILED".to_string()),
			};

			if request.query.starts_with("mutation") {
				let expected = self.auth.encode(&Credentials::new("a", "b")).operation_name;

				if request.operation_name != expected {
					return Err(rejected());
				}

				let (field, _) = self.auth.name().split_once('(').unwrap_or_default();

				return Ok(serde_json::json!({ field: { "token": self.token() } }));
			}
			if token != Some(self.token().as_str()) {
				return Err(scout_providers::Error::Graph {
					message: "Not authenticated.".to_string(),
					code: Some("UNAUTHENTICATED".to_string()),
				});
			}
			if request.query.contains("candidate(id:") {
				return Ok(serde_json::json!({ "candidate": null }));
			}
			if !request.query.contains(self.list_marker) {
				return Err(rejected());
			}

			Ok(serde_json::json!({ "candidates": { "items": [], "data": [] } }))
		}
	}

	impl GraphTransport for ScriptedTransport {
		fn execute<'a>(
			&'a self,
			request: &'a GraphRequest,
			token: Option<&'a str>,
		) -> BoxFuture<'a, scout_providers::Result<Value>> {
			self.calls
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push(request.operation_name.clone());

			Box::pin(async move { self.respond(request, token) })
		}
	}

	fn client(transport: Arc<ScriptedTransport>) -> SessionClient {
		SessionClient::new(transport, Credentials::new("operator@example.com", "secret"))
	}

	#[tokio::test]
	async fn remembers_accepted_login_shape() {
		let transport = ScriptedTransport::new(AuthVariant::SignInInput, "items {");
		let client = client(transport.clone());
		let session = client.authenticate().await.expect("Failed to authenticate.");

		assert_eq!(session.schema_variant, AuthVariant::SignInInput);
		assert_eq!(transport.calls(), vec!["Authenticate", "Login", "SignIn"]);
		assert_eq!(client.known_variant().await, Some(AuthVariant::SignInInput));

		client.invalidate(&session).await;
		client.authenticate().await.expect("Failed to re-authenticate.");

		assert_eq!(transport.calls()[3..], ["SignIn".to_string()]);
	}

	#[tokio::test]
	async fn invalidate_ignores_newer_sessions() {
		let transport = ScriptedTransport::new(AuthVariant::LoginInput, "items {");
		let client = client(transport);
		let session = client.authenticate().await.expect("Failed to authenticate.");
		let stale = Session { token: "old".to_string(), schema_variant: AuthVariant::LoginInput };

		client.invalidate(&stale).await;

		assert_eq!(client.session().await, Some(session));
	}

	#[tokio::test]
	async fn null_candidate_is_not_found() {
		let transport = ScriptedTransport::new(AuthVariant::LoginInput, "items {");
		let err = client(transport).candidate("404").await.expect_err("Expected lookup failure.");

		assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err}");
	}

	#[tokio::test]
	async fn blank_candidate_id_is_rejected_without_network() {
		let transport = ScriptedTransport::new(AuthVariant::LoginInput, "items {");
		let err = client(transport.clone()).candidate("  ").await.expect_err("Expected rejection.");

		assert!(matches!(err, Error::InvalidRequest { .. }));
		assert!(transport.calls().is_empty());
	}

	#[tokio::test]
	async fn second_query_shape_is_used_when_first_is_rejected() {
		let transport = ScriptedTransport::new(AuthVariant::LoginInput, "data {");
		let client = client(transport.clone());
		let page = client.query(&CandidateQuery::new(1, 20)).await.expect("Query failed.");

		assert!(page.items.is_empty());
		assert_eq!(
			transport.calls()[2..],
			["GetCandidates".to_string(), "GetCandidatesPage".to_string()]
		);
	}
}
