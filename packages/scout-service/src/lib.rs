pub mod controller;
pub mod extract;
pub mod scheduler;
pub mod schema;
pub mod session;

mod error;

pub use controller::{ApplyOutcome, ListController, ListPhase, ListView, PageState};
pub use error::{Error, Result};
pub use extract::{Extraction, ExtractionSource, FilterExtractor};
pub use scheduler::Debouncer;
pub use schema::{AuthVariant, QueryVariant};
pub use session::{Credentials, Session, SessionClient};

use std::{future::Future, pin::Pin};

use serde_json::Value;

use scout_config::ExtractorProviderConfig;
use scout_domain::{CandidatePage, CandidateQuery};
use scout_providers::{
	extractor,
	graph::{GraphClient, GraphRequest},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Carries one operation to the graph backend and returns its `data` object.
pub trait GraphTransport
where
	Self: Send + Sync,
{
	fn execute<'a>(
		&'a self,
		request: &'a GraphRequest,
		token: Option<&'a str>,
	) -> BoxFuture<'a, scout_providers::Result<Value>>;
}

/// Turns a natural-language query into a raw filter object.
pub trait ExtractorProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(&'a self, query: &'a str) -> BoxFuture<'a, scout_providers::Result<Value>>;
}

/// Anything able to serve one canonical page of candidates.
pub trait CandidateSource
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, query: &'a CandidateQuery) -> BoxFuture<'a, Result<CandidatePage>>;
}

impl GraphTransport for GraphClient {
	fn execute<'a>(
		&'a self,
		request: &'a GraphRequest,
		token: Option<&'a str>,
	) -> BoxFuture<'a, scout_providers::Result<Value>> {
		Box::pin(GraphClient::execute(self, request, token))
	}
}

/// HTTP extraction endpoint described by an [`ExtractorProviderConfig`].
#[derive(Debug, Clone)]
pub struct HttpExtractor {
	cfg: ExtractorProviderConfig,
}
impl HttpExtractor {
	pub fn new(cfg: ExtractorProviderConfig) -> Self {
		Self { cfg }
	}
}

impl ExtractorProvider for HttpExtractor {
	fn extract<'a>(&'a self, query: &'a str) -> BoxFuture<'a, scout_providers::Result<Value>> {
		Box::pin(extractor::extract(&self.cfg, query))
	}
}
