mod error;
mod extractor;
mod graph;

pub use error::{Error, Result};
pub use extractor::ExtractorMock;
pub use graph::{GraphMock, GraphMockConfig, RecordedOperation};

use std::future::IntoFuture;

use axum::Router;
use serde_json::Value;
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

const STATUSES: [&str; 5] = ["Active", "Interview", "Rejected", "Offer", "Withdrawn"];
const CITIES: [&str; 4] = ["Istanbul", "Ankara", "Izmir", "Bursa"];
const EDUCATION: [&str; 3] = ["Computer Engineering", "Software Engineering", "Mathematics"];

/// A server bound to an ephemeral loopback port, shut down when dropped.
pub struct MockServer {
	url: String,
	shutdown: Option<Sender<()>>,
}
impl MockServer {
	pub async fn start(app: Router) -> Result<Self> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { url: format!("http://{addr}"), shutdown: Some(tx) })
	}

	pub fn url(&self) -> &str {
		&self.url
	}
}

impl Drop for MockServer {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

/// Deterministic wire-format candidates, one per index starting at 1.
pub fn sample_candidates(count: usize) -> Vec<Value> {
	(1..=count)
		.map(|index| {
			serde_json::json!({
				"id": index.to_string(),
				"name": format!("Candidate {index}"),
				"email": format!("candidate{index}@example.com"),
				"avatarUrl": null,
				"status": STATUSES[index % STATUSES.len()],
				"education": EDUCATION[index % EDUCATION.len()],
				"city": CITIES[index % CITIES.len()],
				"expectedSalary": 30_000 + index * 500,
				"joinDate": format!("2023-{:02}-{:02}", index % 12 + 1, index % 28 + 1),
				"score": (index * 7) % 101,
			})
		})
		.collect()
}
