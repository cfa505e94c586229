use std::{future::Future, sync::Mutex, time::Duration};

use tokio::task::JoinHandle;

/// Trailing-edge debouncer.
///
/// Each [`schedule`](Self::schedule) replaces the pending timer, so only the last action in a
/// burst runs. Once a timer fires, its action runs detached and is no longer cancellable.
#[derive(Debug, Default)]
pub struct Debouncer {
	pending: Mutex<Option<JoinHandle<()>>>,
}
impl Debouncer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Must be called from within a Tokio runtime.
	pub fn schedule<F>(&self, action: F, delay: Duration)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let timer = tokio::spawn(async move {
			if !delay.is_zero() {
				tokio::time::sleep(delay).await;
			}

			tokio::spawn(action);
		});
		let previous = self.pending.lock().unwrap_or_else(|err| err.into_inner()).replace(timer);

		if let Some(previous) = previous {
			previous.abort();
		}
	}

	pub fn cancel(&self) {
		if let Some(pending) = self.pending.lock().unwrap_or_else(|err| err.into_inner()).take() {
			pending.abort();
		}
	}

	pub fn is_pending(&self) -> bool {
		self.pending
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.as_ref()
			.is_some_and(|timer| !timer.is_finished())
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel();
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn burst_runs_only_last_action() {
		let debouncer = Debouncer::new();
		let fired = Arc::new(Mutex::new(Vec::new()));

		for label in ["a", "ab", "abc"] {
			let fired = fired.clone();

			debouncer.schedule(
				async move {
					fired.lock().unwrap_or_else(|err| err.into_inner()).push(label);
				},
				Duration::from_millis(300),
			);
			tokio::time::sleep(Duration::from_millis(100)).await;
		}

		assert!(debouncer.is_pending());

		tokio::time::sleep(Duration::from_millis(500)).await;

		assert_eq!(*fired.lock().unwrap_or_else(|err| err.into_inner()), vec!["abc"]);
		assert!(!debouncer.is_pending());
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_drops_pending_action() {
		let debouncer = Debouncer::new();
		let runs = Arc::new(AtomicUsize::new(0));
		let counter = runs.clone();

		debouncer.schedule(
			async move {
				counter.fetch_add(1, Ordering::SeqCst);
			},
			Duration::from_millis(50),
		);
		debouncer.cancel();
		tokio::time::sleep(Duration::from_millis(200)).await;

		assert_eq!(runs.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn fired_action_survives_later_schedule() {
		let debouncer = Debouncer::new();
		let runs = Arc::new(AtomicUsize::new(0));

		for _ in 0..2 {
			let counter = runs.clone();

			debouncer.schedule(
				async move {
					tokio::time::sleep(Duration::from_millis(500)).await;
					counter.fetch_add(1, Ordering::SeqCst);
				},
				Duration::from_millis(10),
			);
			tokio::time::sleep(Duration::from_millis(50)).await;
		}

		tokio::time::sleep(Duration::from_secs(1)).await;

		assert_eq!(runs.load(Ordering::SeqCst), 2);
	}
}
