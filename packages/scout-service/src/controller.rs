//! Debounced, epoch-guarded pagination over a [`CandidateSource`].
//!
//! Every change of intent (search text, filters, sort, refresh) bumps the request epoch and
//! schedules a page-one fetch through the debouncer. A response is applied only when its epoch
//! still matches, so a slow answer to an older intent can never overwrite a newer one.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::watch;

use scout_config::ListConfig;
use scout_domain::{Candidate, CandidatePage, CandidateQuery, FilterSet, SortSpec};

use crate::{CandidateSource, Debouncer, Extraction, FilterExtractor, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPhase {
	Idle,
	Loading,
	Ready,
	Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
	pub cursor_page: u32,
	pub page_size: u32,
	pub items: Vec<Candidate>,
	pub total: u64,
	pub has_more: bool,
	pub request_epoch: u64,
}

/// Snapshot of everything a list view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
	pub phase: ListPhase,
	pub loading_more: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub search_term: String,
	pub filters: FilterSet,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sort: Option<SortSpec>,
	#[serde(flatten)]
	pub page: PageState,
}
impl ListView {
	fn new(page_size: u32) -> Self {
		Self {
			phase: ListPhase::Idle,
			loading_more: false,
			error: None,
			search_term: String::new(),
			filters: FilterSet::default(),
			sort: None,
			page: PageState {
				cursor_page: 1,
				page_size,
				items: Vec::new(),
				total: 0,
				has_more: false,
				request_epoch: 0,
			},
		}
	}

	pub fn active_filter_count(&self) -> usize {
		self.filters.active_count()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
	Applied,
	/// The response belonged to a superseded epoch and was dropped.
	Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
	Replace,
	Append,
}

struct Inner {
	source: Arc<dyn CandidateSource>,
	page_size: u32,
	debounce: Duration,
	debouncer: Debouncer,
	view: watch::Sender<ListView>,
}
impl Inner {
	async fn fetch(&self, epoch: u64, page: u32, mode: FetchMode) -> ApplyOutcome {
		let query = {
			let view = self.view.borrow();

			if view.page.request_epoch != epoch {
				return ApplyOutcome::Stale;
			}

			CandidateQuery::new(page, self.page_size)
				.with_search(&view.search_term)
				.with_sort(view.sort.clone())
				.with_filters(view.filters.clone())
		};

		tracing::debug!(epoch, page, "Fetching candidate page.");

		let result = self.source.fetch(&query).await;

		self.apply(epoch, page, mode, result)
	}

	fn apply(
		&self,
		epoch: u64,
		page: u32,
		mode: FetchMode,
		result: Result<CandidatePage>,
	) -> ApplyOutcome {
		let mut outcome = ApplyOutcome::Stale;

		self.view.send_if_modified(|view| {
			if view.page.request_epoch != epoch {
				return false;
			}

			outcome = ApplyOutcome::Applied;
			view.loading_more = false;

			match result {
				Ok(fetched) => {
					let page_size =
						if fetched.page_size > 0 { fetched.page_size } else { self.page_size };
					let fetched = CandidatePage { page, page_size, ..fetched };
					let has_more = fetched.has_more();

					match mode {
						FetchMode::Replace => view.page.items = fetched.items,
						FetchMode::Append => view.page.items.extend(fetched.items),
					}

					view.page.cursor_page = page;
					view.page.page_size = page_size;
					view.page.total = fetched.total;
					view.page.has_more = has_more;
					view.phase = ListPhase::Ready;
					view.error = None;
				},
				Err(err) => {
					tracing::warn!(epoch, page, error = %err, "Candidate fetch failed.");

					view.phase = ListPhase::Error;
					view.error = Some(err.to_string());
				},
			}

			true
		});

		if outcome == ApplyOutcome::Stale {
			tracing::trace!(epoch, page, "Discarded stale candidate page.");
		}

		outcome
	}
}

/// Owns list state and turns intent changes into debounced, ordered fetches.
///
/// Cheap to clone; clones share state. Mutating methods must be called from within a Tokio
/// runtime.
#[derive(Clone)]
pub struct ListController {
	inner: Arc<Inner>,
}
impl ListController {
	pub fn new(source: Arc<dyn CandidateSource>, cfg: &ListConfig) -> Self {
		Self::with_settings(source, cfg.page_size, Duration::from_millis(cfg.debounce_ms))
	}

	pub fn with_settings(
		source: Arc<dyn CandidateSource>,
		page_size: u32,
		debounce: Duration,
	) -> Self {
		let page_size = page_size.max(1);
		let (view, _) = watch::channel(ListView::new(page_size));

		Self {
			inner: Arc::new(Inner { source, page_size, debounce, debouncer: Debouncer::new(), view }),
		}
	}

	pub fn view(&self) -> ListView {
		self.inner.view.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<ListView> {
		self.inner.view.subscribe()
	}

	pub fn epoch(&self) -> u64 {
		self.inner.view.borrow().page.request_epoch
	}

	pub fn set_search_term(&self, text: impl Into<String>) {
		let text = text.into();

		self.reset(self.inner.debounce, |view| view.search_term = text);
	}

	pub fn set_filters(&self, filters: FilterSet) {
		self.reset(self.inner.debounce, |view| view.filters = filters);
	}

	/// Sorts by `field`, flipping the direction if it is already the sort field.
	pub fn set_sort(&self, field: &str) {
		self.reset(self.inner.debounce, |view| {
			view.sort = Some(SortSpec::toggle(view.sort.as_ref(), field));
		});
	}

	pub fn clear_sort(&self) {
		self.reset(self.inner.debounce, |view| view.sort = None);
	}

	/// Clears search text, filters and sort in one reset.
	pub fn reset_filters(&self) {
		self.reset(self.inner.debounce, |view| {
			view.search_term.clear();
			view.filters = FilterSet::default();
			view.sort = None;
		});
	}

	/// Re-runs the current intent immediately.
	pub fn refresh(&self) {
		self.reset(Duration::ZERO, |_| {});
	}

	/// Resolves `text` into filters and applies them as the new filter set.
	pub async fn apply_natural_language(
		&self,
		extractor: &FilterExtractor,
		text: &str,
	) -> Extraction {
		let extraction = extractor.extract_detailed(text).await;

		self.set_filters(extraction.filters.clone());

		extraction
	}

	/// Requests the next page. Returns `false` when the list is not ready, a page is already in
	/// flight, or the last page has been reached.
	pub fn load_more(&self) -> bool {
		let mut request = None;

		self.inner.view.send_if_modified(|view| {
			if view.phase != ListPhase::Ready || view.loading_more || !view.page.has_more {
				return false;
			}

			view.loading_more = true;
			request = Some((view.page.request_epoch, view.page.cursor_page + 1));

			true
		});

		let Some((epoch, page)) = request else {
			return false;
		};
		let inner = self.inner.clone();

		tokio::spawn(async move {
			inner.fetch(epoch, page, FetchMode::Append).await;
		});

		true
	}

	fn reset<F>(&self, delay: Duration, mutate: F)
	where
		F: FnOnce(&mut ListView),
	{
		let mut epoch = 0;

		self.inner.view.send_modify(|view| {
			mutate(view);

			view.page.request_epoch += 1;
			view.page.cursor_page = 1;
			view.page.items.clear();
			view.page.total = 0;
			view.page.has_more = false;
			view.phase = ListPhase::Loading;
			view.loading_more = false;
			view.error = None;
			epoch = view.page.request_epoch;
		});

		tracing::debug!(epoch, delay_ms = delay.as_millis() as u64, "List intent changed.");

		let inner = self.inner.clone();

		self.inner.debouncer.schedule(
			async move {
				inner.fetch(epoch, 1, FetchMode::Replace).await;
			},
			delay,
		);
	}
}
