use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use scout_service::{
	ExtractionSource, FilterExtractor, ListController, ListPhase, ListView, SessionClient,
};

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	/// Without a config file, settings come from `SCOUT_*` environment variables.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	#[arg(long, short = 's', value_name = "TEXT")]
	pub search: Option<String>,
	/// Natural-language filter request, e.g. "Active candidates from Istanbul".
	#[arg(long, short = 'a', value_name = "TEXT")]
	pub ask: Option<String>,
	/// Column to sort by. Repeating a column flips its direction.
	#[arg(long, value_name = "FIELD")]
	pub sort: Vec<String>,
	#[arg(long, short = 'p', value_name = "N", default_value_t = 1)]
	pub pages: u32,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = match &args.config {
		Some(path) => scout_config::load(path)?,
		None => scout_config::from_env()?,
	};
	init_tracing(&config.service.log_level)?;
	let client = SessionClient::shared(&config.graph)?;
	let extractor = FilterExtractor::from_config(&config);

	tracing::info!(
		endpoint = %config.graph.endpoint,
		remote_extractor = extractor.is_remote(),
		page_size = config.list.page_size,
		"Scout starting."
	);

	let view = browse(&args, &config, client, &extractor).await?;

	println!("{}", serde_json::to_string_pretty(&view)?);

	if let Some(message) = view.error {
		return Err(eyre::eyre!("Candidate listing failed: {message}"));
	}
	Ok(())
}

/// Applies every requested intent, then loads up to `args.pages` pages.
pub async fn browse(
	args: &Args,
	config: &scout_config::Config,
	client: Arc<SessionClient>,
	extractor: &FilterExtractor,
) -> color_eyre::Result<ListView> {
	let controller = ListController::new(client, &config.list);
	let mut rx = controller.subscribe();

	if let Some(ask) = &args.ask {
		let extraction = controller.apply_natural_language(extractor, ask).await;

		if let ExtractionSource::Fallback { reason } = &extraction.source {
			tracing::info!(%reason, "Filters resolved locally.");
		}
	}
	if let Some(search) = &args.search {
		controller.set_search_term(search.as_str());
	}
	for field in &args.sort {
		controller.set_sort(field);
	}

	controller.refresh();

	let mut view = settle(&mut rx, controller.epoch()).await?;

	for _ in 1..args.pages {
		if !controller.load_more() {
			break;
		}

		view = settle(&mut rx, controller.epoch()).await?;
	}

	tracing::info!(
		items = view.page.items.len(),
		total = view.page.total,
		has_more = view.page.has_more,
		"Listing complete."
	);

	Ok(view)
}

async fn settle(rx: &mut watch::Receiver<ListView>, epoch: u64) -> color_eyre::Result<ListView> {
	let view = rx
		.wait_for(|view| {
			view.page.request_epoch == epoch
				&& !view.loading_more
				&& matches!(view.phase, ListPhase::Ready | ListPhase::Error)
		})
		.await
		.map_err(|_| eyre::eyre!("List controller stopped before settling."))?;

	Ok(view.clone())
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout stays pure JSON.
fn init_tracing(configured: &str) -> color_eyre::Result<()> {
	let (filter, rejected) = match EnvFilter::try_from_default_env() {
		Ok(filter) => (filter, None),
		Err(_) => match EnvFilter::try_new(configured) {
			Ok(filter) => (filter, None),
			Err(err) => (EnvFilter::new("info"), Some(err)),
		},
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|err| eyre::eyre!("Failed to install log subscriber: {err}"))?;

	if let Some(err) = rejected {
		tracing::warn!(level = configured, error = %err, "Invalid log level; using info.");
	}

	Ok(())
}
