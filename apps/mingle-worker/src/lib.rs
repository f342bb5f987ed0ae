use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
	version = mingle_cli::VERSION,
	rename_all = "kebab",
	styles = mingle_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
	/// Event to run matching and seat allocation for.
	#[arg(long, value_name = "ID")]
	pub event_id: i64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = mingle_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = mingle_storage::db::Db::connect(&config.storage.postgres).await?;
	db.ensure_schema(config.providers.embedding.dimensions).await?;

	let service = mingle_service::MatchService::new(config, db);
	let result = service.run_matching(args.event_id).await?;

	println!("{}", serde_json::to_string_pretty(&result)?);

	if !result.success {
		tracing::error!(event_id = args.event_id, failure = ?result.failure, "Matching run failed.");

		color_eyre::eyre::bail!("Matching run failed for event {}.", args.event_id);
	}

	Ok(())
}
