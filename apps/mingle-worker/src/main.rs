use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mingle_worker::Args::parse();

	mingle_worker::run(args).await
}
