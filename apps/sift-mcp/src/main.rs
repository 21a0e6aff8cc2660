use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = sift_mcp::Args::parse();
	sift_mcp::run(args).await
}
