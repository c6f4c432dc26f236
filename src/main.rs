use clap::Parser;
use lazarus::cli;

#[tokio::main]
async fn main() -> lazarus::Result<()> {
    let args = cli::Args::parse();
    cli::run(args).await
}
