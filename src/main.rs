// ABOUTME: Entry point for adib — a literary mentor chat with intent-routed generation.
// ABOUTME: Parses CLI args, loads config, and launches the app.

use std::path::PathBuf;

use clap::Parser;

use adib::app::App;
use adib::config::Config;

#[derive(Parser)]
#[command(name = "adib", about = "AI-ADIB — o'zbek adabiyoti bo'yicha intellektual mentor")]
struct Args {
    /// Start without restoring saved sessions.
    #[arg(long)]
    fresh: bool,

    /// Override the data directory used for persistence.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    App::new(config, args.fresh, args.data_dir).run().await
}
