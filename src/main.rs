use clap::Parser;

use deskstate_lib::{bootstrap, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = bootstrap::tracing::init_tracing_subscriber() {
        eprintln!("Failed to initialize tracing: {err}");
    }

    let output = bootstrap::run(cli).await?;
    println!("{output}");
    Ok(())
}
