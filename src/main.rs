use clap::Parser;
use puzzle_solver::{config::Config, riddle::RiddleClient, web};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    if config.riddle.api_key.is_none() {
        tracing::warn!("No API key was provided, riddles won't be answered");
    }

    let riddles = RiddleClient::new(&config.riddle);
    web::serve(&config.address, &riddles)?;

    Ok(())
}
