//! Command-line and environment configuration.

use clap::{Args, Parser};
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_API_URL: &str =
    "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Solve equations and riddles from your browser.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "puzzle-solver", version, about)]
pub struct Config {
    /// The address to listen on.
    #[arg(long, env = "PUZZLE_SOLVER_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,
    #[command(flatten)]
    pub riddle: RiddleConfig,
}

/// Settings for the chat-completion API used to answer riddles.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct RiddleConfig {
    /// The chat-completion endpoint.
    #[arg(long, env = "RIDDLE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// The bearer token sent with each request.
    #[arg(long, env = "RIDDLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// The model asked to answer riddles.
    #[arg(long, env = "RIDDLE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// How long to wait for the API before giving up, in seconds.
    #[arg(long, env = "RIDDLE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl RiddleConfig {
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

impl Default for RiddleConfig {
    fn default() -> Self {
        RiddleConfig {
            api_url: String::from(DEFAULT_API_URL),
            api_key: None,
            model: String::from(DEFAULT_MODEL),
            timeout_secs: 30,
        }
    }
}
