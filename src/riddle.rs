//! Answering riddles with a chat-completion API.

use crate::{answer::ERROR_MARKER, config::RiddleConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ureq::{Agent, AgentBuilder};

const SYSTEM_PROMPT: &str = "You are a riddle solver. Provide concise, \
                             accurate answers to riddles. If the riddle is \
                             common, give the standard answer. If it's \
                             ambiguous, provide the most likely solution.";

/// Something which can answer a riddle.
pub trait RiddleSolver {
    /// Answer a riddle, returning a message starting with
    /// [`ERROR_MARKER`] if something went wrong.
    fn answer(&self, riddle: &str) -> String;
}

/// A [`RiddleSolver`] backed by an OpenAI-style chat-completion endpoint.
#[derive(Debug)]
pub struct RiddleClient {
    agent: Agent,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl RiddleClient {
    pub fn new(config: &RiddleConfig) -> Self {
        let agent = AgentBuilder::new().timeout(config.timeout()).build();

        RiddleClient {
            agent,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Ask the API to solve a riddle.
    pub fn solve(&self, riddle: &str) -> Result<String, RiddleError> {
        let api_key =
            self.api_key.as_deref().ok_or(RiddleError::MissingApiKey)?;
        let request = CompletionRequest::new(&self.model, riddle);

        debug!(
            url = %self.api_url,
            model = %self.model,
            "Asking for a riddle answer"
        );

        let response = self
            .agent
            .post(&self.api_url)
            .set("Authorization", &format!("Bearer {}", api_key))
            .send_json(&request)?;

        if response.status() != 200 {
            let status = response.status();
            let body = response.into_string().unwrap_or_default();
            return Err(RiddleError::Status { status, body });
        }

        let body: CompletionResponse = response
            .into_json()
            .map_err(|e| RiddleError::Transport(e.to_string()))?;

        body.into_answer()
    }
}

impl RiddleSolver for RiddleClient {
    fn answer(&self, riddle: &str) -> String {
        match self.solve(riddle) {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Unable to answer the riddle");
                format!("{} {}", ERROR_MARKER, e)
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiddleError {
    #[error("Error solving riddle: no API key was configured")]
    MissingApiKey,
    #[error("API Error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Error solving riddle: {0}")]
    Transport(String),
    #[error("Error solving riddle: the response didn't contain an answer")]
    MalformedResponse,
}

impl From<ureq::Error> for RiddleError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, response) => RiddleError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => {
                RiddleError::Transport(transport.to_string())
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

impl<'a> CompletionRequest<'a> {
    fn new(model: &'a str, riddle: &str) -> Self {
        CompletionRequest {
            model,
            messages: vec![
                Message {
                    role: String::from("system"),
                    content: String::from(SYSTEM_PROMPT),
                },
                Message {
                    role: String::from("user"),
                    content: format!("Answer this riddle: {}", riddle),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

impl CompletionResponse {
    fn into_answer(self) -> Result<String, RiddleError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(RiddleError::MalformedResponse)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Choice {
    message: Message,
}
