//! Model backends for the generation step
//!
//! The backend is picked once from [`ModelConfig::backend`]; callers only use
//! the [`ModelBackend`] methods and never look at the concrete variant.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compression::CompressionResult;
use crate::config::{BackendKind, ModelConfig};
use crate::error::{QuireError, Result};
use crate::text::truncate_chars;

/// Prompt characters echoed back by the mock backend
const MOCK_ECHO_CHARS: usize = 200;

pub enum ModelBackend {
    Mock(MockModel),
    Http(HttpModel),
}

impl ModelBackend {
    pub fn from_config(config: ModelConfig) -> Self {
        match config.backend {
            BackendKind::Mock => ModelBackend::Mock(MockModel::new(config)),
            BackendKind::Http => ModelBackend::Http(HttpModel::new(config)),
        }
    }

    /// Complete `prompt`, returning the generated text
    #[tracing::instrument(
        skip_all,
        fields(backend = ?self.config().backend, prompt_chars = prompt.chars().count())
    )]
    pub fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            ModelBackend::Mock(model) => Ok(model.generate(prompt)),
            ModelBackend::Http(model) => model.generate(prompt),
        }
    }

    /// Check that the backend is reachable
    pub fn ping(&self) -> Result<()> {
        match self {
            ModelBackend::Mock(_) => Ok(()),
            ModelBackend::Http(model) => model.ping(),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        match self {
            ModelBackend::Mock(model) => &model.config,
            ModelBackend::Http(model) => &model.config,
        }
    }

    /// Replace the configuration. A different `backend` kind switches the
    /// variant.
    pub fn update_config(&mut self, config: ModelConfig) {
        *self = ModelBackend::from_config(config);
    }
}

/// Offline backend with deterministic output
#[derive(Debug, Clone)]
pub struct MockModel {
    config: ModelConfig,
}

impl MockModel {
    pub fn new(config: ModelConfig) -> Self {
        MockModel { config }
    }

    /// Echo the last non-blank prompt line
    pub fn generate(&self, prompt: &str) -> String {
        let last_line = prompt
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("");
        format!(
            "[mock:{}] {}",
            self.config.model,
            truncate_chars(last_line, MOCK_ECHO_CHARS)
        )
    }
}

/// OpenAI-compatible chat completions client
pub struct HttpModel {
    config: ModelConfig,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl HttpModel {
    pub fn new(config: ModelConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .build()
            .into();
        HttpModel { config, agent }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.endpoint.trim_end_matches('/'))
    }

    pub fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            stream: false,
        };
        let payload = serde_json::to_string(&request)?;
        let url = self.url("chat/completions");

        let mut response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(payload.as_str())
            .map_err(|e| transport_error(&url, e))?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| transport_error(&url, e))?;

        parse_completion(&body)
    }

    pub fn ping(&self) -> Result<()> {
        let url = self.url("models");
        self.agent
            .get(&url)
            .call()
            .map_err(|e| transport_error(&url, e))?;
        Ok(())
    }
}

fn transport_error(url: &str, err: ureq::Error) -> QuireError {
    match err {
        ureq::Error::StatusCode(code) => QuireError::Model(format!("{url} returned HTTP {code}")),
        other => QuireError::Model(format!("request to {url} failed: {other}")),
    }
}

/// First choice's message content from a chat completions response
fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| QuireError::Model(format!("malformed completion response: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| QuireError::Model("completion response has no content".into()))
}

/// Prompt text for a compressed context and a writing instruction.
/// Empty sections are left out.
pub fn render_prompt(context: &CompressionResult, instruction: &str) -> String {
    let mut sections = Vec::new();

    for (heading, body) in [
        ("Project", context.project_context.as_str()),
        ("Glossary", context.glossary.as_str()),
        ("Outline", context.outline.as_str()),
    ] {
        if !body.trim().is_empty() {
            sections.push(format!("# {heading}\n{}", body.trim()));
        }
    }

    let excerpts: Vec<String> = context
        .chapters
        .iter()
        .filter(|c| !c.content.trim().is_empty())
        .map(|c| format!("## {} ({})\n{}", c.chapter_title, c.chapter_id, c.content.trim()))
        .collect();
    if !excerpts.is_empty() {
        sections.push(format!("# Related chapters\n{}", excerpts.join("\n\n")));
    }

    sections.push(format!("# Instruction\n{}", instruction.trim()));
    sections.join("\n\n")
}
