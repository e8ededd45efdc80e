//! AI chat about a movie
//!
//! A [`ChatSession`] holds the role-tagged history, seeded with a system
//! prompt describing the movie. [`ChatClient`] posts the history to the chat
//! service and streams the reply text back chunk by chunk.

use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::types::MovieDetails;

/// Shown to the user for any chat failure
pub const CHAT_ERROR_MESSAGE: &str = "Failed to send message. Please try again.";

/// Conversation starters offered under the chat box
pub const PREDEFINED_PROMPTS: [&str; 5] = [
    "What makes this movie special?",
    "Explain the main themes",
    "Compare this to similar movies",
    "Analyze the ending",
    "Discuss the cinematography",
];

/// Error type for chat requests
#[derive(Error, Debug)]
pub enum ChatError {
    /// Prompt rejected before sending
    #[error("Invalid prompt: {0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Service answered with a non-2xx status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Reply stream was not valid UTF-8
    #[error("Failed to decode reply: {0}")]
    Decode(String),
}

impl ChatError {
    /// Message for the chat panel
    pub fn user_message(&self) -> &'static str {
        CHAT_ERROR_MESSAGE
    }
}

impl Serialize for ChatError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.user_message())
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Conversation about one movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    movie_id: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Start a conversation seeded with the movie's details
    pub fn for_movie(movie: &MovieDetails) -> Self {
        Self {
            movie_id: movie.id.clone(),
            messages: vec![ChatMessage::new(ChatRole::System, system_prompt(movie))],
        }
    }

    /// Id of the movie being discussed
    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    /// Full history, system prompt included
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// History shown to the user (system messages hidden)
    pub fn visible_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
    }

    fn push(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }
}

fn system_prompt(movie: &MovieDetails) -> String {
    format!(
        "You are a friendly movie expert discussing the movie: {title} ({year}).\n\
         Use the following movie details in your responses:\n\
         Plot: {plot}\n\
         Director: {director}\n\
         Actors: {actors}\n\
         Genre: {genre}\n\
         Ratings: IMDb {rating}/10\n\
         \n\
         Please format your responses using markdown when appropriate.\n\
         Use bullet points for lists and emphasis for important points.",
        title = movie.title,
        year = movie.year,
        plot = movie.plot,
        director = movie.director,
        actors = movie.actors,
        genre = movie.genres.join(", "),
        rating = movie.imdb_rating,
    )
}

/// Configuration for the chat client
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the chat service; requests go to `{api_url}/api/chat`
    pub api_url: String,
    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Streaming chat client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    /// Create a client for the configured service
    ///
    /// # Errors
    /// - `HttpError` if the HTTP client cannot be built
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", config.api_url.trim_end_matches('/')),
        })
    }

    /// Send `prompt` as the next user message and stream the reply
    ///
    /// `on_chunk` receives each decoded piece of text as it arrives. The
    /// complete reply is appended to the session as an assistant message and
    /// returned. On failure the user message stays in the history and no
    /// partial reply is kept.
    ///
    /// # Errors
    /// - `Validation` if the prompt is blank
    /// - `HttpError` / `Status` / `Decode` for transport failures
    #[instrument(skip(self, session, on_chunk), fields(movie = %session.movie_id))]
    pub async fn send<F>(
        &self,
        session: &mut ChatSession,
        prompt: &str,
        mut on_chunk: F,
    ) -> Result<String, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ChatError::Validation("prompt cannot be empty".to_string()));
        }
        session.push(ChatRole::User, prompt);

        match self.stream_reply(session.messages(), &mut on_chunk).await {
            Ok(reply) => {
                debug!(len = reply.len(), "chat reply complete");
                session.push(ChatRole::Assistant, reply.clone());
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                Err(e)
            }
        }
    }

    async fn stream_reply<F>(
        &self,
        messages: &[ChatMessage],
        on_chunk: &mut F,
    ) -> Result<String, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        let mut response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let mut reply = String::new();
        let mut pending: Vec<u8> = Vec::new();
        while let Some(bytes) = response.chunk().await? {
            pending.extend_from_slice(&bytes);
            let text = take_utf8_prefix(&mut pending)?;
            if !text.is_empty() {
                on_chunk(&text);
                reply.push_str(&text);
            }
        }

        if !pending.is_empty() {
            return Err(ChatError::Decode("reply ended mid-character".to_string()));
        }
        Ok(reply)
    }
}

/// Remove and return the longest valid UTF-8 prefix of `buf`
///
/// An incomplete trailing sequence stays in `buf` for the next chunk.
fn take_utf8_prefix(buf: &mut Vec<u8>) -> Result<String, ChatError> {
    let valid = match std::str::from_utf8(buf) {
        Ok(_) => buf.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(e) => return Err(ChatError::Decode(e.to_string())),
    };
    let rest = buf.split_off(valid);
    let text = String::from_utf8(std::mem::replace(buf, rest))
        .map_err(|e| ChatError::Decode(e.to_string()))?;
    Ok(text)
}
