//! Prompt building and the chat-completion wire types

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, Model};

pub const PROMPT_PREFIX: &str = "Write a short poem about a ";
pub const PROMPT_SUFFIX: &str = ":\n";

/// Upper bound on generated tokens, fixed for every run
pub const MAX_TOKENS: u32 = 100;

/// Wraps the subject in the fixed poem instruction.
/// The subject is used verbatim: no trimming, no escaping.
pub fn build_prompt(subject: &str) -> String
{   let mut prompt = String::with_capacity(
      PROMPT_PREFIX.len() + subject.len() + PROMPT_SUFFIX.len()
    );
    prompt.push_str(PROMPT_PREFIX);
    prompt.push_str(subject);
    prompt.push_str(PROMPT_SUFFIX);
    prompt
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   /// Model id
    pub model: Model
  , /// Max tokens to generate
    pub max_tokens: u32
  , /// Conversation, oldest first
    pub messages: Vec<ChatMessage>
}

impl CompletionRequest
{   /// The single-message poem request for `subject`
    pub fn for_subject(subject: &str, model: Model) -> Self
    {   CompletionRequest
        {   model
          , max_tokens: MAX_TOKENS
          , messages: vec![
              ChatMessage::system(build_prompt(subject))
            ]
        }
    }
}

/// Body returned by `POST /chat/completions`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionResponse
{   #[serde(default)]
    pub id: Option<String>
  , #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<Usage>
}

impl CompletionResponse
{   /// Text of the first candidate, if there is one
    pub fn first_text(&self) -> Option<&str>
    {   self.choices.first()
          .map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub index: u32
  , pub message: ChatMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage
{   pub prompt_tokens: u32
  , pub completion_tokens: u32
  , pub total_tokens: u32
}

/// OpenAI-style error body: `{"error": {"message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse
{   pub error: ErrorDetail
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail
{   pub message: String
  , #[serde(default, rename = "type")]
    pub kind: Option<String>
}
