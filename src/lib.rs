pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod input;
pub mod client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/*

poemgen reads one word, asks a chat-completion API for a short poem
about it and prints the answer.

poemgen/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Shared types and the service seam
│   ├── main.rs         # Binary: logging, config, Ctrl-C, exit code
│   ├── error.rs        # Error enum
│   ├── config.rs       # Environment-backed configuration
│   ├── request.rs      # Prompt building, wire request/response
│   ├── input.rs        # Subject scanning from stdin
│   ├── client.rs       # PoemRequester
│   └── providers/
│       ├── mod.rs
│       └── openai.rs   # reqwest-backed chat completions
└── tests/              # Integration tests against a local HTTP stub

*/

pub use client::PoemRequester;
pub use config::PoemConfig;
pub use error::Error;
pub use providers::OpenAiClient;
pub use request::{CompletionRequest, CompletionResponse};

// ===== Service seam =====

/// Anything that can answer a chat-completion request.
/// `OpenAiClient` talks HTTP; tests plug in stubs.
pub trait ChatCompletionService
{   fn create_chat_completion(
      &self
    , request: &CompletionRequest
    ) -> impl Future<Output = Result<CompletionResponse, Error>> + Send;
}

// ===== Shared types =====

/// Chat models the requester knows by name.
/// Serialized as the wire id, e.g. `"gpt-3.5-turbo"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Model
{   /// gpt-3.5-turbo
    Gpt3Dot5Turbo
  , /// gpt-4
    Gpt4
  , /// gpt-4o
    Gpt4o
  , /// gpt-4o-mini
    Gpt4oMini
  , /// Any other id, for OpenAI-compatible servers
    Custom(String)
}

impl Model
{   pub fn as_str(&self) -> &str
    {   match self
        {   Model::Gpt3Dot5Turbo => "gpt-3.5-turbo"
          , Model::Gpt4 => "gpt-4"
          , Model::Gpt4o => "gpt-4o"
          , Model::Gpt4oMini => "gpt-4o-mini"
          , Model::Custom(id) => id.as_str()
        }
    }
}

impl Default for Model
{   fn default() -> Self
    {   Model::Gpt3Dot5Turbo
    }
}

impl fmt::Display for Model
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

impl From<&str> for Model
{   fn from(id: &str) -> Self
    {   match id
        {   "gpt-3.5-turbo" => Model::Gpt3Dot5Turbo
          , "gpt-4" => Model::Gpt4
          , "gpt-4o" => Model::Gpt4o
          , "gpt-4o-mini" => Model::Gpt4oMini
          , other => Model::Custom(other.to_string())
        }
    }
}

impl From<String> for Model
{   fn from(id: String) -> Self
    {   Model::from(id.as_str())
    }
}

impl From<Model> for String
{   fn from(model: Model) -> Self
    {   model.as_str().to_string()
    }
}

/// Sender role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

/// One role-tagged message, as sent and as returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: Role::System
          , content: content.into()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: Role::Assistant
          , content: content.into()
        }
    }
}
