//! Configuration for the poem requester

use serde::{Deserialize, Serialize};
use log::debug;

use crate::error::Error;
use crate::Model;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const MODEL_VAR: &str = "POEM_MODEL";
pub const TIMEOUT_VAR: &str = "POEM_TIMEOUT_SECS";

/// Requester configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PoemConfig
{   /// Bearer credential for the API
    pub api_key: Option<String>
  , /// API base URL, without trailing `/chat/completions`
    pub api_base: String
  , /// Model to ask
    pub model: Model
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl Default for PoemConfig
{   fn default() -> Self
    {   PoemConfig
        {   api_key: None
          , api_base: OPENAI_API_BASE.to_string()
          , model: Model::default()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for PoemConfig
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("PoemConfig")
          .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
          .field("api_base", &self.api_base)
          .field("model", &self.model)
          .field("timeout_secs", &self.timeout_secs)
          .finish()
    }
}

impl PoemConfig
{   /// Load from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any name -> value lookup; unset or empty values
    /// fall back to the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name).filter(|v| !v.trim().is_empty())
        };
        let mut config = PoemConfig::default();

        config.api_key = get(API_KEY_VAR);
        if let Some(base) = get(API_BASE_VAR)
        {   config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get(MODEL_VAR)
        {   config.model = Model::from(model.trim());
        }
        if let Some(secs) = get(TIMEOUT_VAR)
        {   config.timeout_secs = secs.trim().parse::<u64>()
              .ok()
              .filter(|s| *s > 0)
              .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                  "{} must be a positive integer, got {:?}",
                  TIMEOUT_VAR, secs
                ))
              })?;
        }

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// The configured key, or `MissingApiKey`
    pub fn api_key(&self) -> Result<&str, Error>
    {   self.api_key.as_deref()
          .ok_or_else(|| Error::MissingApiKey(API_KEY_VAR.to_string()))
    }

    pub fn timeout(&self) -> std::time::Duration
    {   std::time::Duration::from_secs(self.timeout_secs)
    }
}
