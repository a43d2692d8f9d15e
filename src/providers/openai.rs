use log::{debug, trace, error};
use reqwest::StatusCode;

use crate::config::PoemConfig;
use crate::error::Error;
use crate::request::{CompletionRequest, CompletionResponse, ErrorResponse};

// ===== OpenAI Client =====

/// Chat-completions client for OpenAI and compatible servers
#[derive(Clone)]
pub struct OpenAiClient
{   api_key: String
  , api_base: String
  , http_client: reqwest::Client
}

impl std::fmt::Debug for OpenAiClient
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("OpenAiClient")
          .field("api_base", &self.api_base)
          .finish_non_exhaustive()
    }
}

impl OpenAiClient
{   /// Build a client from configuration.
    /// Fails without touching the network if no key is configured.
    pub fn new(config: &PoemConfig) -> Result<Self, Error>
    {   debug!("Creating OpenAiClient for {}", config.api_base);
        let api_key = config.api_key()?.to_string();

        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::HttpError(e.to_string())
          })?;

        Ok(OpenAiClient
        {   api_key
          , api_base: config.api_base.trim_end_matches('/').to_string()
          , http_client
        })
    }

    pub fn endpoint(&self) -> String
    {   format!("{}/chat/completions", self.api_base)
    }

    async fn handle_create_chat_completion(
      &self
    , request: &CompletionRequest
    ) -> Result<CompletionResponse, Error>
    {   debug!("Sending chat completion for model: {}", request.model);
        trace!("OpenAI request: {:?}", request);

        let response = self.http_client
          .post(self.endpoint())
          .bearer_auth(&self.api_key)
          .json(request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            transport_error(e)
          })?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("OpenAI API error ({}): {}", status, body);
            return Err(status_error(status, &body));
        }

        let completion: CompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::ParseError(e.to_string())
            }
          })?;

        debug!(
          "Received {} choice(s), usage: {:?}",
          completion.choices.len(),
          completion.usage
        );
        Ok(completion)
    }
}

impl crate::ChatCompletionService for OpenAiClient
{   async fn create_chat_completion(
      &self
    , request: &CompletionRequest
    ) -> Result<CompletionResponse, Error>
    {   self.handle_create_chat_completion(request).await
    }
}

fn transport_error(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   Error::Timeout
    } else
    {   Error::HttpError(e.to_string())
    }
}

/// Map a non-success status and its body to an error variant
pub fn status_error(status: StatusCode, body: &str) -> Error
{   let message = serde_json::from_str::<ErrorResponse>(body)
      .map(|r| {
        debug!("OpenAI error type: {:?}", r.error.kind);
        r.error.message
      })
      .unwrap_or_else(|_| body.trim().to_string());

    match status
    {   StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
          Error::Unauthorized(message)
        }
      , StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded
      , _ => Error::ApiError
        {   status: status.as_u16()
          , message
        }
    }
}
