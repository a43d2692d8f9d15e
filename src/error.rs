use std::fmt;

/// Error type for poem generation
/// Implements Clone so stubs and callers can hand it around freely
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key is missing from configuration
    MissingApiKey(String)
  , /// Invalid configuration value
    InvalidConfiguration(String)
  , /// Reading the subject failed
    Input(String)
  , /// HTTP transport error
    HttpError(String)
  , /// Credential rejected by the API
    Unauthorized(String)
  , /// Rate limit exceeded
    RateLimitExceeded
  , /// API returned an error response
    ApiError
    {   status: u16
      , message: String
    }
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Request did not finish within the configured timeout
    Timeout
  , /// Request was cancelled before it finished
    Cancelled
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(var) => {
              write!(f, "Missing API key: set {}", var)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Input(msg) => {
              write!(f, "Failed to read input: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Unauthorized(msg) => {
              write!(f, "Unauthorized: {}", msg)
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::ApiError { status, message } => {
              write!(f, "API error ({}): {}", status, message)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Cancelled => {
              write!(f, "Request cancelled")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Input(e.to_string())
    }
}
