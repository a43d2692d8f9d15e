use std::future::Future;
use std::io::{BufRead, Write};
use std::time::Duration;
use log::{debug, error, info};

use crate::config::PoemConfig;
use crate::error::Error;
use crate::request::CompletionRequest;
use crate::{ChatCompletionService, Model};

/// Turns a subject into a poem through a chat-completion service
pub struct PoemRequester<S>
{   service: S
  , model: Model
  , timeout: Duration
}

impl PoemRequester<crate::providers::OpenAiClient>
{   /// Requester backed by the OpenAI HTTP client
    pub fn from_config(config: &PoemConfig) -> Result<Self, Error>
    {   let service = crate::providers::OpenAiClient::new(config)?;
        Ok(PoemRequester::new(
          service
        , config.model.clone()
        , config.timeout()
        ))
    }
}

impl<S: ChatCompletionService> PoemRequester<S>
{   pub fn new(service: S, model: Model, timeout: Duration) -> Self
    {   debug!(
          "Creating PoemRequester (model: {}, timeout: {:?})",
          model, timeout
        );
        PoemRequester
        {   service
          , model
          , timeout
        }
    }

    pub fn model(&self) -> &Model
    {   &self.model
    }

    /// Ask for a poem about `subject` and return the first candidate's
    /// text untouched. No retry; an empty candidate list is an error.
    pub async fn generate_poem(&self, subject: &str)
      -> Result<String, Error>
    {   let request = CompletionRequest::for_subject(
          subject,
          self.model.clone()
        );
        debug!("Requesting poem about {:?}", subject);

        let response = tokio::time::timeout(
          self.timeout,
          self.service.create_chat_completion(&request)
        )
        .await
        .map_err(|_| {
          error!("No response within {:?}", self.timeout);
          Error::Timeout
        })??;

        response.first_text()
          .map(str::to_string)
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })
    }

    /// Read a subject from `input`, generate, and write the poem plus a
    /// newline to `output`. Nothing is written on failure.
    pub async fn run<R, W>(&self, input: &mut R, output: &mut W)
      -> Result<(), Error>
    where
      R: BufRead
    , W: Write
    {   self.run_until(input, output, std::future::pending()).await
    }

    /// `run`, abandoned with `Error::Cancelled` if `cancel` completes
    /// while the request is in flight. `cancel` is first polled after
    /// the subject has been read.
    pub async fn run_until<R, W, C>(
      &self
    , input: &mut R
    , output: &mut W
    , cancel: C
    ) -> Result<(), Error>
    where
      R: BufRead
    , W: Write
    , C: Future<Output = ()>
    {   let subject = crate::input::read_subject(input)?;

        let poem = tokio::select!
        {   result = self.generate_poem(&subject) => result?
          , _ = cancel => {
              info!("Cancelled, abandoning request about {:?}", subject);
              return Err(Error::Cancelled);
            }
        };

        writeln!(output, "{}", poem)
          .and_then(|_| output.flush())
          .map_err(|e| {
            error!("Failed to write poem: {}", e);
            Error::Other(format!("failed to write output: {}", e))
          })?;
        info!("Poem about {:?} written", subject);
        Ok(())
    }
}
