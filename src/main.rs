use std::io::{self, Write};
use std::process::ExitCode;
use log::{debug, error, warn};

use poemgen::{Error, PoemConfig, PoemRequester};

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    ).init();

    match run().await
    {   Ok(()) => ExitCode::SUCCESS
      , Err(e) => {
          error!("poemgen failed: {}", e);
          eprintln!("Error: {}", e);
          ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error>
{   let config = PoemConfig::from_env()?;
    let requester = PoemRequester::from_config(&config)?;
    debug!("Using model {}", requester.model());

    eprint!("Enter a word to create a poem: ");
    if let Err(e) = io::stderr().flush()
    {   debug!("Failed to flush prompt: {}", e);
    }

    requester.run_until(
      &mut io::stdin().lock()
    , &mut io::stdout().lock()
    , interrupted()
    ).await
}

/// Resolves on Ctrl-C. If the handler cannot be installed the request
/// simply runs without one.
async fn interrupted()
{   if let Err(e) = tokio::signal::ctrl_c().await
    {   warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
