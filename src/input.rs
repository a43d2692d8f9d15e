use std::io::BufRead;
use log::{debug, error, warn};

use crate::error::Error;

/// Reads one line and returns its first whitespace-delimited token.
///
/// End of stream and blank lines give an empty subject. Anything after
/// the first token is dropped. Bytes that are not UTF-8 are replaced,
/// not rejected. Only I/O failures are errors.
pub fn read_subject<R: BufRead>(reader: &mut R) -> Result<String, Error>
{   let mut buf = Vec::new();
    let read = reader.read_until(b'\n', &mut buf).map_err(|e| {
      error!("Failed to read subject: {}", e);
      Error::from(e)
    })?;
    if read == 0
    {   debug!("Input closed before a subject was given");
    }

    let line = String::from_utf8_lossy(&buf);

    let mut tokens = line.split_whitespace();
    let subject = tokens.next().unwrap_or_default().to_string();
    let extra = tokens.count();
    if extra > 0
    {   warn!("Ignoring {} extra word(s) after {:?}", extra, subject);
    }
    Ok(subject)
}
