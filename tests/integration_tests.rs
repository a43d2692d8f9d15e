use std::io::Cursor;
use std::time::Duration;

use poemgen::config::PoemConfig;
use poemgen::error::Error;
use poemgen::{ChatCompletionService, CompletionRequest, Model, OpenAiClient, PoemRequester};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the stub server saw
#[derive(Debug)]
struct CapturedRequest
{   head: String
  , body: String
}

impl CapturedRequest
{   fn request_line(&self) -> &str
    {   self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<String>
    {   let name = name.to_ascii_lowercase();
        self.head.lines().skip(1).find_map(|line| {
          let (k, v) = line.split_once(':')?;
          (k.trim().to_ascii_lowercase() == name)
            .then(|| v.trim().to_string())
        })
    }

    fn json(&self) -> serde_json::Value
    {   serde_json::from_str(&self.body).unwrap()
    }
}

enum Reply
{   Respond
    {   status: u16
      , body: String
    }
  , Hang
}

/// Serves exactly one connection on a random local port
async fn spawn_stub(reply: Reply)
  -> (String, oneshot::Receiver<CapturedRequest>)
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let captured = read_request(&mut socket).await;
      let _ = tx.send(captured);

      match reply
      {   Reply::Respond { status, body } => {
            let response = format!(
              "HTTP/1.1 {} Stub\r\n\
               Content-Type: application/json\r\n\
               Content-Length: {}\r\n\
               Connection: close\r\n\r\n{}",
              status,
              body.len(),
              body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
          }
        , Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
          }
      }
    });

    (format!("http://{}/v1", addr), rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest
{   let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop
    {   let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n")
        {   break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head.lines()
      .find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case("content-length")
          .then(|| v.trim().parse::<usize>().ok())
          .flatten()
      })
      .unwrap_or(0);

    while buf.len() < head_end + content_length
    {   let n = socket.read(&mut chunk).await.unwrap();
        if n == 0
        {   break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
    CapturedRequest { head, body }
}

fn config_for(api_base: &str) -> PoemConfig
{   PoemConfig
    {   api_key: Some("sk-test".to_string())
      , api_base: api_base.to_string()
      , timeout_secs: 5
      , ..PoemConfig::default()
    }
}

fn completion_body(text: &str) -> String
{   serde_json::json!({
      "id": "chatcmpl-stub",
      "object": "chat.completion",
      "created": 1700000000,
      "model": "gpt-3.5-turbo-0125",
      "choices": [{
        "index": 0,
        "message": { "role": "assistant", "content": text },
        "finish_reason": "stop"
      }],
      "usage": { "prompt_tokens": 14, "completion_tokens": 5, "total_tokens": 19 }
    })
    .to_string()
}

#[tokio::test]
async fn test_client_sends_openai_request()
{   let (base, captured) = spawn_stub(Reply::Respond
    {   status: 200
      , body: completion_body("Whiskers in moonlight...")
    }).await;

    let client = OpenAiClient::new(&config_for(&base)).unwrap();
    let request = CompletionRequest::for_subject("cat", Model::default());
    let response = client.create_chat_completion(&request).await.unwrap();

    assert_eq!(response.first_text(), Some("Whiskers in moonlight..."));
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(19));

    let seen = captured.await.unwrap();
    assert_eq!(seen.request_line(), "POST /v1/chat/completions HTTP/1.1");
    assert_eq!(seen.header("authorization").as_deref(), Some("Bearer sk-test"));
    assert_eq!(
      seen.header("content-type").as_deref(),
      Some("application/json")
    );
    assert_eq!(
      seen.json(),
      serde_json::json!({
        "model": "gpt-3.5-turbo",
        "max_tokens": 100,
        "messages": [
          { "role": "system", "content": "Write a short poem about a cat:\n" }
        ]
      })
    );
}

#[tokio::test]
async fn test_run_end_to_end_with_cat()
{   let (base, captured) = spawn_stub(Reply::Respond
    {   status: 200
      , body: completion_body("Whiskers in moonlight...")
    }).await;

    let requester = PoemRequester::from_config(&config_for(&base)).unwrap();
    let mut input = Cursor::new("cat\n".as_bytes());
    let mut output = Vec::new();

    requester.run(&mut input, &mut output).await.unwrap();

    assert_eq!(
      String::from_utf8(output).unwrap(),
      "Whiskers in moonlight...\n"
    );
    let seen = captured.await.unwrap();
    assert_eq!(
      seen.json()["messages"][0]["content"],
      "Write a short poem about a cat:\n"
    );
}

#[tokio::test]
async fn test_empty_choices_are_an_error()
{   let (base, _captured) = spawn_stub(Reply::Respond
    {   status: 200
      , body: r#"{"id": "chatcmpl-stub", "choices": []}"#.to_string()
    }).await;

    let requester = PoemRequester::from_config(&config_for(&base)).unwrap();
    assert_eq!(
      requester.generate_poem("cat").await,
      Err(Error::NoChoicesInResponse)
    );
}

#[tokio::test]
async fn test_unauthorized_is_reported()
{   let (base, _captured) = spawn_stub(Reply::Respond
    {   status: 401
      , body: r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#.to_string()
    }).await;

    let requester = PoemRequester::from_config(&config_for(&base)).unwrap();
    assert_eq!(
      requester.generate_poem("cat").await,
      Err(Error::Unauthorized("Incorrect API key provided".to_string()))
    );
}

#[tokio::test]
async fn test_rate_limit_is_reported()
{   let (base, _captured) = spawn_stub(Reply::Respond
    {   status: 429
      , body: r#"{"error": {"message": "Rate limit reached"}}"#.to_string()
    }).await;

    let requester = PoemRequester::from_config(&config_for(&base)).unwrap();
    assert_eq!(
      requester.generate_poem("cat").await,
      Err(Error::RateLimitExceeded)
    );
}

#[tokio::test]
async fn test_server_error_keeps_status_and_message()
{   let (base, _captured) = spawn_stub(Reply::Respond
    {   status: 500
      , body: r#"{"error": {"message": "The server had an error"}}"#.to_string()
    }).await;

    let requester = PoemRequester::from_config(&config_for(&base)).unwrap();
    assert_eq!(
      requester.generate_poem("cat").await,
      Err(Error::ApiError
      {   status: 500
        , message: "The server had an error".to_string()
      })
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_parse_error()
{   let (base, _captured) = spawn_stub(Reply::Respond
    {   status: 200
      , body: "not json".to_string()
    }).await;

    let requester = PoemRequester::from_config(&config_for(&base)).unwrap();
    assert!(matches!(
      requester.generate_poem("cat").await,
      Err(Error::ParseError(_))
    ));
}

#[tokio::test]
async fn test_hanging_server_times_out()
{   let (base, _captured) = spawn_stub(Reply::Hang).await;

    let config = PoemConfig
    {   timeout_secs: 1
      , ..config_for(&base)
    };
    let requester = PoemRequester::from_config(&config).unwrap();

    let started = std::time::Instant::now();
    assert_eq!(requester.generate_poem("cat").await, Err(Error::Timeout));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_connection_refused_is_http_error()
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let requester = PoemRequester::from_config(
      &config_for(&format!("http://{}/v1", addr))
    ).unwrap();
    assert!(matches!(
      requester.generate_poem("cat").await,
      Err(Error::HttpError(_))
    ));
}

#[test]
fn test_missing_key_fails_before_any_request()
{   let config = PoemConfig
    {   api_key: None
      , ..PoemConfig::default()
    };
    assert_eq!(
      PoemRequester::from_config(&config).err().map(|e| e.to_string()),
      Some("Missing API key: set OPENAI_API_KEY".to_string())
    );
}
