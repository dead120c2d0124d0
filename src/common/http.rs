use std::time::Duration;

use reqwest::{Client, Error, header};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
  pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
  }

  /// Client for JSON API calls (InnerTube, Data API).
  pub fn new() -> Result<Client, Error> {
    Client::builder()
      .user_agent(Self::default_user_agent())
      .timeout(Duration::from_secs(10))
      .build()
  }

  /// Client for relaying media bodies. There is no total request timeout;
  /// connecting and each individual read are bounded instead, so a stalled
  /// media server surfaces as a read error. Bodies are never decompressed
  /// so byte counts match `Content-Length`.
  pub fn new_streaming(
    connect_timeout: Duration,
    read_timeout: Duration,
  ) -> Result<Client, Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
    headers.insert(
      header::ACCEPT_LANGUAGE,
      header::HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
      header::ACCEPT_ENCODING,
      header::HeaderValue::from_static("identity"),
    );

    Client::builder()
      .user_agent(Self::default_user_agent())
      .default_headers(headers)
      .connect_timeout(connect_timeout)
      .read_timeout(read_timeout)
      .no_gzip()
      .build()
  }
}
