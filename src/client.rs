//! OhMySMTP async client implementation.

use crate::classifier::{RawFailure, classify};
use crate::{Email, Error, Result, SendResponse};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;

const DEFAULT_REQUEST_HOST: &str = "https://ohmysmtp.com/api/v1/";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
// Sent as `OhMySMTP-Server-Token`; header names are case-insensitive.
const SERVER_TOKEN_HEADER: &str = "ohmysmtp-server-token";
const USER_AGENT_VALUE: &str = concat!("ohmysmtp-rust - ", env!("CARGO_PKG_VERSION"));

/// Connection settings of a [`Client`], fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Base URL of the API; `send` is appended to it.
    pub request_host: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_host: DEFAULT_REQUEST_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Async client for the OhMySMTP sending API.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] to override the
/// request host, timeout, or user agent.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    options: ClientOptions,
    headers: HeaderMap,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(server_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(server_token)
    }

    /// Create a client with the default host and timeout.
    ///
    /// # Examples
    /// ```no_run
    /// # use ohmysmtp_client::Client;
    /// # fn main() -> Result<(), ohmysmtp_client::Error> {
    /// let client = Client::new("server-token")?;
    /// assert_eq!(client.options().timeout, 60);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(server_token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(server_token).build()
    }

    /// The settings this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Headers attached to every request.
    pub fn request_headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    /// Send an email.
    ///
    /// Any failure, whether a non-2xx reply or a transport error, is classified
    /// into an [`crate::ApiError`] and returned as [`crate::Error::Api`]. Nothing is retried.
    ///
    /// # Examples
    /// ```no_run
    /// # use ohmysmtp_client::{Client, Email};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ohmysmtp_client::Error> {
    /// let client = Client::new("server-token")?;
    /// let email = Email::new("app@example.com", "user@example.com", "Hello")
    ///     .with_html_body("<p>Hello</p>");
    /// let sent = client.send_email(&email).await?;
    /// println!("{:?}", sent.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_email(&self, email: &Email) -> Result<SendResponse> {
        let url = self.endpoint("send");
        tracing::debug!(%url, to = %email.to, "sending email");

        match self.post_json(&url, email).await {
            Ok(sent) => {
                tracing::debug!(id = ?sent.id, status = ?sent.status, "email accepted");
                Ok(sent)
            }
            Err(failure) => {
                let err = classify(failure);
                tracing::warn!(
                    kind = %err.kind(),
                    status_code = err.status_code(),
                    error_code = err.error_code(),
                    reason = err.message(),
                    "email send failed"
                );
                Err(err.into())
            }
        }
    }

    /// POST a JSON body and decode the JSON reply, leaving failures unclassified.
    async fn post_json(
        &self,
        url: &str,
        body: &Email,
    ) -> std::result::Result<SendResponse, RawFailure> {
        let response = self
            .http
            .post(url)
            .headers(self.request_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| RawFailure::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!(error = %err, %status, "failed to read error response body");
                    String::new()
                }
            };
            return Err(RawFailure::from_response(status.as_u16(), &text));
        }

        response
            .json()
            .await
            .map_err(|e| RawFailure::from_reqwest(&e))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.options.request_host.trim_end_matches('/'))
    }
}

/// Builder for configuring an OhMySMTP client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    server_token: String,
    options: ClientOptions,
    user_agent: String,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Request host `https://ohmysmtp.com/api/v1/`
    /// - 60 second timeout
    /// - User agent naming this crate and its version
    pub fn new(server_token: impl Into<String>) -> Self {
        Self {
            server_token: server_token.into(),
            options: ClientOptions::default(),
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing against a local server.
    pub fn request_host(mut self, request_host: impl Into<String>) -> Self {
        self.options.request_host = request_host.into();
        self
    }

    /// Set the per-request timeout in seconds. Must be at least 1.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.options.timeout = seconds;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client. No network request is made.
    ///
    /// Fails if the timeout is zero, if the token or user agent cannot be used
    /// as a header value, or if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client> {
        if self.options.timeout == 0 {
            return Err(Error::Config("timeout must be at least one second".into()));
        }
        let headers = self.headers()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.options.timeout))
            .build()?;

        Ok(Client {
            http,
            options: self.options,
            headers,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(SERVER_TOKEN_HEADER),
            HeaderValue::from_str(&self.server_token)?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        Ok(headers)
    }
}
