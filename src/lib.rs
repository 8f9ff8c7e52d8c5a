//! # OhMySMTP Client
//! Asynchronous wrapper around the OhMySMTP transactional email HTTP API, providing a single
//! [`Client::send_email`] call configured through [`Client`] and [`ClientBuilder`].
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`.
//!
//! ## Out of scope
//! No retries, rate limiting, payload validation, templating, or attachment encoding. A failed
//! send is reported once and never re-attempted.
//!
//! ## Errors
//! Every failed send surfaces as [`Error::Api`] carrying an [`ApiError`]. Its [`ErrorKind`] is
//! picked from the HTTP status the service returned (401, 404, 422, 500, 503, anything else), and
//! transport failures with no response become [`ErrorKind::Generic`]. The mapping itself lives in
//! [`classify`] and can be used on its own. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use ohmysmtp_client::{Client, Email, ErrorKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ohmysmtp_client::Error> {
//!     let client = Client::new("server-token")?;
//!     let email = Email::new("app@example.com", "user@example.com", "Welcome")
//!         .with_text_body("Thanks for signing up.");
//!
//!     match client.send_email(&email).await {
//!         Ok(sent) => println!("queued: {:?}", sent.id),
//!         Err(err) if err.api().map(|e| e.kind()) == Some(ErrorKind::InvalidCredentials) => {
//!             eprintln!("check the server token");
//!         }
//!         Err(err) => return Err(err),
//!     }
//!     Ok(())
//! }
//! ```

mod classifier;
mod client;
mod error;
mod models;

pub use classifier::{RawFailure, classify};
pub use client::{Client, ClientBuilder, ClientOptions};
pub use error::{ApiError, Error, ErrorKind};
pub use models::{Attachment, Email, SendResponse};

/// Result type alias for OhMySMTP operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
