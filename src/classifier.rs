//! Classification of failed API calls into [`ApiError`] values.
//!
//! The service answers errors with a JSON body of the form
//! `{"ErrorCode": 7, "Message": "..."}`, but either field may be missing, and a
//! request may fail before any response arrives. [`classify`] folds all of
//! these shapes into one [`ApiError`] without performing I/O.

use crate::{ApiError, ErrorKind};
use serde_json::{Map, Value};
use std::error::Error as StdError;

/// A failure as observed by the transport, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFailure {
    /// The service replied with a non-2xx status.
    Response {
        /// HTTP status, if the transport reported one.
        status: Option<u16>,
        /// Response body. Non-JSON bodies are represented as [`Value::Null`].
        body: Value,
        /// Transport-level message, used when the body carries no `Message`.
        message: String,
    },
    /// No response was received; only a message is available.
    Transport { message: String },
    /// No usable message at all; `details` is dumped verbatim.
    Unstructured { details: Value },
}

impl RawFailure {
    /// Build a response failure from a non-2xx status and the raw body text.
    pub fn from_response(status: u16, body: &str) -> Self {
        RawFailure::Response {
            status: Some(status),
            body: serde_json::from_str(body).unwrap_or(Value::Null),
            message: format!("Request failed with status code {status}"),
        }
    }

    /// Build a failure from a `reqwest` error raised before a usable reply existed.
    ///
    /// The message is the error's display followed by each cause in its
    /// `source()` chain, joined with `": "`. Errors that carry no cause are
    /// captured field by field instead.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let summary = err.to_string();
        let causes = cause_chain(err);
        if summary.trim().is_empty() || causes.is_empty() {
            return RawFailure::Unstructured {
                details: describe_reqwest_error(err),
            };
        }

        let mut message = summary;
        for cause in causes {
            // hyper repeats the io error text in its wrapper
            if !message.contains(&cause) {
                message.push_str(": ");
                message.push_str(&cause);
            }
        }
        RawFailure::Transport { message }
    }
}

/// Turn a [`RawFailure`] into exactly one [`ApiError`].
///
/// Response failures take their kind from [`ErrorKind::from_status`]; every
/// other failure is [`ErrorKind::Generic`] with zeroed codes.
pub fn classify(failure: RawFailure) -> ApiError {
    match failure {
        RawFailure::Response {
            status,
            body,
            message,
        } => {
            let error_code = body.get("ErrorCode").map(parse_error_code).unwrap_or(0);
            let status_code = status.unwrap_or(0);
            let message = body
                .get("Message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(message);

            ApiError::new(
                ErrorKind::from_status(status_code),
                message,
                error_code,
                status_code,
            )
        }
        RawFailure::Transport { message } => ApiError::new(ErrorKind::Generic, message, 0, 0),
        RawFailure::Unstructured { details } => {
            ApiError::new(ErrorKind::Generic, dump(&details), 0, 0)
        }
    }
}

/// Any JSON number is accepted; fractions truncate and out-of-range values saturate.
fn parse_error_code(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}

/// Non-empty display strings of every error in `err`'s source chain.
fn cause_chain(err: &dyn StdError) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.trim().is_empty() {
            causes.push(text);
        }
        source = cause.source();
    }
    causes
}

/// Serialize diagnostic details. Never returns an empty string.
fn dump(details: &Value) -> String {
    // Serializing a `Value` cannot fail; fall back to the debug form regardless.
    serde_json::to_string(details).unwrap_or_else(|_| format!("{details:?}"))
}

/// Field-by-field snapshot of a `reqwest` error.
fn describe_reqwest_error(err: &reqwest::Error) -> Value {
    let mut fields = Map::new();
    fields.insert("debug".into(), Value::String(format!("{err:?}")));
    fields.insert("is_timeout".into(), Value::Bool(err.is_timeout()));
    fields.insert("is_connect".into(), Value::Bool(err.is_connect()));
    fields.insert("is_request".into(), Value::Bool(err.is_request()));
    fields.insert("is_body".into(), Value::Bool(err.is_body()));
    fields.insert("is_decode".into(), Value::Bool(err.is_decode()));
    if let Some(url) = err.url() {
        fields.insert("url".into(), Value::String(url.to_string()));
    }
    if let Some(status) = err.status() {
        fields.insert("status".into(), Value::from(status.as_u16()));
    }

    let sources = cause_chain(err);
    if !sources.is_empty() {
        fields.insert(
            "sources".into(),
            Value::Array(sources.into_iter().map(Value::String).collect()),
        );
    }

    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value, message: &str) -> RawFailure {
        RawFailure::Response {
            status: Some(status),
            body,
            message: message.to_string(),
        }
    }

    #[test]
    fn invalid_input_with_full_body() {
        let err = classify(response(
            422,
            json!({"ErrorCode": 7, "Message": "bad field"}),
            "Request failed with status code 422",
        ));
        assert_eq!(err, ApiError::new(ErrorKind::InvalidInput, "bad field", 7, 422));
    }

    #[test]
    fn empty_body_falls_back_to_transport_message() {
        let err = classify(response(500, json!({}), "socket hang up"));
        assert_eq!(
            err,
            ApiError::new(ErrorKind::InternalServerError, "socket hang up", 0, 500)
        );
    }

    #[test]
    fn unlisted_status_is_unknown() {
        let err = classify(response(599, json!({"Message": "teapot"}), "ignored"));
        assert_eq!(err, ApiError::new(ErrorKind::Unknown, "teapot", 0, 599));
    }

    #[test]
    fn status_selects_kind_and_keeps_fields() {
        let cases = [
            (401, ErrorKind::InvalidCredentials),
            (404, ErrorKind::Generic),
            (422, ErrorKind::InvalidInput),
            (500, ErrorKind::InternalServerError),
            (503, ErrorKind::ServiceUnavailable),
            (400, ErrorKind::Unknown),
            (502, ErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            let err = classify(response(
                status,
                json!({"ErrorCode": 12, "Message": "nope"}),
                "fallback",
            ));
            assert_eq!(err.kind(), kind, "status {status}");
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), 12);
            assert_eq!(err.message(), "nope");
        }
    }

    #[test]
    fn missing_status_is_zero_and_unknown() {
        let err = classify(RawFailure::Response {
            status: None,
            body: json!({"ErrorCode": 3}),
            message: "no status".into(),
        });
        assert_eq!(err, ApiError::new(ErrorKind::Unknown, "no status", 3, 0));
    }

    #[test]
    fn malformed_fields_use_defaults() {
        let err = classify(response(
            401,
            json!({"ErrorCode": "seven", "Message": 42}),
            "Request failed with status code 401",
        ));
        assert_eq!(err.error_code(), 0);
        assert_eq!(err.message(), "Request failed with status code 401");
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    }

    #[test]
    fn non_integer_error_codes_are_kept() {
        let err = classify(response(422, json!({"ErrorCode": 7.0}), "fallback"));
        assert_eq!(err.error_code(), 7);

        let err = classify(response(422, json!({"ErrorCode": 7.9}), "fallback"));
        assert_eq!(err.error_code(), 7);

        let err = classify(response(422, json!({"ErrorCode": u64::MAX}), "fallback"));
        assert_eq!(err.error_code(), i64::MAX);

        let err = classify(response(422, json!({"ErrorCode": -3}), "fallback"));
        assert_eq!(err.error_code(), -3);
    }

    #[test]
    fn empty_message_in_body_is_kept() {
        let err = classify(response(422, json!({"Message": ""}), "fallback"));
        assert_eq!(err.message(), "");
    }

    #[test]
    fn transport_failure_is_generic() {
        let err = classify(RawFailure::Transport {
            message: "ENOTFOUND".into(),
        });
        assert_eq!(err, ApiError::new(ErrorKind::Generic, "ENOTFOUND", 0, 0));
    }

    #[test]
    fn unstructured_failure_is_dumped() {
        let err = classify(RawFailure::Unstructured {
            details: json!({"code": "ECONNRESET", "syscall": "read"}),
        });
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.error_code(), 0);
        assert_eq!(err.status_code(), 0);
        assert!(err.message().contains("ECONNRESET"));
        assert!(err.message().contains("syscall"));

        let empty = classify(RawFailure::Unstructured { details: Value::Null });
        assert!(!empty.message().is_empty());
    }

    #[test]
    fn from_response_parses_json_or_ignores_body() {
        let raw = RawFailure::from_response(422, r#"{"ErrorCode":9,"Message":"to is required"}"#);
        assert_eq!(
            classify(raw),
            ApiError::new(ErrorKind::InvalidInput, "to is required", 9, 422)
        );

        let raw = RawFailure::from_response(503, "<html>down</html>");
        assert_eq!(
            classify(raw),
            ApiError::new(
                ErrorKind::ServiceUnavailable,
                "Request failed with status code 503",
                0,
                503
            )
        );
    }

    async fn refused_connection() -> reqwest::Error {
        // Nothing listens on port 9 (discard) in the test environment.
        reqwest::Client::new()
            .post("http://127.0.0.1:9/api/v1/send")
            .send()
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn reqwest_dump_lists_fields_and_causes() {
        let err = refused_connection().await;
        let details = describe_reqwest_error(&err);

        assert_eq!(details["is_connect"], json!(true));
        assert_eq!(details["is_timeout"], json!(false));
        assert_eq!(details["url"], json!("http://127.0.0.1:9/api/v1/send"));
        let sources = details["sources"].as_array().expect("source chain");
        assert!(!sources.is_empty());
        assert!(
            sources
                .iter()
                .any(|s| s.as_str().unwrap().to_lowercase().contains("connection refused"))
        );
    }

    #[tokio::test]
    async fn reqwest_transport_message_includes_cause() {
        let err = refused_connection().await;
        let RawFailure::Transport { message } = RawFailure::from_reqwest(&err) else {
            panic!("expected a transport failure");
        };
        assert!(message.starts_with(&err.to_string()));
        assert!(message.to_lowercase().contains("connection refused"), "{message}");
    }

    #[test]
    fn invalid_url_message_includes_parse_error() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let classified = classify(RawFailure::from_reqwest(&err));
        assert_eq!(classified.kind(), ErrorKind::Generic);
        assert!(
            classified.message().contains("relative URL without a base"),
            "{}",
            classified.message()
        );
    }
}
