//! Response envelope and the transport-neutral reply.

use crate::http::error::AppError;
use serde::Serialize;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `{ "data": ..., "error": ... }`, the shape of every JSON response.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<&'static str>,
}

/// One page of a browse endpoint.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

/// A response ready to be written by the server adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Expire the `account_id` and `token` cookies.
    pub clear_session: bool,
}

impl HttpReply {
    pub fn json<T: Serialize>(status: u16, envelope: &Envelope<T>) -> Self {
        match serde_json::to_vec(envelope) {
            Ok(body) => Self {
                status,
                content_type: CONTENT_TYPE_JSON,
                body,
                clear_session: false,
            },
            Err(e) => {
                log::error!("failed to serialize response: {e}");
                Self {
                    status: 500,
                    content_type: CONTENT_TYPE_JSON,
                    body: br#"{"data":null,"error":"SerializationError"}"#.to_vec(),
                    clear_session: false,
                }
            }
        }
    }

    /// 200 with `data`.
    pub fn ok<T: Serialize>(data: T) -> Self {
        Self::json(
            200,
            &Envelope {
                data: Some(data),
                error: None,
            },
        )
    }

    /// 200 with `"data": null`.
    pub fn empty() -> Self {
        Self::json::<()>(200, &Envelope { data: None, error: None })
    }

    pub fn text(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            clear_session: false,
        }
    }

    /// Envelope for a failed request. 4xx are logged at info, 500 at error with the
    /// source chain.
    pub fn from_error(err: &AppError) -> Self {
        if err.is_unclassified() {
            log::error!("{}", error_chain(err));
        } else {
            log::info!("{err}");
        }
        let mut reply = Self::json::<()>(
            err.status(),
            &Envelope {
                data: None,
                error: Some(err.kind_name()),
            },
        );
        reply.clear_session = err.clears_session();
        reply
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(&format!(": caused by: {cause}"));
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::DbError;

    #[test]
    fn test_ok_envelope() {
        let reply = HttpReply::ok(serde_json::json!({ "health": "ok" }));
        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.body_json(),
            serde_json::json!({ "data": { "health": "ok" }, "error": null })
        );
    }

    #[test]
    fn test_error_envelope() {
        let reply = HttpReply::from_error(&AppError::LoginFailed);
        assert_eq!(reply.status, 401);
        assert!(reply.clear_session);
        assert_eq!(
            reply.body_json(),
            serde_json::json!({ "data": null, "error": "LoginFailed" })
        );
    }

    #[test]
    fn test_unclassified_error_named_by_kind() {
        let reply = HttpReply::from_error(&AppError::from(DbError::Decode("column 3".into())));
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body_json()["error"], "DecodeError");
    }
}
