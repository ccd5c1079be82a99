//! Outcome classification for a single backend call.
//!
//! # Design
//! `execute` is the one choke point every call goes through. It never
//! returns early with a panic or a raw transport error: the operation's
//! outcome, whatever it is, is folded into an `ApiResult`. A non-2xx
//! response is not an exception here, it lands in the same `Err` channel as
//! transport failures.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::HttpResponse;
use crate::transport::TransportError;

/// Run one HTTP call and classify its outcome.
pub async fn execute<F, Fut>(operation: F) -> ApiResult<HttpResponse>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<HttpResponse, TransportError>>,
{
    let outcome = AssertUnwindSafe(async move { operation().await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(response)) => classify(response),
        Ok(Err(TransportError::NoResponse(reason))) => {
            warn!("no response from server: {reason}");
            Err(ApiError::Unreachable)
        }
        Ok(Err(TransportError::Dispatch(reason))) => {
            warn!("request could not be dispatched: {reason}");
            Err(ApiError::Malformed(reason))
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!("request operation panicked: {reason}");
            Err(ApiError::Malformed(reason))
        }
    }
}

/// Map a received response to success or a server rejection.
pub fn classify(response: HttpResponse) -> ApiResult<HttpResponse> {
    if response.is_success() {
        debug!("response status {}", response.status);
        return Ok(response);
    }
    let message = rejection_message(&response);
    warn!("server rejected request with status {}: {message}", response.status);
    Err(ApiError::Server {
        status: response.status,
        message,
    })
}

/// Deserialize a successful response into the operation's declared schema.
pub fn narrow<T: DeserializeOwned>(response: &HttpResponse) -> ApiResult<T> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}

/// The body's `message` or `error` field, falling back to the status line.
fn rejection_message(response: &HttpResponse) -> String {
    let body: Option<Value> = serde_json::from_str(&response.body).ok();
    let declared = body.as_ref().and_then(|body| {
        ["message", "error"].iter().find_map(|field| {
            body.get(*field)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        })
    });

    declared.unwrap_or_else(|| status_text(response.status))
}

fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "request operation panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailureKind, NO_RESPONSE_MESSAGE};

    async fn respond(status: u16, body: &str) -> ApiResult<HttpResponse> {
        let response = HttpResponse::new(status, body);
        execute(|| async move { Ok(response) }).await
    }

    #[tokio::test]
    async fn ok_status_returns_body_unchanged() {
        let body = r#"{"status":"success","data":[{"id":1}]}"#;
        let response = respond(200, body).await.unwrap();
        assert_eq!(response.body, body);
    }

    #[tokio::test]
    async fn any_2xx_is_success() {
        assert!(respond(201, "{}").await.is_ok());
        assert!(respond(299, "").await.is_ok());
    }

    #[tokio::test]
    async fn non_2xx_uses_message_field() {
        let err = respond(400, r#"{"message":"OTP expired","error":"ignored"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "OTP expired");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn non_2xx_falls_back_to_error_field() {
        let err = respond(401, r#"{"error":"Unauthorized token"}"#).await.unwrap_err();
        assert_eq!(err.message(), "Unauthorized token");
    }

    #[tokio::test]
    async fn empty_message_field_is_skipped() {
        let err = respond(409, r#"{"message":"","error":"Duplicate email"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Duplicate email");
    }

    #[tokio::test]
    async fn non_2xx_without_fields_uses_status_text() {
        let err = respond(500, "").await.unwrap_err();
        assert_eq!(err.message(), "Internal Server Error");

        let err = respond(404, "<html>gone</html>").await.unwrap_err();
        assert_eq!(err.message(), "Not Found");
    }

    #[tokio::test]
    async fn unknown_status_without_reason_uses_code() {
        let err = respond(599, "").await.unwrap_err();
        assert_eq!(err.message(), "HTTP 599");
    }

    #[tokio::test]
    async fn no_response_has_fixed_message() {
        let err = execute(|| async { Err(TransportError::NoResponse("timed out".to_string())) })
            .await
            .unwrap_err();
        assert_eq!(err.message(), NO_RESPONSE_MESSAGE);
        assert_eq!(err.kind(), FailureKind::Unreachable);
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_its_own_text() {
        let err = execute(|| async { Err(TransportError::Dispatch("builder error: bad url".to_string())) })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "builder error: bad url");
        assert_eq!(err.kind(), FailureKind::MalformedRequest);
    }

    #[tokio::test]
    async fn panic_inside_operation_is_contained() {
        let err = execute(|| async {
            if true {
                panic!("base url not configured");
            }
            Ok(HttpResponse::new(200, ""))
        })
        .await
        .unwrap_err();
        assert_eq!(err, ApiError::Malformed("base url not configured".to_string()));
    }

    #[test]
    fn narrow_rejects_mismatched_schema() {
        #[derive(Debug, serde::Deserialize)]
        struct Needs {
            #[allow(dead_code)]
            id: u64,
        }
        let err = narrow::<Needs>(&HttpResponse::new(200, r#"{"name":"x"}"#)).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidPayload);
    }
}
