//! Executes plain-data requests over the network.
//!
//! `Transport` is the seam between the sans-IO client and real I/O. Test
//! doubles implement it directly; `HttpTransport` implements it with
//! `reqwest`, applying the configured timeout to every call.

use std::future::Future;

use reqwest::multipart;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Why a transport produced no `HttpResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request was sent but nothing came back (timeout, connect, reset).
    #[error("no response: {0}")]
    NoResponse(String),

    /// The request never left the process.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Performs one HTTP round-trip per call. Implementations hold no per-call
/// state, so one instance may serve any number of concurrent calls.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Dispatch(e.to_string()))?;
        Ok(Self { client })
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let RequestBody::Form(form) = request.body {
            let mut parts = multipart::Form::new();
            for (name, value) in form.into_fields() {
                parts = parts.text(name, value);
            }
            builder = builder.multipart(parts);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        self.round_trip(request)
    }
}

/// Only a request that could not be built counts as `Dispatch`. Every other
/// failure, including a body cut short after the status line, is
/// `NoResponse`: the status of a response that never fully arrived is not
/// a server answer to classify.
fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::Dispatch(error.to_string())
    } else {
        TransportError::NoResponse(error.to_string())
    }
}
