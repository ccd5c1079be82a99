//! API client core for the driver booking app.
//!
//! # Overview
//! Every backend call the driver app makes goes through this crate, and
//! every call ends in one `ApiResult`: the decoded body on success, or an
//! `ApiError` whose message is ready to show the user. Server rejections,
//! unreachable servers and requests that could not be dispatched all take
//! the same path.
//!
//! # Design
//! - `DriverClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`.
//! - `execute` classifies the outcome of one round-trip and never lets a
//!   panic or transport error escape.
//! - `DriverService` binds the client to a `Transport` and exposes the
//!   typed operation catalogue; `HttpTransport` is the `reqwest` backend.
//! - Records (drivers, vehicles, trips) are passed through as typed DTOs
//!   without interpretation. Business status (`"success"` or not) is
//!   surfaced as `Reply` for the caller to judge.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod form;
pub mod http;
pub mod poller;
pub mod service;
pub mod storage;
pub mod transport;
pub mod types;

pub use client::{DriverClient, TokenProvider};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ConfigError, FailureKind, NO_RESPONSE_MESSAGE};
pub use executor::execute;
pub use form::Form;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use poller::ActiveRidesPoller;
pub use service::DriverService;
pub use storage::{DocumentStore, StorageError};
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{
    Acknowledged, Credentials, DriverRegistration, Listing, LoginSession, NewVehicle,
    OtpVerification, OtpVerified, Profile, ProfileUpdate, Registered, Registration, Reply, Trip,
    TripDetails, VehicleType,
};
