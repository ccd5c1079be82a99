//! Stateless request builder and response parser for the booking API.
//!
//! # Design
//! `DriverClient` holds only a base URL and an optional token provider, and
//! carries no mutable state between calls. Each catalogue operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that classifies an `HttpResponse` and narrows its body to the
//! operation's schema. The caller (usually `DriverService`) executes the
//! round-trip in between.

use std::fmt;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::executor::{classify, narrow};
use crate::form::Form;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::types::{
    Acknowledged, Credentials, DriverRegistration, Listing, LoginSession, NewVehicle,
    OtpVerification, OtpVerified, Profile, ProfileUpdate, Registered, Registration, Reply, Trip,
    VehicleType,
};

pub const LOGIN_PATH: &str = "/user/login";
pub const REGISTER_PATH: &str = "/user/register";
pub const VERIFY_OTP_PATH: &str = "/user/verify-otp";
pub const REGISTER_DRIVER_PATH: &str = "/user/register-driver";
pub const ADD_VEHICLE_PATH: &str = "/vehicle/add-vehicle";
pub const VEHICLE_TYPES_PATH: &str = "/vehicle/get-vehicle-types";
pub const DRIVER_TRIPS_PATH: &str = "/driver/get-driver-trips";
pub const PROFILE_PATH: &str = "/user/profile";
pub const UPDATE_PROFILE_PATH: &str = "/user/update";

/// Supplies a bearer token for outgoing requests, if one is available.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Builds requests and parses responses without touching the network.
#[derive(Clone)]
pub struct DriverClient {
    base_url: String,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl fmt::Debug for DriverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverClient")
            .field("base_url", &self.base_url)
            .field("token_provider", &self.token_provider.is_some())
            .finish()
    }
}

impl DriverClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_provider: None,
        }
    }

    /// Attach `authorization: Bearer <token>` to every request the provider
    /// has a token for.
    pub fn with_token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- build ---------------------------------------------------------------

    pub fn build_login(&self, input: &Credentials) -> ApiResult<HttpRequest> {
        self.form_request(LOGIN_PATH, input)
    }

    pub fn build_register(&self, input: &Registration) -> ApiResult<HttpRequest> {
        self.form_request(REGISTER_PATH, input)
    }

    pub fn build_verify_otp(&self, input: &OtpVerification) -> ApiResult<HttpRequest> {
        self.form_request(VERIFY_OTP_PATH, input)
    }

    pub fn build_register_driver(&self, input: &DriverRegistration) -> ApiResult<HttpRequest> {
        self.form_request(REGISTER_DRIVER_PATH, input)
    }

    pub fn build_add_vehicle(&self, input: &NewVehicle) -> ApiResult<HttpRequest> {
        self.form_request(ADD_VEHICLE_PATH, input)
    }

    pub fn build_list_vehicle_types(&self) -> HttpRequest {
        self.get_request(VEHICLE_TYPES_PATH, Vec::new())
    }

    pub fn build_list_active_rides(&self, driver_id: u64) -> HttpRequest {
        self.get_request(
            DRIVER_TRIPS_PATH,
            vec![("driver_id".to_string(), driver_id.to_string())],
        )
    }

    pub fn build_get_profile(&self) -> HttpRequest {
        self.get_request(PROFILE_PATH, Vec::new())
    }

    pub fn build_update_profile(&self, input: &ProfileUpdate) -> ApiResult<HttpRequest> {
        self.form_request(UPDATE_PROFILE_PATH, input)
    }

    // -- parse ---------------------------------------------------------------

    pub fn parse_login(&self, response: HttpResponse) -> ApiResult<Reply<LoginSession>> {
        parse(response)
    }

    pub fn parse_register(&self, response: HttpResponse) -> ApiResult<Reply<Registered>> {
        parse(response)
    }

    pub fn parse_verify_otp(&self, response: HttpResponse) -> ApiResult<Reply<OtpVerified>> {
        parse(response)
    }

    pub fn parse_register_driver(&self, response: HttpResponse) -> ApiResult<Reply<Acknowledged>> {
        parse(response)
    }

    pub fn parse_add_vehicle(&self, response: HttpResponse) -> ApiResult<Reply<Acknowledged>> {
        parse(response)
    }

    pub fn parse_list_vehicle_types(
        &self,
        response: HttpResponse,
    ) -> ApiResult<Reply<Listing<VehicleType>>> {
        parse(response)
    }

    pub fn parse_list_active_rides(&self, response: HttpResponse) -> ApiResult<Reply<Listing<Trip>>> {
        parse(response)
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> ApiResult<Profile> {
        parse(response)
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> ApiResult<Profile> {
        parse(response)
    }

    // -- helpers -------------------------------------------------------------

    fn form_request<T: serde::Serialize>(&self, path: &str, input: &T) -> ApiResult<HttpRequest> {
        let form = Form::from_serialize(input)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            query: Vec::new(),
            headers: self.headers(),
            body: RequestBody::Form(form),
        })
    }

    fn get_request(&self, path: &str, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            query,
            headers: self.headers(),
            body: RequestBody::Empty,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.token_provider
            .as_ref()
            .and_then(|provider| provider.token())
            .map(|token| vec![("authorization".to_string(), format!("Bearer {token}"))])
            .unwrap_or_default()
    }
}

fn parse<T: serde::de::DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let response = classify(response)?;
    narrow(&response)
}
