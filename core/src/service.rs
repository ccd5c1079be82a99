//! The typed operation catalogue, bound to a transport.
//!
//! Each method builds its request with `DriverClient`, runs it through
//! `execute`, and narrows the body to the operation's schema. No retries,
//! no caching, no state carried between calls.

use log::debug;
use serde::de::DeserializeOwned;

use crate::client::DriverClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::executor::{execute, narrow};
use crate::http::HttpRequest;
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    Acknowledged, Credentials, DriverRegistration, Listing, LoginSession, NewVehicle,
    OtpVerification, OtpVerified, Profile, ProfileUpdate, Registered, Registration, Reply, Trip,
    VehicleType,
};

/// Backend gateway for the driver app.
#[derive(Debug, Clone)]
pub struct DriverService<T> {
    client: DriverClient,
    transport: T,
}

impl DriverService<HttpTransport> {
    /// Service over `reqwest` using the config's origin and timeout.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let transport =
            HttpTransport::new(config).map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(Self::new(DriverClient::new(&config.base_url), transport))
    }
}

impl<T: Transport> DriverService<T> {
    pub fn new(client: DriverClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &DriverClient {
        &self.client
    }

    pub async fn login(&self, input: &Credentials) -> ApiResult<Reply<LoginSession>> {
        self.call(self.client.build_login(input)?).await
    }

    pub async fn register(&self, input: &Registration) -> ApiResult<Reply<Registered>> {
        self.call(self.client.build_register(input)?).await
    }

    pub async fn verify_otp(&self, input: &OtpVerification) -> ApiResult<Reply<OtpVerified>> {
        self.call(self.client.build_verify_otp(input)?).await
    }

    pub async fn register_driver(
        &self,
        input: &DriverRegistration,
    ) -> ApiResult<Reply<Acknowledged>> {
        self.call(self.client.build_register_driver(input)?).await
    }

    pub async fn add_vehicle(&self, input: &NewVehicle) -> ApiResult<Reply<Acknowledged>> {
        self.call(self.client.build_add_vehicle(input)?).await
    }

    pub async fn list_vehicle_types(&self) -> ApiResult<Reply<Listing<VehicleType>>> {
        self.call(self.client.build_list_vehicle_types()).await
    }

    pub async fn list_active_rides(&self, driver_id: u64) -> ApiResult<Reply<Listing<Trip>>> {
        self.call(self.client.build_list_active_rides(driver_id)).await
    }

    pub async fn get_profile(&self) -> ApiResult<Profile> {
        self.call(self.client.build_get_profile()).await
    }

    pub async fn update_profile(&self, input: &ProfileUpdate) -> ApiResult<Profile> {
        self.call(self.client.build_update_profile(input)?).await
    }

    async fn call<R: DeserializeOwned>(&self, request: HttpRequest) -> ApiResult<R> {
        debug!("calling {} {}", request.method.as_str(), request.url);
        let response = execute(|| self.transport.send(request)).await?;
        narrow(&response)
    }
}
