//! Request and response payloads for the booking backend.
//!
//! # Design
//! Driver, vehicle and trip records are passed through without
//! interpretation, but each operation's body is still deserialized into an
//! explicit schema so malformed payloads surface as
//! `ApiError::InvalidPayload` instead of silently missing fields.
//!
//! Most bodies carry a `status` discriminator. `Reply<T>` splits on it:
//! `"success"` yields `Accepted(T)`, anything else yields `Rejected`.
//! Deciding what a rejection means is left to the caller.

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_SUCCESS: &str = "success";
pub const USER_TYPE_DRIVER: &str = "driver";

// ---------------------------------------------------------------------------
// Business-level reply
// ---------------------------------------------------------------------------

/// Business outcome carried inside a 2xx response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Accepted(T),
    Rejected {
        status: String,
        message: Option<String>,
    },
}

impl<T> Reply<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Reply::Accepted(_))
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Reply::Accepted(data) => Some(data),
            Reply::Rejected { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Accepted(data) => Reply::Accepted(f(data)),
            Reply::Rejected { status, message } => Reply::Rejected { status, message },
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Reply<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| de::Error::missing_field("status"))?
            .to_string();

        if status == STATUS_SUCCESS {
            return T::deserialize(value).map(Reply::Accepted).map_err(de::Error::custom);
        }

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Reply::Rejected { status, message })
    }
}

/// Body of operations that only report success and a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Acknowledged {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of listing operations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
}

// ---------------------------------------------------------------------------
// Authentication and onboarding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginSession {
    pub user_id: u64,
    pub username: String,
    pub user_type: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginSession {
    /// Only driver accounts may use the driver app.
    pub fn is_driver(&self) -> bool {
        self.user_type == USER_TYPE_DRIVER
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_user_type")]
    pub user_type: String,
}

impl Registration {
    pub fn driver(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            user_type: default_user_type(),
        }
    }
}

fn default_user_type() -> String {
    USER_TYPE_DRIVER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registered {
    #[serde(default)]
    pub message: Option<String>,
    pub data: RegisteredUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerification {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpVerified {
    #[serde(default)]
    pub message: Option<String>,
    pub data: VerifiedUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedUser {
    pub id: u64,
}

/// Driver details plus the URLs of already-uploaded documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverRegistration {
    pub user_id: u64,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    pub date_of_birth: String,
    pub national_ins_number: String,
    pub address: String,
    pub email: String,
    pub license_number: String,
    pub license_expiry_date: String,
    pub contact_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub license_photocopy: String,
    pub pco_license: String,
    pub bank_statement: String,
    pub private_hire_driver_badge: String,
    pub created_at: String,
}

impl DriverRegistration {
    /// Required fields left blank. Surname and profile image are optional.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("first_name", &self.first_name),
            ("date_of_birth", &self.date_of_birth),
            ("national_ins_number", &self.national_ins_number),
            ("address", &self.address),
            ("email", &self.email),
            ("license_number", &self.license_number),
            ("license_expiry_date", &self.license_expiry_date),
            ("contact_number", &self.contact_number),
            ("license_photocopy", &self.license_photocopy),
            ("pco_license", &self.pco_license),
            ("bank_statement", &self.bank_statement),
            ("private_hire_driver_badge", &self.private_hire_driver_badge),
        ])
    }
}

/// Vehicle details plus the URLs of already-uploaded documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVehicle {
    pub driver_id: u64,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_color: String,
    pub vehicle_charge: String,
    pub vehicle_registration_number: String,
    pub vehicle_type: String,
    pub private_hire_vehicle_licence: String,
    pub v5c_registration: String,
    pub insurance: String,
    pub mot: String,
    pub permission_letter: String,
}

impl NewVehicle {
    /// Every vehicle field and document is required.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        blank_fields(&[
            ("vehicle_make", &self.vehicle_make),
            ("vehicle_model", &self.vehicle_model),
            ("vehicle_color", &self.vehicle_color),
            ("vehicle_charge", &self.vehicle_charge),
            ("vehicle_registration_number", &self.vehicle_registration_number),
            ("vehicle_type", &self.vehicle_type),
            ("private_hire_vehicle_licence", &self.private_hire_vehicle_licence),
            ("v5c_registration", &self.v5c_registration),
            ("insurance", &self.insurance),
            ("mot", &self.mot),
            ("permission_letter", &self.permission_letter),
        ])
    }
}

fn blank_fields(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

// ---------------------------------------------------------------------------
// Vehicles and trips
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleType {
    pub id: u64,
    pub category_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub car_seat_available: u32,
    pub max_passenger_count: u32,
    pub max_luggages: u32,
    pub max_hand_luggages: u32,
    pub file_path: String,
    pub description: String,
}

/// A trip assigned to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: u64,
    #[serde(rename = "tour_booking_id")]
    pub booking: TripDetails,
    pub driver_id: u64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDetails {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub no_of_passenger: u32,
    pub no_of_luggage: u32,
    pub no_of_hand_luggage: u32,
    pub amount: String,
    pub pickup: Option<String>,
    pub drop: Option<String>,
    pub stops: u32,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Profile fields. Fields this client does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Partial profile update. Only the fields present are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_success_deserializes_payload() {
        let reply: Reply<LoginSession> = serde_json::from_str(
            r#"{"status":"success","message":"ok","user_id":19,"username":"d@x.io","user_type":"driver"}"#,
        )
        .unwrap();
        let session = reply.accepted().unwrap();
        assert_eq!(session.user_id, 19);
        assert!(session.is_driver());
    }

    #[test]
    fn reply_other_status_is_rejected_with_message() {
        let reply: Reply<LoginSession> =
            serde_json::from_str(r#"{"status":"failed","message":"Invalid credentials"}"#).unwrap();
        assert_eq!(
            reply,
            Reply::Rejected {
                status: "failed".to_string(),
                message: Some("Invalid credentials".to_string()),
            }
        );
    }

    #[test]
    fn reply_without_status_is_an_error() {
        let result: Result<Reply<Acknowledged>, _> = serde_json::from_str(r#"{"message":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn reply_success_with_missing_fields_is_an_error() {
        let result: Result<Reply<Registered>, _> =
            serde_json::from_str(r#"{"status":"success","message":"done"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn customer_session_is_not_a_driver() {
        let session = LoginSession {
            user_id: 1,
            username: "c".to_string(),
            user_type: "customer".to_string(),
            message: None,
        };
        assert!(!session.is_driver());
    }

    #[test]
    fn registration_defaults_to_driver_user_type() {
        let reg: Registration =
            serde_json::from_str(r#"{"name":"A","email":"a@b.c","password":"pw"}"#).unwrap();
        assert_eq!(reg.user_type, "driver");
    }

    #[test]
    fn driver_registration_allows_missing_surname_and_photo() {
        let reg = DriverRegistration {
            user_id: 7,
            first_name: "Sam".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            national_ins_number: "QQ123456C".to_string(),
            address: "1 High St".to_string(),
            email: "sam@example.com".to_string(),
            license_number: "L1".to_string(),
            license_expiry_date: "2030-01-01".to_string(),
            contact_number: "0700".to_string(),
            license_photocopy: "https://files/l.pdf".to_string(),
            pco_license: "https://files/p.pdf".to_string(),
            bank_statement: "https://files/b.pdf".to_string(),
            private_hire_driver_badge: "https://files/h.pdf".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            ..DriverRegistration::default()
        };
        assert!(reg.missing_fields().is_empty());
    }

    #[test]
    fn vehicle_reports_blank_fields() {
        let vehicle = NewVehicle {
            driver_id: 3,
            vehicle_make: "Toyota".to_string(),
            vehicle_model: "  ".to_string(),
            ..NewVehicle::default()
        };
        let missing = vehicle.missing_fields();
        assert!(missing.contains(&"vehicle_model"));
        assert!(missing.contains(&"mot"));
        assert!(!missing.contains(&"vehicle_make"));
        assert_eq!(missing.len(), 10);
    }

    #[test]
    fn trip_keeps_booking_details() {
        let trip: Trip = serde_json::from_value(serde_json::json!({
            "id": 1,
            "tour_booking_id": {
                "id": 9, "first_name": "Ann", "last_name": "Lee", "contact_number": "0711",
                "no_of_passenger": 2, "no_of_luggage": 1, "no_of_hand_luggage": 0,
                "amount": "42.50", "pickup": "Heathrow", "drop": null, "stops": 0
            },
            "driver_id": 19, "status": "pending", "created_at": 1700000000, "updated_at": 1700000100
        }))
        .unwrap();
        assert_eq!(trip.booking.amount, "42.50");
        assert_eq!(trip.booking.drop, None);
    }

    #[test]
    fn profile_keeps_unmodelled_fields() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":4,"name":"Kim","email":"k@x.io","contact_number":"0722"}"#,
        )
        .unwrap();
        assert_eq!(profile.extra["contact_number"], "0722");
    }
}
