use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::QueryRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Code every registration is expected to confirm with.
pub const MOCK_OTP: &str = "1234";

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub id: u64,
    pub tour_booking_id: TripDetails,
    pub driver_id: u64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Clone, Debug)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
    pub verified: bool,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default)]
pub struct Backend {
    next_id: u64,
    pub users: HashMap<u64, User>,
    pub drivers: HashMap<u64, HashMap<String, String>>,
    pub vehicles: Vec<HashMap<String, String>>,
    pub vehicle_types: Vec<VehicleType>,
    pub trips: Vec<Trip>,
    pub current_user: Option<u64>,
}

impl Backend {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Assign a trip to a driver and return its id.
    pub fn assign_trip(&mut self, driver_id: u64, details: TripDetails) -> u64 {
        let id = self.next_id();
        self.trips.push(Trip {
            id,
            tour_booking_id: details,
            driver_id,
            status: "pending".to_string(),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        });
        id
    }
}

pub type Db = Arc<RwLock<Backend>>;

pub fn new_db() -> Db {
    let backend = Backend {
        vehicle_types: seed_vehicle_types(),
        ..Backend::default()
    };
    Arc::new(RwLock::new(backend))
}

pub fn app() -> Router {
    app_with(new_db())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/user/login", post(login))
        .route("/user/register", post(register))
        .route("/user/verify-otp", post(verify_otp))
        .route("/user/register-driver", post(register_driver))
        .route("/user/profile", get(get_profile))
        .route("/user/update", post(update_profile))
        .route("/vehicle/add-vehicle", post(add_vehicle))
        .route("/vehicle/get-vehicle-types", get(list_vehicle_types))
        .route("/driver/get-driver-trips", get(list_driver_trips))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, new_db()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

/// A non-2xx answer with the backend's `{status, message}` body.
pub struct Rejection {
    status: StatusCode,
    message: String,
}

impl Rejection {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = json!({ "status": "failed", "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

type Fields = HashMap<String, String>;

async fn read_form(mut multipart: Multipart) -> Result<Fields, Rejection> {
    let mut fields = Fields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Rejection::new(StatusCode::BAD_REQUEST, e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| Rejection::new(StatusCode::BAD_REQUEST, e.body_text()))?;
        fields.insert(name, value);
    }
    Ok(fields)
}

fn require<'a>(fields: &'a Fields, names: &[&str]) -> Result<Vec<&'a str>, Rejection> {
    names
        .iter()
        .map(|name| {
            fields
                .get(*name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Rejection::new(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        format!("{} is required", name.replace('_', " ")),
                    )
                })
        })
        .collect()
}

fn failed(message: &str) -> Json<Value> {
    Json(json!({ "status": "failed", "message": message }))
}

fn parse_id(raw: &str, field: &str) -> Result<u64, Rejection> {
    raw.parse()
        .map_err(|_| Rejection::new(StatusCode::UNPROCESSABLE_ENTITY, format!("{field} is invalid")))
}

fn profile_body(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "user_type": user.user_type,
        "contact_number": user.contact_number,
        "address": user.address,
    })
}

async fn login(State(db): State<Db>, multipart: Multipart) -> Result<Json<Value>, Rejection> {
    let fields = read_form(multipart).await?;
    let values = require(&fields, &["username", "password"])?;
    let (username, password) = (values[0], values[1]);

    let mut backend = db.write().await;
    let found = backend
        .users
        .values()
        .find(|u| u.email == username && u.password == password)
        .cloned();
    let Some(user) = found else {
        info!("login failed for {username}");
        return Ok(failed("Invalid username or password"));
    };
    if !user.verified {
        return Ok(failed("Account not verified"));
    }
    backend.current_user = Some(user.id);
    info!("login ok for user {}", user.id);
    Ok(Json(json!({
        "status": "success",
        "message": "Login successful",
        "user_id": user.id,
        "username": user.email,
        "user_type": user.user_type,
    })))
}

async fn register(State(db): State<Db>, multipart: Multipart) -> Result<Json<Value>, Rejection> {
    let fields = read_form(multipart).await?;
    let values = require(&fields, &["name", "email", "password", "user_type"])?;

    let mut backend = db.write().await;
    if backend.users.values().any(|u| u.email == values[1]) {
        return Ok(failed("Email already registered"));
    }
    let id = backend.next_id();
    let user = User {
        id,
        name: values[0].to_string(),
        email: values[1].to_string(),
        password: values[2].to_string(),
        user_type: values[3].to_string(),
        verified: false,
        contact_number: None,
        address: None,
    };
    info!("registered user {id}");
    let body = json!({
        "status": "success",
        "message": "Registration successful, OTP sent to your email",
        "data": { "id": id, "name": user.name },
    });
    backend.users.insert(id, user);
    Ok(Json(body))
}

async fn verify_otp(State(db): State<Db>, multipart: Multipart) -> Result<Json<Value>, Rejection> {
    let fields = read_form(multipart).await?;
    let values = require(&fields, &["email", "otp"])?;

    let mut backend = db.write().await;
    let Some(user) = backend.users.values_mut().find(|u| u.email == values[0]) else {
        return Ok(failed("Unknown email"));
    };
    if values[1] != MOCK_OTP {
        return Ok(failed("Incorrect OTP"));
    }
    user.verified = true;
    Ok(Json(json!({
        "status": "success",
        "message": "OTP verified",
        "data": { "id": user.id },
    })))
}

const DRIVER_FIELDS: &[&str] = &[
    "user_id",
    "first_name",
    "date_of_birth",
    "national_ins_number",
    "address",
    "email",
    "license_number",
    "license_expiry_date",
    "contact_number",
    "license_photocopy",
    "pco_license",
    "bank_statement",
    "private_hire_driver_badge",
];

async fn register_driver(
    State(db): State<Db>,
    multipart: Multipart,
) -> Result<Json<Value>, Rejection> {
    let fields = read_form(multipart).await?;
    let values = require(&fields, DRIVER_FIELDS)?;
    let user_id = parse_id(values[0], "user_id")?;

    let mut backend = db.write().await;
    if !backend.users.contains_key(&user_id) {
        return Ok(failed("User not found"));
    }
    backend.drivers.insert(user_id, fields);
    info!("driver profile stored for user {user_id}");
    Ok(Json(json!({ "status": "success", "message": "Driver registered successfully" })))
}

const VEHICLE_FIELDS: &[&str] = &[
    "driver_id",
    "vehicle_make",
    "vehicle_model",
    "vehicle_color",
    "vehicle_charge",
    "vehicle_registration_number",
    "vehicle_type",
    "private_hire_vehicle_licence",
    "v5c_registration",
    "insurance",
    "mot",
    "permission_letter",
];

async fn add_vehicle(State(db): State<Db>, multipart: Multipart) -> Result<Json<Value>, Rejection> {
    let fields = read_form(multipart).await?;
    let values = require(&fields, VEHICLE_FIELDS)?;
    let driver_id = parse_id(values[0], "driver_id")?;

    let mut backend = db.write().await;
    if !backend.drivers.contains_key(&driver_id) {
        return Ok(failed("Driver not registered"));
    }
    backend.vehicles.push(fields);
    info!("vehicle added for driver {driver_id}");
    Ok(Json(json!({ "status": "success", "message": "Vehicle added successfully" })))
}

async fn list_vehicle_types(State(db): State<Db>) -> Json<Value> {
    let backend = db.read().await;
    Json(json!({ "status": "success", "data": backend.vehicle_types }))
}

#[derive(Deserialize)]
struct TripQuery {
    driver_id: u64,
}

async fn list_driver_trips(
    State(db): State<Db>,
    query: Result<Query<TripQuery>, QueryRejection>,
) -> Result<Json<Value>, Rejection> {
    let Query(query) =
        query.map_err(|_| Rejection::new(StatusCode::BAD_REQUEST, "driver_id is required"))?;
    let backend = db.read().await;
    let trips: Vec<&Trip> = backend
        .trips
        .iter()
        .filter(|t| t.driver_id == query.driver_id)
        .collect();
    Ok(Json(json!({ "status": "success", "data": trips })))
}

async fn get_profile(State(db): State<Db>) -> Response {
    let backend = db.read().await;
    match backend.current_user.and_then(|id| backend.users.get(&id)) {
        Some(user) => Json(profile_body(user)).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not logged in" }))).into_response(),
    }
}

async fn update_profile(State(db): State<Db>, multipart: Multipart) -> Result<Response, Rejection> {
    let fields = read_form(multipart).await?;
    let mut backend = db.write().await;
    let Some(id) = backend.current_user else {
        return Ok((StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not logged in" }))).into_response());
    };
    let user = backend
        .users
        .get_mut(&id)
        .ok_or_else(|| Rejection::new(StatusCode::NOT_FOUND, "User not found"))?;
    if let Some(name) = fields.get("name") {
        user.name = name.clone();
    }
    if let Some(email) = fields.get("email") {
        user.email = email.clone();
    }
    if let Some(contact) = fields.get("contact_number") {
        user.contact_number = Some(contact.clone());
    }
    if let Some(address) = fields.get("address") {
        user.address = Some(address.clone());
    }
    Ok(Json(profile_body(user)).into_response())
}

fn seed_vehicle_types() -> Vec<VehicleType> {
    vec![
        VehicleType {
            id: 1,
            category_name: "Saloon".to_string(),
            kind: "standard".to_string(),
            car_seat_available: 1,
            max_passenger_count: 4,
            max_luggages: 2,
            max_hand_luggages: 2,
            file_path: "/uploads/saloon.png".to_string(),
            description: "Toyota Prius or similar".to_string(),
        },
        VehicleType {
            id: 2,
            category_name: "MPV".to_string(),
            kind: "large".to_string(),
            car_seat_available: 2,
            max_passenger_count: 6,
            max_luggages: 4,
            max_hand_luggages: 4,
            file_path: "/uploads/mpv.png".to_string(),
            description: "Ford Galaxy or similar".to_string(),
        },
    ]
}
