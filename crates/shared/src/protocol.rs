use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Amenity, PropertyId, PropertyType, SessionUser};

/// Body of `GET /api/fetch-user`. A missing payload means nobody is signed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub payload: Option<SessionUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub data_b64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySubmission {
    pub property_name: String,
    pub address: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub property_type: PropertyType,
    pub amenities: Vec<Amenity>,
    pub description: String,
    pub price: f64,
    pub contact_email: String,
    pub contact_phone: String,
    pub images: Vec<ImagePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPropertyResponse {
    pub property_id: PropertyId,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub payload: Option<SessionUser>,
}
