use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(PropertyId);

/// Access level of whoever is looking at the page. Absence of a user is `Guest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Guest,
    Admin,
    /// Also absorbs role names this client does not know.
    #[serde(other)]
    Member,
}

impl Role {
    pub fn is_signed_in(self) -> bool {
        !matches!(self, Role::Guest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(rename = "displayName", alias = "name", default)]
    pub display_name: String,
    #[serde(default = "default_user_role")]
    pub role: Role,
}

fn default_user_role() -> Role {
    Role::Member
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Studio,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Condo,
        PropertyType::Studio,
    ];

    /// Wire values, in the order the type picker lists them.
    pub const VALUES: [&'static str; 4] = ["apartment", "house", "condo", "studio"];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Studio => "studio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::House => "House",
            PropertyType::Condo => "Condo",
            PropertyType::Studio => "Studio",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property type: {0}")]
pub struct UnknownPropertyType(pub String);

impl FromStr for PropertyType {
    type Err = UnknownPropertyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownPropertyType(s.to_string()))
    }
}

/// The fixed amenity checklist offered on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Amenity {
    #[serde(rename = "WiFi")]
    WiFi,
    Parking,
    Gym,
    Laundry,
    #[serde(rename = "Air Conditioning")]
    AirConditioning,
    Heating,
}

impl Amenity {
    pub const CHECKLIST: [Amenity; 6] = [
        Amenity::WiFi,
        Amenity::Parking,
        Amenity::Gym,
        Amenity::Laundry,
        Amenity::AirConditioning,
        Amenity::Heating,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Amenity::WiFi => "WiFi",
            Amenity::Parking => "Parking",
            Amenity::Gym => "Gym",
            Amenity::Laundry => "Laundry",
            Amenity::AirConditioning => "Air Conditioning",
            Amenity::Heating => "Heating",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Amenity::CHECKLIST
            .into_iter()
            .find(|amenity| amenity.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
