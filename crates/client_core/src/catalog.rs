//! Read-side property views: the admin portfolio, room listing filters and star ratings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::domain::PropertyId;

pub const USD_TO_INR: f64 = 75.0;

pub const NO_PROPERTIES_MESSAGE: &str =
    "No properties found. Try adjusting your search or add a new property.";

pub const PRICE_FLOOR: u32 = 0;
pub const PRICE_CEILING: u32 = 10_000;
pub const PRICE_STEP: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedProperty {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub sqft: u32,
    pub occupancy: u32,
    /// Monthly revenue in rupees.
    pub revenue: u64,
}

impl ManagedProperty {
    pub fn revenue_label(&self) -> String {
        format!("₹{}/mo", group_thousands(self.revenue))
    }

    pub fn area_label(&self) -> String {
        format!("{} sq.ft", group_thousands(u64::from(self.sqft)))
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.address.to_lowercase().contains(needle)
    }
}

/// Properties an admin manages. Deletion only affects this in-memory list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPortfolio {
    properties: Vec<ManagedProperty>,
}

impl PropertyPortfolio {
    pub fn new(properties: Vec<ManagedProperty>) -> Self {
        Self { properties }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Case-insensitive substring match on name or address. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&ManagedProperty> {
        let needle = term.to_lowercase();
        self.properties
            .iter()
            .filter(|property| property.matches(&needle))
            .collect()
    }

    pub fn remove(&mut self, id: PropertyId) -> Option<ManagedProperty> {
        let index = self.properties.iter().position(|p| p.id == id)?;
        Some(self.properties.remove(index))
    }
}

pub fn usd_to_inr(usd: f64) -> f64 {
    usd * USD_TO_INR
}

/// `3375000` becomes `3,375,000`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCount {
    Exactly(u32),
    FourOrMore,
}

impl RoomCount {
    fn accepts(self, rooms: u32) -> bool {
        match self {
            RoomCount::Exactly(n) => rooms == n,
            RoomCount::FourOrMore => rooms >= 4,
        }
    }
}

impl FromStr for RoomCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4+" => Ok(RoomCount::FourOrMore),
            other => match other.parse::<u32>() {
                Ok(n @ 1..=3) => Ok(RoomCount::Exactly(n)),
                _ => Err(format!("unsupported room count: {other}")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListing {
    pub title: String,
    pub place: String,
    pub price_per_night: u32,
    pub gender: Gender,
    pub rooms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomFilter {
    min_price: u32,
    max_price: u32,
    pub place: Option<String>,
    pub gender: Option<Gender>,
    pub rooms: Option<RoomCount>,
}

impl Default for RoomFilter {
    fn default() -> Self {
        Self {
            min_price: PRICE_FLOOR,
            max_price: PRICE_CEILING,
            place: None,
            gender: None,
            rooms: None,
        }
    }
}

impl RoomFilter {
    pub fn price_range(&self) -> (u32, u32) {
        (self.min_price, self.max_price)
    }

    /// Clamps both ends to the slider bounds and snaps them down to the slider step.
    pub fn set_price_range(&mut self, low: u32, high: u32) {
        let snap = |v: u32| v.clamp(PRICE_FLOOR, PRICE_CEILING) / PRICE_STEP * PRICE_STEP;
        let (low, high) = (snap(low), snap(high));
        self.min_price = low.min(high);
        self.max_price = low.max(high);
    }

    pub fn matches(&self, room: &RoomListing) -> bool {
        (self.min_price..=self.max_price).contains(&room.price_per_night)
            && self
                .place
                .as_deref()
                .map_or(true, |place| room.place.eq_ignore_ascii_case(place))
            && self.gender.map_or(true, |gender| room.gender == gender)
            && self.rooms.map_or(true, |count| count.accepts(room.rooms))
    }

    pub fn apply<'a>(&self, rooms: &'a [RoomListing]) -> Vec<&'a RoomListing> {
        rooms.iter().filter(|room| self.matches(room)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarFill {
    Full,
    Half,
    Empty,
}

/// One entry per star up to `max`: full below the integer part of `rating`, half for a
/// fractional remainder, empty after that.
pub fn star_fills(rating: f64, max: u8) -> Vec<StarFill> {
    (0..max)
        .map(|index| {
            let index = f64::from(index);
            if index < rating.floor() {
                StarFill::Full
            } else if index < rating {
                StarFill::Half
            } else {
                StarFill::Empty
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
