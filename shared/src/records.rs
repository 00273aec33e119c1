use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(RideId);
typed_id!(BookingId);
typed_id!(RequestId);
typed_id!(BidId);
typed_id!(UserId);

/// Status vocabulary shared by rides, bookings, requests and bids.
///
/// Each backend collection only uses a subset; unknown strings decode as
/// `Unknown` instead of failing the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Active,
    Confirmed,
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Open,
    Closed,
    Completed,
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Confirmed => "CONFIRMED",
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Completed => "COMPLETED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Cancelled and rejected items never count as upcoming or completed.
    #[must_use]
    pub const fn is_excluded(self) -> bool {
        matches!(self, Self::Cancelled | Self::Rejected)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
}

impl VehicleSummary {
    #[must_use]
    pub fn label(&self) -> String {
        match &self.color {
            Some(color) => format!("{color} {} {}", self.make, self.model),
            None => format!("{} {}", self.make, self.model),
        }
    }
}

/// A ride posted by the signed-in driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: RideId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: u32,
    pub price_per_seat: f64,
    pub status: ItemStatus,
    #[serde(default)]
    pub driver: Option<PersonSummary>,
    #[serde(default)]
    pub vehicle: Option<VehicleSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideSummary {
    pub id: RideId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    #[serde(default)]
    pub driver: Option<PersonSummary>,
}

/// A seat reservation held by the signed-in passenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub status: ItemStatus,
    pub seats_booked: u32,
    pub total_price: f64,
    pub ride: RideSummary,
}

/// Back-reference from a bid to the request it was placed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub id: RequestId,
    pub origin: String,
    pub destination: String,
    pub preferred_date_time: DateTime<Utc>,
    #[serde(default)]
    pub passenger: Option<PersonSummary>,
}

/// A driver's offer against a ride request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: BidId,
    pub status: ItemStatus,
    pub price_offer: f64,
    #[serde(default)]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub driver: Option<PersonSummary>,
    pub request: RequestSummary,
}

impl Bid {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status == ItemStatus::Accepted
    }
}

/// A passenger's open call for a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    pub id: RequestId,
    pub origin: String,
    pub destination: String,
    pub preferred_date_time: DateTime<Utc>,
    pub seats_needed: u32,
    #[serde(default)]
    pub max_price: Option<f64>,
    pub status: ItemStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub passenger: Option<PersonSummary>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

impl RideRequest {
    pub fn accepted_bids(&self) -> impl Iterator<Item = &Bid> {
        self.bids.iter().filter(|b| b.is_accepted())
    }

    #[must_use]
    pub fn has_accepted_bid(&self) -> bool {
        self.accepted_bids().next().is_some()
    }
}

// --- Envelope payloads, one per list endpoint ---

#[derive(Debug, Clone, Deserialize)]
pub struct RidesData {
    pub rides: Vec<Ride>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidsData {
    pub bids: Vec<Bid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingsData {
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestsData {
    pub requests: Vec<RideRequest>,
}
