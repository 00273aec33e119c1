//! The unified timeline entry for the "My Rides" lists.
//!
//! Rides, bookings and confirmed matches come from different endpoints with
//! different shapes. Everything that lands on a timeline is turned into a
//! [`ScheduleItem`] first, so bucket filtering and ordering only ever see one
//! type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::records::{
    Bid, BidId, Booking, ItemStatus, PersonSummary, RequestId, Ride, RideRequest,
};

/// Derived sort key. Confirmed matches float above everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Matched,
    Standard,
}

impl Priority {
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Matched => 0,
            Self::Standard => 1,
        }
    }
}

/// Anything the bucket classifier and the comparator can work on.
pub trait Schedulable {
    fn scheduled_at(&self) -> DateTime<Utc>;

    fn status(&self) -> ItemStatus;

    /// Only ride requests expire.
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn priority(&self) -> Priority;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    PostedRide,
    AcceptedBidAsRide,
    Booking,
    AcceptedRequestAsBooking,
}

impl ScheduleKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostedRide => "posted_ride",
            Self::AcceptedBidAsRide => "accepted_bid_as_ride",
            Self::Booking => "booking",
            Self::AcceptedRequestAsBooking => "accepted_request_as_booking",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timeline id. Derived entries get a prefixed id so they can never collide
/// with a genuine ride or booking id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn for_bid(id: &BidId) -> Self {
        Self(format!("bid:{id}"))
    }

    pub fn for_request(id: &RequestId) -> Self {
        Self(format!("request:{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An accepted bid shown on the driver's timeline as if it were a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedBidRide {
    pub id: ItemId,
    pub bid_id: BidId,
    pub request_id: RequestId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: f64,
    pub passenger: Option<PersonSummary>,
}

/// A request with an accepted bid shown on the passenger's timeline as if
/// it were a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedRequestBooking {
    pub id: ItemId,
    pub request_id: RequestId,
    pub bid_id: BidId,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub seats: u32,
    pub price: f64,
    pub driver: Option<PersonSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum ScheduleItem {
    PostedRide(Ride),
    AcceptedBidAsRide(AcceptedBidRide),
    Booking(Booking),
    AcceptedRequestAsBooking(AcceptedRequestBooking),
}

impl ScheduleItem {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::PostedRide(ride) => ride.id.as_str(),
            Self::AcceptedBidAsRide(item) => item.id.as_str(),
            Self::Booking(booking) => booking.id.as_str(),
            Self::AcceptedRequestAsBooking(item) => item.id.as_str(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ScheduleKind {
        match self {
            Self::PostedRide(_) => ScheduleKind::PostedRide,
            Self::AcceptedBidAsRide(_) => ScheduleKind::AcceptedBidAsRide,
            Self::Booking(_) => ScheduleKind::Booking,
            Self::AcceptedRequestAsBooking(_) => ScheduleKind::AcceptedRequestAsBooking,
        }
    }

    #[must_use]
    pub fn route(&self) -> (&str, &str) {
        match self {
            Self::PostedRide(ride) => (&ride.origin, &ride.destination),
            Self::AcceptedBidAsRide(item) => (&item.origin, &item.destination),
            Self::Booking(booking) => (&booking.ride.origin, &booking.ride.destination),
            Self::AcceptedRequestAsBooking(item) => (&item.origin, &item.destination),
        }
    }

    /// The person on the other side of the trip, if the backend sent one.
    #[must_use]
    pub fn counterpart(&self) -> Option<&PersonSummary> {
        match self {
            Self::PostedRide(_) => None,
            Self::AcceptedBidAsRide(item) => item.passenger.as_ref(),
            Self::Booking(booking) => booking.ride.driver.as_ref(),
            Self::AcceptedRequestAsBooking(item) => item.driver.as_ref(),
        }
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        match self {
            Self::PostedRide(ride) => ride.price_per_seat,
            Self::AcceptedBidAsRide(item) => item.price,
            Self::Booking(booking) => booking.total_price,
            Self::AcceptedRequestAsBooking(item) => item.price,
        }
    }

    /// Only items backed by a real ride or booking can be cancelled.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        match self {
            Self::PostedRide(ride) => !ride.status.is_excluded(),
            Self::Booking(booking) => !booking.status.is_excluded(),
            Self::AcceptedBidAsRide(_) | Self::AcceptedRequestAsBooking(_) => false,
        }
    }
}

impl Schedulable for ScheduleItem {
    fn scheduled_at(&self) -> DateTime<Utc> {
        match self {
            Self::PostedRide(ride) => ride.departure_time,
            Self::AcceptedBidAsRide(item) => item.departure_time,
            Self::Booking(booking) => booking.ride.departure_time,
            Self::AcceptedRequestAsBooking(item) => item.departure_time,
        }
    }

    fn status(&self) -> ItemStatus {
        match self {
            Self::PostedRide(ride) => ride.status,
            Self::Booking(booking) => booking.status,
            Self::AcceptedBidAsRide(_) | Self::AcceptedRequestAsBooking(_) => {
                ItemStatus::Confirmed
            }
        }
    }

    fn priority(&self) -> Priority {
        match self {
            Self::AcceptedBidAsRide(_) | Self::AcceptedRequestAsBooking(_) => Priority::Matched,
            Self::PostedRide(_) | Self::Booking(_) => Priority::Standard,
        }
    }
}

impl Schedulable for RideRequest {
    fn scheduled_at(&self) -> DateTime<Utc> {
        self.preferred_date_time
    }

    fn status(&self) -> ItemStatus {
        self.status
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn priority(&self) -> Priority {
        if self.has_accepted_bid() {
            Priority::Matched
        } else {
            Priority::Standard
        }
    }
}

impl Schedulable for Bid {
    fn scheduled_at(&self) -> DateTime<Utc> {
        self.request.preferred_date_time
    }

    fn status(&self) -> ItemStatus {
        self.status
    }

    fn priority(&self) -> Priority {
        if self.is_accepted() {
            Priority::Matched
        } else {
            Priority::Standard
        }
    }
}
