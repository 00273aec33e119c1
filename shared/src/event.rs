use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bucket::Bucket;
use crate::capabilities::RemoteResult;
use crate::forms::{BidDraft, RequestDraft, RideDraft};
use crate::model::{RequestToken, UserAction};
use crate::pipeline::{RideTab, Source};
use crate::records::{Bid, BidId, Booking, BookingId, Ride, RideId, RideRequest, UserId};
use crate::search::LocationField;

// --- Session token: redacted Debug, moved into a SecretString on arrival ---

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_secret(self) -> SecretString {
        SecretString::new(self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// --- Fetch results, one per remote collection ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum FetchPayload {
    Rides(RemoteResult<Vec<Ride>>),
    Bids(RemoteResult<Vec<Bid>>),
    Bookings(RemoteResult<Vec<Booking>>),
    Requests(RemoteResult<Vec<RideRequest>>),
}

impl FetchPayload {
    pub fn source(&self) -> Source {
        match self {
            FetchPayload::Rides(_) => Source::Rides,
            FetchPayload::Bids(_) => Source::Bids,
            FetchPayload::Bookings(_) => Source::Bookings,
            FetchPayload::Requests(_) => Source::Requests,
        }
    }
}

// --- Event enum: flat, large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Session & configuration
    Configure {
        base_url: String,
    },
    SessionStarted {
        user_id: UserId,
        token: SessionToken,
    },
    SessionEnded,
    TimeZoneChanged {
        utc_offset_minutes: i32,
    },

    // My Rides navigation
    TabSelected(RideTab),
    FilterSelected(Bucket),
    RefreshRequested,

    // Actions on list items
    AcceptBidRequested(BidId),
    RejectBidRequested(BidId),
    CancelRideRequested(RideId),
    CancelBookingRequested(BookingId),

    // Forms
    RideSubmitted(Box<RideDraft>),
    RequestSubmitted(Box<RequestDraft>),
    BidSubmitted(Box<BidDraft>),
    LocationQueryChanged {
        field: LocationField,
        query: String,
    },
    LocationPicked {
        field: LocationField,
        name: String,
    },

    // Notices
    TimerTick,
    DismissAlert,
    DismissToast,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    FetchCompleted {
        tab: RideTab,
        token: RequestToken,
        payload: Box<FetchPayload>,
    },
    #[serde(skip)]
    ActionCompleted {
        action: Box<UserAction>,
        result: RemoteResult<()>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Configure { .. } => "configure",
            Event::SessionStarted { .. } => "session_started",
            Event::SessionEnded => "session_ended",
            Event::TimeZoneChanged { .. } => "time_zone_changed",
            Event::TabSelected(_) => "tab_selected",
            Event::FilterSelected(_) => "filter_selected",
            Event::RefreshRequested => "refresh_requested",
            Event::AcceptBidRequested(_) => "accept_bid_requested",
            Event::RejectBidRequested(_) => "reject_bid_requested",
            Event::CancelRideRequested(_) => "cancel_ride_requested",
            Event::CancelBookingRequested(_) => "cancel_booking_requested",
            Event::RideSubmitted(_) => "ride_submitted",
            Event::RequestSubmitted(_) => "request_submitted",
            Event::BidSubmitted(_) => "bid_submitted",
            Event::LocationQueryChanged { .. } => "location_query_changed",
            Event::LocationPicked { .. } => "location_picked",
            Event::TimerTick => "timer_tick",
            Event::DismissAlert => "dismiss_alert",
            Event::DismissToast => "dismiss_toast",
            Event::FetchCompleted { .. } => "fetch_completed",
            Event::ActionCompleted { .. } => "action_completed",
        }
    }

    /// Capability callbacks are not user input.
    pub fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Event::FetchCompleted { .. } | Event::ActionCompleted { .. } | Event::TimerTick
        )
    }
}
