use chrono::{DateTime, FixedOffset, Offset, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bucket::Bucket;
use crate::capabilities::{Endpoint, RemoteError};
use crate::config::ApiConfig;
use crate::event::FetchPayload;
use crate::forms::ValidationError;
use crate::pipeline::{RideTab, Source, TabList, TabSources};
use crate::records::{BidId, BookingId, RideId, UserId};
use crate::search::SearchState;
use crate::{AppError, ToastKind, ToastMessage};

/// Identifies one load of one tab. Only the newest token per tab may
/// resolve it; anything older is a stale response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Responses collected for the in-flight load of a tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinBuffer {
    sources: TabSources,
    arrived: Vec<Source>,
    failures: Vec<(Source, RemoteError)>,
}

impl JoinBuffer {
    /// Returns false when this source already arrived for the current load.
    pub fn record(&mut self, payload: FetchPayload) -> bool {
        let source = payload.source();
        if self.arrived.contains(&source) {
            return false;
        }
        self.arrived.push(source);

        let failure = match payload {
            FetchPayload::Rides(Ok(rides)) => {
                self.sources.rides = rides;
                None
            }
            FetchPayload::Bids(Ok(bids)) => {
                self.sources.bids = bids;
                None
            }
            FetchPayload::Bookings(Ok(bookings)) => {
                self.sources.bookings = bookings;
                None
            }
            FetchPayload::Requests(Ok(requests)) => {
                self.sources.requests = requests;
                None
            }
            FetchPayload::Rides(Err(e))
            | FetchPayload::Bids(Err(e))
            | FetchPayload::Bookings(Err(e))
            | FetchPayload::Requests(Err(e)) => Some(e),
        };
        if let Some(error) = failure {
            self.failures.push((source, error));
        }
        true
    }

    pub fn is_complete(&self, expected: &[Source]) -> bool {
        expected.iter().all(|source| self.arrived.contains(source))
    }

    /// Empties the buffer, handing back what was collected.
    pub fn take(&mut self) -> Result<TabSources, Vec<(Source, RemoteError)>> {
        let JoinBuffer {
            sources, failures, ..
        } = std::mem::take(self);
        if failures.is_empty() {
            Ok(sources)
        } else {
            Err(failures)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabSlot {
    pub phase: LoadPhase,
    pub latest_token: Option<RequestToken>,
    pub bucket: Bucket,
    pub join: JoinBuffer,
    pub list: TabList,
}

impl TabSlot {
    pub fn new(tab: RideTab) -> Self {
        Self {
            phase: LoadPhase::Idle,
            latest_token: None,
            bucket: Bucket::All,
            join: JoinBuffer::default(),
            list: TabList::empty_for(tab),
        }
    }

    /// Starts a new load. The previous list stays visible until it resolves.
    pub fn begin(&mut self, token: RequestToken, bucket: Bucket) {
        self.phase = LoadPhase::Loading;
        self.latest_token = Some(token);
        self.bucket = bucket;
        self.join = JoinBuffer::default();
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.phase == LoadPhase::Loading && self.latest_token == Some(token)
    }

    pub fn resolve(&mut self, list: TabList) {
        self.phase = LoadPhase::Ready;
        self.list = list;
    }

    pub fn fail(&mut self, tab: RideTab) {
        self.phase = LoadPhase::Failed;
        self.list = TabList::empty_for(tab);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tabs {
    driver: TabSlot,
    passenger: TabSlot,
    my_requests: TabSlot,
    my_offers: TabSlot,
}

impl Default for Tabs {
    fn default() -> Self {
        Self {
            driver: TabSlot::new(RideTab::Driver),
            passenger: TabSlot::new(RideTab::Passenger),
            my_requests: TabSlot::new(RideTab::MyRequests),
            my_offers: TabSlot::new(RideTab::MyOffers),
        }
    }
}

impl Tabs {
    pub fn get(&self, tab: RideTab) -> &TabSlot {
        match tab {
            RideTab::Driver => &self.driver,
            RideTab::Passenger => &self.passenger,
            RideTab::MyRequests => &self.my_requests,
            RideTab::MyOffers => &self.my_offers,
        }
    }

    pub fn get_mut(&mut self, tab: RideTab) -> &mut TabSlot {
        match tab {
            RideTab::Driver => &mut self.driver,
            RideTab::Passenger => &mut self.passenger,
            RideTab::MyRequests => &mut self.my_requests,
            RideTab::MyOffers => &mut self.my_offers,
        }
    }
}

/// A mutating call the user is waiting on.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    AcceptBid(BidId),
    RejectBid(BidId),
    CancelRide(RideId),
    CancelBooking(BookingId),
    CreateRide,
    CreateRequest,
    CreateBid,
}

impl UserAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AcceptBid(_) => "accept_bid",
            Self::RejectBid(_) => "reject_bid",
            Self::CancelRide(_) => "cancel_ride",
            Self::CancelBooking(_) => "cancel_booking",
            Self::CreateRide => "create_ride",
            Self::CreateRequest => "create_request",
            Self::CreateBid => "create_bid",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::AcceptBid(id) => Endpoint::AcceptBid(id.clone()),
            Self::RejectBid(id) => Endpoint::RejectBid(id.clone()),
            Self::CancelRide(id) => Endpoint::CancelRide(id.clone()),
            Self::CancelBooking(id) => Endpoint::CancelBooking(id.clone()),
            Self::CreateRide => Endpoint::CreateRide,
            Self::CreateRequest => Endpoint::CreateRequest,
            Self::CreateBid => Endpoint::CreateBid,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::AcceptBid(_) => "Bid accepted",
            Self::RejectBid(_) => "Bid rejected",
            Self::CancelRide(_) => "Ride cancelled",
            Self::CancelBooking(_) => "Booking cancelled",
            Self::CreateRide => "Ride posted",
            Self::CreateRequest => "Ride request posted",
            Self::CreateBid => "Bid placed",
        }
    }

    /// Shown when the server gives no message of its own.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::AcceptBid(_) => "Failed to accept bid",
            Self::RejectBid(_) => "Failed to reject bid",
            Self::CancelRide(_) => "Failed to cancel ride",
            Self::CancelBooking(_) => "Failed to cancel booking",
            Self::CreateRide => "Failed to post ride",
            Self::CreateRequest => "Failed to post ride request",
            Self::CreateBid => "Failed to place bid",
        }
    }
}

/// Runtime-only: never serialized.
#[derive(Debug)]
pub struct Session {
    pub user_id: UserId,
    token: SecretString,
}

impl Session {
    pub fn new(user_id: UserId, token: SecretString) -> Self {
        Self { user_id, token }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

#[derive(Debug)]
pub struct Model {
    pub now: DateTime<Utc>,
    pub utc_offset: FixedOffset,
    pub config: ApiConfig,
    pub session: Option<Session>,

    // My Rides
    pub active_tab: RideTab,
    pub active_bucket: Bucket,
    pub tabs: Tabs,
    next_token: RequestToken,
    pub pending_action: Option<UserAction>,

    // Forms
    pub search: SearchState,
    pub form_errors: Vec<ValidationError>,

    // Notices
    pub active_toast: Option<ToastMessage>,
    pub active_alert: Option<AppError>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            utc_offset: Utc.fix(),
            config: ApiConfig::default(),
            session: None,
            active_tab: RideTab::default(),
            active_bucket: Bucket::default(),
            tabs: Tabs::default(),
            next_token: RequestToken::default(),
            pending_action: None,
            search: SearchState::default(),
            form_errors: Vec::new(),
            active_toast: None,
            active_alert: None,
        }
    }
}

impl Model {
    pub fn update_timestamp(&mut self) {
        self.now = Utc::now();
    }

    /// `now` in the user's zone; calendar buckets are judged on this.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.now.with_timezone(&self.utc_offset)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn bearer(&self) -> Option<String> {
        self.session.as_ref().map(Session::bearer)
    }

    pub fn issue_token(&mut self) -> RequestToken {
        self.next_token = self.next_token.next();
        self.next_token
    }

    pub fn slot(&self, tab: RideTab) -> &TabSlot {
        self.tabs.get(tab)
    }

    pub fn slot_mut(&mut self, tab: RideTab) -> &mut TabSlot {
        self.tabs.get_mut(tab)
    }

    pub fn active_slot(&self) -> &TabSlot {
        self.tabs.get(self.active_tab)
    }

    pub fn start_session(&mut self, user_id: UserId, token: SecretString) {
        self.session = Some(Session::new(user_id, token));
    }

    /// Drops the session and everything fetched under it. Tokens keep
    /// counting so late responses from the old session stay stale.
    pub fn end_session(&mut self) {
        self.session = None;
        self.tabs = Tabs::default();
        self.active_tab = RideTab::default();
        self.active_bucket = Bucket::default();
        self.pending_action = None;
        self.form_errors.clear();
        self.search = SearchState::default();
        self.active_alert = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind, self.now));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    pub fn show_alert(&mut self, error: AppError) {
        self.active_alert = Some(error);
    }

    pub fn clear_alert(&mut self) {
        self.active_alert = None;
    }
}
