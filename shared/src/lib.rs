#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod bucket;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod forms;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod schedule;
pub mod search;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bucket::Bucket;
use crate::capabilities::{RemoteError, UrlError};
use crate::forms::{FormField, ValidationError};
use crate::model::{LoadPhase, UserAction};
use crate::pipeline::{RideTab, TabList};
use crate::records::ItemStatus;
use crate::schedule::{Priority, Schedulable, ScheduleItem, ScheduleKind};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::Model;

pub const LOAD_FAILED_MESSAGE: &str = "Couldn't load your rides. Pull to refresh.";
pub const ACTION_BUSY_MESSAGE: &str = "Please wait for the current request to finish.";
pub const CANNOT_CANCEL_MESSAGE: &str = "This trip can no longer be cancelled.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Authentication,
    Validation,
    Remote,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Authentication => "AUTH_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Remote => "REMOTE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network => ErrorSeverity::Transient,
            Self::Internal => ErrorSeverity::Fatal,
            Self::Authentication | Self::Validation | Self::Remote => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    /// A failed accept / reject / cancel / create call. The server's own
    /// text wins over the per-action fallback.
    #[must_use]
    pub fn action_failed(action: &UserAction, error: &RemoteError) -> Self {
        let message = error.server_message().unwrap_or(action.failure_message());
        let alert = Self::new(ErrorKind::Remote, message)
            .with_internal(error.to_string())
            .with_context("action", action.name());
        if error.is_transport() {
            alert.with_severity(ErrorSeverity::Transient)
        } else {
            alert
        }
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Authentication => "Please sign in to see your rides.".into(),
            ErrorKind::Validation | ErrorKind::Remote => self.message.clone(),
            ErrorKind::Internal => {
                "An unexpected error occurred. Please try again or contact support.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<&RemoteError> for AppError {
    fn from(e: &RemoteError) -> Self {
        match e {
            RemoteError::Transport { detail } => {
                AppError::new(ErrorKind::Network, "Network error").with_internal(detail)
            }
            RemoteError::Rejected { message } => AppError::new(
                ErrorKind::Remote,
                message.clone().unwrap_or_else(|| "Request was rejected".into()),
            ),
            RemoteError::MissingData => {
                AppError::new(ErrorKind::Remote, "The server returned no data")
            }
            RemoteError::Decode { detail } => {
                AppError::new(ErrorKind::Internal, "Unexpected response from server")
                    .with_internal(detail)
            }
        }
    }
}

impl From<UrlError> for AppError {
    fn from(e: UrlError) -> Self {
        AppError::new(ErrorKind::Validation, "Invalid server address").with_internal(e.to_string())
    }
}

impl From<&ValidationError> for AppError {
    fn from(e: &ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
            .with_context("field", e.field().label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: now,
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = (now - self.created_at).num_milliseconds();
        u64::try_from(elapsed).is_ok_and(|elapsed| elapsed > self.duration_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabChipView {
    pub tab: RideTab,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterChipView {
    pub bucket: Bucket,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LocationFieldView {
    pub query: String,
    pub value: Option<String>,
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldErrorView {
    pub field: FormField,
    pub message: String,
}

/// One line of the driver or passenger timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleRowView {
    pub id: String,
    pub kind: ScheduleKind,
    pub origin: String,
    pub destination: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: ItemStatus,
    pub is_match: bool,
    pub counterpart: Option<String>,
    pub price: f64,
    pub can_cancel: bool,
}

impl From<&ScheduleItem> for ScheduleRowView {
    fn from(item: &ScheduleItem) -> Self {
        let (origin, destination) = item.route();
        Self {
            id: item.id().to_string(),
            kind: item.kind(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            scheduled_at: item.scheduled_at(),
            status: item.status(),
            is_match: item.priority() == Priority::Matched,
            counterpart: item.counterpart().map(|person| person.name.clone()),
            price: item.price(),
            can_cancel: item.is_cancellable(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub is_authenticated: bool,
    pub user_id: Option<String>,

    pub tabs: Vec<TabChipView>,
    pub filters: Vec<FilterChipView>,
    pub active_tab: RideTab,
    pub active_bucket: Bucket,
    pub phase: LoadPhase,
    pub is_loading: bool,
    pub list: TabList,
    pub rows: Vec<ScheduleRowView>,
    pub empty_message: Option<String>,
    pub pending_action: Option<String>,

    pub origin: LocationFieldView,
    pub destination: LocationFieldView,
    pub form_errors: Vec<FieldErrorView>,

    pub alert: Option<UserFacingError>,
    pub toast: Option<ToastView>,
}

fn empty_list_message(tab: RideTab, bucket: Bucket) -> String {
    let noun = match tab {
        RideTab::Driver => "rides",
        RideTab::Passenger => "bookings",
        RideTab::MyRequests => "requests",
        RideTab::MyOffers => "offers",
    };
    if bucket == Bucket::All {
        format!("No {noun} yet")
    } else {
        format!("No {noun} match \"{}\"", bucket.label())
    }
}

pub mod app {
    use chrono::FixedOffset;
    use crux_http::RequestBuilder;
    use serde::de::DeserializeOwned;
    use uuid::Uuid;

    use super::*;
    use crate::capabilities::{
        into_ack, into_remote, AckEnvelope, ApiEnvelope, Capabilities, Endpoint, HttpMethod,
        RemoteResult,
    };
    use crate::config::ApiConfig;
    use crate::event::FetchPayload;
    use crate::model::RequestToken;
    use crate::pipeline::{build_tab_list, Source};
    use crate::records::{BidsData, BookingsData, RequestsData, RidesData};
    use crate::search::LocationField;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn authorized(builder: RequestBuilder<Event>, bearer: &str) -> RequestBuilder<Event> {
            let request_id = Uuid::new_v4().to_string();
            builder
                .header("Authorization", bearer)
                .header("X-Request-Id", request_id.as_str())
        }

        fn fetch<T, F>(endpoint: &Endpoint, bearer: &str, config: &ApiConfig, caps: &Capabilities, wrap: F)
        where
            T: DeserializeOwned + Send + 'static,
            F: FnOnce(RemoteResult<T>) -> Event + Send + 'static,
        {
            let url = config.url_for(endpoint);
            Self::authorized(caps.http.get(&url), bearer)
                .expect_json::<ApiEnvelope<T>>()
                .send(move |result| wrap(into_remote(result)));
        }

        fn send_fetch(
            tab: RideTab,
            token: RequestToken,
            source: Source,
            bearer: &str,
            config: &ApiConfig,
            caps: &Capabilities,
        ) {
            let completed = move |payload: FetchPayload| Event::FetchCompleted {
                tab,
                token,
                payload: Box::new(payload),
            };

            match source {
                Source::Rides => {
                    Self::fetch(&Endpoint::DriverRides, bearer, config, caps, move |r: RemoteResult<RidesData>| {
                        completed(FetchPayload::Rides(r.map(|data| data.rides)))
                    });
                }
                Source::Bids => {
                    Self::fetch(&Endpoint::DriverBids, bearer, config, caps, move |r: RemoteResult<BidsData>| {
                        completed(FetchPayload::Bids(r.map(|data| data.bids)))
                    });
                }
                Source::Bookings => {
                    Self::fetch(
                        &Endpoint::PassengerBookings,
                        bearer,
                        config,
                        caps,
                        move |r: RemoteResult<BookingsData>| {
                            completed(FetchPayload::Bookings(r.map(|data| data.bookings)))
                        },
                    );
                }
                Source::Requests => {
                    Self::fetch(
                        &Endpoint::PassengerRequests,
                        bearer,
                        config,
                        caps,
                        move |r: RemoteResult<RequestsData>| {
                            completed(FetchPayload::Requests(r.map(|data| data.requests)))
                        },
                    );
                }
            }
        }

        /// Issues a fresh token for `tab` and fires every fetch it needs.
        fn load_tab(tab: RideTab, model: &mut Model, caps: &Capabilities) {
            let Some(bearer) = model.bearer() else {
                tracing::warn!(tab = tab.id(), "load requested without a session");
                model.show_alert(AppError::new(ErrorKind::Authentication, "Not signed in"));
                return;
            };

            let token = model.issue_token();
            let bucket = model.active_bucket;
            model.slot_mut(tab).begin(token, bucket);
            tracing::debug!(tab = tab.id(), token = token.value(), bucket = bucket.id(), "loading tab");

            for &source in tab.sources() {
                Self::send_fetch(tab, token, source, &bearer, &model.config, caps);
            }
        }

        fn handle_fetch(
            tab: RideTab,
            token: RequestToken,
            payload: FetchPayload,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            let now = model.local_now();
            let slot = model.slot_mut(tab);

            if !slot.is_current(token) {
                tracing::debug!(
                    tab = tab.id(),
                    token = token.value(),
                    latest = ?slot.latest_token,
                    "discarding stale response"
                );
                return;
            }

            let source = payload.source();
            if !tab.sources().contains(&source) {
                tracing::warn!(tab = tab.id(), ?source, "response for a collection this tab does not load");
                return;
            }
            if !slot.join.record(payload) {
                tracing::debug!(tab = tab.id(), ?source, "duplicate response ignored");
                return;
            }
            if !slot.join.is_complete(tab.sources()) {
                return;
            }

            match slot.join.take() {
                Ok(sources) => {
                    let outcome = build_tab_list(tab, &sources, slot.bucket, &now);
                    for skipped in &outcome.skipped {
                        tracing::warn!(tab = tab.id(), error = %skipped, "leaving request off the timeline");
                    }
                    tracing::info!(
                        tab = tab.id(),
                        token = token.value(),
                        items = outcome.list.len(),
                        "tab loaded"
                    );
                    slot.resolve(outcome.list);
                }
                Err(failures) => {
                    for (source, error) in &failures {
                        tracing::error!(tab = tab.id(), ?source, error = %error, "fetch failed");
                    }
                    slot.fail(tab);
                    model.show_toast(LOAD_FAILED_MESSAGE, ToastKind::Warning);
                }
            }

            caps.render.render();
        }

        fn start_action(action: UserAction, body: Option<Vec<u8>>, model: &mut Model, caps: &Capabilities) {
            if let Some(pending) = &model.pending_action {
                tracing::info!(pending = pending.name(), requested = action.name(), "action already in flight");
                model.show_toast(ACTION_BUSY_MESSAGE, ToastKind::Info);
                return;
            }

            let Some(bearer) = model.bearer() else {
                tracing::warn!(action = action.name(), "action requested without a session");
                model.show_alert(AppError::new(ErrorKind::Authentication, "Not signed in"));
                return;
            };

            let endpoint = action.endpoint();
            let url = model.config.url_for(&endpoint);
            let builder = match endpoint.method() {
                HttpMethod::Get => caps.http.get(&url),
                HttpMethod::Post => caps.http.post(&url),
                HttpMethod::Patch => caps.http.patch(&url),
                HttpMethod::Delete => caps.http.delete(&url),
            };

            let mut builder = Self::authorized(builder, &bearer);
            if let Some(body) = body {
                builder = builder.header("Content-Type", "application/json").body(body);
            }

            let completed = Box::new(action.clone());
            builder
                .expect_json::<AckEnvelope>()
                .send(move |result| Event::ActionCompleted {
                    action: completed,
                    result: into_ack(result),
                });

            tracing::info!(action = action.name(), method = endpoint.method().as_str(), "action sent");
            model.pending_action = Some(action);
        }

        /// Refuses locally when the item is on screen and already cancelled
        /// or otherwise not cancellable.
        fn cancel_allowed(id: &str, model: &mut Model) -> bool {
            let blocked = match &model.active_slot().list {
                TabList::Timeline(items) => items
                    .iter()
                    .any(|item| item.id() == id && !item.is_cancellable()),
                TabList::Requests(_) | TabList::Offers(_) => false,
            };
            if blocked {
                tracing::warn!(item = id, "cancel requested for an item that cannot be cancelled");
                model.show_toast(CANNOT_CANCEL_MESSAGE, ToastKind::Warning);
            }
            !blocked
        }

        fn submit<T: Serialize>(action: UserAction, draft: &T, model: &mut Model, caps: &Capabilities) {
            match serde_json::to_vec(draft) {
                Ok(body) => Self::start_action(action, Some(body), model, caps),
                Err(e) => {
                    tracing::error!(action = action.name(), error = %e, "failed to encode form");
                    model.show_alert(
                        AppError::new(ErrorKind::Internal, "Failed to encode form")
                            .with_internal(e.to_string()),
                    );
                }
            }
        }

        fn reject_form(form: &'static str, errors: Vec<ValidationError>, model: &mut Model) {
            tracing::warn!(form, errors = errors.len(), "form rejected");
            model.form_errors = errors;
        }

        fn handle_action_result(
            action: UserAction,
            result: RemoteResult<()>,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            if model.pending_action.as_ref() != Some(&action) {
                tracing::debug!(action = action.name(), "result for an action no longer pending");
                return;
            }
            model.pending_action = None;

            match result {
                Ok(()) => {
                    tracing::info!(action = action.name(), "action succeeded");
                    model.show_toast(action.success_message(), ToastKind::Success);
                    Self::load_tab(model.active_tab, model, caps);
                }
                Err(error) => {
                    tracing::error!(action = action.name(), error = %error, "action failed");
                    model.show_alert(AppError::action_failed(&action, &error));
                }
            }

            caps.render.render();
        }

        fn location_view(model: &Model, field: LocationField) -> LocationFieldView {
            let search = model.search.field(field);
            LocationFieldView {
                query: search.query.clone(),
                value: search.value.clone(),
                suggestions: search.suggestions.clone(),
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            model.update_timestamp();

            if event.is_user_initiated() {
                tracing::debug!(event = event.name(), "user event");
            }

            match event {
                Event::Configure { base_url } => {
                    match ApiConfig::new(base_url) {
                        Ok(config) => {
                            tracing::info!(host = config.base_url().host(), "api configured");
                            model.config = config;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "rejected api configuration");
                            model.show_alert(AppError::from(e));
                        }
                    }
                    caps.render.render();
                }

                Event::SessionStarted { user_id, token } => {
                    if token.is_blank() {
                        tracing::warn!(user_id = %user_id, "session started without a token");
                        model.show_alert(AppError::new(
                            ErrorKind::Authentication,
                            "Missing session token",
                        ));
                    } else {
                        tracing::info!(user_id = %user_id, "session started");
                        model.start_session(user_id, token.into_secret());
                        Self::load_tab(model.active_tab, model, caps);
                    }
                    caps.render.render();
                }

                Event::SessionEnded => {
                    tracing::info!("session ended");
                    model.end_session();
                    caps.render.render();
                }

                Event::TimeZoneChanged { utc_offset_minutes } => {
                    match utc_offset_minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
                        Some(offset) => {
                            model.utc_offset = offset;
                            if model.is_authenticated() {
                                Self::load_tab(model.active_tab, model, caps);
                            }
                        }
                        None => {
                            tracing::warn!(utc_offset_minutes, "rejected utc offset");
                            model.show_alert(AppError::new(
                                ErrorKind::Validation,
                                "Invalid time zone offset",
                            ));
                        }
                    }
                    caps.render.render();
                }

                Event::TabSelected(tab) => {
                    model.active_tab = tab;
                    model.active_bucket = Bucket::All;
                    Self::load_tab(tab, model, caps);
                    caps.render.render();
                }

                Event::FilterSelected(bucket) => {
                    let tab = model.active_tab;
                    if tab.offers(bucket) {
                        model.active_bucket = bucket;
                        Self::load_tab(tab, model, caps);
                    } else {
                        tracing::warn!(tab = tab.id(), bucket = bucket.id(), "filter not offered on tab");
                        model.show_toast(
                            format!("\"{}\" is not available on {}", bucket.label(), tab.label()),
                            ToastKind::Warning,
                        );
                    }
                    caps.render.render();
                }

                Event::RefreshRequested => {
                    Self::load_tab(model.active_tab, model, caps);
                    caps.render.render();
                }

                Event::FetchCompleted {
                    tab,
                    token,
                    payload,
                } => Self::handle_fetch(tab, token, *payload, model, caps),

                Event::AcceptBidRequested(id) => {
                    Self::start_action(UserAction::AcceptBid(id), None, model, caps);
                    caps.render.render();
                }

                Event::RejectBidRequested(id) => {
                    Self::start_action(UserAction::RejectBid(id), None, model, caps);
                    caps.render.render();
                }

                Event::CancelRideRequested(id) => {
                    if Self::cancel_allowed(id.as_str(), model) {
                        Self::start_action(UserAction::CancelRide(id), None, model, caps);
                    }
                    caps.render.render();
                }

                Event::CancelBookingRequested(id) => {
                    if Self::cancel_allowed(id.as_str(), model) {
                        Self::start_action(UserAction::CancelBooking(id), None, model, caps);
                    }
                    caps.render.render();
                }

                Event::ActionCompleted { action, result } => {
                    Self::handle_action_result(*action, result, model, caps);
                }

                Event::RideSubmitted(draft) => {
                    match draft.validate(model.now) {
                        Ok(()) => {
                            model.form_errors.clear();
                            Self::submit(UserAction::CreateRide, &*draft, model, caps);
                        }
                        Err(errors) => Self::reject_form("ride", errors, model),
                    }
                    caps.render.render();
                }

                Event::RequestSubmitted(draft) => {
                    match draft.validate(model.now) {
                        Ok(()) => {
                            model.form_errors.clear();
                            Self::submit(UserAction::CreateRequest, &*draft, model, caps);
                        }
                        Err(errors) => Self::reject_form("request", errors, model),
                    }
                    caps.render.render();
                }

                Event::BidSubmitted(draft) => {
                    match draft.validate() {
                        Ok(()) => {
                            model.form_errors.clear();
                            Self::submit(UserAction::CreateBid, &*draft, model, caps);
                        }
                        Err(errors) => Self::reject_form("bid", errors, model),
                    }
                    caps.render.render();
                }

                Event::LocationQueryChanged { field, query } => {
                    let now = model.now;
                    model.search.field_mut(field).edit(query, now);
                    caps.render.render();
                }

                Event::LocationPicked { field, name } => {
                    model.search.field_mut(field).pick(name);
                    caps.render.render();
                }

                Event::TimerTick => {
                    let now = model.now;
                    let mut changed = model.search.tick(now);

                    if model
                        .active_toast
                        .as_ref()
                        .is_some_and(|toast| toast.is_expired(now))
                    {
                        model.clear_toast();
                        changed = true;
                    }

                    if changed {
                        caps.render.render();
                    }
                }

                Event::DismissAlert => {
                    model.clear_alert();
                    caps.render.render();
                }

                Event::DismissToast => {
                    model.clear_toast();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let tab = model.active_tab;
            let slot = model.active_slot();

            let empty_message = match slot.phase {
                LoadPhase::Failed => Some(LOAD_FAILED_MESSAGE.to_string()),
                LoadPhase::Ready if slot.list.is_empty() => {
                    Some(empty_list_message(tab, slot.bucket))
                }
                _ => None,
            };

            ViewModel {
                is_authenticated: model.is_authenticated(),
                user_id: model.session.as_ref().map(|s| s.user_id.to_string()),

                tabs: RideTab::ALL
                    .iter()
                    .map(|&t| TabChipView {
                        tab: t,
                        label: t.label().to_string(),
                        selected: t == tab,
                    })
                    .collect(),
                filters: tab
                    .buckets()
                    .iter()
                    .map(|&bucket| FilterChipView {
                        bucket,
                        label: bucket.label().to_string(),
                        selected: bucket == model.active_bucket,
                    })
                    .collect(),
                active_tab: tab,
                active_bucket: model.active_bucket,
                phase: slot.phase,
                is_loading: slot.phase == LoadPhase::Loading,
                list: slot.list.clone(),
                rows: match &slot.list {
                    TabList::Timeline(items) => items.iter().map(ScheduleRowView::from).collect(),
                    TabList::Requests(_) | TabList::Offers(_) => Vec::new(),
                },
                empty_message,
                pending_action: model.pending_action.as_ref().map(|a| a.name().to_string()),

                origin: Self::location_view(model, LocationField::Origin),
                destination: Self::location_view(model, LocationField::Destination),
                form_errors: model
                    .form_errors
                    .iter()
                    .map(|e| FieldErrorView {
                        field: e.field(),
                        message: e.to_string(),
                    })
                    .collect(),

                alert: model.active_alert.as_ref().map(UserFacingError::from),
                toast: model.active_toast.as_ref().map(ToastView::from),
            }
        }
    }
}
