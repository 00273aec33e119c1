mod common;

use chrono::{Duration, Utc};

use common::*;
use shared::capabilities::RemoteError;
use shared::event::FetchPayload;
use shared::forms::{BidDraft, FormField, RideDraft};
use shared::model::UserAction;
use shared::pipeline::RideTab;
use shared::records::{BidId, BookingId, RequestId, RideId};
use shared::search::LocationField;
use shared::{Event, Model, ToastKind, ACTION_BUSY_MESSAGE, CANNOT_CANCEL_MESSAGE};

fn action_completed(action: UserAction, result: Result<(), RemoteError>) -> Event {
    Event::ActionCompleted {
        action: Box::new(action),
        result,
    }
}

fn signed_in() -> (Tester, Model) {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    (app, model)
}

#[test]
fn accept_bid_success_reloads_active_tab() {
    let (app, mut model) = signed_in();
    let before = latest_token(&model, RideTab::Driver);

    let update = app.update(Event::AcceptBidRequested(BidId::new("b1")), &mut model);
    let requests = http_requests(update.effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].method.eq_ignore_ascii_case("PATCH"));
    assert!(requests[0].url.ends_with("/bids/b1/accept"));
    assert_eq!(header(&requests[0], "Authorization"), Some("Bearer test-token"));
    assert_eq!(app.view(&model).pending_action.as_deref(), Some("accept_bid"));

    let update = app.update(
        action_completed(UserAction::AcceptBid(BidId::new("b1")), Ok(())),
        &mut model,
    );
    assert!(renders(&update.effects));
    assert_eq!(http_requests(update.effects).len(), 2);
    assert!(latest_token(&model, RideTab::Driver) > before);

    let view = app.view(&model);
    assert!(view.pending_action.is_none());
    let toast = view.toast.unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Bid accepted");
}

#[test]
fn failure_shows_server_message_and_leaves_list_alone() {
    let (app, mut model) = signed_in();
    let slot_before = model.slot(RideTab::Driver).clone();

    app.update(Event::RejectBidRequested(BidId::new("b2")), &mut model);
    let update = app.update(
        action_completed(
            UserAction::RejectBid(BidId::new("b2")),
            Err(RemoteError::Rejected {
                message: Some("Bid is no longer pending".into()),
            }),
        ),
        &mut model,
    );
    assert!(http_requests(update.effects).is_empty());
    assert_eq!(model.slot(RideTab::Driver), &slot_before);

    let alert = app.view(&model).alert.unwrap();
    assert_eq!(alert.message, "Bid is no longer pending");
    assert!(model.pending_action.is_none());

    app.update(Event::DismissAlert, &mut model);
    assert!(app.view(&model).alert.is_none());
}

#[test]
fn failure_without_server_message_uses_fallback() {
    let (app, mut model) = signed_in();

    let update = app.update(Event::CancelRideRequested(RideId::new("r1")), &mut model);
    let requests = http_requests(update.effects);
    assert!(requests[0].method.eq_ignore_ascii_case("DELETE"));
    assert!(requests[0].url.ends_with("/rides/r1"));

    app.update(
        action_completed(
            UserAction::CancelRide(RideId::new("r1")),
            Err(RemoteError::Transport {
                detail: "connection reset".into(),
            }),
        ),
        &mut model,
    );

    let alert = app.view(&model).alert.unwrap();
    assert_eq!(alert.message, "Failed to cancel ride");
    assert!(alert.is_transient);
}

#[test]
fn only_one_action_in_flight() {
    let (app, mut model) = signed_in();

    app.update(Event::CancelBookingRequested(BookingId::new("k1")), &mut model);
    let update = app.update(Event::CancelBookingRequested(BookingId::new("k2")), &mut model);
    assert!(http_requests(update.effects).is_empty());

    let toast = model.active_toast.as_ref().unwrap();
    assert_eq!(toast.kind, ToastKind::Info);
    assert_eq!(toast.message, ACTION_BUSY_MESSAGE);
    assert_eq!(
        model.pending_action,
        Some(UserAction::CancelBooking(BookingId::new("k1")))
    );
}

#[test]
fn result_for_unknown_action_is_ignored() {
    let (app, mut model) = signed_in();

    let update = app.update(
        action_completed(UserAction::AcceptBid(BidId::new("zz")), Ok(())),
        &mut model,
    );
    assert!(http_requests(update.effects).is_empty());
    assert!(model.active_toast.is_none());
}

#[test]
fn actions_need_a_session() {
    let app = Tester::default();
    let mut model = Model::default();

    let update = app.update(Event::AcceptBidRequested(BidId::new("b1")), &mut model);
    assert!(http_requests(update.effects).is_empty());
    assert!(model.pending_action.is_none());
    assert_eq!(
        app.view(&model).alert.map(|a| a.error_code),
        Some("AUTH_ERROR".to_string())
    );
}

#[test]
fn invalid_ride_form_is_not_sent() {
    let (app, mut model) = signed_in();

    let draft = RideDraft {
        origin: "Halifax".into(),
        destination: "halifax".into(),
        departure_time: Utc::now() - Duration::hours(1),
        available_seats: 2,
        price_per_seat: 20.0,
    };
    let update = app.update(Event::RideSubmitted(Box::new(draft)), &mut model);
    assert!(http_requests(update.effects).is_empty());

    let fields: Vec<FormField> = app.view(&model).form_errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec![FormField::Destination, FormField::DepartureTime]);
    assert!(model.pending_action.is_none());
}

#[test]
fn valid_ride_form_posts_json() {
    let (app, mut model) = signed_in();

    let draft = RideDraft {
        origin: "Halifax".into(),
        destination: "Truro".into(),
        departure_time: Utc::now() + Duration::days(1),
        available_seats: 2,
        price_per_seat: 20.0,
    };
    let update = app.update(Event::RideSubmitted(Box::new(draft)), &mut model);
    let requests = http_requests(update.effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].method.eq_ignore_ascii_case("POST"));
    assert!(requests[0].url.ends_with("/rides"));
    assert_eq!(header(&requests[0], "Content-Type"), Some("application/json"));

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["origin"], "Halifax");
    assert_eq!(body["availableSeats"], 2);

    assert!(app.view(&model).form_errors.is_empty());
    assert_eq!(model.pending_action, Some(UserAction::CreateRide));
}

#[test]
fn bid_form_posts_to_bids() {
    let (app, mut model) = signed_in();

    let draft = BidDraft {
        request_id: RequestId::new("q9"),
        price_offer: 35.0,
        message: None,
    };
    let update = app.update(Event::BidSubmitted(Box::new(draft)), &mut model);
    let requests = http_requests(update.effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.ends_with("/bids"));

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["requestId"], "q9");
    assert!(body.get("message").is_none());

    app.update(action_completed(UserAction::CreateBid, Ok(())), &mut model);
    assert_eq!(model.active_toast.as_ref().map(|t| t.message.as_str()), Some("Bid placed"));
}

#[test]
fn location_search_wires_query_and_pick() {
    let app = Tester::default();
    let mut model = Model::default();

    app.update(
        Event::LocationQueryChanged {
            field: LocationField::Origin,
            query: "hali".into(),
        },
        &mut model,
    );
    // Still inside the debounce window.
    app.update(Event::TimerTick, &mut model);
    let view = app.view(&model);
    assert_eq!(view.origin.query, "hali");
    assert!(view.origin.suggestions.is_empty());
    assert!(model.search.field(LocationField::Origin).is_pending());

    app.update(
        Event::LocationPicked {
            field: LocationField::Origin,
            name: "Halifax".into(),
        },
        &mut model,
    );
    let view = app.view(&model);
    assert_eq!(view.origin.value.as_deref(), Some("Halifax"));
    assert!(view.origin.suggestions.is_empty());
    assert!(view.destination.query.is_empty());
}

#[test]
fn cancelled_item_on_screen_is_not_sent() {
    let (app, mut model) = signed_in();
    let token = latest_token(&model, RideTab::Driver);
    let when = Utc::now() + Duration::days(1);

    app.update(
        completed(
            RideTab::Driver,
            token,
            FetchPayload::Rides(Ok(vec![ride("r1", when, "CANCELLED"), ride("r2", when, "ACTIVE")])),
        ),
        &mut model,
    );
    app.update(completed(RideTab::Driver, token, FetchPayload::Bids(Ok(Vec::new()))), &mut model);

    let rows = app.view(&model).rows;
    assert_eq!(rows.iter().filter(|row| row.can_cancel).count(), 1);

    let update = app.update(Event::CancelRideRequested(RideId::new("r1")), &mut model);
    assert!(http_requests(update.effects).is_empty());
    assert!(model.pending_action.is_none());
    assert_eq!(
        model.active_toast.as_ref().map(|t| t.message.as_str()),
        Some(CANNOT_CANCEL_MESSAGE)
    );

    let update = app.update(Event::CancelRideRequested(RideId::new("r2")), &mut model);
    assert_eq!(http_requests(update.effects).len(), 1);
}
