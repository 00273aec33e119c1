mod common;

use chrono::{Duration, Utc};

use common::*;
use shared::bucket::Bucket;
use shared::capabilities::RemoteError;
use shared::event::FetchPayload;
use shared::model::LoadPhase;
use shared::pipeline::{RideTab, TabList};
use shared::{Event, Model, ToastKind, LOAD_FAILED_MESSAGE};

fn timeline_ids(list: &TabList) -> Vec<String> {
    match list {
        TabList::Timeline(items) => items.iter().map(|item| item.id().to_string()).collect(),
        other => panic!("expected a timeline, got {other:?}"),
    }
}

#[test]
fn sign_in_loads_driver_tab() {
    let app = Tester::default();
    let mut model = Model::default();

    let requests = sign_in(&app, &mut model);
    assert_eq!(requests.len(), 2);

    let urls: Vec<&str> = requests.iter().map(|r| r.url.as_str()).collect();
    assert!(urls.contains(&"https://api.rideclub.app/api/v1/rides/driver/my-rides"));
    assert!(urls.contains(&"https://api.rideclub.app/api/v1/bids/driver/my-bids"));

    for request in &requests {
        assert!(request.method.eq_ignore_ascii_case("GET"));
        assert_eq!(header(request, "Authorization"), Some("Bearer test-token"));
        assert!(header(request, "X-Request-Id").is_some());
    }

    assert_eq!(model.slot(RideTab::Driver).phase, LoadPhase::Loading);
    assert!(app.view(&model).is_loading);
}

#[test]
fn refresh_without_session_sends_nothing() {
    let app = Tester::default();
    let mut model = Model::default();

    let update = app.update(Event::RefreshRequested, &mut model);
    assert!(renders(&update.effects));
    assert!(http_requests(update.effects).is_empty());

    let view = app.view(&model);
    assert!(!view.is_authenticated);
    assert_eq!(view.alert.map(|a| a.error_code), Some("AUTH_ERROR".to_string()));
}

#[test]
fn driver_tab_resolves_once_both_collections_arrive() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);

    let now = Utc::now();
    let token = latest_token(&model, RideTab::Driver);

    let rides = vec![
        ride("r1", now + Duration::days(2), "ACTIVE"),
        ride("r2", now + Duration::days(1), "CANCELLED"),
    ];
    let update = app.update(completed(RideTab::Driver, token, FetchPayload::Rides(Ok(rides))), &mut model);
    assert!(!renders(&update.effects));
    assert_eq!(model.slot(RideTab::Driver).phase, LoadPhase::Loading);

    let bids = vec![
        bid("b1", "q1", now + Duration::days(3), "ACCEPTED"),
        bid("b2", "q2", now + Duration::days(1), "PENDING"),
    ];
    let update = app.update(completed(RideTab::Driver, token, FetchPayload::Bids(Ok(bids))), &mut model);
    assert!(renders(&update.effects));

    let view = app.view(&model);
    assert_eq!(view.phase, LoadPhase::Ready);
    assert!(!view.is_loading);
    // The confirmed match sorts first even though it departs last.
    assert_eq!(timeline_ids(&view.list), vec!["bid:b1", "r2", "r1"]);
}

#[test]
fn passenger_tab_leaves_out_ambiguous_requests() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);

    let update = app.update(Event::TabSelected(RideTab::Passenger), &mut model);
    let urls: Vec<String> = http_requests(update.effects).into_iter().map(|r| r.url).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().any(|u| u.ends_with("/bookings/my-bookings")));
    assert!(urls.iter().any(|u| u.ends_with("/requests/passenger/my-requests")));

    let now = Utc::now();
    let token = latest_token(&model, RideTab::Passenger);
    let when = now + Duration::days(4);

    let requests = vec![
        request("q1", when, "CLOSED", vec![bid("b1", "q1", when, "ACCEPTED")]),
        request(
            "q2",
            when,
            "CLOSED",
            vec![bid("b2", "q2", when, "ACCEPTED"), bid("b3", "q2", when, "ACCEPTED")],
        ),
        request("q3", when, "OPEN", vec![bid("b4", "q3", when, "PENDING")]),
    ];
    app.update(completed(RideTab::Passenger, token, FetchPayload::Requests(Ok(requests))), &mut model);
    app.update(
        completed(
            RideTab::Passenger,
            token,
            FetchPayload::Bookings(Ok(vec![booking("k1", now + Duration::days(1), "CONFIRMED")])),
        ),
        &mut model,
    );

    let view = app.view(&model);
    assert_eq!(view.phase, LoadPhase::Ready);
    assert_eq!(timeline_ids(&view.list), vec!["request:q1", "k1"]);
}

#[test]
fn stale_responses_are_discarded() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    let first = latest_token(&model, RideTab::Driver);

    app.update(Event::RefreshRequested, &mut model);
    let second = latest_token(&model, RideTab::Driver);
    assert!(second > first);

    let now = Utc::now();
    let old_rides = vec![ride("old", now + Duration::days(1), "ACTIVE")];
    let update = app.update(completed(RideTab::Driver, first, FetchPayload::Rides(Ok(old_rides))), &mut model);
    assert!(!renders(&update.effects));
    app.update(completed(RideTab::Driver, first, FetchPayload::Bids(Ok(Vec::new()))), &mut model);
    assert_eq!(model.slot(RideTab::Driver).phase, LoadPhase::Loading);

    let fresh = vec![ride("new", now + Duration::days(1), "ACTIVE")];
    app.update(completed(RideTab::Driver, second, FetchPayload::Rides(Ok(fresh))), &mut model);
    app.update(completed(RideTab::Driver, second, FetchPayload::Bids(Ok(Vec::new()))), &mut model);

    assert_eq!(timeline_ids(&app.view(&model).list), vec!["new"]);
}

#[test]
fn failed_fetch_empties_list_with_one_notice() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    let token = latest_token(&model, RideTab::Driver);

    let offline = || RemoteError::Transport {
        detail: "offline".into(),
    };
    app.update(completed(RideTab::Driver, token, FetchPayload::Rides(Err(offline()))), &mut model);
    assert!(model.active_toast.is_none());
    app.update(completed(RideTab::Driver, token, FetchPayload::Bids(Err(offline()))), &mut model);

    let view = app.view(&model);
    assert_eq!(view.phase, LoadPhase::Failed);
    assert!(view.list.is_empty());
    assert_eq!(view.empty_message.as_deref(), Some(LOAD_FAILED_MESSAGE));
    assert!(view.alert.is_none());

    let toast = view.toast.unwrap();
    assert_eq!(toast.kind, ToastKind::Warning);
    assert_eq!(toast.message, LOAD_FAILED_MESSAGE);
}

#[test]
fn one_failed_collection_fails_the_whole_tab() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    let token = latest_token(&model, RideTab::Driver);

    let rides = vec![ride("r1", Utc::now() + Duration::days(1), "ACTIVE")];
    app.update(completed(RideTab::Driver, token, FetchPayload::Rides(Ok(rides))), &mut model);
    app.update(
        completed(
            RideTab::Driver,
            token,
            FetchPayload::Bids(Err(RemoteError::Rejected {
                message: Some("Unauthorized".into()),
            })),
        ),
        &mut model,
    );

    assert_eq!(model.slot(RideTab::Driver).phase, LoadPhase::Failed);
    assert!(model.slot(RideTab::Driver).list.is_empty());

    // Next trigger recovers.
    let update = app.update(Event::RefreshRequested, &mut model);
    assert_eq!(http_requests(update.effects).len(), 2);
    assert_eq!(model.slot(RideTab::Driver).phase, LoadPhase::Loading);
}

#[test]
fn filter_not_on_tab_is_rejected() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);

    let update = app.update(Event::FilterSelected(Bucket::Pending), &mut model);
    assert!(http_requests(update.effects).is_empty());
    assert_eq!(model.active_bucket, Bucket::All);
    assert_eq!(model.active_toast.as_ref().map(|t| t.kind), Some(ToastKind::Warning));
}

#[test]
fn request_tab_filters_by_status() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);

    app.update(Event::TabSelected(RideTab::MyRequests), &mut model);
    let update = app.update(Event::FilterSelected(Bucket::Open), &mut model);
    let requests = http_requests(update.effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.ends_with("/requests/passenger/my-requests"));

    let now = Utc::now();
    let token = latest_token(&model, RideTab::MyRequests);
    let payload = vec![
        request("q1", now + Duration::days(1), "OPEN", Vec::new()),
        request("q2", now + Duration::days(2), "CLOSED", Vec::new()),
        request("q3", now + Duration::days(3), "OPEN", Vec::new()),
    ];
    app.update(completed(RideTab::MyRequests, token, FetchPayload::Requests(Ok(payload))), &mut model);

    let view = app.view(&model);
    assert_eq!(view.active_bucket, Bucket::Open);
    assert!(view.filters.iter().any(|chip| chip.bucket == Bucket::Open && chip.selected));
    match view.list {
        TabList::Requests(items) => {
            let ids: Vec<&str> = items.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["q1", "q3"]);
        }
        other => panic!("expected requests, got {other:?}"),
    }
}

#[test]
fn switching_tabs_resets_filter() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);

    app.update(Event::FilterSelected(Bucket::Upcoming), &mut model);
    assert_eq!(model.active_bucket, Bucket::Upcoming);

    let update = app.update(Event::TabSelected(RideTab::MyOffers), &mut model);
    let requests = http_requests(update.effects);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.ends_with("/bids/driver/my-bids"));
    assert_eq!(model.active_bucket, Bucket::All);
    assert_eq!(app.view(&model).filters.len(), RideTab::MyOffers.buckets().len());
}

#[test]
fn ending_session_drops_late_responses() {
    let app = Tester::default();
    let mut model = Model::default();
    sign_in(&app, &mut model);
    let token = latest_token(&model, RideTab::Driver);

    app.update(Event::SessionEnded, &mut model);
    assert!(!model.is_authenticated());

    let rides = vec![ride("r1", Utc::now() + Duration::days(1), "ACTIVE")];
    let update = app.update(completed(RideTab::Driver, token, FetchPayload::Rides(Ok(rides))), &mut model);
    assert!(!renders(&update.effects));
    assert_eq!(model.slot(RideTab::Driver).phase, LoadPhase::Idle);
    assert!(model.slot(RideTab::Driver).list.is_empty());
}

#[test]
fn configure_changes_base_url() {
    let app = Tester::default();
    let mut model = Model::default();

    app.update(
        Event::Configure {
            base_url: "http://localhost:3000/api/v1".into(),
        },
        &mut model,
    );
    let requests = sign_in(&app, &mut model);
    assert!(requests
        .iter()
        .all(|r| r.url.starts_with("http://localhost:3000/api/v1/")));

    app.update(
        Event::Configure {
            base_url: "ftp://nope".into(),
        },
        &mut model,
    );
    assert_eq!(model.config.base_url().host(), "localhost");
    assert_eq!(
        app.view(&model).alert.map(|a| a.error_code),
        Some("VALIDATION_ERROR".to_string())
    );
}
