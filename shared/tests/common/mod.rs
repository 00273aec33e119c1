#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use serde_json::{json, Value};

use shared::event::{FetchPayload, SessionToken};
use shared::model::RequestToken;
use shared::pipeline::RideTab;
use shared::records::{Bid, Booking, Ride, RideRequest, UserId};
use shared::{App, Effect, Event, Model};

pub type Tester = AppTester<App, Effect>;

pub fn ride(id: &str, departure: DateTime<Utc>, status: &str) -> Ride {
    serde_json::from_value(json!({
        "id": id,
        "origin": "Halifax",
        "destination": "Moncton",
        "departureTime": departure,
        "availableSeats": 3,
        "pricePerSeat": 25.0,
        "status": status,
    }))
    .unwrap()
}

pub fn booking(id: &str, departure: DateTime<Utc>, status: &str) -> Booking {
    serde_json::from_value(json!({
        "id": id,
        "status": status,
        "seatsBooked": 1,
        "totalPrice": 25.0,
        "ride": {
            "id": format!("ride-of-{id}"),
            "origin": "Halifax",
            "destination": "Truro",
            "departureTime": departure,
        },
    }))
    .unwrap()
}

pub fn bid(id: &str, request_id: &str, preferred: DateTime<Utc>, status: &str) -> Bid {
    serde_json::from_value(json!({
        "id": id,
        "status": status,
        "priceOffer": 30.0,
        "createdAt": preferred - Duration::days(2),
        "driver": { "id": "d1", "name": "Dana" },
        "request": {
            "id": request_id,
            "origin": "Sydney",
            "destination": "Halifax",
            "preferredDateTime": preferred,
            "passenger": { "id": "p1", "name": "Sam" },
        },
    }))
    .unwrap()
}

pub fn request(id: &str, preferred: DateTime<Utc>, status: &str, bids: Vec<Bid>) -> RideRequest {
    serde_json::from_value(json!({
        "id": id,
        "origin": "Sydney",
        "destination": "Halifax",
        "preferredDateTime": preferred,
        "seatsNeeded": 1,
        "status": status,
        "bids": bids,
    }))
    .unwrap()
}

pub fn http_requests(effects: Vec<Effect>) -> Vec<HttpRequest> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request.operation),
            _ => None,
        })
        .collect()
}

/// Like `http_requests`, but keeps the requests resolvable.
pub fn pending_http(effects: Vec<Effect>) -> Vec<Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

/// Takes the request whose URL ends with `suffix` out of `requests`.
pub fn take_request(requests: &mut Vec<Request<HttpRequest>>, suffix: &str) -> Request<HttpRequest> {
    let index = requests
        .iter()
        .position(|r| r.operation.url.ends_with(suffix))
        .unwrap_or_else(|| panic!("no request for {suffix}"));
    requests.remove(index)
}

pub fn json_reply(status: u16, body: Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).json(body).build())
}

pub fn raw_reply(status: u16, body: &[u8]) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).body(body.to_vec()).build())
}

/// Answers `request` as the shell would and runs the events it produces.
pub fn reply(app: &Tester, model: &mut Model, mut request: Request<HttpRequest>, result: HttpResult) -> Vec<Effect> {
    let update = app.resolve(&mut request, result).unwrap();
    let mut effects = update.effects;
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

pub fn renders(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| matches!(effect, Effect::Render(_)))
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Signs in and returns the HTTP requests fired for the initial load.
pub fn sign_in(app: &Tester, model: &mut Model) -> Vec<HttpRequest> {
    let update = app.update(
        Event::SessionStarted {
            user_id: UserId::new("u1"),
            token: SessionToken::new("test-token"),
        },
        model,
    );
    http_requests(update.effects)
}

pub fn latest_token(model: &Model, tab: RideTab) -> RequestToken {
    model.slot(tab).latest_token.unwrap()
}

pub fn completed(tab: RideTab, token: RequestToken, payload: FetchPayload) -> Event {
    Event::FetchCompleted {
        tab,
        token,
        payload: Box::new(payload),
    }
}
