use thiserror::Error;

use crate::records::{Bid, RequestId, RideRequest};
use crate::schedule::{AcceptedBidRide, AcceptedRequestBooking, ItemId, ScheduleItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("request {0} has no accepted bid")]
    NoAcceptedBid(RequestId),

    #[error("request {request_id} has {accepted} accepted bids, expected exactly one")]
    AmbiguousAcceptance { request_id: RequestId, accepted: usize },
}

/// Turns an accepted bid into a confirmed ride on the driver's timeline.
///
/// Callers filter on `ACCEPTED` first; the resulting item is confirmed
/// whatever the bid's own status field says.
#[must_use]
pub fn normalize_accepted_bid(bid: &Bid) -> ScheduleItem {
    ScheduleItem::AcceptedBidAsRide(AcceptedBidRide {
        id: ItemId::for_bid(&bid.id),
        bid_id: bid.id.clone(),
        request_id: bid.request.id.clone(),
        origin: bid.request.origin.clone(),
        destination: bid.request.destination.clone(),
        departure_time: bid.request.preferred_date_time,
        price: bid.price_offer,
        passenger: bid.request.passenger.clone(),
    })
}

/// Turns a request with exactly one accepted bid into a confirmed booking on
/// the passenger's timeline.
pub fn normalize_accepted_request(request: &RideRequest) -> Result<ScheduleItem, NormalizeError> {
    let mut accepted = request.accepted_bids();

    let bid = accepted
        .next()
        .ok_or_else(|| NormalizeError::NoAcceptedBid(request.id.clone()))?;

    let extra = accepted.count();
    if extra > 0 {
        return Err(NormalizeError::AmbiguousAcceptance {
            request_id: request.id.clone(),
            accepted: extra + 1,
        });
    }

    Ok(ScheduleItem::AcceptedRequestAsBooking(AcceptedRequestBooking {
        id: ItemId::for_request(&request.id),
        request_id: request.id.clone(),
        bid_id: bid.id.clone(),
        origin: request.origin.clone(),
        destination: request.destination.clone(),
        departure_time: request.preferred_date_time,
        seats: request.seats_needed,
        price: bid.price_offer,
        driver: bid.driver.clone(),
    }))
}
