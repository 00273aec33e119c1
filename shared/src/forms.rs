//! Create-ride, create-request and place-bid forms.
//!
//! Validation is pure and collects every failing field so the shell can
//! mark them all at once. Nothing is sent while any error remains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::records::RequestId;

pub const MAX_PLACE_LEN: usize = 120;
pub const MAX_MESSAGE_LEN: usize = 500;
pub const MIN_SEATS: u32 = 1;
pub const MAX_SEATS: u32 = 8;
pub const MAX_PRICE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Origin,
    Destination,
    DepartureTime,
    PreferredDateTime,
    ExpiresAt,
    AvailableSeats,
    SeatsNeeded,
    PricePerSeat,
    MaxPrice,
    PriceOffer,
    RequestId,
    Message,
}

impl FormField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Origin => "Origin",
            Self::Destination => "Destination",
            Self::DepartureTime => "Departure time",
            Self::PreferredDateTime => "Preferred time",
            Self::ExpiresAt => "Expiry",
            Self::AvailableSeats => "Available seats",
            Self::SeatsNeeded => "Seats needed",
            Self::PricePerSeat => "Price per seat",
            Self::MaxPrice => "Maximum price",
            Self::PriceOffer => "Price offer",
            Self::RequestId => "Request",
            Self::Message => "Message",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(FormField),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: FormField, max: usize },

    #[error("Origin and destination must be different")]
    SameEndpoints,

    #[error("{0} must be in the future")]
    NotInFuture(FormField),

    #[error("{field} must be between {min} and {max}")]
    SeatsOutOfRange { field: FormField, min: u32, max: u32 },

    #[error("{0} must be greater than 0 and at most 10000")]
    InvalidPrice(FormField),

    #[error("Expiry must not be after the preferred time")]
    ExpiresAfterPreferredTime,
}

impl ValidationError {
    /// The field the shell should highlight.
    pub fn field(&self) -> FormField {
        match self {
            Self::Required(field)
            | Self::NotInFuture(field)
            | Self::InvalidPrice(field)
            | Self::TooLong { field, .. }
            | Self::SeatsOutOfRange { field, .. } => *field,
            Self::SameEndpoints => FormField::Destination,
            Self::ExpiresAfterPreferredTime => FormField::ExpiresAt,
        }
    }
}

fn check_place(value: &str, field: FormField, errors: &mut Vec<ValidationError>) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(ValidationError::Required(field));
    } else if trimmed.chars().count() > MAX_PLACE_LEN {
        errors.push(ValidationError::TooLong {
            field,
            max: MAX_PLACE_LEN,
        });
    }
}

fn check_route(origin: &str, destination: &str, errors: &mut Vec<ValidationError>) {
    check_place(origin, FormField::Origin, errors);
    check_place(destination, FormField::Destination, errors);

    let (origin, destination) = (origin.trim(), destination.trim());
    if !origin.is_empty() && origin.to_lowercase() == destination.to_lowercase() {
        errors.push(ValidationError::SameEndpoints);
    }
}

fn check_future(at: DateTime<Utc>, now: DateTime<Utc>, field: FormField, errors: &mut Vec<ValidationError>) {
    if at <= now {
        errors.push(ValidationError::NotInFuture(field));
    }
}

fn check_seats(seats: u32, field: FormField, errors: &mut Vec<ValidationError>) {
    if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
        errors.push(ValidationError::SeatsOutOfRange {
            field,
            min: MIN_SEATS,
            max: MAX_SEATS,
        });
    }
}

fn check_price(price: f64, field: FormField, errors: &mut Vec<ValidationError>) {
    // Also rejects NaN.
    if !(price > 0.0 && price <= MAX_PRICE) {
        errors.push(ValidationError::InvalidPrice(field));
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A driver offering seats on a trip. Body of `POST /rides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideDraft {
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: u32,
    pub price_per_seat: f64,
}

impl RideDraft {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_route(&self.origin, &self.destination, &mut errors);
        check_future(self.departure_time, now, FormField::DepartureTime, &mut errors);
        check_seats(self.available_seats, FormField::AvailableSeats, &mut errors);
        check_price(self.price_per_seat, FormField::PricePerSeat, &mut errors);
        finish(errors)
    }
}

/// A passenger asking for a ride. Body of `POST /requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub origin: String,
    pub destination: String,
    pub preferred_date_time: DateTime<Utc>,
    pub seats_needed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RequestDraft {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_route(&self.origin, &self.destination, &mut errors);
        check_future(self.preferred_date_time, now, FormField::PreferredDateTime, &mut errors);
        check_seats(self.seats_needed, FormField::SeatsNeeded, &mut errors);
        if let Some(max_price) = self.max_price {
            check_price(max_price, FormField::MaxPrice, &mut errors);
        }
        if let Some(expires_at) = self.expires_at {
            check_future(expires_at, now, FormField::ExpiresAt, &mut errors);
            if expires_at > self.preferred_date_time {
                errors.push(ValidationError::ExpiresAfterPreferredTime);
            }
        }
        finish(errors)
    }
}

/// A driver's offer on an open request. Body of `POST /bids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidDraft {
    pub request_id: RequestId,
    pub price_offer: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BidDraft {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.request_id.as_str().trim().is_empty() {
            errors.push(ValidationError::Required(FormField::RequestId));
        }
        check_price(self.price_offer, FormField::PriceOffer, &mut errors);
        if let Some(message) = &self.message {
            if message.chars().count() > MAX_MESSAGE_LEN {
                errors.push(ValidationError::TooLong {
                    field: FormField::Message,
                    max: MAX_MESSAGE_LEN,
                });
            }
        }
        finish(errors)
    }
}
