//! Normalize, merge, filter and sort: the list that a "My Rides" tab shows.
//!
//! Every function here takes its inputs by reference and returns a fresh
//! vector. Fetched collections are never reordered or trimmed in place.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::bucket::{classify, Bucket};
use crate::normalize::{normalize_accepted_bid, normalize_accepted_request, NormalizeError};
use crate::records::{Bid, Booking, Ride, RideRequest};
use crate::schedule::{Schedulable, ScheduleItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RideTab {
    #[default]
    Driver,
    Passenger,
    MyRequests,
    MyOffers,
}

const TIMELINE_BUCKETS: &[Bucket] = &[
    Bucket::All,
    Bucket::Today,
    Bucket::ThisWeek,
    Bucket::ThisMonth,
    Bucket::Upcoming,
    Bucket::Completed,
    Bucket::Cancelled,
];

const REQUEST_BUCKETS: &[Bucket] = &[
    Bucket::All,
    Bucket::Open,
    Bucket::Closed,
    Bucket::Expired,
    Bucket::Today,
    Bucket::ThisWeek,
    Bucket::ThisMonth,
];

const OFFER_BUCKETS: &[Bucket] = &[
    Bucket::All,
    Bucket::Pending,
    Bucket::Accepted,
    Bucket::Rejected,
    Bucket::Today,
    Bucket::ThisWeek,
    Bucket::ThisMonth,
];

impl RideTab {
    pub const ALL: [RideTab; 4] = [Self::Driver, Self::Passenger, Self::MyRequests, Self::MyOffers];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Passenger => "passenger",
            Self::MyRequests => "my_requests",
            Self::MyOffers => "my_offers",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Driver => "As Driver",
            Self::Passenger => "As Passenger",
            Self::MyRequests => "My Requests",
            Self::MyOffers => "My Offers",
        }
    }

    /// Filter chips offered on this tab, in display order.
    #[must_use]
    pub const fn buckets(self) -> &'static [Bucket] {
        match self {
            Self::Driver | Self::Passenger => TIMELINE_BUCKETS,
            Self::MyRequests => REQUEST_BUCKETS,
            Self::MyOffers => OFFER_BUCKETS,
        }
    }

    #[must_use]
    pub fn offers(self, bucket: Bucket) -> bool {
        self.buckets().contains(&bucket)
    }

    #[must_use]
    pub const fn sources(self) -> &'static [Source] {
        match self {
            Self::Driver => &[Source::Rides, Source::Bids],
            Self::Passenger => &[Source::Bookings, Source::Requests],
            Self::MyRequests => &[Source::Requests],
            Self::MyOffers => &[Source::Bids],
        }
    }
}

impl fmt::Display for RideTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One remote collection a tab is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Rides,
    Bids,
    Bookings,
    Requests,
}

/// Collections fetched for one load of one tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabSources {
    pub rides: Vec<Ride>,
    pub bids: Vec<Bid>,
    pub bookings: Vec<Booking>,
    pub requests: Vec<RideRequest>,
}

/// What a tab displays, already filtered and ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum TabList {
    Timeline(Vec<ScheduleItem>),
    Requests(Vec<RideRequest>),
    Offers(Vec<Bid>),
}

impl TabList {
    #[must_use]
    pub fn empty_for(tab: RideTab) -> Self {
        match tab {
            RideTab::Driver | RideTab::Passenger => Self::Timeline(Vec::new()),
            RideTab::MyRequests => Self::Requests(Vec::new()),
            RideTab::MyOffers => Self::Offers(Vec::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Timeline(items) => items.len(),
            Self::Requests(items) => items.len(),
            Self::Offers(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabOutcome {
    pub list: TabList,
    /// Requests that could not be placed on the timeline.
    pub skipped: Vec<NormalizeError>,
}

/// Concatenation. The inputs are disjoint by construction, so no dedup.
#[must_use]
pub fn merge(primary: Vec<ScheduleItem>, derived: Vec<ScheduleItem>) -> Vec<ScheduleItem> {
    let mut merged = primary;
    merged.extend(derived);
    merged
}

/// Priority rank first, then soonest first.
pub fn compare<T: Schedulable + ?Sized>(a: &T, b: &T) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.scheduled_at().cmp(&b.scheduled_at()))
}

/// Stable: equal keys keep their input order.
pub fn sort_by_priority<T: Schedulable>(items: &mut [T]) {
    items.sort_by(|a, b| compare(a, b));
}

pub fn apply_filter<T, Tz>(items: &[T], bucket: Bucket, now: &DateTime<Tz>) -> Vec<T>
where
    T: Schedulable + Clone,
    Tz: TimeZone,
{
    items
        .iter()
        .filter(|item| classify(*item, bucket, now))
        .cloned()
        .collect()
}

/// Posted rides plus accepted bids shown as rides.
#[must_use]
pub fn driver_timeline(rides: &[Ride], bids: &[Bid]) -> Vec<ScheduleItem> {
    let primary = rides.iter().cloned().map(ScheduleItem::PostedRide).collect();
    let derived = bids
        .iter()
        .filter(|bid| bid.is_accepted())
        .map(normalize_accepted_bid)
        .collect();
    merge(primary, derived)
}

/// Bookings plus accepted requests shown as bookings. Requests that fail to
/// normalize are returned next to the list.
#[must_use]
pub fn passenger_timeline(
    bookings: &[Booking],
    requests: &[RideRequest],
) -> (Vec<ScheduleItem>, Vec<NormalizeError>) {
    let primary = bookings.iter().cloned().map(ScheduleItem::Booking).collect();

    let mut derived = Vec::new();
    let mut skipped = Vec::new();
    for request in requests.iter().filter(|r| r.has_accepted_bid()) {
        match normalize_accepted_request(request) {
            Ok(item) => derived.push(item),
            Err(e) => skipped.push(e),
        }
    }

    (merge(primary, derived), skipped)
}

/// Runs the whole pipeline for one tab.
pub fn build_tab_list<Tz: TimeZone>(
    tab: RideTab,
    sources: &TabSources,
    bucket: Bucket,
    now: &DateTime<Tz>,
) -> TabOutcome {
    match tab {
        RideTab::Driver => {
            let timeline = driver_timeline(&sources.rides, &sources.bids);
            let mut items = apply_filter(&timeline, bucket, now);
            sort_by_priority(&mut items);
            TabOutcome {
                list: TabList::Timeline(items),
                skipped: Vec::new(),
            }
        }
        RideTab::Passenger => {
            let (timeline, skipped) = passenger_timeline(&sources.bookings, &sources.requests);
            let mut items = apply_filter(&timeline, bucket, now);
            sort_by_priority(&mut items);
            TabOutcome {
                list: TabList::Timeline(items),
                skipped,
            }
        }
        RideTab::MyRequests => {
            let mut items = apply_filter(&sources.requests, bucket, now);
            sort_by_priority(&mut items);
            TabOutcome {
                list: TabList::Requests(items),
                skipped: Vec::new(),
            }
        }
        RideTab::MyOffers => {
            let mut items = apply_filter(&sources.bids, bucket, now);
            sort_by_priority(&mut items);
            TabOutcome {
                list: TabList::Offers(items),
                skipped: Vec::new(),
            }
        }
    }
}
