//! Named list filters ("buckets") and the classifier that decides membership.
//!
//! The classifier never reads the clock: `now` is always passed in. Calendar
//! buckets compare local dates in `now`'s time zone, so a phone set to
//! Atlantic time sees the same "today" as its user does.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::records::ItemStatus;
use crate::schedule::Schedulable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
    Upcoming,
    Completed,
    Cancelled,
    Open,
    Closed,
    Expired,
    Pending,
    Accepted,
    Rejected,
}

impl Bucket {
    pub const ALL: [Bucket; 13] = [
        Self::All,
        Self::Today,
        Self::ThisWeek,
        Self::ThisMonth,
        Self::Upcoming,
        Self::Completed,
        Self::Cancelled,
        Self::Open,
        Self::Closed,
        Self::Expired,
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Expired => "expired",
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Today => "Today",
            Self::ThisWeek => "This week",
            Self::ThisMonth => "This month",
            Self::Upcoming => "Upcoming",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Expired => "Expired",
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    /// Status the bucket matches exactly, for the status-only buckets.
    #[must_use]
    pub const fn exact_status(self) -> Option<ItemStatus> {
        match self {
            Self::Open => Some(ItemStatus::Open),
            Self::Closed => Some(ItemStatus::Closed),
            Self::Pending => Some(ItemStatus::Pending),
            Self::Accepted => Some(ItemStatus::Accepted),
            Self::Rejected => Some(ItemStatus::Rejected),
            _ => None,
        }
    }

    /// Buckets that only look at request/bid status (plus expiry), never at
    /// the scheduled date.
    #[must_use]
    pub const fn is_status_specific(self) -> bool {
        matches!(
            self,
            Self::Open | Self::Closed | Self::Expired | Self::Pending | Self::Accepted | Self::Rejected
        )
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Sunday on or before `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Whether `item` belongs to `bucket` at instant `now`.
pub fn classify<T, Tz>(item: &T, bucket: Bucket, now: &DateTime<Tz>) -> bool
where
    T: Schedulable + ?Sized,
    Tz: TimeZone,
{
    let scheduled = item.scheduled_at();
    let status = item.status();

    match bucket {
        Bucket::All => true,
        Bucket::Today => {
            let day = scheduled.with_timezone(&now.timezone()).date_naive();
            day == now.date_naive()
        }
        Bucket::ThisWeek => {
            let day = scheduled.with_timezone(&now.timezone()).date_naive();
            let start = week_start(now.date_naive());
            day >= start && day < start + Duration::days(7)
        }
        Bucket::ThisMonth => {
            let day = scheduled.with_timezone(&now.timezone()).date_naive();
            let today = now.date_naive();
            day.year() == today.year() && day.month() == today.month()
        }
        Bucket::Upcoming => scheduled > *now && !status.is_excluded(),
        Bucket::Completed => scheduled <= *now && !status.is_excluded(),
        Bucket::Cancelled => status == ItemStatus::Cancelled,
        Bucket::Expired => {
            status == ItemStatus::Open && item.expires_at().is_some_and(|at| at < *now)
        }
        Bucket::Open | Bucket::Closed | Bucket::Pending | Bucket::Accepted | Bucket::Rejected => {
            bucket.exact_status() == Some(status)
        }
    }
}
