//! Debounced place-name autocomplete for the origin and destination fields.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_SUGGESTIONS: usize = 8;
pub const SEARCH_DEBOUNCE_MS: i64 = 300;

/// Places the ride forms can suggest.
pub const LOCATIONS: &[&str] = &[
    "Halifax",
    "Dartmouth",
    "Bedford",
    "Sackville",
    "Truro",
    "New Glasgow",
    "Antigonish",
    "Sydney",
    "Glace Bay",
    "Port Hawkesbury",
    "Wolfville",
    "Kentville",
    "Windsor",
    "Lunenburg",
    "Bridgewater",
    "Yarmouth",
    "Digby",
    "Amherst",
    "Moncton",
    "Dieppe",
    "Saint John",
    "Fredericton",
    "Sackville NB",
    "Charlottetown",
    "Summerside",
    "Halifax Stanfield International Airport",
];

/// Case-insensitive substring match over `catalog`, in catalog order.
pub fn search_locations(query: &str, catalog: &[&str], limit: usize) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(limit)
        .map(|name| (*name).to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationField {
    Origin,
    Destination,
}

/// One autocomplete box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationSearch {
    pub query: String,
    pub value: Option<String>,
    pub suggestions: Vec<String>,
    edited_at: Option<DateTime<Utc>>,
}

impl LocationSearch {
    pub fn edit(&mut self, query: String, now: DateTime<Utc>) {
        self.query = query;
        self.value = None;
        self.edited_at = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Runs the search once the query has been quiet long enough.
    /// Returns whether suggestions were recomputed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let Some(edited_at) = self.edited_at else {
            return false;
        };
        if now - edited_at < Duration::milliseconds(SEARCH_DEBOUNCE_MS) {
            return false;
        }

        self.suggestions = search_locations(&self.query, LOCATIONS, MAX_SUGGESTIONS);
        self.edited_at = None;
        tracing::debug!(
            query = %self.query,
            suggestions = self.suggestions.len(),
            "location search ran"
        );
        true
    }

    pub fn pick(&mut self, name: String) {
        self.query = name.clone();
        self.value = Some(name);
        self.suggestions.clear();
        self.edited_at = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub origin: LocationSearch,
    pub destination: LocationSearch,
}

impl SearchState {
    pub fn field_mut(&mut self, field: LocationField) -> &mut LocationSearch {
        match field {
            LocationField::Origin => &mut self.origin,
            LocationField::Destination => &mut self.destination,
        }
    }

    pub fn field(&self, field: LocationField) -> &LocationSearch {
        match field {
            LocationField::Origin => &self.origin,
            LocationField::Destination => &self.destination,
        }
    }

    /// Returns whether any field produced new suggestions.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let origin = self.origin.tick(now);
        let destination = self.destination.tick(now);
        origin || destination
    }
}
