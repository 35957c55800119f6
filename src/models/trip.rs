// src/models/trip.rs

//! Scraped trip records and per-route results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::RoutePair;

/// Number of consecutive days paged through for every route.
pub const DAYS_TO_SCRAPE: usize = 5;

/// One bus departure as displayed on a results card. All fields are raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub from: String,
    pub to: String,
    /// Day label as shown above the results, not normalized
    pub date: String,
    pub bus_name: String,
    pub bus_type: String,
    /// Fare text including currency as displayed
    pub price: String,
    pub departure_time: String,
    pub arrival_time: String,
}

/// Placeholder entry stored for a route that produced no trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoBusesNotice {
    pub message: String,
}

impl NoBusesNotice {
    pub fn for_route(pair: &RoutePair) -> Self {
        Self {
            message: format!(
                "No buses available for {} to {} for the next {} days.",
                pair.source(),
                pair.destination(),
                DAYS_TO_SCRAPE
            ),
        }
    }
}

/// Outcome of scraping one route.
///
/// Serializes as a JSON array: either the trip records or a single notice
/// object. Never an empty array when built through [`RouteResult::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteResult {
    Trips(Vec<TripRecord>),
    NoBuses([NoBusesNotice; 1]),
}

impl RouteResult {
    /// Turn a route's accumulated records into its stored result.
    pub fn finalize(pair: &RoutePair, trips: Vec<TripRecord>) -> Self {
        if trips.is_empty() {
            Self::no_buses(pair)
        } else {
            Self::Trips(trips)
        }
    }

    pub fn no_buses(pair: &RoutePair) -> Self {
        Self::NoBuses([NoBusesNotice::for_route(pair)])
    }

    pub fn trips(&self) -> &[TripRecord] {
        match self {
            Self::Trips(trips) => trips,
            Self::NoBuses(_) => &[],
        }
    }

    pub fn is_no_buses(&self) -> bool {
        matches!(self, Self::NoBuses(_))
    }

    /// Number of entries in the serialized list.
    pub fn len(&self) -> usize {
        match self {
            Self::Trips(trips) => trips.len(),
            Self::NoBuses(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Results for every processed route, keyed `<source>_to_<destination>`,
/// in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMap {
    routes: IndexMap<String, RouteResult>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a route's result. Re-inserting a key keeps its original position.
    pub fn insert(&mut self, pair: &RoutePair, result: RouteResult) {
        self.routes.insert(pair.key(), result);
    }

    pub fn get(&self, pair: &RoutePair) -> Option<&RouteResult> {
        self.routes.get(&pair.key())
    }

    /// Whether the route already has scraped trips (sentinels don't count).
    pub fn has_trips(&self, pair: &RoutePair) -> bool {
        self.get(pair)
            .is_some_and(|result| !result.trips().is_empty())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteResult)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn trip_count(&self) -> usize {
        self.routes.values().map(|r| r.trips().len()).sum()
    }

    pub fn no_bus_count(&self) -> usize {
        self.routes.values().filter(|r| r.is_no_buses()).count()
    }
}
