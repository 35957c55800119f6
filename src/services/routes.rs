// src/services/routes.rs

//! Route search space.

use std::collections::HashSet;

use crate::models::{RoutePair, Station};

/// Every ordered pair of distinct stations, grouped by source in input order.
pub fn enumerate(stations: &[Station]) -> Vec<RoutePair> {
    stations
        .iter()
        .flat_map(|source| {
            stations
                .iter()
                .filter_map(move |destination| RoutePair::new(source.clone(), destination.clone()))
        })
        .collect()
}

/// Keep only routes departing from one of `sources`. An empty filter keeps all.
pub fn retain_sources(pairs: Vec<RoutePair>, sources: &[String]) -> Vec<RoutePair> {
    if sources.is_empty() {
        return pairs;
    }

    let known: HashSet<&str> = pairs.iter().map(|p| p.source().name()).collect();
    for name in sources {
        if !known.contains(name.as_str()) {
            log::warn!("Source station '{}' is not in the station list", name);
        }
    }

    pairs
        .into_iter()
        .filter(|p| sources.iter().any(|s| s == p.source().name()))
        .collect()
}
