// src/models/mod.rs

//! Domain models for the scraper application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod locator;
mod station;
mod trip;

// Re-export all public types
pub use config::{
    CardLocators, Config, LocatorConfig, PathConfig, SiteConfig, TimeoutConfig, WebDriverConfig,
    timeouts,
};
pub use locator::Locator;
pub use station::{RoutePair, Station, StationOption};
pub use trip::{DAYS_TO_SCRAPE, NoBusesNotice, ResultMap, RouteResult, TripRecord};

/// Tally of a scrape run, reported once at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScrapeStats {
    /// Routes in the search space for this run
    pub routes_total: usize,
    /// Routes skipped because a previous run already has their trips
    pub routes_skipped: usize,
    /// Routes that produced at least one trip
    pub routes_with_trips: usize,
    /// Routes stored with the "no buses" notice
    pub routes_without_trips: usize,
    /// Routes cut short by an unexpected failure
    pub routes_aborted: usize,
    /// Trip records collected in this run
    pub trips: usize,
}
