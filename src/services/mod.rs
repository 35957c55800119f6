//! Service layer for the scraper application.
//!
//! This module contains the business logic for:
//! - Route enumeration (`routes::enumerate`)
//! - Trip extraction from a results page (`DayPageExtractor`)
//! - Scraping a single route across several days (`RouteScraper`)

pub mod extractor;
pub mod route_scraper;
pub mod routes;

pub use extractor::{DayOutcome, DayPageExtractor, DayRead};
pub use route_scraper::{DayAdvance, RouteReport, RouteScraper};
