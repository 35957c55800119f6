//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Scrape every route and persist results after each one
//! - `run_stations`: Discover the station list from the search form
//! - `load_stations`: Read the station list a scrape run starts from

pub mod scrape;
pub mod stations;

pub use scrape::run_scrape;
pub use stations::{discover_stations, load_stations, parse_station_list, run_stations};
