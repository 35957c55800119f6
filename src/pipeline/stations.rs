// src/pipeline/stations.rs

//! Station list loading and discovery.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::browser::BrowserPage;
use crate::browser::wait::Waiter;
use crate::error::{AppError, Result};
use crate::models::{Config, Station, StationOption};
use crate::storage::local::write_json;
use crate::utils::is_remote;

/// Load station names from a local file or an `http(s)` URL.
///
/// Never fails: problems are logged and an empty list is returned, which
/// makes the run a no-op instead of a crash.
pub async fn load_stations(location: &str) -> Vec<Station> {
    match read_station_list(location).await {
        Ok(stations) => {
            log::info!("Loaded {} stations from {}", stations.len(), location);
            stations
        }
        Err(e) => {
            log::error!(
                "An error occurred while reading the station list {}: {}",
                location,
                e
            );
            Vec::new()
        }
    }
}

async fn read_station_list(location: &str) -> Result<Vec<Station>> {
    let text = if is_remote(location) {
        reqwest::get(location)
            .await?
            .error_for_status()?
            .text()
            .await?
    } else {
        tokio::fs::read_to_string(location).await?
    };
    parse_station_list(&text)
}

/// Parse a JSON array of dropdown options into station names.
///
/// Entries without a non-blank string `text` are skipped, as are repeats of
/// a name already seen.
pub fn parse_station_list(json: &str) -> Result<Vec<Station>> {
    let value: Value = serde_json::from_str(json)?;
    let entries = value
        .as_array()
        .ok_or_else(|| AppError::validation("station list must be a JSON array"))?;

    let mut seen = HashSet::new();
    let stations = entries
        .iter()
        .filter_map(|entry| entry.get("text").and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .filter(|text| seen.insert(*text))
        .map(Station::new)
        .collect();
    Ok(stations)
}

/// Read the source dropdown's options from the search page.
///
/// Placeholder options (blank text or blank value) are dropped.
pub async fn discover_stations<P: BrowserPage>(
    config: &Config,
    page: &P,
) -> Result<Vec<StationOption>> {
    let waiter = Waiter::new(config.timeouts.poll_interval());
    let locator = &config.locators.from_select;

    page.goto(&config.site.search_url).await?;
    waiter
        .present(page, locator, config.timeouts.element())
        .await?;

    let options = page
        .select_options(locator)
        .await?
        .ok_or_else(|| AppError::element_not_found(locator))?;

    Ok(options
        .into_iter()
        .filter(|o| !o.text.trim().is_empty() && !o.value.trim().is_empty())
        .collect())
}

/// Discover the station list and write it where `scrape` reads it from.
pub async fn run_stations<P: BrowserPage>(config: &Config, page: P, output: &Path) -> Result<usize> {
    let discovered = discover_stations(config, &page).await;
    let released = page.quit().await;

    let options = discovered?;
    released?;

    write_json(output, &options).await?;
    log::info!("Saved {} stations to {}", options.len(), output.display());
    Ok(options.len())
}
