// src/pipeline/scrape.rs

//! Route-by-route scraping with a save after every route.

use chrono::Utc;

use crate::browser::BrowserPage;
use crate::error::Result;
use crate::models::{Config, ResultMap, RoutePair, ScrapeStats};
use crate::services::RouteScraper;
use crate::storage::ResultStorage;
use crate::utils::log;

/// Scrape every route in order, then release the browser.
///
/// `previous` seeds the result map (resume); routes that already have trips
/// in it are skipped. The document in `storage` is overwritten after each
/// route. The session is quit exactly once, whether or not the run succeeds.
pub async fn run_scrape<P: BrowserPage>(
    config: &Config,
    page: P,
    pairs: &[RoutePair],
    storage: &dyn ResultStorage,
    previous: ResultMap,
) -> Result<(ResultMap, ScrapeStats)> {
    let outcome = scrape_all(config, &page, pairs, storage, previous).await;
    if let Err(e) = &outcome {
        ::log::error!("An error occurred in the scrape run: {}", e);
    }

    match page.quit().await {
        Ok(()) => ::log::debug!("Browser session closed"),
        Err(e) => {
            ::log::error!("Failed to close the browser session: {}", e);
            if outcome.is_ok() {
                return Err(e);
            }
        }
    }

    outcome
}

async fn scrape_all<P: BrowserPage>(
    config: &Config,
    page: &P,
    pairs: &[RoutePair],
    storage: &dyn ResultStorage,
    previous: ResultMap,
) -> Result<(ResultMap, ScrapeStats)> {
    let start_time = Utc::now();
    log::header(&format!("Scraping {} routes", pairs.len()));

    let scraper = RouteScraper::new(config)?;
    let mut results = previous;
    let mut stats = ScrapeStats {
        routes_total: pairs.len(),
        ..ScrapeStats::default()
    };

    for (i, pair) in pairs.iter().enumerate() {
        if results.has_trips(pair) {
            ::log::debug!("Skipping {}, already scraped", pair);
            stats.routes_skipped += 1;
            continue;
        }

        log::step(
            i + 1,
            pairs.len(),
            &format!("Scraping buses from {} to {}...", pair.source(), pair.destination()),
        );

        let report = scraper.scrape_route(page, pair).await;
        if report.aborted {
            stats.routes_aborted += 1;
        }
        if report.result.is_no_buses() {
            stats.routes_without_trips += 1;
        } else {
            stats.routes_with_trips += 1;
            stats.trips += report.result.trips().len();
        }

        results.insert(pair, report.result);
        storage.save(&results).await?;

        ::log::info!("Completed scraping {}", pair);
    }

    let elapsed = Utc::now() - start_time;
    log::summary(
        &format!("Scraping complete. All data saved to {}.", storage.location()),
        &[
            ("Routes", stats.routes_total.to_string()),
            ("Skipped (resume)", stats.routes_skipped.to_string()),
            ("With trips", stats.routes_with_trips.to_string()),
            ("No buses", stats.routes_without_trips.to_string()),
            ("Aborted", stats.routes_aborted.to_string()),
            ("Trips", stats.trips.to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );

    Ok((results, stats))
}
