// src/services/route_scraper.rs

//! Scrapes one route: fills the search form, then pages through the results
//! one day at a time.

use std::path::PathBuf;

use crate::browser::BrowserPage;
use crate::browser::wait::Waiter;
use crate::error::{AppError, Result};
use crate::models::{Config, DAYS_TO_SCRAPE, RoutePair, RouteResult, TripRecord};
use crate::services::extractor::{DayOutcome, DayPageExtractor, DayRead};
use crate::utils::sanitize_filename;

/// Whether paging to the next day worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayAdvance {
    Next,
    /// The "next day" control never became clickable.
    NoMoreDays,
}

/// Result of one route plus how it ended.
#[derive(Debug, Clone)]
pub struct RouteReport {
    pub result: RouteResult,
    /// The route stopped on an unexpected failure
    pub aborted: bool,
}

/// Drives a single route inside a shared browser session.
pub struct RouteScraper<'a> {
    config: &'a Config,
    waiter: Waiter,
    extractor: DayPageExtractor,
}

impl<'a> RouteScraper<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let waiter = Waiter::new(config.timeouts.poll_interval());
        let extractor = DayPageExtractor::new(&config.locators.card, waiter, &config.timeouts)?;

        Ok(Self {
            config,
            waiter,
            extractor,
        })
    }

    /// Scrape `pair` and always come back with a result.
    ///
    /// Failures end the route, get logged and screenshotted, and whatever was
    /// collected before them is kept.
    pub async fn scrape_route<P: BrowserPage>(&self, page: &P, pair: &RoutePair) -> RouteReport {
        let mut trips = Vec::new();

        let aborted = match self.run(page, pair, &mut trips).await {
            Ok(()) => false,
            Err(e) => {
                log::error!("An error occurred while scraping {}: {}", pair, e);
                self.capture_failure(page, pair).await;
                true
            }
        };

        RouteReport {
            result: RouteResult::finalize(pair, trips),
            aborted,
        }
    }

    async fn run<P: BrowserPage>(
        &self,
        page: &P,
        pair: &RoutePair,
        trips: &mut Vec<TripRecord>,
    ) -> Result<()> {
        self.fill_search_form(page, pair).await?;
        self.submit_search(page).await?;

        let mut previous_label: Option<String> = None;
        let mut previous_cards: Vec<String> = Vec::new();
        for day in 0..DAYS_TO_SCRAPE {
            let label = self.read_day_label(page, previous_label.as_deref()).await?;

            let DayRead { outcome, cards } =
                self.extractor.extract(page, &label, &previous_cards).await?;
            match outcome {
                DayOutcome::Found {
                    trips: found,
                    skipped,
                } => {
                    if skipped > 0 {
                        log::warn!(
                            "Skipped {} unreadable trip card(s) for {} on {}",
                            skipped,
                            pair,
                            label
                        );
                    }
                    log::debug!("{} trip(s) for {} on {}", found.len(), pair, label);
                    trips.extend(found);
                }
                DayOutcome::EmptyDay => {
                    log::info!(
                        "No buses found for {} on {}. Checking next day.",
                        pair,
                        label
                    );
                }
            }

            if day + 1 < DAYS_TO_SCRAPE && self.advance(page).await? == DayAdvance::NoMoreDays {
                log::info!(
                    "No 'Next day' button found for {}. Ending scrape for this route.",
                    label
                );
                break;
            }
            previous_label = Some(label);
            previous_cards = cards;
        }

        Ok(())
    }

    /// Pick source and destination. The destination list depends on the
    /// source, so its option is waited for separately.
    async fn fill_search_form<P: BrowserPage>(&self, page: &P, pair: &RoutePair) -> Result<()> {
        let locators = &self.config.locators;
        let timeouts = &self.config.timeouts;

        page.goto(&self.config.site.search_url).await?;

        self.waiter
            .present(page, &locators.from_select, timeouts.element())
            .await?;
        self.waiter
            .present(page, &locators.to_select, timeouts.element())
            .await?;

        self.waiter
            .select(
                page,
                &locators.from_select,
                pair.source().name(),
                timeouts.element(),
            )
            .await?;
        self.waiter
            .select(
                page,
                &locators.to_select,
                pair.destination().name(),
                timeouts.dropdown_populate(),
            )
            .await
    }

    async fn submit_search<P: BrowserPage>(&self, page: &P) -> Result<()> {
        let locators = &self.config.locators;
        let timeout = self.config.timeouts.element();

        self.waiter.click(page, &locators.date_button, timeout).await?;
        self.waiter.click(page, &locators.search_button, timeout).await
    }

    /// Read the day label once it is showing.
    ///
    /// After paging, the label has to move off the previous day's value; if it
    /// never does within the settle timeout the current label is used as is.
    /// A label that never shows up ends the route.
    async fn read_day_label<P: BrowserPage>(
        &self,
        page: &P,
        previous: Option<&str>,
    ) -> Result<String> {
        let locator = &self.config.locators.day_label;
        let timeouts = &self.config.timeouts;

        if let Some(previous) = previous {
            match self
                .waiter
                .text_change(page, locator, previous, timeouts.results_settle())
                .await
            {
                Ok(label) => return Ok(label),
                Err(AppError::Timeout { .. }) => {
                    log::debug!("Day label still '{}' after paging", previous);
                }
                Err(e) => return Err(e),
            }
        }

        self.waiter.text(page, locator, timeouts.element()).await
    }

    async fn advance<P: BrowserPage>(&self, page: &P) -> Result<DayAdvance> {
        match self
            .waiter
            .click(
                page,
                &self.config.locators.next_day_button,
                self.config.timeouts.next_day(),
            )
            .await
        {
            Ok(()) => Ok(DayAdvance::Next),
            Err(e) if e.is_missing_element() => Ok(DayAdvance::NoMoreDays),
            Err(e) => Err(e),
        }
    }

    /// Best-effort screenshot of the page a route failed on.
    async fn capture_failure<P: BrowserPage>(&self, page: &P, pair: &RoutePair) {
        let path = self.screenshot_path(pair);
        if let Some(dir) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                log::debug!("Could not create {}: {}", dir.display(), e);
            }
        }

        match page.screenshot(&path).await {
            Ok(()) => log::info!("Saved screenshot to {}", path.display()),
            Err(e) => log::warn!("Could not save screenshot for {}: {}", pair, e),
        }
    }

    pub fn screenshot_path(&self, pair: &RoutePair) -> PathBuf {
        let name = format!("error_screenshot_{}.png", pair.key());
        self.config
            .paths
            .screenshot_dir
            .join(sanitize_filename(&name))
    }
}
