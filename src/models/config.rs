//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Locator;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// WebDriver session settings
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Bounded wait settings
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Element locators on the search and results pages
    #[serde(default)]
    pub locators: LocatorConfig,

    /// Input and output file locations
    #[serde(default)]
    pub paths: PathConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.site.search_url)
            .map_err(|e| AppError::validation(format!("site.search_url: {e}")))?;
        Url::parse(&self.webdriver.server_url)
            .map_err(|e| AppError::validation(format!("webdriver.server_url: {e}")))?;

        let t = &self.timeouts;
        for (name, value) in [
            ("timeouts.element_secs", t.element_secs),
            ("timeouts.next_day_secs", t.next_day_secs),
            ("timeouts.dropdown_populate_secs", t.dropdown_populate_secs),
            ("timeouts.results_settle_secs", t.results_settle_secs),
            ("timeouts.results_quiet_ms", t.results_quiet_ms),
            ("timeouts.poll_interval_ms", t.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(AppError::validation(format!("{name} must be > 0")));
            }
        }
        if t.results_quiet() >= t.results_settle() {
            return Err(AppError::validation(
                "timeouts.results_quiet_ms must be shorter than timeouts.results_settle_secs",
            ));
        }

        for (name, locator) in self.locators.named() {
            if locator.value().trim().is_empty() {
                return Err(AppError::validation(format!("locators.{name} is empty")));
            }
        }

        if self.paths.output_file.as_os_str().is_empty() {
            return Err(AppError::validation("paths.output_file is empty"));
        }
        Ok(())
    }
}

/// Target site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page holding the route search form
    #[serde(default = "defaults::search_url")]
    pub search_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::search_url(),
        }
    }
}

/// WebDriver session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// Address of the running WebDriver server (e.g. chromedriver)
    #[serde(default = "defaults::server_url")]
    pub server_url: String,

    /// Run the browser without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Browser window size as (width, height)
    #[serde(default = "defaults::window_size")]
    pub window_size: (u32, u32),
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: defaults::server_url(),
            headless: defaults::headless(),
            window_size: defaults::window_size(),
        }
    }
}

/// Bounded wait settings. Every wait in a route uses one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Presence/clickability of form controls, day label and trip cards
    #[serde(default = "defaults::element_secs")]
    pub element_secs: u64,

    /// The "next day" control, which renders after the results
    #[serde(default = "defaults::next_day_secs")]
    pub next_day_secs: u64,

    /// Destination select repopulating after the source is chosen
    #[serde(default = "defaults::dropdown_populate_secs")]
    pub dropdown_populate_secs: u64,

    /// Results replacing the previous day's and then settling
    #[serde(default = "defaults::results_settle_secs")]
    pub results_settle_secs: u64,

    /// How long the trip cards must stay unchanged to count as rendered
    #[serde(default = "defaults::results_quiet_ms")]
    pub results_quiet_ms: u64,

    /// Polling interval for all bounded waits
    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl TimeoutConfig {
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn next_day(&self) -> Duration {
        Duration::from_secs(self.next_day_secs)
    }

    pub fn dropdown_populate(&self) -> Duration {
        Duration::from_secs(self.dropdown_populate_secs)
    }

    pub fn results_settle(&self) -> Duration {
        Duration::from_secs(self.results_settle_secs)
    }

    pub fn results_quiet(&self) -> Duration {
        Duration::from_millis(self.results_quiet_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_secs: defaults::element_secs(),
            next_day_secs: defaults::next_day_secs(),
            dropdown_populate_secs: defaults::dropdown_populate_secs(),
            results_settle_secs: defaults::results_settle_secs(),
            results_quiet_ms: defaults::results_quiet_ms(),
            poll_interval_ms: defaults::poll_interval_ms(),
        }
    }
}

/// Locators for every element the scraper touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default = "defaults::from_select")]
    pub from_select: Locator,
    #[serde(default = "defaults::to_select")]
    pub to_select: Locator,
    #[serde(default = "defaults::date_button")]
    pub date_button: Locator,
    #[serde(default = "defaults::search_button")]
    pub search_button: Locator,
    #[serde(default = "defaults::day_label")]
    pub day_label: Locator,
    #[serde(default = "defaults::next_day_button")]
    pub next_day_button: Locator,
    #[serde(default)]
    pub card: CardLocators,
}

impl LocatorConfig {
    /// All locators paired with their config key.
    pub fn named(&self) -> Vec<(&'static str, &Locator)> {
        let mut all = vec![
            ("from_select", &self.from_select),
            ("to_select", &self.to_select),
            ("date_button", &self.date_button),
            ("search_button", &self.search_button),
            ("day_label", &self.day_label),
            ("next_day_button", &self.next_day_button),
        ];
        all.extend(self.card.named());
        all
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            from_select: defaults::from_select(),
            to_select: defaults::to_select(),
            date_button: defaults::date_button(),
            search_button: defaults::search_button(),
            day_label: defaults::day_label(),
            next_day_button: defaults::next_day_button(),
            card: CardLocators::default(),
        }
    }
}

/// Locators for a trip card and the fields inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardLocators {
    #[serde(default = "defaults::card")]
    pub card: Locator,
    #[serde(default = "defaults::from_point")]
    pub from_point: Locator,
    #[serde(default = "defaults::to_point")]
    pub to_point: Locator,
    #[serde(default = "defaults::operator")]
    pub operator: Locator,
    #[serde(default = "defaults::bus_type")]
    pub bus_type: Locator,
    #[serde(default = "defaults::fare")]
    pub fare: Locator,
    #[serde(default = "defaults::start_time")]
    pub start_time: Locator,
    #[serde(default = "defaults::end_time")]
    pub end_time: Locator,
}

impl CardLocators {
    fn named(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("card.card", &self.card),
            ("card.from_point", &self.from_point),
            ("card.to_point", &self.to_point),
            ("card.operator", &self.operator),
            ("card.bus_type", &self.bus_type),
            ("card.fare", &self.fare),
            ("card.start_time", &self.start_time),
            ("card.end_time", &self.end_time),
        ]
    }
}

impl Default for CardLocators {
    fn default() -> Self {
        Self {
            card: defaults::card(),
            from_point: defaults::from_point(),
            to_point: defaults::to_point(),
            operator: defaults::operator(),
            bus_type: defaults::bus_type(),
            fare: defaults::fare(),
            start_time: defaults::start_time(),
            end_time: defaults::end_time(),
        }
    }
}

/// Input and output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Station list (JSON array of `{ "text": ... }` options)
    #[serde(default = "defaults::stations_file")]
    pub stations_file: String,

    /// Cumulative results document, rewritten after every route
    #[serde(default = "defaults::output_file")]
    pub output_file: PathBuf,

    /// Where failed-route screenshots go
    #[serde(default = "defaults::screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            stations_file: defaults::stations_file(),
            output_file: defaults::output_file(),
            screenshot_dir: defaults::screenshot_dir(),
        }
    }
}

/// Default wait durations.
pub mod timeouts {
    /// Form controls, day label and trip cards.
    pub const ELEMENT_SECS: u64 = 10;
    /// "Next day" control; longer because it renders last.
    pub const NEXT_DAY_SECS: u64 = 15;
    /// Destination options repopulating after a source is picked.
    pub const DROPDOWN_POPULATE_SECS: u64 = 5;
    /// Upper bound for a day's results to replace the previous day's and settle.
    pub const RESULTS_SETTLE_SECS: u64 = 5;
    /// Trip cards unchanged for this long count as fully rendered.
    pub const RESULTS_QUIET_MS: u64 = 1500;
    pub const POLL_INTERVAL_MS: u64 = 250;
}

mod defaults {
    use std::path::PathBuf;

    use super::timeouts;
    use crate::models::Locator;

    // Site defaults
    pub fn search_url() -> String {
        "https://bussewa.com".into()
    }

    // WebDriver defaults
    pub fn server_url() -> String {
        "http://localhost:9515".into()
    }
    pub fn headless() -> bool {
        true
    }
    pub fn window_size() -> (u32, u32) {
        (1366, 900)
    }

    // Timeout defaults
    pub fn element_secs() -> u64 {
        timeouts::ELEMENT_SECS
    }
    pub fn next_day_secs() -> u64 {
        timeouts::NEXT_DAY_SECS
    }
    pub fn dropdown_populate_secs() -> u64 {
        timeouts::DROPDOWN_POPULATE_SECS
    }
    pub fn results_settle_secs() -> u64 {
        timeouts::RESULTS_SETTLE_SECS
    }
    pub fn results_quiet_ms() -> u64 {
        timeouts::RESULTS_QUIET_MS
    }
    pub fn poll_interval_ms() -> u64 {
        timeouts::POLL_INTERVAL_MS
    }

    // Search form
    pub fn from_select() -> Locator {
        Locator::id("search_from_destination")
    }
    pub fn to_select() -> Locator {
        Locator::id("search_to")
    }
    pub fn date_button() -> Locator {
        Locator::class("TV0VZ")
    }
    pub fn search_button() -> Locator {
        Locator::class("btn_1")
    }

    // Results page
    pub fn day_label() -> Locator {
        Locator::class("current-date")
    }
    pub fn next_day_button() -> Locator {
        Locator::id("next-day-btn")
    }
    pub fn card() -> Locator {
        Locator::class("trip-infos")
    }
    pub fn from_point() -> Locator {
        Locator::class("trip-fromstationpoint")
    }
    pub fn to_point() -> Locator {
        Locator::class("trip-tostationpoint")
    }
    pub fn operator() -> Locator {
        Locator::class("trip-operator")
    }
    pub fn bus_type() -> Locator {
        Locator::class("trip-bustype")
    }
    pub fn fare() -> Locator {
        Locator::class("trip-fare")
    }
    pub fn start_time() -> Locator {
        Locator::class("trip-starttime")
    }
    pub fn end_time() -> Locator {
        Locator::class("trip-endtime")
    }

    // Paths
    pub fn stations_file() -> String {
        "dropdown_options.json".into()
    }
    pub fn output_file() -> PathBuf {
        PathBuf::from("bus_data.json")
    }
    pub fn screenshot_dir() -> PathBuf {
        PathBuf::from(".")
    }
}
