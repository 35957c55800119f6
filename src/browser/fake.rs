//! Scripted in-memory [`BrowserPage`] for tests.
//!
//! Simulates the search form and a multi-day results view. Each route can be
//! given its own list of days; routes without a script get empty days. Cards
//! render on the (paused) tokio clock, so tests can stagger them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::browser::BrowserPage;
use crate::error::{AppError, Result};
use crate::models::{Locator, LocatorConfig, StationOption};

/// One day of results.
#[derive(Debug, Clone)]
pub struct FakeDay {
    /// `None` when the day label never renders
    pub label: Option<String>,
    /// Cards, each with how long after the day is shown it renders
    pub cards: Vec<(Duration, String)>,
    /// Whether the "next day" control is clickable on this day
    pub has_next: bool,
}

impl FakeDay {
    /// A day whose results list never appears.
    pub fn empty(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            cards: Vec::new(),
            has_next: true,
        }
    }

    pub fn with_cards(label: &str, cards: &[String]) -> Self {
        Self {
            label: Some(label.to_string()),
            cards: cards.iter().map(|c| (Duration::ZERO, c.clone())).collect(),
            has_next: true,
        }
    }

    /// Add a card that renders `after` the day is shown.
    pub fn then_card(mut self, after: Duration, card: String) -> Self {
        self.cards.push((after, card));
        self
    }

    pub fn without_label(mut self) -> Self {
        self.label = None;
        self
    }

    pub fn last(mut self) -> Self {
        self.has_next = false;
        self
    }
}

/// Render a trip card using the default class names.
pub fn card(operator: &str, fare: &str, start: &str) -> String {
    format!(
        r#"<div class="trip-infos">
             <span class="trip-fromstationpoint">Gongabu</span>
             <span class="trip-tostationpoint">Tourist Bus Park</span>
             <span class="trip-operator">{operator}</span>
             <span class="trip-bustype">Deluxe</span>
             <span class="trip-fare">{fare}</span>
             <span class="trip-starttime">{start}</span>
             <span class="trip-endtime">03:00 PM</span>
           </div>"#
    )
}

/// Render a trip card that lacks its fare element.
pub fn card_without_fare(operator: &str) -> String {
    format!(
        r#"<div class="trip-infos">
             <span class="trip-fromstationpoint">Gongabu</span>
             <span class="trip-tostationpoint">Tourist Bus Park</span>
             <span class="trip-operator">{operator}</span>
             <span class="trip-bustype">Deluxe</span>
             <span class="trip-starttime">06:00 AM</span>
             <span class="trip-endtime">01:00 PM</span>
           </div>"#
    )
}

/// What the fake observed, shared with the test after the page is consumed.
#[derive(Debug, Default)]
pub struct FakeLog {
    pub visits: usize,
    pub searches: Vec<(String, String)>,
    pub clicks: Vec<String>,
    pub screenshots: Vec<PathBuf>,
    pub quits: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    from: Option<String>,
    to: Option<String>,
    searched: bool,
    day: usize,
    shown_at: Option<Instant>,
    /// Previous day's cards still on screen after paging, until the instant
    stale: Option<(String, Instant)>,
    label_glitch: bool,
}

pub struct FakePage {
    locators: LocatorConfig,
    stations: Vec<String>,
    default_days: Vec<FakeDay>,
    routes: HashMap<(String, String), Vec<FakeDay>>,
    unselectable: HashSet<String>,
    screenshot_fails: bool,
    quit_fails: bool,
    stale_for: Duration,
    flaky_label: bool,
    state: Mutex<FakeState>,
    log: Arc<Mutex<FakeLog>>,
}

impl FakePage {
    pub fn new(stations: &[&str]) -> Self {
        Self {
            locators: LocatorConfig::default(),
            stations: stations.iter().map(|s| s.to_string()).collect(),
            default_days: (1..=5).map(|d| FakeDay::empty(&format!("Day {d}"))).collect(),
            routes: HashMap::new(),
            unselectable: HashSet::new(),
            screenshot_fails: false,
            quit_fails: false,
            stale_for: Duration::ZERO,
            flaky_label: false,
            state: Mutex::new(FakeState::default()),
            log: Arc::new(Mutex::new(FakeLog::default())),
        }
    }

    /// Script the result days for one route.
    pub fn route(mut self, source: &str, destination: &str, days: Vec<FakeDay>) -> Self {
        self.routes
            .insert((source.to_string(), destination.to_string()), days);
        self
    }

    /// Make a destination never appear in the "to" select.
    pub fn unselectable(mut self, destination: &str) -> Self {
        self.unselectable.insert(destination.to_string());
        self
    }

    pub fn failing_screenshots(mut self) -> Self {
        self.screenshot_fails = true;
        self
    }

    pub fn failing_quit(mut self) -> Self {
        self.quit_fails = true;
        self
    }

    /// Keep the previous day's cards on screen for `duration` after paging.
    pub fn stale_results(mut self, duration: Duration) -> Self {
        self.stale_for = duration;
        self
    }

    /// The day label read right after paging fails once as stale.
    pub fn flaky_label_after_paging(mut self) -> Self {
        self.flaky_label = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn record(&self) -> MutexGuard<'_, FakeLog> {
        self.log.lock().unwrap()
    }

    fn days_for(&self, state: &FakeState) -> &[FakeDay] {
        match (&state.from, &state.to) {
            (Some(from), Some(to)) => self
                .routes
                .get(&(from.clone(), to.clone()))
                .unwrap_or(&self.default_days),
            _ => &self.default_days,
        }
    }

    fn current_day(&self) -> Option<FakeDay> {
        let state = self.state();
        if !state.searched {
            return None;
        }
        self.days_for(&state).get(state.day).cloned()
    }

    /// Card markup on screen right now.
    fn rendered_cards(&self) -> String {
        let state = self.state();
        if !state.searched {
            return String::new();
        }
        let now = Instant::now();
        if let Some((cards, until)) = &state.stale {
            if now < *until {
                return cards.clone();
            }
        }

        let elapsed = state
            .shown_at
            .map_or(Duration::ZERO, |shown| now.duration_since(shown));
        self.days_for(&state)
            .get(state.day)
            .map(|day| {
                day.cards
                    .iter()
                    .filter(|(after, _)| *after <= elapsed)
                    .map(|(_, card)| card.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, _url: &str) -> Result<()> {
        *self.state() = FakeState::default();
        self.record().visits += 1;
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        let l = &self.locators;
        if *locator == l.from_select || *locator == l.to_select {
            return Ok(!self.state().searched);
        }
        if *locator == l.day_label {
            return Ok(self.current_day().is_some_and(|d| d.label.is_some()));
        }
        if *locator == l.card.card {
            return Ok(!self.rendered_cards().is_empty());
        }
        Ok(false)
    }

    async fn find_text(&self, locator: &Locator) -> Result<Option<String>> {
        if *locator == self.locators.day_label {
            {
                let mut state = self.state();
                if state.label_glitch {
                    state.label_glitch = false;
                    return Err(AppError::stale_element("current-date was re-rendered"));
                }
            }
            return Ok(self.current_day().and_then(|d| d.label));
        }
        Ok(None)
    }

    async fn click(&self, locator: &Locator) -> Result<bool> {
        let l = &self.locators;
        let clicked = if *locator == l.date_button {
            !self.state().searched
        } else if *locator == l.search_button {
            let mut state = self.state();
            match state.from.clone().zip(state.to.clone()) {
                Some(search) => {
                    state.searched = true;
                    state.shown_at = Some(Instant::now());
                    drop(state);
                    self.record().searches.push(search);
                    true
                }
                None => false,
            }
        } else if *locator == l.next_day_button {
            let on_screen = self.rendered_cards();
            let mut state = self.state();
            let days = self.days_for(&state);
            let can_advance = state.searched
                && days.get(state.day).is_some_and(|d| d.has_next)
                && state.day + 1 < days.len();
            if can_advance {
                let now = Instant::now();
                state.day += 1;
                state.shown_at = Some(now);
                state.stale = (!self.stale_for.is_zero() && !on_screen.is_empty())
                    .then(|| (on_screen, now + self.stale_for));
                state.label_glitch = self.flaky_label;
            }
            can_advance
        } else {
            false
        };

        if clicked {
            self.record().clicks.push(locator.value().to_string());
        }
        Ok(clicked)
    }

    async fn select_by_text(&self, locator: &Locator, text: &str) -> Result<bool> {
        let mut state = self.state();
        if state.searched || !self.stations.iter().any(|s| s == text) {
            return Ok(false);
        }
        if *locator == self.locators.from_select {
            state.from = Some(text.to_string());
            Ok(true)
        } else if *locator == self.locators.to_select {
            let available = state.from.as_deref().is_some_and(|from| from != text)
                && !self.unselectable.contains(text);
            if available {
                state.to = Some(text.to_string());
            }
            Ok(available)
        } else {
            Ok(false)
        }
    }

    async fn select_options(&self, locator: &Locator) -> Result<Option<Vec<StationOption>>> {
        if *locator != self.locators.from_select {
            return Ok(None);
        }
        let mut options = vec![StationOption {
            text: "Select origin".to_string(),
            value: String::new(),
        }];
        options.extend(self.stations.iter().enumerate().map(|(i, s)| StationOption {
            text: s.clone(),
            value: (i + 1).to_string(),
        }));
        Ok(Some(options))
    }

    async fn page_source(&self) -> Result<String> {
        let cards = self.rendered_cards();
        Ok(format!("<html><body><div id=\"results\">{cards}</div></body></html>"))
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.record().screenshots.push(path.to_path_buf());
        if self.screenshot_fails {
            return Err(AppError::Io(std::io::Error::other("screenshot failed")));
        }
        Ok(())
    }

    async fn quit(self) -> Result<()> {
        self.record().quits += 1;
        if self.quit_fails {
            return Err(AppError::validation("session already gone"));
        }
        Ok(())
    }
}
