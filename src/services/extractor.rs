// src/services/extractor.rs

//! Trip extraction from a loaded results page.
//!
//! Cards are read independently: a card missing one of its fields is skipped
//! and counted, the other cards on the page still produce records.
//!
//! The results list re-renders in place when paging between days, so a day is
//! only read once the previous day's cards are gone and the new ones have
//! stopped changing.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tokio::time::Instant;

use crate::browser::BrowserPage;
use crate::browser::wait::{Waiter, poll_until};
use crate::error::{AppError, Result};
use crate::models::{CardLocators, Locator, TimeoutConfig, TripRecord};
use crate::utils::normalize_whitespace;

/// What one day of results produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    /// Trip cards were shown. `skipped` counts cards with missing fields.
    Found { trips: Vec<TripRecord>, skipped: usize },
    /// No trip cards appeared for the day.
    EmptyDay,
}

/// A day's results as read once they settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRead {
    pub outcome: DayOutcome,
    /// Outer HTML of each card on the page, in page order
    pub cards: Vec<String>,
}

impl DayRead {
    fn empty() -> Self {
        Self {
            outcome: DayOutcome::EmptyDay,
            cards: Vec::new(),
        }
    }
}

struct CardSelectors {
    card: Selector,
    from_point: Selector,
    to_point: Selector,
    operator: Selector,
    bus_type: Selector,
    fare: Selector,
    start_time: Selector,
    end_time: Selector,
}

/// Reads trip cards off the current results page.
pub struct DayPageExtractor {
    card_locator: Locator,
    selectors: CardSelectors,
    waiter: Waiter,
    appear: Duration,
    settle: Duration,
    quiet: Duration,
}

impl DayPageExtractor {
    pub fn new(locators: &CardLocators, waiter: Waiter, timeouts: &TimeoutConfig) -> Result<Self> {
        let selectors = CardSelectors {
            card: Self::parse_selector(&locators.card)?,
            from_point: Self::parse_selector(&locators.from_point)?,
            to_point: Self::parse_selector(&locators.to_point)?,
            operator: Self::parse_selector(&locators.operator)?,
            bus_type: Self::parse_selector(&locators.bus_type)?,
            fare: Self::parse_selector(&locators.fare)?,
            start_time: Self::parse_selector(&locators.start_time)?,
            end_time: Self::parse_selector(&locators.end_time)?,
        };

        Ok(Self {
            card_locator: locators.card.clone(),
            selectors,
            waiter,
            appear: timeouts.element(),
            settle: timeouts.results_settle(),
            quiet: timeouts.results_quiet(),
        })
    }

    /// Wait for the day's trip cards to finish rendering and extract them.
    ///
    /// `previous` holds the cards read for the day before; they have to be
    /// replaced before anything is read. Cards not showing up at all is
    /// [`DayOutcome::EmptyDay`], not an error.
    pub async fn extract<P: BrowserPage>(
        &self,
        page: &P,
        day_label: &str,
        previous: &[String],
    ) -> Result<DayRead> {
        if !previous.is_empty() {
            self.wait_for_replacement(page, previous).await?;
        }

        match self
            .waiter
            .present(page, &self.card_locator, self.appear)
            .await
        {
            Ok(()) => {}
            Err(AppError::Timeout { .. }) => return Ok(DayRead::empty()),
            Err(e) => return Err(e),
        }

        let html = self.settled_source(page).await?;
        Ok(DayRead {
            outcome: self.parse(&html, day_label),
            cards: self.card_html(&html),
        })
    }

    /// Wait for the previous day's cards to leave the page.
    ///
    /// Two days can list identical cards, so running out of time here is not
    /// an error.
    async fn wait_for_replacement<P: BrowserPage>(
        &self,
        page: &P,
        previous: &[String],
    ) -> Result<()> {
        let replaced = poll_until(
            "previous day's trip cards to be replaced",
            self.settle,
            self.waiter.interval(),
            || async move {
                let html = page.page_source().await?;
                Ok::<_, AppError>((self.card_html(&html).as_slice() != previous).then_some(()))
            },
        )
        .await;

        match replaced {
            Ok(()) => Ok(()),
            Err(AppError::Timeout { .. }) => {
                log::debug!("Trip cards unchanged after paging, reading them as is");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Re-read the page until its trip cards have not changed for the quiet
    /// window, or the settle timeout runs out.
    async fn settled_source<P: BrowserPage>(&self, page: &P) -> Result<String> {
        let deadline = Instant::now() + self.settle;
        let mut html = page.page_source().await?;
        let mut cards = self.card_html(&html);
        let mut quiet_since = Instant::now();

        loop {
            let now = Instant::now();
            if now.duration_since(quiet_since) >= self.quiet {
                return Ok(html);
            }
            if now >= deadline {
                log::debug!("Trip cards still changing after {:?}", self.settle);
                return Ok(html);
            }
            tokio::time::sleep(self.waiter.interval().min(deadline - now)).await;

            html = page.page_source().await?;
            let latest = self.card_html(&html);
            if latest != cards {
                cards = latest;
                quiet_since = Instant::now();
            }
        }
    }

    fn card_html(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.card)
            .map(|card| card.html())
            .collect()
    }

    /// Extract all trip cards from a page's HTML.
    pub fn parse(&self, html: &str, day_label: &str) -> DayOutcome {
        let document = Html::parse_document(html);
        let mut trips = Vec::new();
        let mut skipped = 0;

        for card in document.select(&self.selectors.card) {
            match self.parse_card(&card, day_label) {
                Some(trip) => trips.push(trip),
                None => skipped += 1,
            }
        }

        if trips.is_empty() && skipped == 0 {
            DayOutcome::EmptyDay
        } else {
            DayOutcome::Found { trips, skipped }
        }
    }

    fn parse_card(&self, card: &ElementRef, day_label: &str) -> Option<TripRecord> {
        let s = &self.selectors;
        Some(TripRecord {
            from: Self::field(card, &s.from_point)?,
            to: Self::field(card, &s.to_point)?,
            date: day_label.to_string(),
            bus_name: Self::field(card, &s.operator)?,
            bus_type: Self::field(card, &s.bus_type)?,
            price: Self::field(card, &s.fare)?,
            departure_time: Self::field(card, &s.start_time)?,
            arrival_time: Self::field(card, &s.end_time)?,
        })
    }

    fn field(card: &ElementRef, selector: &Selector) -> Option<String> {
        let element = card.select(selector).next()?;
        Some(normalize_whitespace(&Self::rendered_text(&element)))
    }

    /// Text a browser would render for `element`.
    ///
    /// Skips `script`/`style`/`template` content and `hidden` subtrees. Text
    /// hidden through CSS is still included.
    fn rendered_text(element: &ElementRef) -> String {
        element
            .descendants()
            .filter_map(|node| node.value().as_text().map(|text| (node, text)))
            .filter(|(node, _)| {
                !node.ancestors().any(|ancestor| {
                    ancestor.value().as_element().is_some_and(|e| {
                        matches!(e.name(), "script" | "style" | "template")
                            || e.attr("hidden").is_some()
                    })
                })
            })
            .map(|(_, text)| &**text)
            .collect()
    }

    fn parse_selector(locator: &Locator) -> Result<Selector> {
        let css = locator.to_css();
        Selector::parse(&css).map_err(|e| AppError::selector(css.as_str(), format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDay, FakePage, card, card_without_fare};
    use crate::models::LocatorConfig;

    fn extractor() -> DayPageExtractor {
        DayPageExtractor::new(
            &CardLocators::default(),
            Waiter::new(Duration::from_millis(100)),
            &TimeoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_cards_in_page_order() {
        let html = format!(
            "<div>{}{}</div>",
            card("Greenline", "Rs. 1,500", "07:00 AM"),
            card("Jagadamba", "Rs. 900", "06:30 PM")
        );

        let DayOutcome::Found { trips, skipped } = extractor().parse(&html, "2024-11-02") else {
            panic!("expected trips");
        };

        assert_eq!(skipped, 0);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].bus_name, "Greenline");
        assert_eq!(trips[0].price, "Rs. 1,500");
        assert_eq!(trips[0].date, "2024-11-02");
        assert_eq!(trips[0].from, "Gongabu");
        assert_eq!(trips[1].departure_time, "06:30 PM");
        assert_eq!(trips[1].arrival_time, "03:00 PM");
    }

    #[test]
    fn test_card_missing_field_is_skipped() {
        let html = format!(
            "{}{}",
            card_without_fare("Broken"),
            card("Greenline", "Rs. 1,500", "07:00 AM")
        );

        let outcome = extractor().parse(&html, "Mon");
        let DayOutcome::Found { trips, skipped } = outcome else {
            panic!("expected trips");
        };
        assert_eq!(skipped, 1);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].bus_name, "Greenline");
    }

    #[test]
    fn test_only_broken_cards_is_distinct_from_empty() {
        let outcome = extractor().parse(&card_without_fare("Broken"), "Mon");
        assert_eq!(
            outcome,
            DayOutcome::Found {
                trips: Vec::new(),
                skipped: 1
            }
        );
        assert_eq!(extractor().parse("<p>none</p>", "Mon"), DayOutcome::EmptyDay);
    }

    #[test]
    fn test_field_text_skips_script_and_hidden_nodes() {
        let html = card(
            r#"Greenline<script>window.track("op");</script><span hidden>Old Name</span>"#,
            "Rs. 1,500<style>.fare { color: red }</style>",
            "07:00 AM",
        );

        let DayOutcome::Found { trips, .. } = extractor().parse(&html, "Mon") else {
            panic!("expected trips");
        };
        assert_eq!(trips[0].bus_name, "Greenline");
        assert_eq!(trips[0].price, "Rs. 1,500");
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut locators = CardLocators::default();
        locators.fare = Locator::css("[[invalid");
        let result = DayPageExtractor::new(
            &locators,
            Waiter::new(Duration::from_millis(100)),
            &TimeoutConfig::default(),
        );
        assert!(matches!(result, Err(AppError::Selector { .. })));
    }

    async fn searched_page(days: Vec<FakeDay>) -> FakePage {
        let page = FakePage::new(&["A", "B"]).route("A", "B", days);
        let locators = LocatorConfig::default();
        page.goto("https://example.test").await.unwrap();
        page.select_by_text(&locators.from_select, "A").await.unwrap();
        page.select_by_text(&locators.to_select, "B").await.unwrap();
        page.click(&locators.search_button).await.unwrap();
        page
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_zero_cards_is_empty_day() {
        let page = searched_page(vec![FakeDay::empty("Mon")]).await;
        let read = extractor().extract(&page, "Mon", &[]).await.unwrap();
        assert_eq!(read.outcome, DayOutcome::EmptyDay);
        assert!(read.cards.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_reads_cards() {
        let page = searched_page(vec![FakeDay::with_cards(
            "Mon",
            &[card("Greenline", "Rs. 1,500", "07:00 AM")],
        )])
        .await;

        let read = extractor().extract(&page, "Mon", &[]).await.unwrap();
        let DayOutcome::Found { trips, .. } = read.outcome else {
            panic!("expected trips");
        };
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].date, "Mon");
        assert_eq!(read.cards.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_waits_for_late_cards() {
        let page = searched_page(vec![
            FakeDay::with_cards("Mon", &[card("Early", "Rs. 900", "06:00 AM")])
                .then_card(Duration::from_secs(1), card("Late", "Rs. 1,100", "09:00 AM")),
        ])
        .await;

        let read = extractor().extract(&page, "Mon", &[]).await.unwrap();
        let DayOutcome::Found { trips, .. } = read.outcome else {
            panic!("expected trips");
        };
        let names: Vec<_> = trips.iter().map(|t| t.bus_name.as_str()).collect();
        assert_eq!(names, ["Early", "Late"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_reads_cards_identical_to_previous_day() {
        let page = searched_page(vec![FakeDay::with_cards(
            "Mon",
            &[card("Greenline", "Rs. 1,500", "07:00 AM")],
        )])
        .await;
        let extractor = extractor();
        let first = extractor.extract(&page, "Mon", &[]).await.unwrap();

        let started = Instant::now();
        let again = extractor.extract(&page, "Tue", &first.cards).await.unwrap();

        assert!(started.elapsed() >= TimeoutConfig::default().results_settle());
        let DayOutcome::Found { trips, .. } = again.outcome else {
            panic!("expected trips");
        };
        assert_eq!(trips[0].date, "Tue");
    }
}
