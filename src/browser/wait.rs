//! Bounded waits over [`BrowserPage`] primitives.
//!
//! Every wait polls its condition at a fixed interval and gives up with
//! [`AppError::Timeout`] once its timeout elapses. Nothing here sleeps
//! unconditionally.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::browser::BrowserPage;
use crate::error::{AppError, Result};
use crate::models::Locator;

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe is always tried at least once. Transient WebDriver errors (an
/// element going stale mid re-render) count as "not yet"; any other error
/// ends the wait immediately.
pub async fn poll_until<T, F, Fut>(
    what: impl fmt::Display,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => log::debug!("Retrying wait for {}: {}", what, e),
            Err(e) => return Err(e),
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(AppError::timeout(what, timeout));
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Poll settings shared by all waits of a session.
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    interval: Duration,
}

impl Waiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for any element matching `locator`.
    pub async fn present<P: BrowserPage>(
        &self,
        page: &P,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<()> {
        poll_until(locator, timeout, self.interval, || async move {
            Ok::<_, AppError>(page.is_present(locator).await?.then_some(()))
        })
        .await
    }

    /// Wait for an element and read its text.
    pub async fn text<P: BrowserPage>(
        &self,
        page: &P,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<String> {
        poll_until(locator, timeout, self.interval, || page.find_text(locator)).await
    }

    /// Wait until the element's text differs from `previous`.
    pub async fn text_change<P: BrowserPage>(
        &self,
        page: &P,
        locator: &Locator,
        previous: &str,
        timeout: Duration,
    ) -> Result<String> {
        let what = format!("{locator} to change from '{previous}'");
        poll_until(what, timeout, self.interval, || async move {
            Ok::<_, AppError>(page
                .find_text(locator)
                .await?
                .filter(|text| text != previous))
        })
        .await
    }

    /// Wait until the element is clickable, then click it.
    pub async fn click<P: BrowserPage>(
        &self,
        page: &P,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<()> {
        poll_until(locator, timeout, self.interval, || async move {
            Ok::<_, AppError>(page.click(locator).await?.then_some(()))
        })
        .await
    }

    /// Wait until the select offers `text`, then choose it.
    pub async fn select<P: BrowserPage>(
        &self,
        page: &P,
        locator: &Locator,
        text: &str,
        timeout: Duration,
    ) -> Result<()> {
        let what = format!("option '{text}' in {locator}");
        poll_until(what, timeout, self.interval, || async move {
            Ok::<_, AppError>(page.select_by_text(locator, text).await?.then_some(()))
        })
        .await
    }
}
