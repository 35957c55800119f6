//! Browser session abstraction.
//!
//! [`BrowserPage`] is the only way the scraper touches a browser. Its methods
//! are single, non-blocking attempts; bounded waiting is layered on top in
//! [`wait`]. The production implementation drives a WebDriver server
//! ([`WebDriverPage`]).

#[cfg(test)]
pub mod fake;
pub mod wait;
mod webdriver;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Locator, StationOption};

pub use webdriver::WebDriverPage;

/// One exclusively owned browser window.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Load `url` in the window.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Whether at least one element matches right now.
    async fn is_present(&self, locator: &Locator) -> Result<bool>;

    /// Text of the first matching element, `None` if nothing matches.
    async fn find_text(&self, locator: &Locator) -> Result<Option<String>>;

    /// Click the first matching element if it is displayed and enabled.
    ///
    /// Returns `false` when there is nothing clickable yet.
    async fn click(&self, locator: &Locator) -> Result<bool>;

    /// Choose the option whose visible text is `text` in a `<select>`.
    ///
    /// Returns `false` when the select or the option is not there yet.
    async fn select_by_text(&self, locator: &Locator, text: &str) -> Result<bool>;

    /// Options of a `<select>`, `None` if the select is absent.
    async fn select_options(&self, locator: &Locator) -> Result<Option<Vec<StationOption>>>;

    /// Current DOM serialized as HTML.
    async fn page_source(&self) -> Result<String>;

    /// Save a PNG of the current viewport.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// End the session and close the browser.
    async fn quit(self) -> Result<()>
    where
        Self: Sized;
}
