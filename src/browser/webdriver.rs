// src/browser/webdriver.rs

//! [`BrowserPage`] backed by a W3C WebDriver session (chromedriver).

use std::path::Path;

use async_trait::async_trait;
use thirtyfour::components::SelectElement;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver, WebElement};

use crate::browser::BrowserPage;
use crate::error::Result;
use crate::models::{Locator, StationOption, WebDriverConfig};

/// A Chrome window driven through WebDriver.
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    /// Start a new browser session on the configured WebDriver server.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }

        log::debug!("Connecting to WebDriver at {}", config.server_url);
        let driver = WebDriver::new(&config.server_url, caps).await?;

        let (width, height) = config.window_size;
        driver
            .set_window_rect(0, 0, width, height)
            .await?;

        Ok(Self { driver })
    }

    fn by(locator: &Locator) -> By {
        match locator {
            Locator::Id(id) => By::Id(id.clone()),
            Locator::Class(class) => By::ClassName(class.clone()),
            Locator::Css(css) => By::Css(css.clone()),
        }
    }

    async fn first(&self, locator: &Locator) -> Result<Option<WebElement>> {
        let mut found = self.driver.find_all(Self::by(locator)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        Ok(self.first(locator).await?.is_some())
    }

    async fn find_text(&self, locator: &Locator) -> Result<Option<String>> {
        match self.first(locator).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn click(&self, locator: &Locator) -> Result<bool> {
        let Some(element) = self.first(locator).await? else {
            return Ok(false);
        };
        if !element.is_clickable().await? {
            return Ok(false);
        }
        element.click().await?;
        Ok(true)
    }

    async fn select_by_text(&self, locator: &Locator, text: &str) -> Result<bool> {
        let Some(element) = self.first(locator).await? else {
            return Ok(false);
        };

        let mut offered = false;
        for option in element.find_all(By::Tag("option")).await? {
            if option.text().await?.trim() == text {
                offered = true;
                break;
            }
        }
        if !offered {
            return Ok(false);
        }

        SelectElement::new(&element)
            .await?
            .select_by_visible_text(text)
            .await?;
        Ok(true)
    }

    async fn select_options(&self, locator: &Locator) -> Result<Option<Vec<StationOption>>> {
        let Some(element) = self.first(locator).await? else {
            return Ok(None);
        };

        let mut options = Vec::new();
        for option in element.find_all(By::Tag("option")).await? {
            options.push(StationOption {
                text: option.text().await?,
                value: option.value().await?.unwrap_or_default(),
            });
        }
        Ok(Some(options))
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.driver.source().await?)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.driver.screenshot(path).await?;
        Ok(())
    }

    async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
