// src/error.rs

//! Unified error handling for the scraper application.

use std::fmt;
use std::time::Duration;

use thirtyfour::error::{WebDriverError, WebDriverErrorInfo, WebDriverErrorInner};
use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// An element did not appear on the page
    #[error("Element not found: {locator}")]
    ElementNotFound { locator: String },

    /// A bounded wait ran out before its condition held
    #[error("Timed out after {}s waiting for {what}", .after.as_secs_f32())]
    Timeout { what: String, after: Duration },

    /// WebDriver protocol or session failure
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] WebDriverError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure while scraping a single route
    #[error("Route error for {route}: {message}")]
    Route { route: String, message: String },
}

impl AppError {
    /// Create an element-not-found error.
    pub fn element_not_found(locator: impl fmt::Display) -> Self {
        Self::ElementNotFound {
            locator: locator.to_string(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(what: impl fmt::Display, after: Duration) -> Self {
        Self::Timeout {
            what: what.to_string(),
            after,
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a route error with context.
    pub fn route(route: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Route {
            route: route.into(),
            message: message.to_string(),
        }
    }

    /// Whether this is one of the "element did not show up in time" kinds.
    pub fn is_missing_element(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::Timeout { .. })
    }

    /// Whether a WebDriver call lost its element to a re-render.
    ///
    /// Bounded waits retry these instead of giving up.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::WebDriver(e) => matches!(
                **e,
                WebDriverErrorInner::NoSuchElement(_)
                    | WebDriverErrorInner::StaleElementReference(_)
            ),
            _ => false,
        }
    }

    /// A stale element reference, as the browser reports it mid re-render.
    pub fn stale_element(message: impl Into<String>) -> Self {
        Self::WebDriver(WebDriverError::StaleElementReference(
            WebDriverErrorInfo::new(message.into()),
        ))
    }
}
