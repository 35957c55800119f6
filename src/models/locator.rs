// src/models/locator.rs

//! Element locators for the search and results pages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an element is found on the page.
///
/// In TOML a locator is written as `{ id = "search_to" }`,
/// `{ class = "trip-infos" }` or `{ css = "div.trip > span" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    Id(String),
    Class(String),
    Css(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    pub fn class(value: impl Into<String>) -> Self {
        Self::Class(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    /// The raw locator value without its kind.
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v) | Self::Class(v) | Self::Css(v) => v,
        }
    }

    /// Equivalent CSS selector, used when parsing page source offline.
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(v) => format!("#{}", v.trim()),
            Self::Class(v) => format!(".{}", v.trim()),
            Self::Css(v) => v.clone(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "id={v}"),
            Self::Class(v) => write!(f, "class={v}"),
            Self::Css(v) => write!(f, "css={v}"),
        }
    }
}
