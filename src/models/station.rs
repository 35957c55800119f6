// src/models/station.rs

//! Stations and the route pairs built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A station as shown in the search form's dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Station(String);

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Station {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One `<option>` of the source dropdown, as stored in the station list file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationOption {
    pub text: String,
    #[serde(default)]
    pub value: String,
}

/// An ordered (source, destination) pair with distinct endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePair {
    source: Station,
    destination: Station,
}

impl RoutePair {
    /// Returns `None` when both ends are the same station.
    pub fn new(source: Station, destination: Station) -> Option<Self> {
        (source != destination).then_some(Self {
            source,
            destination,
        })
    }

    pub fn source(&self) -> &Station {
        &self.source
    }

    pub fn destination(&self) -> &Station {
        &self.destination
    }

    /// Key of this route in the output document.
    pub fn key(&self) -> String {
        format!("{}_to_{}", self.source, self.destination)
    }
}

impl fmt::Display for RoutePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.source, self.destination)
    }
}
