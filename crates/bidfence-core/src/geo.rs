use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// GeoLocation - decoded per-request geography fact
// ---------------------------------------------------------------------------

/// Geography decoded from the request: a country code and an optional
/// region, already normalized to a fixed code space by the upstream
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl GeoLocation {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

// ---------------------------------------------------------------------------
// GeoCode - configured geographic matcher
// ---------------------------------------------------------------------------

/// Rejection of a malformed geo code during rule compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoCodeError {
    #[error("geo code is empty")]
    Empty,
    #[error("geo code '{0}' has an empty country segment")]
    EmptyCountry(String),
    #[error("geo code '{0}' has an empty region segment")]
    EmptyRegion(String),
}

/// A geographic matcher parsed from "US" or "US-CA" form.
///
/// Matching is ASCII case-insensitive. A country-only code covers every
/// region of that country; a code with a region requires the location to
/// carry that exact region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCode {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl GeoCode {
    /// Parse a code of the form "US" or "US-CA".
    pub fn parse(raw: &str) -> Result<Self, GeoCodeError> {
        if raw.is_empty() {
            return Err(GeoCodeError::Empty);
        }
        let (country, region) = match raw.split_once('-') {
            Some((country, region)) => (country, Some(region)),
            None => (raw, None),
        };
        if country.is_empty() {
            return Err(GeoCodeError::EmptyCountry(raw.to_string()));
        }
        if let Some(region) = region {
            if region.is_empty() {
                return Err(GeoCodeError::EmptyRegion(raw.to_string()));
            }
        }
        Ok(Self {
            country: country.to_string(),
            region: region.map(str::to_string),
        })
    }

    /// Whether this code covers the given decoded location.
    pub fn matches(&self, location: &GeoLocation) -> bool {
        if !self.country.eq_ignore_ascii_case(&location.country) {
            return false;
        }
        match &self.region {
            None => true,
            Some(region) => location
                .region
                .as_deref()
                .is_some_and(|r| region.eq_ignore_ascii_case(r)),
        }
    }
}

impl FromStr for GeoCode {
    type Err = GeoCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GeoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.country, region),
            None => write!(f, "{}", self.country),
        }
    }
}
