//! Operating mode of the asset cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the cache checks freshness and persists state (development) or
/// assumes every artifact is pre-built (production).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Check freshness on every request and persist the ledger between runs.
    #[default]
    #[serde(rename = "dev", alias = "development")]
    Development,
    /// Serve pre-built, minified artifacts without any checking.
    #[serde(rename = "prod", alias = "production")]
    Production,
}

impl Mode {
    /// Returns `true` for [`Mode::Production`].
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "dev"),
            Self::Production => write!(f, "prod"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(format!("unknown mode '{other}' (expected 'dev' or 'prod')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("dev".parse::<Mode>().unwrap(), Mode::Development);
        assert_eq!("Production".parse::<Mode>().unwrap(), Mode::Production);
        assert!("staging".parse::<Mode>().is_err());
    }

    #[test]
    fn serde_uses_short_names() {
        assert_eq!(serde_json::to_string(&Mode::Production).unwrap(), "\"prod\"");
        let m: Mode = serde_json::from_str("\"development\"").unwrap();
        assert_eq!(m, Mode::Development);
    }

    #[test]
    fn default_is_development() {
        assert_eq!(Mode::default(), Mode::Development);
        assert!(!Mode::default().is_production());
    }
}
