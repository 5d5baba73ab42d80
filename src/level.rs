//! Host log levels consumed by the syslog delivery pipeline.
//!
//! Levels follow the host's own ranking, least severe first, so the derived
//! `Ord` doubles as the filtering order. Syslog severities run the other way
//! round; [`crate::severity`] owns the translation between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// Lowest rank; as a minimum it forwards every record.
    All,
    Finest,
    Finer,
    Fine,
    Config,
    Info,
    Warning,
    Severe,
    /// Highest rank; as a minimum it disables forwarding.
    Off,
}

impl Default for Level {
    /// Records at `FINE` and above are forwarded until configured otherwise.
    fn default() -> Self {
        Self::Fine
    }
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 9] = [
        Level::All,
        Level::Finest,
        Level::Finer,
        Level::Fine,
        Level::Config,
        Level::Info,
        Level::Warning,
        Level::Severe,
        Level::Off,
    ];

    /// Canonical upper-case name of the level.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::All => "ALL",
            Level::Finest => "FINEST",
            Level::Finer => "FINER",
            Level::Fine => "FINE",
            Level::Config => "CONFIG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Severe => "SEVERE",
            Level::Off => "OFF",
        }
    }

    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "FINEST" | "TRACE" => Ok(Self::Finest),
            "FINER" => Ok(Self::Finer),
            "FINE" | "DEBUG" => Ok(Self::Fine),
            "CONFIG" => Ok(Self::Config),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "SEVERE" | "ERROR" | "CRITICAL" => Ok(Self::Severe),
            "OFF" => Ok(Self::Off),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_owned()
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Finest,
            log::Level::Debug => Level::Fine,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warning,
            log::Level::Error => Level::Severe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fine", Level::Fine)]
    #[case(" WARNING ", Level::Warning)]
    #[case("warn", Level::Warning)]
    #[case("debug", Level::Fine)]
    #[case("error", Level::Severe)]
    #[case("Config", Level::Config)]
    #[case("off", Level::Off)]
    #[case("ALL", Level::All)]
    fn parses_names_and_aliases(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(input.parse::<Level>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_names() {
        let err = "LOUD".parse::<Level>().expect_err("unknown level must fail");
        assert_eq!(err, ParseLevelError("LOUD".into()));
        assert_eq!(Level::parse_or_default("LOUD"), Level::Fine);
    }

    #[rstest]
    fn all_is_sorted_least_severe_first() {
        assert!(Level::ALL.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Level::ALL.first(), Some(&Level::All));
        assert_eq!(Level::ALL.last(), Some(&Level::Off));
    }

    #[rstest]
    fn display_round_trips_through_from_str() {
        for level in Level::ALL {
            assert_eq!(level.to_string().parse::<Level>(), Ok(level));
        }
    }
}
