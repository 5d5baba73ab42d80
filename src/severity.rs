//! Syslog severity and facility tables plus the host level mapping.
//!
//! Syslog ranks severity numerically with `0` as the most urgent, which is
//! the inverse of the host's [`Level`] ordering. [`Level::severity`] performs
//! the inversion and [`passes_filter`] always compares host levels, never the
//! numeric syslog codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Syslog urgency, encoded `0` (emergency) to `7` (debug).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Severity {
    /// Every severity, most urgent first.
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Informational,
        Severity::Debug,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Informational => "INFORMATIONAL",
            Severity::Debug => "DEBUG",
        }
    }

    /// Encode the `PRI` value for this severity under `facility`.
    pub const fn priority(self, facility: Facility) -> u8 {
        facility.code() * 8 + self.code()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Syslog classification of the originating subsystem, encoded `0`-`23`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Facility {
    Kern = 0,
    #[default]
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    AuthPriv = 10,
    Ftp = 11,
    Ntp = 12,
    Audit = 13,
    Alert = 14,
    Clock = 15,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

impl Facility {
    /// Every facility in code order.
    pub const ALL: [Facility; 24] = [
        Facility::Kern,
        Facility::User,
        Facility::Mail,
        Facility::Daemon,
        Facility::Auth,
        Facility::Syslog,
        Facility::Lpr,
        Facility::News,
        Facility::Uucp,
        Facility::Cron,
        Facility::AuthPriv,
        Facility::Ftp,
        Facility::Ntp,
        Facility::Audit,
        Facility::Alert,
        Facility::Clock,
        Facility::Local0,
        Facility::Local1,
        Facility::Local2,
        Facility::Local3,
        Facility::Local4,
        Facility::Local5,
        Facility::Local6,
        Facility::Local7,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Facility::Kern => "KERN",
            Facility::User => "USER",
            Facility::Mail => "MAIL",
            Facility::Daemon => "DAEMON",
            Facility::Auth => "AUTH",
            Facility::Syslog => "SYSLOG",
            Facility::Lpr => "LPR",
            Facility::News => "NEWS",
            Facility::Uucp => "UUCP",
            Facility::Cron => "CRON",
            Facility::AuthPriv => "AUTHPRIV",
            Facility::Ftp => "FTP",
            Facility::Ntp => "NTP",
            Facility::Audit => "AUDIT",
            Facility::Alert => "ALERT",
            Facility::Clock => "CLOCK",
            Facility::Local0 => "LOCAL0",
            Facility::Local1 => "LOCAL1",
            Facility::Local2 => "LOCAL2",
            Facility::Local3 => "LOCAL3",
            Facility::Local4 => "LOCAL4",
            Facility::Local5 => "LOCAL5",
            Facility::Local6 => "LOCAL6",
            Facility::Local7 => "LOCAL7",
        }
    }

    /// Look up a facility by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a facility label is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown syslog facility: {0}")]
pub struct ParseFacilityError(pub String);

impl FromStr for Facility {
    type Err = ParseFacilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|facility| facility.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseFacilityError(s.to_owned()))
    }
}

impl TryFrom<String> for Facility {
    type Error = ParseFacilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Facility> for String {
    fn from(facility: Facility) -> Self {
        facility.label().to_owned()
    }
}

impl Level {
    /// Map the host level onto a syslog severity.
    ///
    /// Total and order-preserving: a more severe host level never maps to a
    /// less urgent (numerically larger) severity.
    pub fn severity(self) -> Severity {
        match self {
            Level::All | Level::Finest | Level::Finer | Level::Fine => Severity::Debug,
            Level::Config | Level::Info => Severity::Informational,
            Level::Warning => Severity::Warning,
            Level::Severe | Level::Off => Severity::Error,
        }
    }
}

/// Return `true` when `level` is at least as severe as `min_level`.
///
/// A minimum of [`Level::Off`] rejects every record.
pub fn passes_filter(level: Level, min_level: Level) -> bool {
    min_level != Level::Off && level >= min_level
}
