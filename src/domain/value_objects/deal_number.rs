//! # Deal Number
//!
//! Human-readable sequential deal identifiers.
//!
//! Deal numbers have the shape `DEAL-<year>-<6-digit-seq>`, are unique, are
//! assigned once at creation, and are never reused — not even after a
//! cancellation. Trader codes (`TR-<year>-<4-digit-seq>`) follow the same
//! scheme. Sequence allocation lives in
//! [`numbering`](crate::domain::services::numbering).
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::value_objects::DealNumber;
//!
//! let number = DealNumber::new(2026, 42).unwrap();
//! assert_eq!(number.to_string(), "DEAL-2026-000042");
//! assert_eq!("DEAL-2026-000042".parse::<DealNumber>().unwrap(), number);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEAL_PREFIX: &str = "DEAL";
const TRADER_PREFIX: &str = "TR";
const DEAL_SEQ_MAX: u32 = 999_999;
const TRADER_SEQ_MAX: u32 = 9_999;

/// Error returned for malformed or out-of-range display codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCodeError(
    /// The offending input or constraint description.
    pub String,
);

impl fmt::Display for InvalidCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid display code: {}", self.0)
    }
}

impl std::error::Error for InvalidCodeError {}

/// A sequential, human-readable deal number: `DEAL-<year>-<6-digit-seq>`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct DealNumber {
    year: i32,
    seq: u32,
}

impl DealNumber {
    /// Creates a deal number from a year and a 1-based sequence value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] when `seq` is zero or exceeds the
    /// six-digit range.
    pub fn new(year: i32, seq: u32) -> Result<Self, InvalidCodeError> {
        if seq == 0 || seq > DEAL_SEQ_MAX {
            return Err(InvalidCodeError(format!(
                "deal sequence {seq} outside 1..={DEAL_SEQ_MAX}"
            )));
        }
        Ok(Self { year, seq })
    }

    /// Returns the year component.
    #[inline]
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the sequence component.
    #[inline]
    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for DealNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DEAL_PREFIX}-{}-{:06}", self.year, self.seq)
    }
}

impl FromStr for DealNumber {
    type Err = InvalidCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, seq) = parse_code(s, DEAL_PREFIX, 6)?;
        Self::new(year, seq)
    }
}

impl TryFrom<String> for DealNumber {
    type Error = InvalidCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DealNumber> for String {
    fn from(value: DealNumber) -> Self {
        value.to_string()
    }
}

/// A sequential trader display code: `TR-<year>-<4-digit-seq>`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TraderCode {
    year: i32,
    seq: u32,
}

impl TraderCode {
    /// Creates a trader code from a year and a 1-based sequence value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] when `seq` is zero or exceeds the
    /// four-digit range.
    pub fn new(year: i32, seq: u32) -> Result<Self, InvalidCodeError> {
        if seq == 0 || seq > TRADER_SEQ_MAX {
            return Err(InvalidCodeError(format!(
                "trader sequence {seq} outside 1..={TRADER_SEQ_MAX}"
            )));
        }
        Ok(Self { year, seq })
    }

    /// Returns the year component.
    #[inline]
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the sequence component.
    #[inline]
    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for TraderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TRADER_PREFIX}-{}-{:04}", self.year, self.seq)
    }
}

impl FromStr for TraderCode {
    type Err = InvalidCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, seq) = parse_code(s, TRADER_PREFIX, 4)?;
        Self::new(year, seq)
    }
}

impl TryFrom<String> for TraderCode {
    type Error = InvalidCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TraderCode> for String {
    fn from(value: TraderCode) -> Self {
        value.to_string()
    }
}

fn parse_code(s: &str, prefix: &str, digits: usize) -> Result<(i32, u32), InvalidCodeError> {
    let mut parts = s.split('-');
    let (Some(tag), Some(year), Some(seq), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(InvalidCodeError(s.to_string()));
    };
    if tag != prefix || seq.len() != digits {
        return Err(InvalidCodeError(s.to_string()));
    }
    let year: i32 = year
        .parse()
        .map_err(|_| InvalidCodeError(s.to_string()))?;
    let seq: u32 = seq.parse().map_err(|_| InvalidCodeError(s.to_string()))?;
    Ok((year, seq))
}
