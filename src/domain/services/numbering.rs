//! # Sequential Numbering
//!
//! Atomic per-year sequences for deal numbers and trader codes.
//!
//! Numbers are allocated from an in-process counter guarded by a mutex —
//! never by scanning existing rows for the highest value. An allocated
//! number is consumed even if the surrounding operation later fails, so
//! numbers are unique and never reused, with possible gaps.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::services::numbering::DealNumberSequence;
//!
//! let seq = DealNumberSequence::new();
//! let first = seq.next(2026).unwrap();
//! let second = seq.next(2026).unwrap();
//! assert_eq!(first.to_string(), "DEAL-2026-000001");
//! assert_eq!(second.seq(), 2);
//! ```

use crate::domain::value_objects::deal_number::InvalidCodeError;
use crate::domain::value_objects::{DealNumber, TraderCode};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A monotonically increasing counter per calendar year.
#[derive(Debug, Default)]
struct YearSequence {
    counters: Mutex<HashMap<i32, u32>>,
}

impl YearSequence {
    fn next(&self, year: i32) -> u32 {
        let mut counters = self.counters.lock();
        let counter = counters.entry(year).or_insert(0);
        *counter += 1;
        *counter
    }

    fn seed(&self, year: i32, last_used: u32) {
        let mut counters = self.counters.lock();
        let counter = counters.entry(year).or_insert(0);
        if last_used > *counter {
            *counter = last_used;
        }
    }
}

/// Allocator for sequential deal numbers.
#[derive(Debug, Default)]
pub struct DealNumberSequence {
    inner: YearSequence,
}

impl DealNumberSequence {
    /// Creates an empty sequence; the first number per year is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next deal number for the given year.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] once a year's six-digit range is
    /// exhausted.
    pub fn next(&self, year: i32) -> Result<DealNumber, InvalidCodeError> {
        DealNumber::new(year, self.inner.next(year))
    }

    /// Fast-forwards a year's counter past numbers already in use, e.g.
    /// after loading persisted deals at startup.
    pub fn seed(&self, number: DealNumber) {
        self.inner.seed(number.year(), number.seq());
    }
}

/// Allocator for sequential trader codes.
#[derive(Debug, Default)]
pub struct TraderCodeSequence {
    inner: YearSequence,
}

impl TraderCodeSequence {
    /// Creates an empty sequence; the first code per year is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next trader code for the given year.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] once a year's four-digit range is
    /// exhausted.
    pub fn next(&self, year: i32) -> Result<TraderCode, InvalidCodeError> {
        TraderCode::new(year, self.inner.next(year))
    }

    /// Fast-forwards a year's counter past codes already in use.
    pub fn seed(&self, code: TraderCode) {
        self.inner.seed(code.year(), code.seq());
    }
}
