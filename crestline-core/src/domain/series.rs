//! DateSeries: ascending-by-date, unique-date container for per-symbol inputs.
//!
//! Every input the engine consumes (daily bars, weekly bars, relative-strength
//! records, fundamentals, earnings) arrives as a `DateSeries`. Duplicate dates
//! are an upstream invariant violation and are rejected at construction rather
//! than silently deduplicated.

use chrono::NaiveDate;
use thiserror::Error;

use crate::timing::ObservationCutoff;

/// Anything carrying an observation date.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("duplicate date {0} in input series")]
    DuplicateDate(NaiveDate),

    #[error("out-of-order date {0} in input series (must ascend)")]
    OutOfOrder(NaiveDate),
}

/// An immutable sequence of dated records, strictly ascending by date.
#[derive(Debug, Clone)]
pub struct DateSeries<T: Dated> {
    items: Vec<T>,
}

impl<T: Dated> DateSeries<T> {
    /// Build a series, verifying strict date ascension.
    pub fn new(items: Vec<T>) -> Result<Self, SeriesError> {
        for pair in items.windows(2) {
            let (a, b) = (pair[0].date(), pair[1].date());
            if b == a {
                return Err(SeriesError::DuplicateDate(b));
            }
            if b < a {
                return Err(SeriesError::OutOfOrder(b));
            }
        }
        Ok(Self { items })
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Index of the latest record admitted by the cutoff, if any.
    ///
    /// This is the single point where the timing policy meets stored data:
    /// all point-in-time lookups resolve through it.
    pub fn latest_admitted(&self, cutoff: ObservationCutoff) -> Option<usize> {
        // partition_point gives the first index NOT admitted; admitted
        // records form a prefix because dates ascend.
        let n = self.items.partition_point(|item| cutoff.admits(item.date()));
        n.checked_sub(1)
    }

    /// Index of the record dated exactly `date`, if present.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.items
            .binary_search_by(|item| item.date().cmp(&date))
            .ok()
    }
}
