//! DOP (Daily Operations Plan) schedule: parsing and time-windowed display.
//!
//! The DOP covers exactly one UTC day. All time comparisons are lexicographic
//! on zero-padded HHMMSS strings and are only valid within that day; the poll
//! loop forces a session restart on date rollover instead of doing day-wrap
//! arithmetic.

pub mod parser;
pub mod window;

pub use window::{EntryState, ScheduleWindow};

use chrono::Utc;

/// One row of the DOP data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Zero-padded HHMMSS, within one UTC day.
    pub start: String,
    /// Zero-padded HHMMSS, within one UTC day.
    pub end: String,
    /// Product type code: the id minus its trailing 3-character sequence
    /// number (`FD001` → `FD`).
    pub product_type: String,
    /// Full upstream id (`FD001`).
    pub product_id: String,
    /// Human-readable label from the third column.
    pub label: String,
    /// True when the operations flag column is `O`.
    pub operational: bool,
}

/// Parsed DOP for one UTC day, stamped with the date it was built for.
/// Entries keep upstream row order and are never re-sorted.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    /// YYYYMMDD build date. A mismatch with the current UTC date invalidates
    /// every time comparison and forces a session restart.
    pub date: String,
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// An empty schedule for `date` ("not yet loaded" / failed download).
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current UTC date as a YYYYMMDD stamp, the DOP provider's date format.
pub fn utc_date_stamp() -> String {
    Utc::now().format("%Y%m%d").to_string()
}

/// Current UTC time as a zero-padded HHMMSS string.
pub fn utc_hhmmss() -> String {
    Utc::now().format("%H%M%S").to_string()
}
