//! Schedule windowing: which 12 rows to show and how to classify them.

use super::{Schedule, ScheduleEntry};

/// How many entries precede the upcoming one in the window.
const LOOKBEHIND: usize = 3;
/// Window length, clamped to the schedule length.
const WINDOW_LEN: usize = 12;

/// Temporal classification of a window entry at a given wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Past,
    Current,
    Future,
}

/// A windowed slice of the schedule, ready for table rendering.
#[derive(Debug, Clone)]
pub struct ScheduleWindow<'a> {
    /// Index of the first displayed entry in the full schedule.
    pub first_index: usize,
    /// True when every entry's start has already passed and the window is
    /// the schedule tail. The upstream dashboard blanked the table for the
    /// rest of the day in this case; the tail stays visible here, flagged so
    /// a renderer can grey it out.
    pub all_started: bool,
    pub entries: Vec<(&'a ScheduleEntry, EntryState)>,
}

impl ScheduleWindow<'_> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the display window for `now` (zero-padded HHMMSS, same UTC day the
/// schedule was built for).
///
/// The window starts [`LOOKBEHIND`] entries before the first entry whose start
/// lies after `now`, clamped to the schedule bounds. When every entry has
/// already started, the window shows the tail of the schedule.
pub fn window_for<'a>(schedule: &'a Schedule, now: &str) -> ScheduleWindow<'a> {
    let entries = &schedule.entries;
    let next_index = entries
        .iter()
        .position(|e| e.start.as_str() > now)
        .unwrap_or(entries.len());
    let first_index = next_index.saturating_sub(LOOKBEHIND);
    let all_started = !entries.is_empty() && next_index == entries.len();

    let last = entries.len().saturating_sub(1);
    let windowed = entries
        .iter()
        .enumerate()
        .skip(first_index)
        .take(WINDOW_LEN)
        .map(|(i, entry)| (entry, classify(entry, i == last, now)))
        .collect();

    ScheduleWindow {
        first_index,
        all_started,
        entries: windowed,
    }
}

fn classify(entry: &ScheduleEntry, is_last: bool, now: &str) -> EntryState {
    // The final entry of the day is never greyed out as past.
    if now > entry.end.as_str() && !is_last {
        EntryState::Past
    } else if entry.start.as_str() < now && now < entry.end.as_str() {
        EntryState::Current
    } else {
        EntryState::Future
    }
}
