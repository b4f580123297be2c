//! DOP text parser.
//!
//! The document is a header block, a tab-separated data block bounded by a
//! `TIME(UTC)` sentinel line and an `ABBREVIATIONS:` trailer, then footnotes.
//! The data block runs from the line after the sentinel to two lines before
//! the trailer (the last line before the trailer is a summary row).

use tracing::{debug, warn};

use super::{Schedule, ScheduleEntry};

/// Parse raw DOP lines into a schedule stamped with `date`.
///
/// Missing sentinels yield an empty schedule; a malformed row is skipped and
/// the rest of the document still parses.
pub fn parse(lines: &[String], date: &str) -> Schedule {
    let mut data_start = None;
    let mut data_end = None;

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.starts_with("TIME(UTC)") {
            data_start = Some(i + 1);
        }
        if line.starts_with("ABBREVIATIONS:") {
            data_end = i.checked_sub(2);
        }
    }

    let (start, end) = match (data_start, data_end) {
        (Some(s), Some(e)) if s <= e => (s, e),
        _ => {
            warn!("[schedule] DOP sentinels not found, schedule stays empty");
            return Schedule::empty(date);
        }
    };

    let mut entries = Vec::new();
    for line in &lines[start..=end.min(lines.len() - 1)] {
        match parse_row(line.trim()) {
            Some(entry) => entries.push(entry),
            None => debug!("[schedule] skipping row: {:?}", line),
        }
    }

    Schedule {
        date: date.to_string(),
        entries,
    }
}

/// Parse one data row; None for malformed rows and EGMSG filler.
fn parse_row(line: &str) -> Option<ScheduleEntry> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 4 {
        return None;
    }

    let (start, end) = fields[0].split_once('-')?;
    if !is_hhmmss(start) || !is_hhmmss(end) {
        return None;
    }
    let id = fields[1];

    // EGMSG rows are non-operational filler messages
    if id.starts_with("EGMSG") {
        return None;
    }
    if id.len() < 3 {
        return None;
    }

    let product_type = &id[..id.len() - 3];

    Some(ScheduleEntry {
        start: start.to_string(),
        end: end.to_string(),
        product_type: product_type.to_string(),
        product_id: id.to_string(),
        label: fields[2].to_string(),
        operational: fields[3] == "O",
    })
}

/// Time fields feed lexicographic comparison and fixed-position slicing
/// downstream, so anything but six ASCII digits rejects the row.
fn is_hhmmss(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}
