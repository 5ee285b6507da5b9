//! Data normalizer: drop records with unparseable dates, sort chronologically, and rescale
//! ratio fields from fractions of one to percentage points.
//!
//! Rescaling is unconditional. Feeding already-normalized records back in scales the ratio
//! fields a second time, so each raw payload must pass through here exactly once.

use crate::models::{NormalizedRecord, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

const RATIO_SCALE: f64 = 100.0;

/// Parse the date forms the upstream payloads use.
///
/// Accepts `YYYY-MM-DD`, RFC 3339, naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`,
/// and integer unix seconds.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
}

/// Normalize one group's raw records.
pub fn normalize(records: &[Record], ratio_fields: &BTreeSet<String>) -> Vec<NormalizedRecord> {
    let mut out: Vec<NormalizedRecord> = Vec::with_capacity(records.len());
    for r in records {
        let Some(timestamp) = parse_date(&r.date) else {
            log::debug!("dropping record with unparseable date {:?}", r.date);
            continue;
        };
        out.push(NormalizedRecord {
            date: r.date.clone(),
            timestamp,
            fields: r.fields.clone(),
        });
    }

    // stable: equal timestamps keep payload order
    out.sort_by_key(|r| r.timestamp);

    rescale_ratios(&mut out, ratio_fields);

    if out.len() < records.len() {
        log::debug!(
            "normalized {} of {} records ({} dropped)",
            out.len(),
            records.len(),
            records.len() - out.len()
        );
    }
    out
}

/// Multiply every ratio-tagged field by 100 in place.
pub fn rescale_ratios(records: &mut [NormalizedRecord], ratio_fields: &BTreeSet<String>) {
    for r in records.iter_mut() {
        for (key, value) in r.fields.iter_mut() {
            if ratio_fields.contains(key) {
                *value *= RATIO_SCALE;
            }
        }
    }
}

/// Re-wrap normalized records as raw records (date text kept verbatim).
pub fn to_raw(records: &[NormalizedRecord]) -> Vec<Record> {
    records
        .iter()
        .map(|r| Record {
            date: r.date.clone(),
            fields: r.fields.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_date_forms() {
        assert!(parse_date("2024-01-01").is_some());
        assert!(parse_date("2024-01-01T12:30:00Z").is_some());
        assert!(parse_date("2024-01-01 12:30:00").is_some());
        assert!(parse_date("2024-01-01T12:30:00").is_some());
        assert_eq!(
            parse_date("1704067200"),
            parse_date("2024-01-01"),
            "unix seconds at midnight UTC"
        );
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("2024-13-40").is_none());
    }
}
