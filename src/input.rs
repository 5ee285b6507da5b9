//! Loading chart input from disk: the backend's JSON response shape
//! (`{ "<group>": [ { "date": ..., "<metric>": ... }, ... ] }`) or a tidy CSV with
//! `group` and `date` columns followed by metric columns.

use crate::error::ChartError;
use crate::models::{ChartInput, Record};
use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load a group -> records mapping from JSON.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<ChartInput> {
    let path = path.as_ref();
    let mut s = String::new();
    File::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .read_to_string(&mut s)?;
    parse_json(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_json(s: &str) -> Result<ChartInput> {
    Ok(serde_json::from_str(s)?)
}

/// Load a tidy CSV: one row per (group, date) observation.
///
/// Empty metric cells become NaN; non-numeric metric cells are skipped.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<ChartInput> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers = rdr.headers()?.clone();
    let group_idx = headers.iter().position(|h| h == "group");
    let Some(date_idx) = headers.iter().position(|h| h == "date") else {
        bail!("{}: missing `date` column", path.display());
    };
    let Some(group_idx) = group_idx else {
        bail!("{}: missing `group` column", path.display());
    };

    let mut out = ChartInput::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("{}: row {}", path.display(), line + 2))?;
        let mut rec = Record::new(row.get(date_idx).unwrap_or_default());
        for (i, cell) in row.iter().enumerate() {
            if i == date_idx || i == group_idx {
                continue;
            }
            let Some(name) = headers.get(i) else { continue };
            let v = if cell.is_empty() {
                f64::NAN
            } else {
                match cell.parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => continue,
                }
            };
            rec.fields.insert(name.to_string(), v);
        }
        out.entry(row.get(group_idx).unwrap_or_default().to_string())
            .or_default()
            .push(rec);
    }
    Ok(out)
}

/// Pick the loader by file extension (`.csv`, anything else is JSON).
pub fn load<P: AsRef<Path>>(path: P) -> Result<ChartInput> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "csv" => load_csv(path),
        _ => load_json(path),
    }
}

/// Every record in a group must carry the same field names as the group's first record.
pub fn check_schema(input: &ChartInput) -> Result<(), ChartError> {
    for (group, records) in input {
        let Some(first) = records.first() else { continue };
        let expected: BTreeSet<&str> = first.fields.keys().map(String::as_str).collect();
        for (index, r) in records.iter().enumerate().skip(1) {
            let got: BTreeSet<&str> = r.fields.keys().map(String::as_str).collect();
            if let Some(field) = expected.symmetric_difference(&got).next() {
                return Err(ChartError::SchemaMismatch {
                    group: group.clone(),
                    index,
                    field: field.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Keys the catalog reads that are absent from a group's first record.
pub fn missing_fields<'a>(
    records: &[Record],
    wanted: impl IntoIterator<Item = &'a str>,
) -> Vec<&'a str> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    wanted
        .into_iter()
        .filter(|k| !first.fields.contains_key(*k))
        .collect()
}
