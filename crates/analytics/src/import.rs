use crate::error::AnalyticsError;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::EquityPoint;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EquityRecord {
    timestamp: String,
    equity: String,
}

/// Loads a `timestamp,equity` CSV export from disk.
pub fn load_equity_curve(path: &Path) -> Result<Vec<EquityPoint>, AnalyticsError> {
    let file = File::open(path)?;
    let curve = read_equity_curve(file)?;
    tracing::info!(path = %path.display(), points = curve.len(), "Equity curve loaded.");
    Ok(curve)
}

/// Parses a `timestamp,equity` CSV stream with a header row.
///
/// Timestamps are RFC 3339 or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn read_equity_curve<R: Read>(reader: R) -> Result<Vec<EquityPoint>, AnalyticsError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut raw = csv::StringRecord::new();
    let mut curve = Vec::new();

    while csv_reader.read_record(&mut raw)? {
        // Physical line where the record starts; blank lines and quoted
        // newlines make this differ from the record count.
        let line = raw.position().map_or(0, |p| p.line());
        let record: EquityRecord = raw.deserialize(Some(&headers))?;

        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| AnalyticsError::InvalidRecord {
            line,
            reason: format!("unrecognised timestamp '{}'", record.timestamp),
        })?;
        let equity = record
            .equity
            .parse::<Decimal>()
            .map_err(|e| AnalyticsError::InvalidRecord {
                line,
                reason: format!("invalid equity '{}': {e}", record.equity),
            })?;

        curve.push(EquityPoint::new(timestamp, equity));
    }

    Ok(curve)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
