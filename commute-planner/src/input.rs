//! Address input CSV.
//!
//! The file needs a header row with an `address` column. Optional
//! `morning_arrival` / `evening_arrival` columns override the configured
//! targets for a single row; blank cells fall back to the configuration.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::ClockTime;

/// Error reading the address file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read address CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("address CSV has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column}: {reason}")]
    InvalidField {
        row: usize,
        column: &'static str,
        reason: String,
    },
}

/// One address to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    /// 1-based position among data rows.
    pub row: usize,
    /// The address as written; blank values are reported per row later.
    pub address: String,
    pub morning_arrival: Option<ClockTime>,
    pub evening_arrival: Option<ClockTime>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    address: String,
    #[serde(default)]
    morning_arrival: Option<String>,
    #[serde(default)]
    evening_arrival: Option<String>,
}

/// Read address rows from a CSV file.
pub fn read_addresses(path: impl AsRef<Path>) -> Result<Vec<AddressRow>, InputError> {
    let path = path.as_ref();
    let rows = parse_addresses(std::fs::File::open(path).map_err(csv::Error::from)?)?;
    debug!(path = %path.display(), rows = rows.len(), "read address file");
    Ok(rows)
}

/// Parse address rows from CSV text.
pub fn parse_addresses<R: Read>(reader: R) -> Result<Vec<AddressRow>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    if !reader.headers()?.iter().any(|h| h == "address") {
        return Err(InputError::MissingColumn("address"));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<RawRow>().enumerate() {
        let raw = record?;
        let row = i + 1;
        rows.push(AddressRow {
            row,
            address: raw.address,
            morning_arrival: parse_override(row, "morning_arrival", raw.morning_arrival)?,
            evening_arrival: parse_override(row, "evening_arrival", raw.evening_arrival)?,
        });
    }

    Ok(rows)
}

fn parse_override(
    row: usize,
    column: &'static str,
    value: Option<String>,
) -> Result<Option<ClockTime>, InputError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => ClockTime::parse_hhmm(s)
            .map(Some)
            .map_err(|e| InputError::InvalidField {
                row,
                column,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn address_only() {
        let rows = parse_addresses("address\n123 Main St\n\"45 Oak Ave, Ardmore\"\n".as_bytes())
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].address, "123 Main St");
        assert_eq!(rows[1].address, "45 Oak Ave, Ardmore");
        assert!(rows[1].morning_arrival.is_none());
    }

    #[test]
    fn per_row_overrides() {
        let csv = "address,morning_arrival,evening_arrival\n\
                   123 Main St,08:15,\n\
                   45 Oak Ave,,18:00\n";
        let rows = parse_addresses(csv.as_bytes()).unwrap();

        assert_eq!(rows[0].morning_arrival.unwrap().to_string(), "08:15");
        assert!(rows[0].evening_arrival.is_none());
        assert!(rows[1].morning_arrival.is_none());
        assert_eq!(rows[1].evening_arrival.unwrap().to_string(), "18:00");
    }

    #[test]
    fn blank_address_kept_for_reporting() {
        let rows = parse_addresses("address\n   \n123 Main St\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].address, "");
        assert_eq!(rows[1].row, 2);
    }

    #[test]
    fn extra_columns_ignored() {
        let rows = parse_addresses("name,address\nHome,123 Main St\n".as_bytes()).unwrap();
        assert_eq!(rows[0].address, "123 Main St");
    }

    #[test]
    fn missing_address_column() {
        let err = parse_addresses("street\n123 Main St\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn("address")));
    }

    #[test]
    fn invalid_override() {
        let err = parse_addresses("address,morning_arrival\n123 Main St,8am\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidField { row: 1, column: "morning_arrival", .. }
        ));
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "address").unwrap();
        writeln!(file, "123 Main St").unwrap();

        let rows = read_addresses(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_addresses("/nonexistent/addresses.csv"),
            Err(InputError::Csv(_))
        ));
    }
}
