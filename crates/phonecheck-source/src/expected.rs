use crate::error::{Result, SourceError};
use phonecheck_core::domain::{ExpectedPhoneRecord, ExpectedPhones, NormalizedPhone};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const PHONE_COLUMN: &str = "phone";
pub const COUNTRY_COLUMN: &str = "country";

/// Loads the ground-truth phone list from a CSV file with a header row.
///
/// The `phone` column is looked up by name and `country` is optional. Rows
/// keep file order and duplicates. A missing file and a file without usable
/// rows are both errors, see [`SourceError::is_setup`].
pub fn load_expected_phones(path: &Path) -> Result<ExpectedPhones> {
    if !path.exists() {
        return Err(SourceError::FileNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_expected_csv(path, &contents)?;
    let phones = ExpectedPhones::new(records)
        .map_err(|_| SourceError::NoRecords(path.to_path_buf()))?;

    info!(
        path = %path.display(),
        count = phones.len(),
        "loaded expected phone numbers"
    );
    Ok(phones)
}

fn parse_expected_csv(path: &Path, contents: &str) -> Result<Vec<ExpectedPhoneRecord>> {
    let csv_err = |source: csv::Error| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|header| header.to_string())
        .collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Ok(Vec::new());
    }

    let phone_idx = headers
        .iter()
        .position(|header| header == PHONE_COLUMN)
        .ok_or_else(|| SourceError::MissingColumn {
            path: path.to_path_buf(),
            column: PHONE_COLUMN.to_string(),
        })?;
    let country_idx = headers.iter().position(|header| header == COUNTRY_COLUMN);

    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let row = idx + 1;
        let raw = record.get(phone_idx).unwrap_or("");

        let Some(phone) = NormalizedPhone::parse(raw) else {
            warn!(path = %path.display(), row, value = raw, "skipping row without a phone number");
            continue;
        };

        let country = country_idx
            .and_then(|idx| record.get(idx))
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        records.push(ExpectedPhoneRecord {
            row,
            country,
            raw: raw.to_string(),
            phone,
        });
    }

    Ok(records)
}
