use std::io;

use crate::bucket::{Bucket, PushOutcome};
use crate::token::{parse_expiry, Token};

/// Per-row tallies from one CSV import. Duplicates and invalid rows are
/// counted, never fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub completed: usize,
    pub duplicate: usize,
    pub invalid: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.completed + self.duplicate + self.invalid
    }
}

/// Stream-level failures only. Anything wrong with an individual row lands
/// in the summary's invalid column instead.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no {0} column in header row")]
    MissingColumn(&'static str),
}

/// Column positions resolved from the header row. Headers are matched
/// case-insensitively after trimming.
#[derive(Debug)]
struct Columns {
    code: usize,
    value: Option<usize>,
    days: Option<usize>,
    expiry: Option<usize>,
    label: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            code: find("code").ok_or(ImportError::MissingColumn("code"))?,
            value: find("value"),
            days: find("days"),
            expiry: find("expiry"),
            label: find("label"),
        })
    }

    fn field<'a>(&self, record: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
        let field = record.get(index?)?.trim();
        if field.is_empty() {
            None
        } else {
            Some(field)
        }
    }
}

/// Stream a CSV document into `bucket`, one token per row.
///
/// The header row is required and must name a `code` column; `value` (or
/// `days`, when `value` is absent), `expiry` and `label` are optional. Rows
/// without a usable code, and rows the CSV decoder rejects, count as invalid
/// and the stream keeps going.
pub fn import_csv<R: io::Read>(
    reader: R,
    bucket: &mut Bucket,
) -> Result<ImportSummary, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::resolve(csv_reader.headers()?)?;

    let mut summary = ImportSummary::default();
    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("skipping undecodable csv row: {}", err);
                summary.invalid += 1;
                continue;
            }
        };

        let Some(code) = columns.field(&record, Some(columns.code)) else {
            summary.invalid += 1;
            continue;
        };
        let value = columns
            .field(&record, columns.value)
            .or_else(|| columns.field(&record, columns.days));
        let expiry = columns
            .field(&record, columns.expiry)
            .and_then(parse_expiry);
        let label = columns.field(&record, columns.label);

        let token = Token::new(
            code.to_string(),
            value.map(str::to_string),
            expiry,
            label.map(str::to_string),
        );
        match bucket.push(token, false) {
            PushOutcome::Completed => summary.completed += 1,
            PushOutcome::Duplicate => summary.duplicate += 1,
            PushOutcome::Invalid => summary.invalid += 1,
        }
    }

    tracing::debug!(
        "csv import finished: {} completed, {} duplicate, {} invalid",
        summary.completed,
        summary.duplicate,
        summary.invalid
    );
    Ok(summary)
}
