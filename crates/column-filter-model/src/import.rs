use std::borrow::Cow;
use std::io::Read;

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use crate::{Dataset, FieldValue, Row};

#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
    /// How to decode raw CSV bytes into text fields.
    pub encoding: CsvTextEncoding,
    /// Decimal separator used when recognizing numeric fields.
    ///
    /// `.` matches inputs like `1234.56`. `,` matches inputs like `1234,56`.
    pub decimal_separator: char,
    /// Trim surrounding whitespace before classifying a field. A field that trims to nothing is
    /// absent.
    pub trim_fields: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            encoding: CsvTextEncoding::Auto,
            decimal_separator: '.',
            trim_fields: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsvTextEncoding {
    /// Attempt to decode as UTF-8; if a field contains invalid UTF-8, fall back to Windows-1252.
    Auto,
    /// Decode as UTF-8 and reject invalid byte sequences.
    Utf8,
    /// Decode as Windows-1252 (aka CP-1252).
    Windows1252,
}

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("csv input was empty")]
    EmptyInput,
    #[error("csv parse error at row {row}, column {column}: {reason}")]
    Parse { row: u64, column: u64, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Import a CSV stream as a [`Dataset`].
///
/// Empty fields become absent values and fields that parse as finite numbers become numbers;
/// everything else is text. Without a header row, columns are named `Column1`, `Column2`, ...
pub fn import_csv_dataset<R: Read>(
    reader: R,
    options: &CsvOptions,
) -> Result<Dataset, CsvImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        // Headers are handled here so row numbers in errors stay consistent.
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    let mut record_index: u64 = 0;
    let mut header_names: Vec<String> = Vec::new();
    let mut rows: Vec<Row> = Vec::new();

    loop {
        record.clear();
        let has_record = csv_reader
            .read_byte_record(&mut record)
            .map_err(|e| map_csv_error(e, record_index + 1))?;
        if !has_record {
            break;
        }
        record_index += 1;

        let fields = decode_record_to_strings(&record, record_index, options.encoding)?;
        if record_index == 1 && options.has_header {
            header_names = fields;
            continue;
        }

        if header_names.len() < fields.len() {
            let start = header_names.len();
            header_names.extend((start..fields.len()).map(|i| format!("Column{}", i + 1)));
        }

        let mut row = Row::new();
        for (name, raw) in header_names.iter().zip(fields) {
            if let Some(value) = classify_field(&raw, options) {
                row.insert(name.clone(), value);
            }
        }
        rows.push(row);
    }

    if record_index == 0 {
        return Err(CsvImportError::EmptyInput);
    }

    log::debug!(
        "imported {} csv rows across {} columns",
        rows.len(),
        header_names.len()
    );
    Ok(Dataset::new(rows))
}

fn classify_field(raw: &str, options: &CsvOptions) -> Option<FieldValue> {
    let field = if options.trim_fields { raw.trim() } else { raw };
    if field.is_empty() {
        return None;
    }
    if let Some(n) = parse_number(field, options.decimal_separator) {
        return Some(FieldValue::Number(n));
    }
    Some(FieldValue::Text(field.to_string()))
}

fn parse_number(field: &str, decimal_separator: char) -> Option<f64> {
    // Reject words like `inf` / `NaN` that `f64::from_str` would accept.
    if !field
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | 'e' | 'E') || c == decimal_separator)
    {
        return None;
    }
    let normalized: Cow<'_, str> = if decimal_separator == '.' {
        Cow::Borrowed(field)
    } else {
        Cow::Owned(field.replace(decimal_separator, "."))
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl CsvTextEncoding {
    fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, std::str::Utf8Error> {
        match self {
            CsvTextEncoding::Utf8 => std::str::from_utf8(bytes).map(Cow::Borrowed),
            CsvTextEncoding::Windows1252 => Ok(WINDOWS_1252.decode_without_bom_handling(bytes).0),
            CsvTextEncoding::Auto => Ok(std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .unwrap_or_else(|_| WINDOWS_1252.decode_without_bom_handling(bytes).0)),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode every field of record number `row` (1-based). The first record may carry a UTF-8 BOM.
fn decode_record_to_strings(
    record: &ByteRecord,
    row: u64,
    encoding: CsvTextEncoding,
) -> Result<Vec<String>, CsvImportError> {
    record
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            let bytes = match bytes.strip_prefix(UTF8_BOM) {
                Some(rest) if row == 1 && index == 0 => rest,
                _ => bytes,
            };
            encoding
                .decode(bytes)
                .map(Cow::into_owned)
                .map_err(|err| CsvImportError::Parse {
                    row,
                    column: index as u64 + 1,
                    reason: format!("invalid UTF-8: {err}"),
                })
        })
        .collect()
}

fn map_csv_error(err: csv::Error, next_row: u64) -> CsvImportError {
    let row = err
        .position()
        .map(csv::Position::record)
        .filter(|&record| record > 0)
        .unwrap_or(next_row);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => io.into(),
        _ => CsvImportError::Parse {
            row,
            column: 0,
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_number_rejects_words() {
        assert_eq!(parse_number("30", '.'), Some(30.0));
        assert_eq!(parse_number("-2.5e1", '.'), Some(-25.0));
        assert_eq!(parse_number("2,5", ','), Some(2.5));
        assert_eq!(parse_number("2,5", '.'), None);
        assert_eq!(parse_number("inf", '.'), None);
        assert_eq!(parse_number("NaN", '.'), None);
        assert_eq!(parse_number("12a", '.'), None);
    }

    #[test]
    fn classify_field_trims_and_treats_empty_as_absent() {
        let options = CsvOptions::default();
        assert_eq!(classify_field("  ", &options), None);
        assert_eq!(
            classify_field(" Bob ", &options),
            Some(FieldValue::from("Bob"))
        );

        let options = CsvOptions {
            trim_fields: false,
            ..CsvOptions::default()
        };
        assert_eq!(
            classify_field(" Bob ", &options),
            Some(FieldValue::from(" Bob "))
        );
    }

    #[test]
    fn invalid_utf8_falls_back_to_windows_1252_only_in_auto_mode() {
        let bytes = [0x43, 0x61, 0x66, 0xE9];
        assert_eq!(CsvTextEncoding::Auto.decode(&bytes).unwrap(), "Café");
        assert_eq!(CsvTextEncoding::Windows1252.decode(&bytes).unwrap(), "Café");
        assert!(CsvTextEncoding::Utf8.decode(&bytes).is_err());
    }

    #[test]
    fn bom_is_stripped_from_the_first_field_only() {
        let mut record = ByteRecord::new();
        record.push_field(b"\xEF\xBB\xBFName");
        record.push_field(b"\xEF\xBB\xBFAge");
        let fields = decode_record_to_strings(&record, 1, CsvTextEncoding::Utf8).unwrap();
        assert_eq!(fields, vec!["Name".to_string(), "\u{feff}Age".to_string()]);

        record.clear();
        record.push_field(b"\xFF");
        assert!(matches!(
            decode_record_to_strings(&record, 3, CsvTextEncoding::Utf8),
            Err(CsvImportError::Parse { row: 3, column: 1, .. })
        ));
    }
}
