//! Minimal reader for delimiter-separated card lists.
//!
//! Supports what card-list exports actually contain:
//!
//! - A header row naming the columns
//! - Quoted fields (`"..."`) that may contain the delimiter or line breaks
//! - `""` inside a quoted field as a literal quote
//! - `\r\n` line endings and blank lines (skipped)
//!
//! Every field is trimmed of surrounding whitespace.

/// Column separator of card-list files.
pub const DEFAULT_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CsvError {
    #[display("empty input: no header row")]
    MissingHeader,
    #[display("unterminated quoted field in record starting at line {line}")]
    UnterminatedQuote { line: usize },
}

/// A parsed record with the line it started on (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    /// Field at `index`, or an empty string for short rows.
    #[must_use]
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<CsvRecord>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Result<Self, CsvError> {
        Self::parse_with_delimiter(text, DEFAULT_DELIMITER)
    }

    pub fn parse_with_delimiter(text: &str, delimiter: char) -> Result<Self, CsvError> {
        let mut records = parse_records(text, delimiter)?.into_iter();
        let header = records.next().ok_or(CsvError::MissingHeader)?;
        Ok(Self {
            headers: header.fields,
            records: records.collect(),
        })
    }

    /// Position of the column named `name` (ASCII case-insensitive).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }
}

fn parse_records(text: &str, delimiter: char) -> Result<Vec<CsvRecord>, CsvError> {
    let mut records = vec![];
    let mut fields = vec![];
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            '\r' => {}
            '\n' => {
                fields.push(finish_field(&mut field));
                push_record(&mut records, &mut fields, record_line);
                line += 1;
                record_line = line;
            }
            c if c == delimiter => fields.push(finish_field(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: record_line });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(finish_field(&mut field));
        push_record(&mut records, &mut fields, record_line);
    }

    Ok(records)
}

fn finish_field(field: &mut String) -> String {
    let value = field.trim().to_owned();
    field.clear();
    value
}

fn push_record(records: &mut Vec<CsvRecord>, fields: &mut Vec<String>, line: usize) {
    let fields = std::mem::take(fields);
    if fields.iter().all(String::is_empty) {
        return;
    }
    records.push(CsvRecord { line, fields });
}
