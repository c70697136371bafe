//! CSV document and encoder.
//!
//! A [`CsvDocument`] is a header row plus body rows of already-stringified
//! cells. Encoding joins cells with `,` and rows with `\n`, without a
//! trailing newline.
//!
//! [`Quoting::Literal`] writes cells as they are. A cell containing a comma
//! or a newline therefore produces a row that CSV readers will misparse.
//! [`Quoting::Rfc4180`] quotes exactly those cells and leaves every other
//! row byte-identical to the literal output.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};

/// Row delimiter.
pub const ROW_DELIMITER: char = '\n';

/// Field delimiter.
pub const FIELD_DELIMITER: char = ',';

/// Cell quoting policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quoting {
    /// No quoting or escaping
    #[default]
    Literal,
    /// Quote cells containing `,`, `"`, CR or LF; double inner quotes
    Rfc4180,
}

/// Ordered rows of a CSV export; row 0 is the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvDocument {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvDocument {
    /// Create a document holding only a header row
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a body row
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Body rows, without the header
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of body rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header followed by body rows
    pub fn all_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        std::iter::once(&self.headers).chain(self.rows.iter())
    }

    /// Encode with the given quoting policy
    pub fn encode(&self, quoting: Quoting) -> CsvResult<String> {
        match quoting {
            Quoting::Literal => Ok(self.to_literal_csv()),
            Quoting::Rfc4180 => self.to_quoted_csv(),
        }
    }

    /// Encode without any quoting
    pub fn to_literal_csv(&self) -> String {
        encode_rows(self.all_rows())
    }

    fn to_quoted_csv(&self) -> CsvResult<String> {
        let rows = self
            .all_rows()
            .map(|row| quote_row(row))
            .collect::<CsvResult<Vec<String>>>()?;
        Ok(rows.join(&ROW_DELIMITER.to_string()))
    }
}

/// Encode one row, quoting only the cells that need it
fn quote_row(row: &[String]) -> CsvResult<String> {
    // The csv writer quotes a lone empty field so the record is not read
    // back as a blank line; the literal form writes nothing there.
    if row.len() <= 1 && row.iter().all(|cell| cell.is_empty()) {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_DELIMITER as u8)
        .terminator(Terminator::Any(ROW_DELIMITER as u8))
        .quote_style(QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(row)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Flush(e.to_string()))?;
    let mut out = String::from_utf8(bytes)?;

    // The writer terminates every record
    if out.ends_with(ROW_DELIMITER) {
        out.pop();
    }
    Ok(out)
}

/// Join rows of cells into CSV text with no quoting and no trailing newline.
///
/// # Example
/// ```
/// use chainexport::encoder::encode_rows;
///
/// let rows = vec![vec!["a".to_string(), "b".to_string()], vec!["1".to_string(), "2".to_string()]];
/// assert_eq!(encode_rows(&rows), "a,b\n1,2");
/// ```
pub fn encode_rows<'a, I, R>(rows: I) -> String
where
    I: IntoIterator<Item = &'a R>,
    R: AsRef<[String]> + 'a + ?Sized,
{
    let mut out = String::new();
    for (i, row) in rows.into_iter().enumerate() {
        if i > 0 {
            out.push(ROW_DELIMITER);
        }
        for (j, cell) in row.as_ref().iter().enumerate() {
            if j > 0 {
                out.push(FIELD_DELIMITER);
            }
            out.push_str(cell);
        }
    }
    out
}
