//! CSV parsing into a [`RawTable`].

use casewatch_dataset_models::RawTable;

use crate::SourceError;

/// Parses delimited text into a [`RawTable`].
///
/// The first record is the header row. Headers and cells are trimmed. Rows
/// are read flexibly: short rows are padded with empty cells and long rows
/// are cut to the header width. Rows whose cells are all empty (`,,,`) are
/// kept so normalization can report them; only lines with no text at all are
/// skipped by the reader. Empty input yields a table with no headers, which
/// normalization reports as a missing header.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the input is not valid delimited text.
pub fn parse_csv(bytes: &[u8], delimiter: u8) -> Result<RawTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let width = headers.len();
    let mut rows = Vec::new();
    let mut ragged = 0usize;

    for result in reader.records() {
        let record = result?;
        if record.len() != width {
            ragged += 1;
        }
        let row: Vec<String> = (0..width)
            .map(|i| record.get(i).unwrap_or("").trim().to_owned())
            .collect();
        rows.push(row);
    }

    if ragged > 0 {
        log::debug!("{ragged} row(s) did not match the header width of {width}");
    }
    log::debug!("Parsed {} CSV rows with {width} columns", rows.len());

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_headers_and_cells() {
        let table = parse_csv(b" DATE , REGION \n 2020-01-01 , A \n", b',').unwrap();
        assert_eq!(table.headers, vec!["DATE", "REGION"]);
        assert_eq!(table.rows, vec![vec!["2020-01-01", "A"]]);
    }

    #[test]
    fn pads_short_rows_and_cuts_long_rows() {
        let table = parse_csv(b"A,B,C\n1\n1,2,3,4\n", b',').unwrap();
        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn honours_delimiter_and_quotes() {
        let table = parse_csv(b"A;B\n\"x;y\";2\n", b';').unwrap();
        assert_eq!(table.rows[0], vec!["x;y", "2"]);
    }

    #[test]
    fn keeps_rows_of_empty_cells() {
        let table = parse_csv(b"A,B\n1,2\n,\n3,4\n", b',').unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1], vec!["", ""]);
    }

    #[test]
    fn skips_lines_without_text() {
        let table = parse_csv(b"A,B\n1,2\n\n3,4\n", b',').unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn empty_input_has_no_headers() {
        let table = parse_csv(b"", b',').unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn header_only_input_has_no_rows() {
        let table = parse_csv(b"A,B\n", b',').unwrap();
        assert_eq!(table.headers.len(), 2);
        assert!(table.rows.is_empty());
    }
}
