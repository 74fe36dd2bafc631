//! CSV tokenizer with encoding and delimiter auto-detection.
//!
//! The tokenizer is a single left-to-right scan that honors quoted fields,
//! escaped quotes and embedded newlines. It never fails: malformed quoting
//! degrades to best-effort rows. No product-specific logic here.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows (header excluded), ragged rows kept as-is
    pub rows: Vec<Vec<String>>,
    /// Column headers
    pub headers: Vec<String>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Split CSV text into rows of cells using a comma delimiter.
///
/// # Example
/// ```ignore
/// use ezme::tokenize;
///
/// let rows = tokenize("a,\"b,c\"\n1,\"say \"\"hi\"\"\"\n");
/// assert_eq!(rows, vec![vec!["a", "b,c"], vec!["1", "say \"hi\""]]);
/// ```
pub fn tokenize(content: &str) -> Vec<Vec<String>> {
    tokenize_with_delimiter(content, ',')
}

/// Split CSV text into rows of cells.
///
/// Rows whose cells are all blank are dropped, so a trailing newline never
/// produces a phantom row. Cells are returned untrimmed.
pub fn tokenize_with_delimiter(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            '\n' => {
                row.push(std::mem::take(&mut cell));
                flush_row(&mut rows, &mut row);
            }
            '\r' => {}
            c if c == delimiter => row.push(std::mem::take(&mut cell)),
            c => cell.push(c),
        }
    }

    // Unterminated quotes end up here too
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        flush_row(&mut rows, &mut row);
    }

    rows
}

fn flush_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>) {
    let finished = std::mem::take(row);
    if finished.iter().any(|c| !c.trim().is_empty()) {
        rows.push(finished);
    }
}

/// Find a column by fuzzy header name.
///
/// Candidates are tried in priority order; for each one the first header
/// whose lowercased text contains it wins.
pub fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.to_lowercase();
        lowered.iter().position(|h| h.contains(&candidate))
    })
}

/// Read a cell as trimmed text, tolerating ragged rows.
pub fn cell<'a>(row: &'a [String], column: Option<usize>) -> &'a str {
    column
        .and_then(|i| row.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

/// Detect the encoding of raw bytes using chardet.
///
/// Valid UTF-8 is taken as-is; chardet only arbitrates legacy code pages.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-9" | "latin5" | "windows-1254" | "cp1254" => "windows-1254".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// A leading UTF-8 byte order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "windows-1254" | "iso-8859-9" => encoding_rs::WINDOWS_1254.decode(bytes).0.into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => {
            let enc = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| CsvError::EncodingError(format!("unsupported encoding '{}'", label)))?;
            enc.decode(bytes).0.into_owned()
        }
    };

    Ok(match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    })
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Comma wins ties; semicolons show up in Turkish-locale spreadsheet exports.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter, splitting off the header row.
pub fn parse_string(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    let mut rows = tokenize_with_delimiter(content, delimiter);
    if rows.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let headers: Vec<String> = rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect();

    Ok(ParseResult {
        rows,
        headers,
        encoding,
        delimiter,
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_string(&content, delimiter, encoding)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn to_csv<S: AsRef<[u8]>>(table: &[Vec<S>]) -> String {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);
        for row in table {
            writer.write_record(row).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_simple_rows() {
        let rows = tokenize("a,b,c\n1,2,3");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_round_trip_through_csv_writer() {
        let table = vec![
            vec!["Handle", "Title", "Body (HTML)"],
            vec!["cig-badem", "Çiğ Badem, 500g", "<p>\"Taze\" badem</p>"],
            vec!["hurmali-ezme", "Hurmalı\nEzme", "satır 1\r\nsatır 2"],
            vec!["x", "", "\"\""],
            vec!["tek"],
        ];
        let encoded = to_csv(&table);
        let rows = tokenize(&encoded);

        let expected: Vec<Vec<String>> = table
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(rows, expected);
    }

    /// Cells built from separators, quotes, line breaks and Turkish letters.
    fn cell_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just(",".to_string()),
                Just("\"".to_string()),
                Just("\n".to_string()),
                Just("\r\n".to_string()),
                "[a-zA-Z]{1,3}",
                "[çğıöşüÇĞİÖŞÜ]",
            ],
            0..6,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn test_generated_tables_round_trip(
            table in prop::collection::vec(prop::collection::vec(cell_strategy(), 1..5), 1..8)
        ) {
            // all-blank rows are dropped by the tokenizer
            let table: Vec<Vec<String>> = table
                .into_iter()
                .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
                .collect();

            let rows = tokenize(&to_csv(&table));
            prop_assert_eq!(rows, table);
        }
    }

    #[test]
    fn test_crlf_and_trailing_newline() {
        let rows = tokenize("a,b\r\n1,2\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_bare_carriage_return_skipped() {
        let rows = tokenize("a\rb,c");
        assert_eq!(rows, vec![vec!["ab", "c"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n\n").is_empty());
    }

    #[test]
    fn test_blank_rows_dropped() {
        let rows = tokenize("a,b\n , \n1,2\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_unterminated_quote_flushes() {
        let rows = tokenize("a,\"open cell\nstill open");
        assert_eq!(rows, vec![vec!["a", "open cell\nstill open"]]);
    }

    #[test]
    fn test_ragged_rows_kept() {
        let rows = tokenize("a,b,c\n1\n1,2,3,4");
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_find_column_priority() {
        let headers: Vec<String> = ["Handle", "variant sku", "Variant Price"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(find_column(&headers, &["variant price"]), Some(2));
        assert_eq!(find_column(&headers, &["sku"]), Some(1));
        assert_eq!(find_column(&headers, &["title"]), None);
    }

    #[test]
    fn test_find_column_candidate_order_wins() {
        let headers: Vec<String> = ["Variant Compare At Price", "Variant Price"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(find_column(&headers, &["variant price", "price"]), Some(1));
        assert_eq!(find_column(&headers, &["price"]), Some(0));
    }

    #[test]
    fn test_cell_tolerates_missing() {
        let row = vec![" a ".to_string()];
        assert_eq!(cell(&row, Some(0)), "a");
        assert_eq!(cell(&row, Some(3)), "");
        assert_eq!(cell(&row, None), "");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("Handle"), ',');
    }

    #[test]
    fn test_semicolon_parse() {
        let result = parse_bytes_auto("Handle;Title\ncig-badem;Çiğ Badem\n".as_bytes()).unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.headers, vec!["Handle", "Title"]);
        assert_eq!(result.rows, vec![vec!["cig-badem", "Çiğ Badem"]]);
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Handle,Title\nh,t\n");
        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.headers[0], "Handle");
    }

    #[test]
    fn test_windows_1254_decoding() {
        // "Şeker" in windows-1254
        let bytes: &[u8] = &[0xDE, 0x65, 0x6B, 0x65, 0x72];
        let decoded = decode_content(bytes, "windows-1254").unwrap();
        assert_eq!(decoded, "Şeker");
    }

    #[test]
    fn test_unknown_encoding_error() {
        assert!(decode_content(b"abc", "no-such-charset").is_err());
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }
}
