//! Permissive tabular parser.
//!
//! Spreadsheet exports in the wild are not strict CSV: quoting is
//! inconsistent, cells carry stray whitespace, and a truncated download can
//! cut a line mid-quote. This parser therefore never fails; it extracts the
//! best interpretation of every non-blank line. An unterminated quote is
//! closed implicitly at end of line, and every field is trimmed after
//! extraction.

/// A parsed roster document: one header row and zero or more data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Trimmed field names from the first non-blank line.
    pub header: Vec<String>,
    /// Data rows, positionally aligned to the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Whether the document contained no non-blank lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }
}

/// Parse raw delimited text into a header and data rows.
///
/// Lines are split CR/LF tolerant; blank lines are discarded. The first
/// non-blank line is the header, all following lines are data rows parsed
/// with the identical rule. Empty input yields an empty table, not an error.
#[must_use]
pub fn parse(text: &str) -> Table {
    let mut lines = text.split(['\r', '\n']).filter(|l| !l.is_empty());

    let Some(first) = lines.next() else {
        return Table::default();
    };

    Table {
        header: parse_line(first),
        rows: lines.map(parse_line).collect(),
    }
}

/// Scan one line into fields, honoring quoting.
///
/// A `"` toggles the quoted state, except that a doubled `""` inside a quoted
/// field emits a literal quote. Commas outside quotes separate fields.
fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let table = parse("id,signed\n123,true\n456,no\n");
        assert_eq!(table.header, vec!["id", "signed"]);
        assert_eq!(table.rows, vec![vec!["123", "true"], vec!["456", "no"]]);
    }

    #[test]
    fn empty_input_is_empty_table() {
        assert!(parse("").is_empty());
        assert!(parse("\n\r\n\n").is_empty());
    }

    #[test]
    fn discards_blank_lines_between_rows() {
        let table = parse("a,b\n\n1,2\n\r\n3,4");
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn quoted_comma_stays_in_field() {
        let table = parse("name,note\nx,\"hello, world\"");
        assert_eq!(table.rows[0], vec!["x", "hello, world"]);
    }

    #[test]
    fn doubled_quote_emits_literal_quote() {
        let table = parse("a\n\"say \"\"hi\"\"\"");
        assert_eq!(table.rows[0], vec!["say \"hi\""]);
    }

    #[test]
    fn unterminated_quote_closes_at_end_of_line() {
        let table = parse("a,b\n\"unterminated,2");
        // The open quote swallows the comma; end of line ends the field.
        assert_eq!(table.rows[0], vec!["unterminated,2"]);
    }

    #[test]
    fn fields_are_trimmed() {
        let table = parse("  a  ,  b  \n 1 ,\t2 ");
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn crlf_line_endings() {
        let table = parse("a,b\r\n1,2\r\n");
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn trailing_empty_field_preserved() {
        let table = parse("a,b\n1,");
        assert_eq!(table.rows[0], vec!["1", ""]);
    }

    /// Quote-escaping is invertible: serializing parsed cells back with the
    /// same convention and reparsing reproduces the cell values.
    #[test]
    fn quoting_round_trip() {
        fn escape(cell: &str) -> String {
            if cell.contains(',') || cell.contains('"') {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.to_string()
            }
        }

        let cells = vec![
            "plain".to_string(),
            "with, comma".to_string(),
            "with \"quotes\"".to_string(),
            "both, \"of\" them".to_string(),
        ];
        let line = cells.iter().map(|c| escape(c)).collect::<Vec<_>>().join(",");
        let table = parse(&format!("h1,h2,h3,h4\n{line}"));
        assert_eq!(table.rows[0], cells);
    }
}
