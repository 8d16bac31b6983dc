//! GFM pipe-table row and delimiter grammar.

use crate::ast::TableAlignment;

/// Parse a delimiter row like `| --- | :-: |`. Returns the per-column
/// alignments, or `None` if the line is not a valid delimiter row.
pub(super) fn parse_table_separator(line: &str) -> Option<Vec<TableAlignment>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.contains('|') {
        return None;
    }

    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    if inner.trim().is_empty() {
        return None;
    }

    let mut alignments = Vec::new();
    for cell in inner.split('|') {
        let cell = cell.trim();
        if cell.is_empty() {
            return None;
        }
        let left = cell.starts_with(':');
        let right = cell.ends_with(':');
        let dashes = &cell[left as usize..cell.len() - right as usize];
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        alignments.push(match (left, right) {
            (true, true) => TableAlignment::Center,
            (true, false) => TableAlignment::Left,
            (false, true) => TableAlignment::Right,
            (false, false) => TableAlignment::None,
        });
    }

    Some(alignments)
}

/// Split a row into trimmed cells on unescaped pipes.
pub(super) fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let bytes = inner.as_bytes();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && bytes[i + 1] == b'|' {
            // Escaped pipe stays escaped for the inline phase.
            current.push_str("\\|");
            i += 2;
        } else if bytes[i] == b'|' {
            cells.push(std::mem::take(&mut current).trim().to_string());
            i += 1;
        } else {
            let len = crate::utf8_char_len(bytes[i]);
            current.push_str(&inner[i..i + len]);
            i += len;
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Row cells padded or clipped to the table's column count.
pub(super) fn parse_table_row(line: &str, num_cols: usize) -> Vec<String> {
    let mut cells = split_cells(line);
    cells.resize(num_cols, String::new());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use TableAlignment::*;

    #[test]
    fn separator_alignments() {
        assert_eq!(
            parse_table_separator("|---|:-:|:--|--:|"),
            Some(vec![None, Center, Left, Right])
        );
        assert_eq!(parse_table_separator(" --- | --- "), Some(vec![None, None]));
        assert_eq!(parse_table_separator("---"), Option::None);
        assert_eq!(parse_table_separator("| a |"), Option::None);
        assert_eq!(parse_table_separator("| :: |"), Option::None);
    }

    #[test]
    fn rows_pad_and_clip() {
        assert_eq!(parse_table_row("| a | b |", 2), vec!["a", "b"]);
        assert_eq!(parse_table_row("a | b | c", 2), vec!["a", "b"]);
        assert_eq!(parse_table_row("| a |", 3), vec!["a", "", ""]);
    }

    #[test]
    fn escaped_pipes_stay_in_cell() {
        assert_eq!(parse_table_row(r"| a \| b |", 1), vec![r"a \| b"]);
    }

    #[test]
    fn multibyte_cells_survive_splitting() {
        assert_eq!(parse_table_row("| über | naïve |", 2), vec!["über", "naïve"]);
    }
}
