//! Plain-text rendering for tables and cell values.

use crate::entities::CellValue;

/// Columns whose text is shown title-cased.
const TITLE_CASE_COLUMNS: &[&str] = &["name", "location", "role", "category"];

/// `"john DOE"` -> `"John Doe"`. Missing or empty input renders as `-`.
pub fn title_case(value: Option<&str>) -> String {
    let Some(s) = value.filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

pub fn format_cell(column: &str, cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "-".to_string(),
        CellValue::Bool(true) => "Yes".to_string(),
        CellValue::Bool(false) => "No".to_string(),
        CellValue::Int(n) => n.to_string(),
        CellValue::Decimal(n) => format!("{n:.2}"),
        CellValue::Text(s) if TITLE_CASE_COLUMNS.contains(&column) => title_case(Some(s)),
        CellValue::Text(s) => s.clone(),
    }
}

/// Render a titled, column-aligned table. `rows` are already formatted.
/// An empty table gets a single hint line under the header.
pub fn render_table(title: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let header_line = format_row(
        &headers
            .iter()
            .map(|h| h.to_uppercase())
            .collect::<Vec<_>>(),
    );
    let rule = "-".repeat(header_line.chars().count().max(title.chars().count()));

    let mut out = format!("{title}\n{rule}\n{header_line}\n{rule}\n");
    if rows.is_empty() {
        out.push_str("No records found. Use `create` to add one.\n");
    } else {
        for row in rows {
            out.push_str(&format_row(row));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case(Some("main BRANCH")), "Main Branch");
        assert_eq!(title_case(Some("HEAD_OF_BRANCH")), "Head_of_branch");
        assert_eq!(title_case(Some("")), "-");
        assert_eq!(title_case(None), "-");
    }

    #[test]
    fn cells_follow_display_rules() {
        assert_eq!(format_cell("membership", &CellValue::Bool(true)), "Yes");
        assert_eq!(format_cell("membership", &CellValue::Bool(false)), "No");
        assert_eq!(format_cell("email", &CellValue::Null), "-");
        assert_eq!(format_cell("total", &CellValue::Decimal(25.0)), "25.00");
        assert_eq!(
            format_cell("role", &CellValue::Text("CASHIER".into())),
            "Cashier"
        );
        assert_eq!(
            format_cell("email", &CellValue::Text("A@B.JO".into())),
            "A@B.JO"
        );
    }

    #[test]
    fn table_aligns_columns() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Water".to_string()],
            vec!["10".to_string(), "Bread".to_string()],
        ];
        let text = render_table("Product Inventory", &headers, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Product Inventory");
        assert_eq!(lines[2], "ID | NAME");
        assert_eq!(lines[4], "1  | Water");
        assert_eq!(lines[5], "10 | Bread");
    }

    #[test]
    fn empty_table_keeps_header() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let text = render_table("Customers", &headers, &[]);
        assert!(text.contains("ID | NAME"));
        assert!(text.contains("No records found"));
    }
}
