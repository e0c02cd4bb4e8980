#![deny(missing_docs)]

//! # Tables
//!
//! Plain-text tables with padded columns and a header rule.

const GAP: &str = "  ";

/// Rows of cells under a fixed header.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table with the given column headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Missing cells render empty; extra cells are dropped.
    pub fn push<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Renders the table, or `No results` when it has no rows.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "No results\n".to_string();
        }
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|i| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(self.headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&format_row(&self.headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&format_row(&rule, &widths));
        for row in &self.rows {
            out.push_str(&format_row(row, &widths));
        }
        out
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let mut line = padded.join(GAP).trim_end().to_string();
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pads_columns() {
        let mut table = Table::new(["Name", "HTTP Method"]);
        table.push(["CreateTopic", "POST"]);
        table.push(["ListTopics", "GET"]);
        let expected = "\
Name         HTTP Method
-----------  -----------
CreateTopic  POST
ListTopics   GET
";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(["Name"]);
        assert_eq!(table.render(), "No results\n");
    }

    #[test]
    fn test_short_rows_are_filled() {
        let mut table = Table::new(["A", "B"]);
        table.push(["x"]);
        assert_eq!(table.render(), "A  B\n-  -\nx\n");
    }
}
