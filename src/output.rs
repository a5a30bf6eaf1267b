//! Result Rendering
//!
//! Query results render as aligned text tables with a trailing row count,
//! kept separate from the operations so tests can assert on structured
//! rows instead of formatted text.

use crate::backend::QueryRows;

/// A renderable result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render as an aligned table followed by the row count.
    #[must_use]
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(String::len).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if idx < widths.len() {
                    widths[idx] = widths[idx].max(cell.len());
                } else {
                    widths.push(cell.len());
                }
            }
        }

        let render_row = |cells: &[String]| -> String {
            let mut line = String::new();
            for (idx, cell) in cells.iter().enumerate() {
                if idx > 0 {
                    line.push_str("  ");
                }
                let width = widths.get(idx).copied().unwrap_or(cell.len());
                line.push_str(&format!("{cell:<width$}"));
            }
            line.trim_end().to_string()
        };

        let mut out = String::new();
        out.push_str(&render_row(&self.columns));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        out.push_str(&format!("total row(s): {}\n", self.rows.len()));
        out
    }
}

impl From<QueryRows> for TableView {
    fn from(result: QueryRows) -> Self {
        Self { columns: result.columns, rows: result.rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_aligns_columns() {
        let view = TableView::new(
            vec!["storeID".to_string(), "productName".to_string()],
            vec![
                vec!["7".to_string(), "Milk".to_string()],
                vec!["104".to_string(), "Bread".to_string()],
            ],
        );
        assert_eq!(
            view.render(),
            "storeID  productName\n\
             7        Milk\n\
             104      Bread\n\
             total row(s): 2\n"
        );
    }

    #[test]
    fn test_render_empty_result() {
        let view = TableView::new(vec!["orderNumber".to_string()], vec![]);
        assert_eq!(view.render(), "orderNumber\ntotal row(s): 0\n");
    }
}
