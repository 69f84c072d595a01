//! Typed table rendering with a single-column free-text filter
//!
//! Records are projected into cells through [`Column`] accessors, so the
//! markup never interpolates raw record fields. Every cell is escaped when the
//! table is written out as HTML.

pub mod page;

use std::fmt::Write;

/// One rendered cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text
    Text(String),
    /// Nested payload behind a disclosure toggle, collapsed until expanded
    Detail {
        summary: String,
        body: String,
        expanded: bool,
    },
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn detail(summary: impl Into<String>, body: impl Into<String>) -> Self {
        Cell::Detail {
            summary: summary.into(),
            body: body.into(),
            expanded: false,
        }
    }

    /// Text a reader sees for this cell; the filter matches against it
    pub fn visible_text(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Detail {
                summary,
                body,
                expanded,
            } => {
                if *expanded {
                    format!("{}{}", summary, body)
                } else {
                    summary.clone()
                }
            }
        }
    }
}

/// Projection of one record field into a display cell
pub struct Column<T> {
    pub header: &'static str,
    pub accessor: fn(&T) -> Cell,
}

impl<T> Column<T> {
    pub const fn new(header: &'static str, accessor: fn(&T) -> Cell) -> Self {
        Self { header, accessor }
    }
}

/// A rendered row and its visibility under the current filter
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub cells: Vec<Cell>,
    pub visible: bool,
}

impl RenderedRow {
    /// Flip the disclosure state of a detail cell. Returns the new state, or
    /// `None` if the column is not a detail cell.
    pub fn toggle_detail(&mut self, column: usize) -> Option<bool> {
        match self.cells.get_mut(column) {
            Some(Cell::Detail { expanded, .. }) => {
                *expanded = !*expanded;
                Some(*expanded)
            }
            _ => None,
        }
    }
}

/// A fully rendered table plus its ephemeral filter state
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    headers: Vec<&'static str>,
    rows: Vec<RenderedRow>,
    filter_column: usize,
    filter: String,
}

/// Project `records` through `columns`. `filter_column` is the index of the
/// column the free-text filter matches against.
pub fn render<T>(records: &[T], columns: &[Column<T>], filter_column: usize) -> RenderedTable {
    debug_assert!(filter_column < columns.len(), "filter column out of range");

    let rows = records
        .iter()
        .map(|record| RenderedRow {
            cells: columns.iter().map(|c| (c.accessor)(record)).collect(),
            visible: true,
        })
        .collect();

    RenderedTable {
        headers: columns.iter().map(|c| c.header).collect(),
        rows,
        filter_column,
        filter: String::new(),
    }
}

impl RenderedTable {
    pub fn headers(&self) -> &[&'static str] {
        &self.headers
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [RenderedRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &RenderedRow> {
        self.rows.iter().filter(|r| r.visible)
    }

    /// Re-evaluate every row against `filter`. Only visibility changes; the
    /// rows themselves and their order are untouched.
    pub fn apply_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        let needle = filter.to_lowercase();
        let column = self.filter_column;

        for row in &mut self.rows {
            row.visible = needle.is_empty()
                || row
                    .cells
                    .get(column)
                    .map(|cell| cell.visible_text().to_lowercase().contains(&needle))
                    .unwrap_or(false);
        }
    }

    /// Write the table as an HTML fragment. `table_id` ties the filter input
    /// to its table for the in-page filter script.
    pub fn to_html(&self, table_id: &str) -> String {
        let mut html = String::new();
        let id = escape_html(table_id);
        let filter_header = self
            .headers
            .get(self.filter_column)
            .copied()
            .unwrap_or_default();

        let _ = write!(
            html,
            concat!(
                r#"<div class="table-view"><input type="search" class="filter" "#,
                r#"data-filter-for="{id}" placeholder="Filter by {header}" "#,
                r#"value="{value}" autocomplete="off">"#,
            ),
            id = id,
            header = escape_html(&filter_header.to_lowercase()),
            value = escape_html(&self.filter),
        );
        let _ = write!(
            html,
            r#"<table id="{}" data-filter-column="{}"><thead><tr>"#,
            id, self.filter_column
        );
        for header in &self.headers {
            let _ = write!(html, "<th>{}</th>", escape_html(header));
        }
        html.push_str("</tr></thead><tbody>");

        for row in &self.rows {
            html.push_str(if row.visible { "<tr>" } else { "<tr hidden>" });
            for cell in &row.cells {
                match cell {
                    Cell::Text(text) => {
                        let _ = write!(html, "<td>{}</td>", escape_html(text));
                    }
                    Cell::Detail {
                        summary,
                        body,
                        expanded,
                    } => {
                        let _ = write!(
                            html,
                            concat!(
                                r#"<td><details{}><summary>{}</summary>"#,
                                r#"<pre class="json">{}</pre></details></td>"#,
                            ),
                            if *expanded { " open" } else { "" },
                            escape_html(summary),
                            escape_html(body),
                        );
                    }
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");

        let noun = if self.rows.len() == 1 { "record" } else { "records" };
        let _ = write!(
            html,
            r#"<p class="count">{} {}</p></div>"#,
            self.rows.len(),
            noun
        );
        html
    }
}

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
