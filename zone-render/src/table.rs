//! Declarative model of the `<tbody>` the renderers fill in.
//!
//! A `TableBody` is the only resource a renderer owns; every render replaces
//! its rows wholesale. `to_html` serializes it with text and attribute
//! values escaped, which is what DOM `textContent`/`href` assignment gives.

use std::fmt::Write as _;

use serde::Serialize;

/// Identifier of the container element on the dashboard pages.
pub const TABLE_BODY_ID: &str = "table-body";
/// Tailwind classes of every data cell.
pub const CELL_CLASS: &str = "px-6 py-4";
/// Tailwind classes of the instance links.
pub const LINK_CLASS: &str = "text-blue-600 hover:underline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellContent {
    Text(String),
    Link {
        href: String,
        text: String,
        class: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub class: String,
    pub content: CellContent,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            class: CELL_CLASS.to_string(),
            content: CellContent::Text(text.into()),
        }
    }

    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            class: CELL_CLASS.to_string(),
            content: CellContent::Link {
                href: href.into(),
                text: text.into(),
                class: LINK_CLASS.to_string(),
            },
        }
    }

    /// Visible text of the cell (link text for link cells).
    pub fn display_text(&self) -> &str {
        match &self.content {
            CellContent::Text(text) => text,
            CellContent::Link { text, .. } => text,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match &self.content {
            CellContent::Link { href, .. } => Some(href),
            CellContent::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<td class=\"{}\">", html_escape(&self.class));
        match &self.content {
            CellContent::Text(text) => out.push_str(&html_escape(text)),
            CellContent::Link { href, text, class } => {
                let _ = write!(
                    out,
                    "<a href=\"{}\" class=\"{}\">{}</a>",
                    html_escape(href),
                    html_escape(class),
                    html_escape(text)
                );
            }
        }
        out.push_str("</td>");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Row of plain text cells, in the given order.
    pub fn text_cells<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: texts.into_iter().map(Cell::text).collect(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(Cell::display_text).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBody {
    id: String,
    rows: Vec<Row>,
}

impl TableBody {
    pub fn new() -> Self {
        Self {
            id: TABLE_BODY_ID.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Drop every existing row and install the new set, in order.
    pub fn replace_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<tbody id=\"{}\">", html_escape(&self.id));
        for row in &self.rows {
            out.push_str("<tr>");
            for cell in &row.cells {
                cell.write_html(&mut out);
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n");
        out
    }
}

impl Default for TableBody {
    fn default() -> Self {
        Self::new()
    }
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
