//! Job listing table parser.
//!
//! The listing page wraps its table in an element with a fixed id. Every row
//! with exactly four `td` cells is a posting:
//! `[index/icon, title + link, department, last date]`.
//! Any other row (headers, section banners, malformed rows) is skipped.

use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use jobwatch_shared::{JobRecord, JobWatchError, Result};

use crate::link::extract_link;

/// Number of cells in a posting row.
const POSTING_CELLS: usize = 4;

/// Compiled selectors for one listing table layout.
#[derive(Debug)]
pub struct JobTable {
    anchor_css: String,
    anchor: Selector,
    row: Selector,
    cell: Selector,
}

impl JobTable {
    /// Compile a parser for the table wrapped by the element matching `anchor_css`.
    pub fn new(anchor_css: &str) -> Result<Self> {
        Ok(Self {
            anchor_css: anchor_css.to_string(),
            anchor: compile(anchor_css)?,
            row: compile("tr")?,
            cell: compile("td")?,
        })
    }

    /// Selector text this parser was built from.
    pub fn anchor_css(&self) -> &str {
        &self.anchor_css
    }

    /// Lazily yield the postings in `doc`, in document order.
    ///
    /// Fails only when the anchor element is missing from the document.
    pub fn records<'a>(&'a self, doc: &'a Html) -> Result<impl Iterator<Item = JobRecord> + 'a> {
        let table = doc.select(&self.anchor).next().ok_or_else(|| {
            JobWatchError::parse(format!(
                "job listing element '{}' not found in document",
                self.anchor_css
            ))
        })?;

        Ok(table
            .select(&self.row)
            .enumerate()
            .filter_map(move |(index, row)| self.parse_row(index, row)))
    }

    /// Parse a whole HTML page and collect its postings.
    pub fn extract(&self, body: &str) -> Result<Vec<JobRecord>> {
        let doc = Html::parse_document(body);
        Ok(self.records(&doc)?.collect())
    }

    fn parse_row(&self, index: usize, row: ElementRef<'_>) -> Option<JobRecord> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.cell).collect();
        if cells.len() != POSTING_CELLS {
            trace!(row = index, cells = cells.len(), "skipping non-posting row");
            return None;
        }

        let markup = cells[1].inner_html();
        Some(JobRecord {
            title: cell_text(cells[1]),
            department_name: cell_text(cells[2]),
            last_date: cell_text(cells[3]),
            document_link: extract_link(&markup).to_string(),
        })
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| JobWatchError::parse(format!("invalid selector '{css}': {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> JobTable {
        JobTable::new("#graphic-design-2").expect("valid selector")
    }

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><div id="graphic-design-2"><table>{rows}</table></div></body></html>"#
        )
    }

    #[test]
    fn single_posting_row() {
        let body = page(
            r#"<tr><td>1</td><td><a href="/forms/gd1.pdf">Graphic Designer</a></td><td>Civil Engg</td><td>30.11.2024</td></tr>"#,
        );
        let records = table().extract(&body).unwrap();
        assert_eq!(
            records,
            vec![JobRecord {
                title: "Graphic Designer".into(),
                department_name: "Civil Engg".into(),
                last_date: "30.11.2024".into(),
                document_link: "/forms/gd1.pdf".into(),
            }]
        );
    }

    #[test]
    fn three_cell_row_is_skipped_without_error() {
        let body = page(r#"<tr><td>1</td><td><a href="/x.pdf">X</a></td><td>Dept</td></tr>"#);
        let records = table().extract(&body).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn five_cell_and_header_rows_are_skipped() {
        let body = page(
            r#"<tr><th>#</th><th>Title</th><th>Dept</th><th>Date</th></tr>
               <tr><td>1</td><td>a</td><td>b</td><td>c</td><td>d</td></tr>"#,
        );
        assert!(table().extract(&body).unwrap().is_empty());
    }

    #[test]
    fn cell_without_anchor_yields_empty_link() {
        let body = page(r#"<tr><td>1</td><td>Notice only</td><td>Dept</td><td>1.1.2025</td></tr>"#);
        let records = table().extract(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Notice only");
        assert_eq!(records[0].document_link, "");
    }

    #[test]
    fn rows_outside_anchor_are_ignored() {
        let body = r#"<html><body>
            <table><tr><td>1</td><td><a href="/other.pdf">Other</a></td><td>D</td><td>E</td></tr></table>
            <div id="graphic-design-2"><table></table></div>
        </body></html>"#;
        assert!(table().extract(body).unwrap().is_empty());
    }

    #[test]
    fn missing_anchor_is_a_parse_error() {
        let err = table()
            .extract("<html><body><p>Site under maintenance</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, JobWatchError::Parse { .. }));
        assert!(err.to_string().contains("#graphic-design-2"));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let err = JobTable::new("##").unwrap_err();
        assert!(matches!(err, JobWatchError::Parse { .. }));

        let err = JobTable::new("div[").unwrap_err();
        assert!(err.to_string().contains("invalid selector 'div['"));
    }

    #[test]
    fn lazy_iteration_preserves_document_order() {
        let body = page(
            r#"<tr><td>1</td><td><a href="/a.pdf">A</a></td><td>D</td><td>1</td></tr>
               <tr><td>2</td><td><a href="/b.pdf">B</a></td><td>D</td><td>2</td></tr>"#,
        );
        let doc = Html::parse_document(&body);
        let parser = table();
        let mut records = parser.records(&doc).unwrap();
        assert_eq!(records.next().unwrap().document_link, "/a.pdf");
        assert_eq!(records.next().unwrap().document_link, "/b.pdf");
        assert!(records.next().is_none());
    }
}
