// =============================================================================
// docket/html_table.rs - READING TABLES LIKE A BROWSER (MOSTLY)
// =============================================================================
//
// Turns one `<table>` element into a header row plus a grid of cell text.
// Cell text is whitespace-collapsed, `colspan` cells are repeated across the
// columns they cover, and rows that belong to tables nested inside a cell
// are ignored.
// =============================================================================

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

/// Browsers clamp `colspan` to this; so do we.
const MAX_COLSPAN: usize = 1000;

static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));

/// A table as text: header names (verbatim) and one `Vec<String>` per body row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Cell at `column` in `row`, or `None` when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// Read a `<table>` element.
///
/// The header is the first row made only of `<th>` cells. Every other row
/// with at least one `<td>` becomes a body row.
pub fn read_table(table: ElementRef<'_>) -> RawTable {
    let mut raw = RawTable::default();

    for tr in table.select(&TR_SELECTOR) {
        if !owned_by(tr, table) {
            continue;
        }

        let cells: Vec<ElementRef<'_>> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"))
            .collect();

        if cells.is_empty() {
            continue;
        }

        let all_header = cells.iter().all(|c| c.value().name() == "th");
        let texts = expand_cells(&cells);

        if all_header {
            if raw.headers.is_empty() {
                raw.headers = texts;
            }
            continue;
        }

        raw.rows.push(texts);
    }

    raw
}

/// Collapse an element's text into single-spaced words.
pub fn collect_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_cells(cells: &[ElementRef<'_>]) -> Vec<String> {
    let mut out = Vec::with_capacity(cells.len());
    for cell in cells {
        let text = collect_text(*cell);
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 1)
            .map(|n| n.min(MAX_COLSPAN))
            .unwrap_or(1);
        for _ in 1..span {
            out.push(text.clone());
        }
        out.push(text);
    }
    out
}

/// True when the nearest enclosing `<table>` of `tr` is `table` itself.
fn owned_by(tr: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    tr.ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .map(|el| el.name() == "table")
                .unwrap_or(false)
        })
        .map(|node| node.id() == table.id())
        .unwrap_or(false)
}
