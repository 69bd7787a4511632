// =============================================================================
// docket/assembler.rs - ONE TABLE TO RULE THEM ALL
// =============================================================================
//
// A case page can carry several docket listing tables (one per section,
// one per era of the case-management system, one because somebody felt
// like it). This module stacks them into a single row set with the
// canonical columns: date, code, description, party, amount.
//
// Two rendering quirks are undone here:
//
// 1. Dates are printed once per group of entries. A blank date cell means
//    "same day as the row above", so dates are forward-filled.
// 2. Amount cells are blank on most rows. When the table has an amount
//    column, blanks become the "" sentinel; when it doesn't, the amount
//    stays `None` so later stages can tell the two situations apart.
// =============================================================================

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::debug;

use crate::docket::html_table::{read_table, RawTable};
use crate::error::LedgerError;
use crate::models::{DocketRow, DocketTable};

/// The structural signature of a docket listing table.
pub const DOCKET_TABLE_SELECTOR: &str = "table.docketlist.ocis, table.docketlist.kp";

static DOCKET_TABLES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(DOCKET_TABLE_SELECTOR).expect("valid docket table selector")
});

/// Date layouts seen in docket listings, most common first.
const DATE_FORMATS: &[&str] = &["%m-%d-%Y", "%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"];

pub const COL_DATE: &str = "date";
pub const COL_CODE: &str = "code";
pub const COL_DESCRIPTION: &str = "description";
pub const COL_PARTY: &str = "party";
pub const COL_AMOUNT: &str = "amount";

/// Pull every docket listing table out of a case page.
pub fn find_docket_tables(doc: &Html) -> Vec<RawTable> {
    doc.select(&DOCKET_TABLES).map(read_table).collect()
}

/// Assemble the docket for one case straight from its parsed page.
pub fn assemble(doc: &Html, case_number: &str) -> Result<DocketTable, LedgerError> {
    let tables = find_docket_tables(doc);
    debug!(case = case_number, tables = tables.len(), "Docket tables located");
    assemble_tables(case_number, &tables)
}

/// Merge raw tables into one canonical docket.
pub fn assemble_tables(case_number: &str, tables: &[RawTable]) -> Result<DocketTable, LedgerError> {
    let no_data = || LedgerError::NoDocketData {
        case_number: case_number.to_string(),
    };

    if tables.is_empty() {
        return Err(no_data());
    }

    // Union of canonical column names, in first-seen order.
    let mut columns: Vec<String> = Vec::new();
    let layouts: Vec<Vec<String>> = tables
        .iter()
        .map(|t| t.headers.iter().map(|h| canonical_column(h)).collect())
        .collect();
    for name in layouts.iter().flatten() {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let has_amount = columns.iter().any(|c| c == COL_AMOUNT);
    let mut rows = Vec::new();
    let mut carried: Option<NaiveDate> = None;

    for (table, layout) in tables.iter().zip(&layouts) {
        let index_of = |name: &str| layout.iter().position(|c| c == name);
        let date_idx = index_of(COL_DATE);
        let code_idx = index_of(COL_CODE);
        let desc_idx = index_of(COL_DESCRIPTION);
        let party_idx = index_of(COL_PARTY);
        let amount_idx = index_of(COL_AMOUNT);

        for cells in &table.rows {
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            let cell = |idx: Option<usize>| -> String {
                idx.and_then(|i| cells.get(i))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };

            let date_text = cell(date_idx);
            let date = if date_text.is_empty() {
                carried
            } else {
                match parse_docket_date(&date_text) {
                    Some(d) => {
                        carried = Some(d);
                        Some(d)
                    }
                    None => {
                        debug!(case = case_number, date = %date_text, "Unreadable docket date, row left undated");
                        None
                    }
                }
            };

            let amount = has_amount.then(|| cell(amount_idx));

            rows.push(DocketRow {
                case_number: case_number.to_string(),
                date,
                code: cell(code_idx),
                description: cell(desc_idx),
                party: cell(party_idx),
                amount,
            });
        }
    }

    if rows.is_empty() {
        return Err(no_data());
    }

    debug!(
        case = case_number,
        rows = rows.len(),
        columns = ?columns,
        "Docket assembled"
    );

    Ok(DocketTable {
        case_number: case_number.to_string(),
        columns,
        rows,
    })
}

/// Lower-case a header and fold known spellings onto the canonical names.
pub fn canonical_column(header: &str) -> String {
    let lowered = header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    match lowered.as_str() {
        "docket date" | "date filed" => COL_DATE.to_string(),
        "docket code" | "docket_code" => COL_CODE.to_string(),
        "docket description" | "docket text" => COL_DESCRIPTION.to_string(),
        "parties" | "party name" => COL_PARTY.to_string(),
        "amount ($)" | "amt" => COL_AMOUNT.to_string(),
        _ => lowered,
    }
}

/// Parse a docket date cell in any of the layouts the courts use.
pub fn parse_docket_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Drop exact duplicate rows, keeping the first occurrence.
pub fn dedup_rows(table: &mut DocketTable) -> usize {
    let before = table.rows.len();
    let mut seen = std::collections::HashSet::new();
    table.rows.retain(|row| seen.insert(row.clone()));
    before - table.rows.len()
}
