// =============================================================================
// party_filter.rs - WHOSE LINE IS IT ANYWAY?
// =============================================================================
//
// A docket tracks every party in a case: co-defendants, bondsmen, the State.
// We only care about the rows that concern our subject.
//
// The rule is deliberately blunt: lower-case everything and check that both
// the first name and the last name appear as substrings. No nicknames, no
// phonetics, no "Jon vs John" forgiveness. Results have to be reproducible,
// and a clever matcher is a matcher nobody can explain to a judge.
//
//   1. Party column missing or blank on every row -> keep everything.
//   2. Keep rows whose party names the subject, plus rows whose
//      description names the subject (clerks often type the name there).
//   3. Nothing matched at all -> keep everything and say so.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::docket::assembler::COL_PARTY;
use crate::models::{DocketRow, DocketTable, Subject};

/// Why the filter handed back the rows unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyFilterFallback {
    /// The docket has no usable party column.
    NoPartyColumn,
    /// Neither party nor description matched any row.
    AmbiguousParty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartyFilterOutcome {
    pub rows: Vec<DocketRow>,
    pub fallback: Option<PartyFilterFallback>,
    pub matched_by_party: usize,
    pub matched_by_description: usize,
}

/// Primary rule: the party field contains both name tokens.
pub fn party_names_subject(row: &DocketRow, first: &str, last: &str) -> bool {
    contains_both(&row.party, first, last)
}

/// Fallback rule: the description contains both name tokens.
pub fn description_names_subject(row: &DocketRow, first: &str, last: &str) -> bool {
    contains_both(&row.description, first, last)
}

/// A blank token names nobody.
fn contains_both(text: &str, first: &str, last: &str) -> bool {
    if first.trim().is_empty() || last.trim().is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();
    lowered.contains(first) && lowered.contains(last)
}

/// Narrow a docket to the rows concerning `subject`.
pub fn filter_for_subject(table: &DocketTable, subject: &Subject) -> PartyFilterOutcome {
    let party_informative = table.has_column(COL_PARTY)
        && table.rows.iter().any(|r| !r.party.trim().is_empty());

    if !party_informative {
        debug!(case = %table.case_number, "No party information on docket, skipping party filter");
        return unfiltered(table, PartyFilterFallback::NoPartyColumn);
    }

    let (first, last) = subject.name_tokens();
    let mut matched_by_party = 0;
    let mut matched_by_description = 0;

    let rows: Vec<DocketRow> = table
        .rows
        .iter()
        .filter(|row| {
            if party_names_subject(row, &first, &last) {
                matched_by_party += 1;
                true
            } else if description_names_subject(row, &first, &last) {
                matched_by_description += 1;
                true
            } else {
                false
            }
        })
        .cloned()
        .collect();

    if rows.is_empty() {
        warn!(
            case = %table.case_number,
            subject = %subject,
            rows = table.len(),
            "No docket row names the subject, proceeding with unfiltered rows"
        );
        return unfiltered(table, PartyFilterFallback::AmbiguousParty);
    }

    debug!(
        case = %table.case_number,
        kept = rows.len(),
        by_party = matched_by_party,
        by_description = matched_by_description,
        dropped = table.len() - rows.len(),
        "Party filter applied"
    );

    PartyFilterOutcome {
        rows,
        fallback: None,
        matched_by_party,
        matched_by_description,
    }
}

fn unfiltered(table: &DocketTable, fallback: PartyFilterFallback) -> PartyFilterOutcome {
    PartyFilterOutcome {
        rows: table.rows.clone(),
        fallback: Some(fallback),
        matched_by_party: 0,
        matched_by_description: 0,
    }
}
