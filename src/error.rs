// =============================================================================
// error.rs - WHEN A DOCKET HAS NOTHING TO SAY
// =============================================================================
//
// Every error in here is case-scoped. A broken docket page for one case
// never takes the batch down with it: the case is skipped, reported, and
// the engine moves on to the next one.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// No table with the docket listing signature was found on the page.
    #[error("no docket data found for case {case_number}")]
    NoDocketData { case_number: String },

    /// Docket tables were found but none of them has a date column, so
    /// nothing can be placed on a calendar.
    #[error("docket for case {case_number} has no date column")]
    NoDateColumn { case_number: String },

    /// The document source could not hand over the page.
    #[error("could not load docket for case {case_number}: {source}")]
    Source {
        case_number: String,
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    pub fn case_number(&self) -> &str {
        match self {
            LedgerError::NoDocketData { case_number }
            | LedgerError::NoDateColumn { case_number }
            | LedgerError::Source { case_number, .. } => case_number,
        }
    }

    /// True for the "this case simply has no data" family, as opposed to
    /// a failure to obtain the document at all.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            LedgerError::NoDocketData { .. } | LedgerError::NoDateColumn { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_grouping() {
        let missing = LedgerError::NoDocketData { case_number: "CF-2020-1".into() };
        let undated = LedgerError::NoDateColumn { case_number: "CF-2020-2".into() };
        let io = LedgerError::Source {
            case_number: "CF-2020-3".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        assert!(missing.is_no_data());
        assert!(undated.is_no_data());
        assert!(!io.is_no_data());
        assert_eq!(io.case_number(), "CF-2020-3");
        assert_eq!(missing.to_string(), "no docket data found for case CF-2020-1");
    }
}
