// ██████╗  ██████╗  ██████╗██╗  ██╗███████╗████████╗
// ██╔══██╗██╔═══██╗██╔════╝██║ ██╔╝██╔════╝╚══██╔══╝
// ██║  ██║██║   ██║██║     █████╔╝ █████╗     ██║
// ██║  ██║██║   ██║██║     ██╔═██╗ ██╔══╝     ██║
// ██████╔╝╚██████╔╝╚██████╗██║  ██╗███████╗   ██║
// ╚═════╝  ╚═════╝  ╚═════╝╚═╝  ╚═╝╚══════╝   ╚═╝
//
// L E D G E R
//
// Court dockets in, fee and payment ledgers out. Every case is worked out on
// its own: what the court assessed, what was paid, and the longest run of
// months in which somebody kept paying.

pub mod case_ref;
pub mod classifier;
pub mod config;
pub mod docket;
pub mod error;
pub mod extraction;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod party_filter;
pub mod phrase_scanner;
pub mod report;
pub mod source;
pub mod streak;

#[cfg(test)]
mod test_support;

pub use case_ref::CaseRef;
pub use classifier::{AmountClassifier, Classification};
pub use error::LedgerError;
pub use ledger::{BatchOutcomes, CaseDocument, CaseLedgerBuilder, LedgerBatch};
pub use models::{DocketRow, DocketTable, ExtractionStrategy, LedgerEntry, LedgerResult, MonthKey, Subject};
pub use party_filter::PartyFilterFallback;
pub use report::BatchReport;
pub use source::{DirectorySource, DocketSource, InMemorySource};
