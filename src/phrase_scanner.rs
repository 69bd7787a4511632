// =============================================================================
// phrase_scanner.rs - LISTENING FOR THE MAGIC WORDS
// =============================================================================
//
// A handful of phrases in a docket description change the story of a case:
//
//   "payment plan"  - the court set up installments
//   "grants 983a"   - a cost waiver under 22 O.S. § 983(a) was granted
//   "receipt"       - the line records money actually taken in
//
// All of them are matched case-insensitively with one Aho-Corasick
// automaton, so every description is walked exactly once no matter how
// many phrases we care about.
// =============================================================================

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use tracing::debug;

use crate::models::DocketRow;

pub const PAYMENT_PLAN_PHRASE: &str = "payment plan";
pub const WAIVER_GRANT_PHRASE: &str = "grants 983a";
pub const RECEIPT_PHRASE: &str = "receipt";

/// Pattern order matters: the match's pattern index maps back to the flag.
const PHRASES: [&str; 3] = [PAYMENT_PLAN_PHRASE, WAIVER_GRANT_PHRASE, RECEIPT_PHRASE];

static PHRASE_AUTOMATON: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(PHRASES)
        .expect("Failed to build docket phrase automaton")
});

/// Which phrases showed up in a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhraseHits {
    pub payment_plan: bool,
    pub waiver_grant: bool,
    pub receipt: bool,
}

impl PhraseHits {
    fn merge(self, other: PhraseHits) -> PhraseHits {
        PhraseHits {
            payment_plan: self.payment_plan || other.payment_plan,
            waiver_grant: self.waiver_grant || other.waiver_grant,
            receipt: self.receipt || other.receipt,
        }
    }
}

/// Scan one piece of text for every phrase.
pub fn scan_text(text: &str) -> PhraseHits {
    let mut hits = PhraseHits::default();
    for m in PHRASE_AUTOMATON.find_overlapping_iter(text) {
        match m.pattern().as_usize() {
            0 => hits.payment_plan = true,
            1 => hits.waiver_grant = true,
            _ => hits.receipt = true,
        }
    }
    hits
}

/// True when the text mentions a receipt, in any capitalization.
pub fn mentions_receipt(text: &str) -> bool {
    scan_text(text).receipt
}

/// Case-level flags derived from every row's description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseFlags {
    pub has_payment_plan: bool,
    pub already_received_waiver: bool,
}

pub fn scan_rows(rows: &[DocketRow]) -> CaseFlags {
    let hits = rows
        .iter()
        .map(|row| scan_text(&row.description))
        .fold(PhraseHits::default(), PhraseHits::merge);

    debug!(
        payment_plan = hits.payment_plan,
        waiver = hits.waiver_grant,
        "Docket phrase scan complete"
    );

    CaseFlags {
        has_payment_plan: hits.payment_plan,
        already_received_waiver: hits.waiver_grant,
    }
}
