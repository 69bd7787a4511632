// =============================================================================
// docket/mod.rs - FROM MARKUP TO ROWS
// =============================================================================
//
// `html_table` knows how to read any table; `assembler` knows which tables
// on a case page are docket listings and how to stitch them together.
// =============================================================================

pub mod assembler;
pub mod html_table;

pub use assembler::{assemble, assemble_tables, dedup_rows, parse_docket_date};
