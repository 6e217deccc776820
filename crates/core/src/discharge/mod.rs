#![allow(missing_docs)]

//! Reconciliation of free-text discharge reports against the manifest.
//!
//! Operators paste unloading reports line by line; each line that mentions a
//! container identifier becomes a [`DischargeRecord`] in a [`DischargeLog`].

mod lookup;
mod parser;
mod shared;

pub use lookup::{manifest_container_ids, DischargeLog, IngestSummary, ReconciliationReport};
pub use parser::{
    canonical_container_id, extract_container_id, extract_date, parse_line, DischargeRecord,
};
pub use shared::SharedDischargeLog;
