use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::ContainerRow;

use super::parser::{canonical_container_id, parse_line, DischargeRecord};

/// Accumulated discharge lookup keyed by canonical container id.
///
/// Successive calls to [`ingest`](Self::ingest) add to the lookup; the newest
/// line for an id replaces earlier ones. Nothing is removed until [`reset`](Self::reset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DischargeLog {
    records: BTreeMap<String, DischargeRecord>,
}

/// What one call to [`DischargeLog::ingest`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Lines in the pasted block.
    pub lines: usize,
    /// Lines that carried a container identifier.
    pub recognised: usize,
    /// Ids that were not in the lookup before this call.
    pub new_ids: usize,
}

/// Discharge lookup compared against the manifest population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Reported and expected.
    pub matched: Vec<String>,
    /// Reported but absent from the manifest.
    pub unexpected: Vec<String>,
    /// Expected but not reported yet.
    pub outstanding: Vec<String>,
}

impl ReconciliationReport {
    /// Ids present in the discharge lookup.
    pub fn total_reported(&self) -> usize {
        self.matched.len() + self.unexpected.len()
    }
}

impl DischargeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a block of free text and upsert every recognised line.
    pub fn ingest(&mut self, text: &str) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for line in text.lines() {
            summary.lines += 1;
            let Some(record) = parse_line(line) else {
                continue;
            };
            summary.recognised += 1;
            if self.upsert(record).is_none() {
                summary.new_ids += 1;
            }
        }
        info!(
            lines = summary.lines,
            recognised = summary.recognised,
            new_ids = summary.new_ids,
            total = self.records.len(),
            "Ingested discharge report"
        );
        summary
    }

    /// Insert or replace the record for its id, returning the previous one.
    pub fn upsert(&mut self, record: DischargeRecord) -> Option<DischargeRecord> {
        self.records.insert(record.container_id.clone(), record)
    }

    pub fn get(&self, container_id: &str) -> Option<&DischargeRecord> {
        self.records.get(container_id)
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.records.contains_key(container_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by container id.
    pub fn records(&self) -> impl Iterator<Item = &DischargeRecord> {
        self.records.values()
    }

    /// Forget everything ingested so far.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Partition the lookup against the expected container ids.
    pub fn reconcile(&self, manifest_ids: &BTreeSet<String>) -> ReconciliationReport {
        let (matched, unexpected): (Vec<String>, Vec<String>) = self
            .records
            .keys()
            .cloned()
            .partition(|id| manifest_ids.contains(id));
        let outstanding = manifest_ids
            .iter()
            .filter(|id| !self.records.contains_key(*id))
            .cloned()
            .collect();
        ReconciliationReport {
            matched,
            unexpected,
            outstanding,
        }
    }
}

/// Canonical ids of every container referenced by the rows.
pub fn manifest_container_ids(rows: &[ContainerRow]) -> BTreeSet<String> {
    rows.iter()
        .map(|row| canonical_container_id(&row.num_conteneur))
        .collect()
}
