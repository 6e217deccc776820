//! Per-document pipeline and batch processing.
//!
//! A document goes through parse → validate → flatten → analyze. In a batch,
//! a failing document is recorded and the remaining ones are still processed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    analysis::{analyze, AnalysisResult},
    error::DocumentError,
    flatten::Flattener,
    hazard::{HazardClassifier, KeywordClassifier},
    manifest::{validate_document, vessel_id, ManifestHeader},
    models::ContainerRow,
};

/// Result of processing one manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRecord {
    /// Vessel identifier, see [`vessel_id`].
    pub id: String,
    /// Name of the file or upload the document came from.
    pub source_name: String,
    /// When the document was processed.
    pub processed_at: DateTime<Utc>,
    /// Header of the first manifest in the document.
    pub manifest: ManifestHeader,
    /// Flattened rows, in source order.
    pub rows: Vec<ContainerRow>,
    /// Statistics and category views.
    pub analysis: AnalysisResult,
}

/// A document rejected during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Name of the rejected document.
    pub source_name: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Records and failures of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Successfully processed documents.
    pub records: Vec<VesselRecord>,
    /// Rejected documents.
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutcome {
    /// Single-line summary of every failure, `None` when all documents passed.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(
            self.failures
                .iter()
                .map(|failure| format!("{}: {}", failure.source_name, failure.reason))
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }

    /// The last successfully processed document.
    pub fn latest(&self) -> Option<&VesselRecord> {
        self.records.last()
    }

    /// Record the outcome of one document.
    pub fn push(&mut self, source_name: &str, outcome: Result<VesselRecord, DocumentError>) {
        match outcome {
            Ok(record) => self.records.push(record),
            Err(err) => {
                warn!(document = source_name, "Rejected manifest document: {err}");
                self.failures.push(DocumentFailure {
                    source_name: source_name.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Validate → flatten → analyze for whole documents.
#[derive(Debug, Clone, Default)]
pub struct Pipeline<C = KeywordClassifier> {
    flattener: Flattener<C>,
}

impl Pipeline<KeywordClassifier> {
    /// Pipeline with the default dangerous-goods policy.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: HazardClassifier> Pipeline<C> {
    /// Pipeline using the given flattener.
    pub fn with_flattener(flattener: Flattener<C>) -> Self {
        Self { flattener }
    }

    /// Process a document given as JSON text.
    pub fn process_text(
        &self,
        source_name: &str,
        text: &str,
    ) -> Result<VesselRecord, DocumentError> {
        let document: Value = serde_json::from_str(text)?;
        self.process_value(source_name, document)
    }

    /// Process an already parsed document.
    pub fn process_value(
        &self,
        source_name: &str,
        document: Value,
    ) -> Result<VesselRecord, DocumentError> {
        let manifests = validate_document(document)?;
        let rows = self.flattener.flatten(&manifests);
        if rows.is_empty() {
            return Err(DocumentError::EmptyResult);
        }
        let analysis = analyze(&rows);

        let (id, manifest) = manifests
            .first()
            .map(|first| (vessel_id(first), ManifestHeader::from(first)))
            .unwrap_or_default();

        info!(
            document = source_name,
            vessel = %id,
            rows = rows.len(),
            containers = analysis.stats.total_containers,
            "Processed manifest document"
        );

        Ok(VesselRecord {
            id,
            source_name: source_name.to_string(),
            processed_at: Utc::now(),
            manifest,
            rows,
            analysis,
        })
    }

    /// Process every `(name, text)` pair; failures never stop the batch.
    pub fn process_batch<I, N, T>(&self, documents: I) -> BatchOutcome
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut outcome = BatchOutcome::default();
        for (name, text) in documents {
            let name = name.as_ref();
            outcome.push(name, self.process_text(name, text.as_ref()));
        }
        outcome
    }
}

/// Process one JSON document with the default pipeline.
pub fn process_document(source_name: &str, text: &str) -> Result<VesselRecord, DocumentError> {
    Pipeline::new().process_text(source_name, text)
}
