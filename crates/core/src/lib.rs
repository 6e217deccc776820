#![warn(clippy::all, missing_docs)]

//! Core engine for vessel cargo manifests.
//!
//! Manifest documents are validated, flattened into one row per container
//! occurrence, aggregated per physical container and classified. Operator
//! discharge reports are parsed into a lookup that feeds per-waybill planning.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod discharge;
pub mod error;
pub mod flatten;
pub mod hazard;
pub mod manifest;
pub mod models;
pub mod planning;

pub use analysis::{analyze, AnalysisResult, AnalyticsStats};
pub use batch::{process_document, BatchOutcome, Pipeline, VesselRecord};
pub use config::AppConfig;
pub use discharge::{DischargeLog, ReconciliationReport, SharedDischargeLog};
pub use error::{DocumentError, StructuralError};
pub use flatten::{flatten_manifests, Flattener};
pub use hazard::{HazardClassifier, KeywordClassifier};
pub use manifest::validate_document;
pub use models::{ContainerRow, Manifest, SizeClass};
pub use planning::{build_plan, BlGroup};
