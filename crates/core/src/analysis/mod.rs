#![allow(missing_docs)]

//! Per-container aggregation, classification and statistics.
//!
//! Rows are folded into one [`ContainerAggregate`] per container number with
//! [`merge_row`]; each aggregate is classified independently and the category
//! views are rebuilt from scratch on every call.

pub mod aggregate;
pub mod classify;
pub mod stats;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ContainerRow;

pub use aggregate::{merge_row, ContainerAggregate, WaybillShare};
pub use classify::{classify, AnomalyReason, Classification};
pub use stats::AnalyticsStats;

/// Groupage container with its waybills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LclContainer {
    pub num_conteneur: String,
    pub taille_conteneur: u32,
    pub bls: Vec<WaybillShare>,
}

/// Dangerous-goods or reefer container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCargoContainer {
    pub num_conteneur: String,
    pub taille_conteneur: u32,
    pub code_iso: String,
    pub bls: Vec<WaybillShare>,
    pub classe_imdg: String,
    pub code_un: String,
    /// The class was inferred from commodity text rather than declared.
    pub imdg_detected: bool,
    pub temperature: String,
    /// The reefer indicator itself was set (as opposed to an `R…` ISO code).
    pub is_active_reefer: bool,
    pub marchandise: String,
}

/// Container with at least one data-quality problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerError {
    pub num_conteneur: String,
    pub taille_conteneur: u32,
    pub code_iso: String,
    pub bls: Vec<WaybillShare>,
    pub reasons: Vec<AnomalyReason>,
}

/// Statistics plus the four category views, each ordered by container number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub stats: AnalyticsStats,
    pub lcl_containers: Vec<LclContainer>,
    pub imdg_containers: Vec<SpecialCargoContainer>,
    pub reefer_containers: Vec<SpecialCargoContainer>,
    pub error_containers: Vec<ContainerError>,
}

/// Merge rows into one aggregate per container number.
///
/// The map is ordered by container number (byte-wise string comparison).
pub fn aggregate_rows(rows: &[ContainerRow]) -> BTreeMap<String, ContainerAggregate> {
    let mut containers: BTreeMap<String, ContainerAggregate> = BTreeMap::new();
    for row in rows {
        match containers.get_mut(&row.num_conteneur) {
            Some(aggregate) => merge_row(aggregate, row),
            None => {
                containers.insert(row.num_conteneur.clone(), ContainerAggregate::seed(row));
            }
        }
    }
    containers
}

/// Aggregate, classify and count the given rows.
pub fn analyze(rows: &[ContainerRow]) -> AnalysisResult {
    let containers = aggregate_rows(rows);
    let mut result = AnalysisResult::default();

    for aggregate in containers.values() {
        let classification = classify(aggregate);
        result.stats.record(aggregate, &classification);

        let bls = aggregate.waybill_list();
        if classification.groupage {
            result.lcl_containers.push(LclContainer {
                num_conteneur: aggregate.num_conteneur.clone(),
                taille_conteneur: aggregate.size,
                bls: bls.clone(),
            });
        }
        if classification.dangerous {
            result
                .imdg_containers
                .push(special_cargo(aggregate, bls.clone()));
        }
        if classification.reefer {
            result
                .reefer_containers
                .push(special_cargo(aggregate, bls.clone()));
        }
        if !classification.anomalies.is_empty() {
            result.error_containers.push(ContainerError {
                num_conteneur: aggregate.num_conteneur.clone(),
                taille_conteneur: aggregate.size,
                code_iso: aggregate.iso.clone(),
                bls,
                reasons: classification.anomalies,
            });
        }
    }

    debug!(
        rows = rows.len(),
        containers = result.stats.total_containers,
        lcl = result.stats.count_lcl,
        imdg = result.stats.count_imdg,
        reefer = result.stats.count_reefer,
        errors = result.stats.count_errors,
        "Analysed container rows"
    );
    result
}

fn special_cargo(aggregate: &ContainerAggregate, bls: Vec<WaybillShare>) -> SpecialCargoContainer {
    SpecialCargoContainer {
        num_conteneur: aggregate.num_conteneur.clone(),
        taille_conteneur: aggregate.size,
        code_iso: aggregate.iso.clone(),
        bls,
        classe_imdg: aggregate.imdg_class.clone(),
        code_un: aggregate.un_code.clone(),
        imdg_detected: aggregate.imdg_detected,
        temperature: aggregate.temperature.clone(),
        is_active_reefer: aggregate.reefer_flag,
        marchandise: aggregate.commodity.clone(),
    }
}
