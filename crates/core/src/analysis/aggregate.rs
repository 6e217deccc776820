use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::ContainerRow;

/// One waybill's share of a physical container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaybillShare {
    /// Waybill number.
    pub num_bl: String,
    /// Consignee on that waybill.
    pub client: String,
    /// Declared weight in kilograms.
    pub weight: f64,
}

/// Everything known about one physical container after merging its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerAggregate {
    /// Container number, literal and case-sensitive.
    pub num_conteneur: String,
    /// Size in feet, `0` when unknown.
    pub size: u32,
    /// ISO 6346 type code.
    pub iso: String,
    /// Dangerous-goods class, declared or synthesised.
    pub imdg_class: String,
    /// `imdg_class` comes from the commodity-text heuristic.
    pub imdg_detected: bool,
    /// UN number.
    pub un_code: String,
    /// Reefer set point.
    pub temperature: String,
    /// Reefer indicator, set once any row raises it.
    pub reefer_flag: bool,
    /// First non-empty commodity description.
    pub commodity: String,
    /// Waybills referencing this container, keyed by waybill number.
    pub waybills: BTreeMap<String, WaybillShare>,
}

impl ContainerAggregate {
    /// Start an aggregate from the first row seen for a container.
    pub fn seed(row: &ContainerRow) -> Self {
        let mut aggregate = Self {
            num_conteneur: row.num_conteneur.clone(),
            size: 0,
            iso: String::new(),
            imdg_class: String::new(),
            imdg_detected: false,
            un_code: String::new(),
            temperature: String::new(),
            reefer_flag: false,
            commodity: String::new(),
            waybills: BTreeMap::new(),
        };
        merge_row(&mut aggregate, row);
        aggregate
    }

    /// Number of distinct waybills referencing the container.
    pub fn waybill_count(&self) -> usize {
        self.waybills.len()
    }

    /// Waybill shares ordered by waybill number.
    pub fn waybill_list(&self) -> Vec<WaybillShare> {
        self.waybills.values().cloned().collect()
    }
}

/// Fold one more row into an aggregate of the same container.
///
/// Merge policy:
/// - scalar attributes (size, ISO code, class, UN code, temperature, commodity):
///   the first non-empty value wins, later values are discarded;
/// - reefer flag: logical OR over all rows;
/// - waybill shares: keyed by waybill number, a later row overwrites the entry;
/// - a declared class or UN code replaces a class synthesised from commodity
///   text, while synthesised labels only fill a container with no hazard data.
pub fn merge_row(aggregate: &mut ContainerAggregate, row: &ContainerRow) {
    if aggregate.size == 0 {
        aggregate.size = row.taille_conteneur;
    }
    fill_if_blank(&mut aggregate.iso, &row.code_iso);
    fill_if_empty(&mut aggregate.temperature, &row.temperature);
    fill_if_empty(&mut aggregate.commodity, &row.marchandise);
    merge_hazard(aggregate, row);
    aggregate.reefer_flag |= row.is_reefer_flagged();

    aggregate.waybills.insert(
        row.num_bl.clone(),
        WaybillShare {
            num_bl: row.num_bl.clone(),
            client: row.client_final.clone(),
            weight: row.poids,
        },
    );
}

fn merge_hazard(aggregate: &mut ContainerAggregate, row: &ContainerRow) {
    if row.imdg_detected {
        if aggregate.imdg_class.is_empty() && aggregate.un_code.is_empty() {
            aggregate.imdg_class = row.classe_imdg.clone();
            aggregate.imdg_detected = true;
        }
        return;
    }

    let declares = !row.classe_imdg.is_empty() || !row.code_un.is_empty();
    if aggregate.imdg_detected && declares {
        aggregate.imdg_class.clear();
        aggregate.imdg_detected = false;
    }
    fill_if_empty(&mut aggregate.imdg_class, &row.classe_imdg);
    fill_if_empty(&mut aggregate.un_code, &row.code_un);
}

/// ISO codes count as empty when blank, matching the anomaly check.
fn fill_if_blank(slot: &mut String, candidate: &str) {
    let candidate = candidate.trim();
    if slot.trim().is_empty() && !candidate.is_empty() {
        *slot = candidate.to_string();
    }
}

fn fill_if_empty(slot: &mut String, candidate: &str) {
    if slot.is_empty() && !candidate.is_empty() {
        *slot = candidate.to_string();
    }
}
