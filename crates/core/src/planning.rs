#![allow(missing_docs)]

//! Discharge planning: rows regrouped per waybill, containers put in handling order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    discharge::{canonical_container_id, DischargeLog},
    models::ContainerRow,
};

/// Group label for rows without a waybill number.
pub const NO_WAYBILL_GROUP: &str = "NO_BL";

/// Consignee label when the first row of a group has none.
pub const UNKNOWN_CLIENT: &str = "UNKNOWN CLIENT";

/// Commodity label for rows with a blank description.
pub const UNDECLARED_COMMODITY: &str = "UNDECLARED";

/// Number of containers carrying one commodity description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityCount {
    pub name: String,
    pub count: usize,
}

/// A container line of a waybill group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedContainer {
    pub row: ContainerRow,
    /// The discharge lookup has a record for this container.
    pub discharged: bool,
    /// Date recorded with that discharge, if any.
    pub discharge_date: Option<String>,
}

/// Planning view of one waybill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlGroup {
    pub bl: String,
    /// Rows without a waybill number; `bl` then holds [`NO_WAYBILL_GROUP`].
    pub missing_waybill: bool,
    pub vessel_name: String,
    pub arrival_date: String,
    /// Consignee of the first row; one waybill is assumed to have one consignee.
    pub client: String,
    pub count: usize,
    pub discharged_count: usize,
    pub fully_discharged: bool,
    /// Commodity histogram, most frequent first.
    pub commodities: Vec<CommodityCount>,
    /// Containers in handling order, see [`ordering_key`].
    pub lines: Vec<PlannedContainer>,
}

/// Handling-order key: the last character of the trimmed number when it is a
/// decimal digit, otherwise 10 so such containers come last.
pub fn ordering_key(num_conteneur: &str) -> u32 {
    num_conteneur
        .trim()
        .chars()
        .last()
        .and_then(|ch| ch.to_digit(10))
        .unwrap_or(10)
}

/// Build the per-waybill planning list.
///
/// Groups are ordered by descending container count, then by waybill number.
pub fn build_plan(rows: &[ContainerRow], discharges: &DischargeLog) -> Vec<BlGroup> {
    // `None` collects rows without a waybill, apart from a real `NO_BL` number.
    let mut by_waybill: BTreeMap<Option<&str>, Vec<&ContainerRow>> = BTreeMap::new();
    for row in rows {
        let bl = (!row.num_bl.is_empty()).then_some(row.num_bl.as_str());
        by_waybill.entry(bl).or_default().push(row);
    }

    let mut groups: Vec<BlGroup> = by_waybill
        .into_iter()
        .map(|(bl, members)| build_group(bl, members, discharges))
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.bl.cmp(&b.bl)));

    debug!(
        groups = groups.len(),
        complete = groups.iter().filter(|g| g.fully_discharged).count(),
        "Built discharge plan"
    );
    groups
}

fn build_group(
    bl: Option<&str>,
    mut members: Vec<&ContainerRow>,
    discharges: &DischargeLog,
) -> BlGroup {
    let first = members[0];
    let vessel_name = first.nom_navire.clone();
    let arrival_date = first.date_manifeste.clone();
    let client = if first.client_final.is_empty() {
        UNKNOWN_CLIENT.to_string()
    } else {
        first.client_final.clone()
    };
    let commodities = commodity_histogram(&members);

    members.sort_by(|a, b| {
        ordering_key(&a.num_conteneur)
            .cmp(&ordering_key(&b.num_conteneur))
            .then_with(|| a.num_conteneur.cmp(&b.num_conteneur))
    });

    let lines: Vec<PlannedContainer> = members
        .into_iter()
        .map(|row| {
            let record = discharges.get(&canonical_container_id(&row.num_conteneur));
            PlannedContainer {
                row: row.clone(),
                discharged: record.is_some(),
                discharge_date: record.and_then(|r| r.date.clone()),
            }
        })
        .collect();

    let count = lines.len();
    let discharged_count = lines.iter().filter(|line| line.discharged).count();
    BlGroup {
        bl: bl.unwrap_or(NO_WAYBILL_GROUP).to_string(),
        missing_waybill: bl.is_none(),
        vessel_name,
        arrival_date,
        client,
        count,
        discharged_count,
        fully_discharged: count > 0 && discharged_count == count,
        commodities,
        lines,
    }
}

fn commodity_histogram(members: &[&ContainerRow]) -> Vec<CommodityCount> {
    let mut histogram: Vec<CommodityCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for row in members {
        let name = if row.marchandise.trim().is_empty() {
            UNDECLARED_COMMODITY
        } else {
            row.marchandise.as_str()
        };
        match positions.get(name) {
            Some(&index) => histogram[index].count += 1,
            None => {
                positions.insert(name, histogram.len());
                histogram.push(CommodityCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }
    // Stable: equal counts keep first-appearance order.
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{row, row_on};

    fn line_numbers(group: &BlGroup) -> Vec<&str> {
        group
            .lines
            .iter()
            .map(|line| line.row.num_conteneur.as_str())
            .collect()
    }

    #[test]
    fn ordering_key_uses_last_digit() {
        assert_eq!(ordering_key("MSCU1234567"), 7);
        assert_eq!(ordering_key(" MSCU1234560  "), 0);
        assert_eq!(ordering_key("MSCU123456X"), 10);
        assert_eq!(ordering_key("   "), 10);
        assert_eq!(ordering_key(""), 10);
    }

    #[test]
    fn containers_follow_check_digit_order() {
        let rows = vec![
            row("BBBU0000003", 20),
            row("AAAU0000003", 20),
            row("CCCU0000001", 20),
            row("UNKNOWN", 0),
            row("DDDU0000009", 40),
        ];
        let plan = build_plan(&rows, &DischargeLog::new());
        assert_eq!(plan.len(), 1);
        assert_eq!(
            line_numbers(&plan[0]),
            vec!["CCCU0000001", "AAAU0000003", "BBBU0000003", "DDDU0000009", "UNKNOWN"]
        );
    }

    #[test]
    fn groups_ordered_by_size_then_number() {
        let rows = vec![
            row_on("A1", "BL9", 20),
            row_on("A2", "BL2", 20),
            row_on("A3", "BL2", 20),
            row_on("A4", "BL1", 20),
            row_on("A5", "", 20),
        ];
        let plan = build_plan(&rows, &DischargeLog::new());
        let order: Vec<_> = plan.iter().map(|g| g.bl.as_str()).collect();
        assert_eq!(order, vec!["BL2", "BL1", "BL9", NO_WAYBILL_GROUP]);
    }

    #[test]
    fn real_no_bl_waybill_is_not_merged_with_missing_ones() {
        let rows = vec![row_on("A1", "NO_BL", 20), row_on("A2", "", 20)];
        let plan = build_plan(&rows, &DischargeLog::new());

        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|g| g.bl == NO_WAYBILL_GROUP && g.count == 1));
        let missing: Vec<_> = plan.iter().map(|g| g.missing_waybill).collect();
        assert_eq!(missing, vec![true, false]);
    }

    #[test]
    fn discharge_annotations_and_completion() {
        let mut spaced = row_on("TCNU 1234567", "BL2", 20);
        spaced.client_final = String::new();
        let rows = vec![
            row_on("MSKU7654321", "BL1", 40),
            row_on("ABCU0000001", "BL1", 20),
            spaced,
        ];

        let mut log = DischargeLog::new();
        log.ingest("MSKU7654321 01/03/2024\ntcnu-1234567");
        let plan = build_plan(&rows, &log);

        let bl1 = plan.iter().find(|g| g.bl == "BL1").unwrap();
        assert_eq!(bl1.discharged_count, 1);
        assert!(!bl1.fully_discharged);
        let msku = bl1
            .lines
            .iter()
            .find(|l| l.row.num_conteneur == "MSKU7654321")
            .unwrap();
        assert!(msku.discharged);
        assert_eq!(msku.discharge_date.as_deref(), Some("01/03/2024"));

        let bl2 = plan.iter().find(|g| g.bl == "BL2").unwrap();
        assert!(bl2.fully_discharged);
        assert_eq!(bl2.lines[0].discharge_date, None);
        assert_eq!(bl2.client, UNKNOWN_CLIENT);
    }

    #[test]
    fn commodity_histogram_counts_and_defaults() {
        let mut rows = vec![
            row("A1", 20),
            row("A2", 20),
            row("A3", 20),
            row("A4", 20),
        ];
        rows[0].marchandise = "RICE".into();
        rows[1].marchandise = "SUGAR".into();
        rows[2].marchandise = "SUGAR".into();
        rows[3].marchandise = "  ".into();

        let plan = build_plan(&rows, &DischargeLog::new());
        let histogram = &plan[0].commodities;
        assert_eq!(
            histogram,
            &vec![
                CommodityCount { name: "SUGAR".into(), count: 2 },
                CommodityCount { name: "RICE".into(), count: 1 },
                CommodityCount { name: UNDECLARED_COMMODITY.into(), count: 1 },
            ]
        );
        assert_eq!(plan[0].vessel_name, "MSC ANNA");
        assert_eq!(plan[0].arrival_date, "2024-03-01");
    }

    #[test]
    fn plan_is_idempotent() {
        let rows = vec![row_on("A1", "BL1", 20), row_on("B2", "BL2", 20)];
        let log = DischargeLog::new();
        assert_eq!(build_plan(&rows, &log), build_plan(&rows, &log));
        assert!(build_plan(&[], &log).is_empty());
    }
}
