#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::models::SizeClass;

use super::{aggregate::ContainerAggregate, classify::Classification};

/// Counts over the unique physical containers of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total_containers: usize,
    pub count20: usize,
    pub count40: usize,
    pub count45: usize,
    pub count_unknown_size: usize,
    #[serde(rename = "countLCL")]
    pub count_lcl: usize,
    #[serde(rename = "countFCL")]
    pub count_fcl: usize,
    #[serde(rename = "countIMDG")]
    pub count_imdg: usize,
    #[serde(rename = "countIMDG20")]
    pub count_imdg20: usize,
    /// 40' and 45' dangerous-goods containers.
    #[serde(rename = "countIMDG40")]
    pub count_imdg40: usize,
    pub count_reefer: usize,
    pub count_reefer20: usize,
    /// 40' and 45' reefers.
    pub count_reefer40: usize,
    pub count_errors: usize,
}

impl AnalyticsStats {
    /// Account for one aggregated container.
    pub fn record(&mut self, aggregate: &ContainerAggregate, classification: &Classification) {
        let size = SizeClass::from_size(aggregate.size);
        self.total_containers += 1;
        match size {
            SizeClass::Twenty => self.count20 += 1,
            SizeClass::Forty => self.count40 += 1,
            SizeClass::FortyFive => self.count45 += 1,
            SizeClass::Unknown => self.count_unknown_size += 1,
        }

        if classification.groupage {
            self.count_lcl += 1;
        } else {
            self.count_fcl += 1;
        }

        if classification.dangerous {
            self.count_imdg += 1;
            match size {
                SizeClass::Twenty => self.count_imdg20 += 1,
                SizeClass::Forty | SizeClass::FortyFive => self.count_imdg40 += 1,
                SizeClass::Unknown => {}
            }
        }

        if classification.reefer {
            self.count_reefer += 1;
            match size {
                SizeClass::Twenty => self.count_reefer20 += 1,
                SizeClass::Forty | SizeClass::FortyFive => self.count_reefer40 += 1,
                SizeClass::Unknown => {}
            }
        }

        if !classification.anomalies.is_empty() {
            self.count_errors += 1;
        }
    }

    /// Twenty-foot equivalent units (20' = 1, 40'/45' = 2).
    pub fn teu(&self) -> usize {
        self.count20 + 2 * (self.count40 + self.count45)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_report_field_names() {
        let stats = AnalyticsStats {
            total_containers: 3,
            count_lcl: 1,
            count_imdg40: 2,
            ..AnalyticsStats::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalContainers"], 3);
        assert_eq!(value["countLCL"], 1);
        assert_eq!(value["countIMDG40"], 2);
        assert_eq!(value["countUnknownSize"], 0);
    }

    #[test]
    fn teu_weights_long_boxes_double() {
        let stats = AnalyticsStats {
            count20: 3,
            count40: 2,
            count45: 1,
            count_unknown_size: 4,
            ..AnalyticsStats::default()
        };
        assert_eq!(stats.teu(), 9);
    }
}
