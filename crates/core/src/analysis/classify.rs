use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::is_unknown_container;

use super::aggregate::ContainerAggregate;

/// Data-quality problem found on an aggregated container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    /// No ISO type code on any row.
    MissingIsoType,
    /// Size could not be read on any row.
    UnknownSize,
    /// Container number missing or a sentinel.
    InvalidContainerNumber,
}

impl AnomalyReason {
    /// Operator-facing description.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIsoType => "missing ISO type",
            Self::UnknownSize => "unknown size",
            Self::InvalidContainerNumber => "invalid container number",
        }
    }
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational categories of one container. Categories are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Shared by more than one waybill (LCL); otherwise FCL.
    pub groupage: bool,
    /// Carries a class or UN number.
    pub dangerous: bool,
    /// Reefer indicator set or ISO code starting with `R`.
    pub reefer: bool,
    /// Every data-quality problem found, in a fixed order.
    pub anomalies: Vec<AnomalyReason>,
}

/// Evaluate every category rule against one aggregate.
pub fn classify(aggregate: &ContainerAggregate) -> Classification {
    let mut anomalies = Vec::new();
    if aggregate.iso.trim().is_empty() {
        anomalies.push(AnomalyReason::MissingIsoType);
    }
    if aggregate.size == 0 {
        anomalies.push(AnomalyReason::UnknownSize);
    }
    if is_unknown_container(&aggregate.num_conteneur) {
        anomalies.push(AnomalyReason::InvalidContainerNumber);
    }

    Classification {
        groupage: aggregate.waybill_count() > 1,
        dangerous: !aggregate.imdg_class.is_empty() || !aggregate.un_code.is_empty(),
        reefer: aggregate.reefer_flag || iso_denotes_reefer(&aggregate.iso),
        anomalies,
    }
}

fn iso_denotes_reefer(iso: &str) -> bool {
    iso.chars()
        .next()
        .map_or(false, |first| first.eq_ignore_ascii_case(&'R'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::merge_row;
    use crate::models::testing::{row, row_on};
    use crate::models::UNKNOWN_CONTAINER;

    #[test]
    fn categories_overlap() {
        let mut base = row("RFRU0000001", 40);
        base.code_iso = "r5G1".into();
        base.code_un = "3257".into();
        let mut aggregate = ContainerAggregate::seed(&base);
        merge_row(&mut aggregate, &row_on("RFRU0000001", "BL2", 40));

        let classification = classify(&aggregate);
        assert!(classification.groupage);
        assert!(classification.dangerous);
        assert!(classification.reefer);
        assert!(classification.anomalies.is_empty());
    }

    #[test]
    fn collects_every_anomaly() {
        let mut broken = row(UNKNOWN_CONTAINER, 0);
        broken.code_iso = "  ".into();
        let classification = classify(&ContainerAggregate::seed(&broken));
        assert_eq!(
            classification.anomalies,
            vec![
                AnomalyReason::MissingIsoType,
                AnomalyReason::UnknownSize,
                AnomalyReason::InvalidContainerNumber
            ]
        );
        assert!(!classification.groupage);
    }

    #[test]
    fn reason_labels_are_not_empty() {
        for reason in [
            AnomalyReason::MissingIsoType,
            AnomalyReason::UnknownSize,
            AnomalyReason::InvalidContainerNumber,
        ] {
            assert!(!reason.to_string().is_empty());
        }
    }
}
