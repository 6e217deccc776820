//! Shared domain models: the inbound document shape and the flattened row.

mod document;
mod row;

pub use document::{ContainerEntry, Manifest, NestedList, Waybill};
pub(crate) use document::value_to_string;
pub use row::{
    filter_rows_by_size, is_unknown_container, ContainerRow, SizeClass,
    LEGACY_UNKNOWN_CONTAINER, UNKNOWN_CONTAINER,
};

#[cfg(test)]
pub(crate) mod testing {
    use super::ContainerRow;

    /// Minimal 22G1 row under `BL1` for `ACME`.
    pub(crate) fn row(num: &str, size: u32) -> ContainerRow {
        ContainerRow {
            numero_escale: "E1".into(),
            nom_navire: "MSC ANNA".into(),
            num_voyage: "V1".into(),
            date_manifeste: "2024-03-01".into(),
            type_manifeste: String::new(),
            regime: String::new(),
            num_bl: "BL1".into(),
            port_chargement: String::new(),
            client_final: "ACME".into(),
            nif_client_final: String::new(),
            marchandise: String::new(),
            num_conteneur: num.into(),
            taille_conteneur: size,
            code_iso: "22G1".into(),
            indicateur_groupage: "0".into(),
            categorie: String::new(),
            poids: 0.0,
            statut: String::new(),
            indicateur_reefer: "0".into(),
            temperature: String::new(),
            classe_imdg: String::new(),
            code_un: String::new(),
            imdg_detected: false,
        }
    }

    /// Same as [`row`] but under the given waybill.
    pub(crate) fn row_on(num: &str, bl: &str, size: u32) -> ContainerRow {
        ContainerRow {
            num_bl: bl.into(),
            ..row(num, size)
        }
    }
}
