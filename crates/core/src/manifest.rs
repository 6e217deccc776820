//! Structural validation of uploaded manifest documents and vessel identity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{error::StructuralError, models::Manifest};

/// Keys of which the first manifest must carry at least one.
const IDENTITY_KEYS: [&str; 2] = ["connaissements", "numero_escale"];

/// Placeholder for absent parts of the vessel identifier.
const UNKNOWN_PART: &str = "UNKNOWN";

/// Check the overall shape of a parsed document and read it as manifests.
///
/// Only the first element is inspected for the identity keys, so obviously
/// wrong files are rejected early. Later elements that are not objects are
/// skipped with a warning and contribute nothing downstream.
pub fn validate_document(document: Value) -> Result<Vec<Manifest>, StructuralError> {
    let Value::Array(elements) = document else {
        return Err(StructuralError::NotAnArray);
    };
    let first = elements.first().ok_or(StructuralError::EmptyArray)?;
    let first = first
        .as_object()
        .ok_or(StructuralError::FirstElementNotObject)?;
    if !IDENTITY_KEYS.iter().any(|key| first.contains_key(*key)) {
        return Err(StructuralError::MissingIdentityKeys);
    }

    let mut manifests = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            warn!(index, "Skipping manifest entry that is not an object");
            continue;
        }
        match serde_json::from_value::<Manifest>(element) {
            Ok(manifest) => manifests.push(manifest),
            Err(err) => warn!(index, "Skipping unreadable manifest entry: {err}"),
        }
    }
    Ok(manifests)
}

/// Stable identifier for a vessel call: `NAME-VOYAGE-CALL`, without whitespace, uppercased.
pub fn vessel_id(manifest: &Manifest) -> String {
    let part = |value: &Option<String>| value.clone().unwrap_or_else(|| UNKNOWN_PART.to_string());
    format!(
        "{}-{}-{}",
        part(&manifest.nom_navire),
        part(&manifest.num_voyage),
        part(&manifest.numero_escale)
    )
    .chars()
    .filter(|ch| !ch.is_whitespace())
    .collect::<String>()
    .to_uppercase()
}

/// Scalar header of a manifest, kept with processed records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    /// Call reference assigned by the port.
    pub numero_escale: String,
    /// Vessel name.
    pub nom_navire: String,
    /// Voyage number.
    pub num_voyage: String,
    /// IMO number of the vessel.
    pub imo_navire: String,
    /// Manifest (arrival) date as written in the document.
    pub date_manifeste: String,
    /// Shipping agent.
    pub consignataire: String,
}

impl From<&Manifest> for ManifestHeader {
    fn from(manifest: &Manifest) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            numero_escale: text(&manifest.numero_escale),
            nom_navire: text(&manifest.nom_navire),
            num_voyage: text(&manifest.num_voyage),
            imo_navire: text(&manifest.imo_navire),
            date_manifeste: text(&manifest.date_manifeste),
            consignataire: text(&manifest.consignataire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_each_structural_violation() {
        assert_eq!(
            validate_document(json!({"numero_escale": "E1"})).unwrap_err(),
            StructuralError::NotAnArray
        );
        assert_eq!(
            validate_document(json!([])).unwrap_err(),
            StructuralError::EmptyArray
        );
        assert_eq!(
            validate_document(json!(["E1"])).unwrap_err(),
            StructuralError::FirstElementNotObject
        );
        assert_eq!(
            validate_document(json!([{"nom_navire": "MSC ANNA"}])).unwrap_err(),
            StructuralError::MissingIdentityKeys
        );
    }

    #[test]
    fn accepts_either_identity_key() {
        let by_call = validate_document(json!([{"numero_escale": "E1"}])).unwrap();
        assert_eq!(by_call.len(), 1);
        let by_waybills = validate_document(json!([{"connaissements": []}])).unwrap();
        assert_eq!(by_waybills.len(), 1);
    }

    #[test]
    fn only_first_element_is_checked() {
        let manifests = validate_document(json!([
            {"numero_escale": "E1"},
            {"unrelated": true},
            42,
        ]))
        .unwrap();
        // The keyless object passes, the number is dropped.
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[1].numero_escale, None);
    }

    #[test]
    fn vessel_id_normalises_parts() {
        let manifest = Manifest {
            nom_navire: Some("Msc Anna".to_string()),
            num_voyage: Some("v 12".to_string()),
            numero_escale: None,
            ..Manifest::default()
        };
        assert_eq!(vessel_id(&manifest), "MSCANNA-V12-UNKNOWN");
    }

    #[test]
    fn header_copies_scalars() {
        let manifest = Manifest {
            numero_escale: Some("E1".to_string()),
            date_manifeste: Some("01/03/2024".to_string()),
            ..Manifest::default()
        };
        let header = ManifestHeader::from(&manifest);
        assert_eq!(header.numero_escale, "E1");
        assert_eq!(header.date_manifeste, "01/03/2024");
        assert!(header.nom_navire.is_empty());
    }
}
