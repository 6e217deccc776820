//! Manifest → waybill → container flattening.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    hazard::{HazardClassifier, HazardVerdict, KeywordClassifier},
    models::{
        value_to_string, ContainerEntry, ContainerRow, Manifest, NestedList, Waybill,
        UNKNOWN_CONTAINER,
    },
};

/// Walks validated manifests and emits one [`ContainerRow`] per container reference.
#[derive(Debug, Clone, Default)]
pub struct Flattener<C = KeywordClassifier> {
    classifier: C,
}

impl Flattener<KeywordClassifier> {
    /// Flattener using the built-in dangerous-goods keywords.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: HazardClassifier> Flattener<C> {
    /// Flattener with a custom dangerous-goods policy.
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    /// Flatten all manifests. Row order follows the source nesting.
    ///
    /// Absent or malformed nested arrays are logged and treated as empty.
    pub fn flatten(&self, manifests: &[Manifest]) -> Vec<ContainerRow> {
        let mut rows = Vec::new();

        for (manifest_index, manifest) in manifests.iter().enumerate() {
            let call = manifest.numero_escale.as_deref().unwrap_or("");
            report_list_state(&manifest.connaissements, || {
                format!("manifest #{manifest_index} (call {call}): waybill list")
            });

            for (waybill_index, waybill) in manifest.connaissements.items().iter().enumerate() {
                let bl = waybill.num_bl.as_deref().unwrap_or("");
                report_list_state(&waybill.conteneurs, || {
                    format!(
                        "manifest #{manifest_index} (call {call}), waybill #{waybill_index} ({bl}): container list"
                    )
                });

                let verdict = self.classifier.classify(waybill.commodity());
                for container in waybill.conteneurs.items() {
                    rows.push(self.build_row(manifest, waybill, container, &verdict));
                }
            }
        }

        debug!(
            manifests = manifests.len(),
            rows = rows.len(),
            "Flattened manifest document"
        );
        rows
    }

    fn build_row(
        &self,
        manifest: &Manifest,
        waybill: &Waybill,
        container: &ContainerEntry,
        verdict: &HazardVerdict,
    ) -> ContainerRow {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let declared_class = container.declared_class().unwrap_or("");
        let declared_un = container.declared_un_code().unwrap_or("");
        let inferred = declared_class.is_empty() && declared_un.is_empty() && verdict.is_detected();
        let classe_imdg = if inferred {
            self.classifier.detected_label().to_string()
        } else {
            declared_class.to_string()
        };

        ContainerRow {
            numero_escale: text(&manifest.numero_escale),
            nom_navire: text(&manifest.nom_navire),
            num_voyage: text(&manifest.num_voyage),
            date_manifeste: text(&manifest.date_manifeste),
            type_manifeste: text(&manifest.type_manifeste),
            regime: text(&manifest.regime),

            num_bl: text(&waybill.num_bl),
            port_chargement: text(&waybill.port_chargement),
            client_final: text(&waybill.client_final),
            nif_client_final: text(&waybill.nif_client_final),
            marchandise: waybill.commodity().to_string(),

            num_conteneur: container
                .num_conteneur
                .clone()
                .unwrap_or_else(|| UNKNOWN_CONTAINER.to_string()),
            taille_conteneur: coerce_size(container.taille_conteneur.as_ref()),
            code_iso: text(&container.code_iso).trim().to_string(),
            indicateur_groupage: container
                .indicateur_groupage
                .clone()
                .unwrap_or_else(|| "0".to_string()),
            categorie: text(&container.categorie),
            poids: container.poids.unwrap_or(0.0),
            statut: text(&container.statut),

            indicateur_reefer: coerce_reefer_flag(container.indicateur_reefer.as_ref()).to_string(),
            temperature: text(&container.temperature),
            classe_imdg,
            code_un: declared_un.to_string(),
            imdg_detected: inferred,
        }
    }
}

/// Flatten with the default dangerous-goods policy.
pub fn flatten_manifests(manifests: &[Manifest]) -> Vec<ContainerRow> {
    Flattener::new().flatten(manifests)
}

/// Read a container size typed as number or numeric text; `0` means unknown.
///
/// A value that reads as a number is used only when it is a whole,
/// non-negative size (`40.5` and `-20` are unknown). Text that is not a number
/// falls back to its leading integer (`"40HC"` → 40).
pub fn coerce_size(raw: Option<&Value>) -> u32 {
    let Some(value) = raw else {
        return 0;
    };
    match numeric_value(value) {
        Some(number) => whole_size(number).unwrap_or(0),
        None => leading_integer(value).unwrap_or(0),
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn whole_size(number: f64) -> Option<u32> {
    let whole = number.is_finite() && number >= 0.0 && number.fract() == 0.0;
    (whole && number <= f64::from(u32::MAX)).then(|| number as u32)
}

fn leading_integer(value: &Value) -> Option<u32> {
    let text = value_to_string(value)?;
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Normalise a reefer indicator encoded as bool, number or text to `"0"`/`"1"`.
pub fn coerce_reefer_flag(raw: Option<&Value>) -> &'static str {
    let on = match raw {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(num)) => num.as_f64().map_or(false, |v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "oui"
        ),
        _ => false,
    };
    if on {
        "1"
    } else {
        "0"
    }
}

/// Log the state of a nested list and return the warning, if any.
fn report_list_state<T>(
    list: &NestedList<T>,
    context: impl FnOnce() -> String,
) -> Option<String> {
    let message = match list {
        NestedList::Missing => format!("{} is absent, treating as empty", context()),
        NestedList::Malformed => format!("{} is not an array, treating as empty", context()),
        NestedList::Items { items, rejected } => {
            if *rejected > 0 {
                format!("{}: skipped {rejected} entries that are not objects", context())
            } else if items.is_empty() {
                format!("{} is empty", context())
            } else {
                return None;
            }
        }
    };
    warn!("{message}");
    Some(message)
}
