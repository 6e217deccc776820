#![allow(missing_docs)]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One vessel call as found in the uploaded document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "loose_string")]
    pub numero_escale: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub consignataire: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub nom_navire: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub imo_navire: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub num_voyage: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub date_manifeste: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub type_manifeste: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub regime: Option<String>,
    #[serde(default)]
    pub connaissements: NestedList<Waybill>,
}

/// Bill of lading attached to a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Waybill {
    #[serde(default, deserialize_with = "loose_string")]
    pub num_bl: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub article: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub description_marchandise: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub port_chargement: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub client_final: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub nif_client_final: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub poids_brute: Option<f64>,
    #[serde(default)]
    pub conteneurs: NestedList<ContainerEntry>,
}

impl Waybill {
    /// Free-text commodity, preferring the detailed description over `article`.
    pub fn commodity(&self) -> &str {
        self.description_marchandise
            .as_deref()
            .or(self.article.as_deref())
            .unwrap_or("")
    }
}

/// Container reference under a waybill, before normalisation.
///
/// `taille_conteneur` and `indicateur_reefer` stay raw because their encoding
/// varies between documents; the flattener coerces them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerEntry {
    #[serde(default, deserialize_with = "loose_string")]
    pub num_conteneur: Option<String>,
    #[serde(default)]
    pub taille_conteneur: Option<Value>,
    #[serde(default, deserialize_with = "loose_string")]
    pub code_iso: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub indicateur_groupage: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub categorie: Option<String>,
    #[serde(default)]
    pub indicateur_reefer: Option<Value>,
    #[serde(default, deserialize_with = "loose_number")]
    pub poids: Option<f64>,
    #[serde(default, deserialize_with = "loose_string")]
    pub statut: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub classe_imdg: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub imdg_class: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub code_un: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub un_number: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub temperature: Option<String>,
}

impl ContainerEntry {
    /// Declared dangerous-goods class, whichever key carried it.
    pub fn declared_class(&self) -> Option<&str> {
        self.classe_imdg.as_deref().or(self.imdg_class.as_deref())
    }

    /// Declared UN number, whichever key carried it.
    pub fn declared_un_code(&self) -> Option<&str> {
        self.code_un.as_deref().or(self.un_number.as_deref())
    }
}

/// A nested array that may be absent or of the wrong JSON type.
///
/// Elements that cannot be read as `T` are counted in `rejected` instead of
/// failing the whole document.
#[derive(Debug, Clone)]
pub enum NestedList<T> {
    Missing,
    Malformed,
    Items { items: Vec<T>, rejected: usize },
}

impl<T> Default for NestedList<T> {
    fn default() -> Self {
        NestedList::Missing
    }
}

impl<T> NestedList<T> {
    /// Elements that were read successfully; empty for missing or malformed lists.
    pub fn items(&self) -> &[T] {
        match self {
            NestedList::Items { items, .. } => items,
            NestedList::Missing | NestedList::Malformed => &[],
        }
    }
}

impl<'de, T> Deserialize<'de> for NestedList<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => NestedList::Missing,
            Value::Array(entries) => {
                let total = entries.len();
                let items: Vec<T> = entries
                    .into_iter()
                    .filter(Value::is_object)
                    .filter_map(|entry| serde_json::from_value(entry).ok())
                    .collect();
                let rejected = total - items.len();
                NestedList::Items { items, rejected }
            }
            _ => NestedList::Malformed,
        })
    }
}

/// Render a scalar JSON value as text; empty strings, null and composites yield `None`.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(num) => Some(num.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(num)) => num.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_accept_numbers_and_blank_strings() {
        let manifest: Manifest = serde_json::from_value(json!({
            "numero_escale": 2024117,
            "nom_navire": "",
            "num_voyage": "V12",
        }))
        .unwrap();
        assert_eq!(manifest.numero_escale.as_deref(), Some("2024117"));
        assert_eq!(manifest.nom_navire, None);
        assert_eq!(manifest.num_voyage.as_deref(), Some("V12"));
        assert!(matches!(manifest.connaissements, NestedList::Missing));
    }

    #[test]
    fn nested_list_distinguishes_malformed_and_rejected_entries() {
        let waybill: Waybill = serde_json::from_value(json!({
            "num_bl": "BL1",
            "conteneurs": [{"num_conteneur": "ABCU1234567"}, "oops", null],
        }))
        .unwrap();
        match &waybill.conteneurs {
            NestedList::Items { items, rejected } => {
                assert_eq!(items.len(), 1);
                assert_eq!(*rejected, 2);
            }
            other => panic!("unexpected list state: {other:?}"),
        }

        let broken: Waybill =
            serde_json::from_value(json!({"num_bl": "BL2", "conteneurs": "n/a"})).unwrap();
        assert!(matches!(broken.conteneurs, NestedList::Malformed));
        assert!(broken.conteneurs.items().is_empty());
    }

    #[test]
    fn commodity_prefers_description() {
        let waybill: Waybill = serde_json::from_value(json!({
            "article": "GENERAL CARGO",
            "description_marchandise": "FROZEN FISH",
        }))
        .unwrap();
        assert_eq!(waybill.commodity(), "FROZEN FISH");

        let fallback: Waybill = serde_json::from_value(json!({"article": "RICE"})).unwrap();
        assert_eq!(fallback.commodity(), "RICE");
    }

    #[test]
    fn hazard_aliases_are_read() {
        let entry: ContainerEntry = serde_json::from_value(json!({
            "imdg_class": 3,
            "un_number": "1263",
            "poids": "12500.5",
        }))
        .unwrap();
        assert_eq!(entry.declared_class(), Some("3"));
        assert_eq!(entry.declared_un_code(), Some("1263"));
        assert_eq!(entry.poids, Some(12500.5));
    }
}
