#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// Sentinel used when a container reference carries no number.
pub const UNKNOWN_CONTAINER: &str = "UNKNOWN";

/// Sentinel written by older exports for the same situation.
pub const LEGACY_UNKNOWN_CONTAINER: &str = "INCONNU";

/// Returns `true` when the container number is empty or one of the sentinels.
pub fn is_unknown_container(num: &str) -> bool {
    num.is_empty() || num == UNKNOWN_CONTAINER || num == LEGACY_UNKNOWN_CONTAINER
}

/// One container under one waybill of one manifest, fully denormalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRow {
    // Manifest level
    pub numero_escale: String,
    pub nom_navire: String,
    pub num_voyage: String,
    pub date_manifeste: String,
    pub type_manifeste: String,
    pub regime: String,

    // Waybill level
    pub num_bl: String,
    pub port_chargement: String,
    pub client_final: String,
    pub nif_client_final: String,
    pub marchandise: String,

    // Container level
    pub num_conteneur: String,
    /// 20, 40, 45, or 0 when the size could not be read.
    pub taille_conteneur: u32,
    pub code_iso: String,
    pub indicateur_groupage: String,
    pub categorie: String,
    pub poids: f64,
    pub statut: String,

    // Special cargo
    /// Always `"0"` or `"1"`.
    pub indicateur_reefer: String,
    pub temperature: String,
    pub classe_imdg: String,
    pub code_un: String,
    /// Set when `classe_imdg` was inferred from the commodity text.
    #[serde(default)]
    pub imdg_detected: bool,
}

impl ContainerRow {
    /// Whether the source flagged this container as a powered reefer.
    pub fn is_reefer_flagged(&self) -> bool {
        self.indicateur_reefer == "1"
    }

    pub fn size_class(&self) -> SizeClass {
        SizeClass::from_size(self.taille_conteneur)
    }
}

/// Size buckets used by the statistics and by row filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Twenty,
    Forty,
    FortyFive,
    Unknown,
}

impl SizeClass {
    pub fn from_size(size: u32) -> Self {
        match size {
            20 => Self::Twenty,
            40 => Self::Forty,
            45 => Self::FortyFive,
            _ => Self::Unknown,
        }
    }

    /// Twenty-foot equivalent units for one container of this class.
    pub fn teu(self) -> u32 {
        match self {
            Self::Twenty => 1,
            Self::Forty | Self::FortyFive => 2,
            Self::Unknown => 0,
        }
    }
}

impl std::str::FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "20" => Ok(Self::Twenty),
            "40" => Ok(Self::Forty),
            "45" => Ok(Self::FortyFive),
            "unknown" | "0" => Ok(Self::Unknown),
            other => Err(format!("unsupported container size '{other}'")),
        }
    }
}

/// Keep only rows of the given size class; `None` keeps everything.
pub fn filter_rows_by_size(rows: &[ContainerRow], size: Option<SizeClass>) -> Vec<ContainerRow> {
    rows.iter()
        .filter(|row| size.map_or(true, |class| row.size_class() == class))
        .cloned()
        .collect()
}
