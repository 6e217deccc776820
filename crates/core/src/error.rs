//! Error types raised while ingesting a manifest document.

use thiserror::Error;

/// Structural problems detected by the validator on the raw document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// The document root is not a JSON array.
    #[error("invalid format: the root element must be an array of manifest objects")]
    NotAnArray,
    /// The root array has no elements.
    #[error("invalid format: the manifest array is empty")]
    EmptyArray,
    /// The first element of the array is not an object.
    #[error("invalid format: manifest entries must be objects")]
    FirstElementNotObject,
    /// The first element has neither `connaissements` nor `numero_escale`.
    #[error("invalid format: missing key fields (numero_escale or connaissements)")]
    MissingIdentityKeys,
}

/// Failure of a single document inside a batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document text is not valid JSON.
    #[error("JSON syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
    /// The parsed document failed structural validation.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The document is well formed but references no container at all.
    #[error("no container found in the document")]
    EmptyResult,
}
