//! Error types for the indexing core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FacetError>;

/// Errors surfaced by schema construction, dispatch, predicate evaluation,
/// and value-range checks. Every variant corresponds to one of the error
/// codes named by the facade contract; the string payloads carry the
/// offending property path or value for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FacetError {
    #[error("invalid schema type at '{property}': {reason}")]
    InvalidSchemaType { property: String, reason: String },

    #[error("unknown filter property: '{0}'")]
    UnknownFilterProperty(String),

    #[error("invalid filter operation on '{property}': {reason}")]
    InvalidFilterOperation { property: String, reason: String },

    #[error("wrong search property type for '{property}': expected a text (Radix) index")]
    WrongSearchPropertyType { property: String },

    #[error("invalid boost value for '{property}': {value} (must be > 0)")]
    InvalidBoostValue { property: String, value: f32 },

    #[error("invalid vector size for '{property}': expected {expected}, got {actual}")]
    InvalidVectorSize {
        property: String,
        expected: usize,
        actual: usize,
    },
}

impl FacetError {
    /// The stable string tag named by the facade contract, independent of
    /// the `Display` message (useful for callers that branch on error kind).
    pub fn code(&self) -> &'static str {
        match self {
            FacetError::InvalidSchemaType { .. } => "INVALID_SCHEMA_TYPE",
            FacetError::UnknownFilterProperty(_) => "UNKNOWN_FILTER_PROPERTY",
            FacetError::InvalidFilterOperation { .. } => "INVALID_FILTER_OPERATION",
            FacetError::WrongSearchPropertyType { .. } => "WRONG_SEARCH_PROPERTY_TYPE",
            FacetError::InvalidBoostValue { .. } => "INVALID_BOOST_VALUE",
            FacetError::InvalidVectorSize { .. } => "INVALID_VECTOR_SIZE",
        }
    }
}
