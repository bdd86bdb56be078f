//! Errors raised while turning a schema into an action.
//!
//! Every variant is fatal to the current generation request and names the
//! field or type that caused it.

use crate::types::{FieldType, OperationKind};

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A scalar reached during resolution has no `scalarMap` entry.
    #[error("scalar type `{type_name}` used by `{field}` has no entry in scalarMap")]
    UnmappedScalarType { type_name: String, field: String },

    /// Unwrapping ended on a name the schema does not define.
    #[error("could not resolve type `{type_name}` used by `{field}`")]
    UnresolvedType { type_name: String, field: String },

    #[error("invalid operation kind `{0}` (expected `query` or `mutation`)")]
    InvalidOperationKind(String),

    #[error("no sample value rule for `{key}` of type `{field_type}`")]
    UnsupportedSampleType { key: String, field_type: FieldType },

    /// Searches need at least one argument to search by.
    #[error("search `{0}` declares no arguments")]
    MissingArguments(String),

    #[error("{kind} `{name}` not found in schema")]
    UnknownOperation { kind: OperationKind, name: String },

    #[error("idMap maps `{type_name}` to `{field}`, which is not a scalar field of that type")]
    UnknownIdSource { type_name: String, field: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
