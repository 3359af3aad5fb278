//! Error types for compile spec validation.

use crate::value::{ConfigValue, ValueKind};
use thiserror::Error;

/// A single validation failure. Building a spec stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("invalid input shape: {0}")]
    InvalidShapeSpec(String),

    #[error("unsupported operating precision `{0}` (supported: int8, fp16, fp32)")]
    UnsupportedPrecision(String),

    #[error("op_precision must be a dtype or a canonical precision, got {0}")]
    InvalidPrecisionType(ValueKind),

    #[error("unsupported device type `{0}` (expected gpu or dla)")]
    InvalidDeviceType(String),

    #[error("unsupported engine capability `{0}` (expected default, safe_gpu or safe_dla)")]
    InvalidCapability(String),

    #[error("gpu_id {gpu_id} conflicts with device ordinal {ordinal}")]
    ConflictingGpuId { ordinal: u32, gpu_id: u32 },

    #[error("field `{field}` expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: ValueKind,
    },

    #[error("method `{method}`: {source}")]
    Method {
        method: String,
        #[source]
        source: Box<SpecError>,
    },
}

impl SpecError {
    pub(crate) fn type_mismatch(field: &str, expected: &'static str, value: &ConfigValue) -> Self {
        SpecError::TypeMismatch {
            field: field.to_string(),
            expected,
            actual: value.kind(),
        }
    }

    /// Name of the offending config field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            SpecError::MissingField(name) => Some(name.as_str()),
            SpecError::TypeMismatch { field, .. } => Some(field.as_str()),
            SpecError::InvalidShapeSpec(_) => Some("input_shapes"),
            SpecError::UnsupportedPrecision(_) | SpecError::InvalidPrecisionType(_) => {
                Some("op_precision")
            }
            SpecError::InvalidDeviceType(_) => Some("device_type"),
            SpecError::ConflictingGpuId { .. } => Some("gpu_id"),
            SpecError::InvalidCapability(_) => Some("capability"),
            SpecError::Method { source, .. } => source.field(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpecError>;
