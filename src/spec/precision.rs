//! Operating precision.

use crate::platform::DType;
use crate::spec::{Result, SpecError};
use crate::value::ConfigValue;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

// [namespace.]name, e.g. "half", "torch.half", "torch.float16"
static DTYPE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[A-Za-z_][A-Za-z0-9_]*\.)*([A-Za-z_][A-Za-z0-9_]*)\s*$")
        .expect("dtype token pattern is valid")
});

/// Numeric representation kernels may execute in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Int8,
    Fp16,
    #[default]
    Fp32,
}

impl Precision {
    /// Resolve an `op_precision` value.
    ///
    /// Accepts a canonical `Precision`, a framework `DType`, or a dtype string
    /// (`"fp16"`, `"half"`, `"torch.float16"`, ...).
    pub fn resolve(token: &ConfigValue) -> Result<Self> {
        match token {
            ConfigValue::Precision(p) => Ok(*p),
            ConfigValue::DType(dtype) => Precision::try_from(*dtype),
            ConfigValue::Str(s) => Precision::from_token(s),
            other => Err(SpecError::InvalidPrecisionType(other.kind())),
        }
    }

    fn from_token(token: &str) -> Result<Self> {
        let unsupported = || SpecError::UnsupportedPrecision(token.to_string());
        let name = DTYPE_TOKEN_RE
            .captures(token)
            .and_then(|caps| caps.get(1))
            .ok_or_else(unsupported)?
            .as_str()
            .to_ascii_lowercase();

        match name.as_str() {
            "int8" => Ok(Precision::Int8),
            "fp16" => Ok(Precision::Fp16),
            "fp32" => Ok(Precision::Fp32),
            _ => DType::from_name(&name)
                .and_then(|dtype| Precision::try_from(dtype).ok())
                .ok_or_else(unsupported),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Precision::Int8 => "int8",
            Precision::Fp16 => "fp16",
            Precision::Fp32 => "fp32",
        }
    }
}

impl TryFrom<DType> for Precision {
    type Error = SpecError;

    fn try_from(dtype: DType) -> Result<Self> {
        match dtype {
            DType::Int8 => Ok(Precision::Int8),
            DType::Float16 => Ok(Precision::Fp16),
            DType::Float32 => Ok(Precision::Fp32),
            other => Err(SpecError::UnsupportedPrecision(other.to_string())),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
