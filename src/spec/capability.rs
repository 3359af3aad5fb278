//! Engine capability (kernel safety subset).

use crate::spec::{Result, SpecError};
use crate::value::ConfigValue;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineCapability {
    #[default]
    Default,
    SafeGpu,
    SafeDla,
}

impl EngineCapability {
    pub fn resolve(value: &ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Capability(c) => Ok(*c),
            ConfigValue::Str(s) => match s.to_ascii_lowercase().as_str() {
                "default" => Ok(EngineCapability::Default),
                "safe_gpu" => Ok(EngineCapability::SafeGpu),
                "safe_dla" => Ok(EngineCapability::SafeDla),
                _ => Err(SpecError::InvalidCapability(s.clone())),
            },
            other => Err(SpecError::type_mismatch("capability", "capability", other)),
        }
    }
}

impl fmt::Display for EngineCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineCapability::Default => "DEFAULT",
            EngineCapability::SafeGpu => "SAFE_GPU",
            EngineCapability::SafeDla => "SAFE_DLA",
        };
        f.write_str(name)
    }
}
