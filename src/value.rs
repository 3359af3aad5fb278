//! Raw configuration values.
//!
//! A compile config is a loosely-typed record: the same key may legitimately
//! hold a list, a tuple, a framework handle or a plain string token. We model
//! every accepted shape as one variant of `ConfigValue` so each field can be
//! decoded with an exhaustive `match` and anything unmatched is rejected at the
//! boundary.
//!
//! JSON documents map onto the plain variants:
//! null -> Null, bool -> Bool, integer -> Int (UInt above `i64::MAX`),
//! other numbers -> Float,
//! string -> Str, array -> List, object -> Map.

use crate::platform::{DType, PlatformDevice};
use crate::spec::{CalibratorRef, DeviceKind, EngineCapability, Precision, Result, SpecError};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integer too large for `Int`.
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Tuple(Vec<ConfigValue>),
    /// Framework size vector (already known to hold dimensions).
    Size(Vec<u64>),
    Map(BTreeMap<String, ConfigValue>),
    DType(DType),
    Device(PlatformDevice),
    Precision(Precision),
    DeviceKind(DeviceKind),
    Capability(EngineCapability),
    Calibrator(CalibratorRef),
}

/// Coarse type of a `ConfigValue`, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Size,
    Map,
    DType,
    Device,
    Precision,
    DeviceKind,
    Capability,
    Calibrator,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "none",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::List => "list",
            ValueKind::Tuple => "tuple",
            ValueKind::Size => "size",
            ValueKind::Map => "dict",
            ValueKind::DType => "dtype",
            ValueKind::Device => "device",
            ValueKind::Precision => "precision",
            ValueKind::DeviceKind => "device type",
            ValueKind::Capability => "capability",
            ValueKind::Calibrator => "calibrator",
        };
        f.write_str(name)
    }
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Null => ValueKind::Null,
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Int(_) | ConfigValue::UInt(_) => ValueKind::Int,
            ConfigValue::Float(_) => ValueKind::Float,
            ConfigValue::Str(_) => ValueKind::Str,
            ConfigValue::List(_) => ValueKind::List,
            ConfigValue::Tuple(_) => ValueKind::Tuple,
            ConfigValue::Size(_) => ValueKind::Size,
            ConfigValue::Map(_) => ValueKind::Map,
            ConfigValue::DType(_) => ValueKind::DType,
            ConfigValue::Device(_) => ValueKind::Device,
            ConfigValue::Precision(_) => ValueKind::Precision,
            ConfigValue::DeviceKind(_) => ValueKind::DeviceKind,
            ConfigValue::Capability(_) => ValueKind::Capability,
            ConfigValue::Calibrator(_) => ValueKind::Calibrator,
        }
    }

    pub fn tuple<T: Into<ConfigValue>>(items: impl IntoIterator<Item = T>) -> Self {
        ConfigValue::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn size(dims: impl IntoIterator<Item = u64>) -> Self {
        ConfigValue::Size(dims.into_iter().collect())
    }

    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
    {
        ConfigValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub(crate) fn expect_bool(&self, field: &str) -> Result<bool> {
        match self {
            ConfigValue::Bool(b) => Ok(*b),
            other => Err(SpecError::type_mismatch(field, "bool", other)),
        }
    }

    pub(crate) fn expect_int(&self, field: &str) -> Result<i64> {
        match self {
            ConfigValue::Int(v) => Ok(*v),
            ConfigValue::UInt(v) => {
                i64::try_from(*v).map_err(|_| SpecError::type_mismatch(field, "64-bit int", self))
            }
            other => Err(SpecError::type_mismatch(field, "int", other)),
        }
    }

    pub(crate) fn expect_uint(&self, field: &str) -> Result<u64> {
        match self {
            ConfigValue::Int(v) => u64::try_from(*v)
                .map_err(|_| SpecError::type_mismatch(field, "non-negative int", self)),
            ConfigValue::UInt(v) => Ok(*v),
            other => Err(SpecError::type_mismatch(field, "int", other)),
        }
    }

    pub(crate) fn expect_u32(&self, field: &str) -> Result<u32> {
        let v = self.expect_uint(field)?;
        u32::try_from(v).map_err(|_| SpecError::type_mismatch(field, "32-bit int", self))
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => ConfigValue::Int(i),
                (None, Some(u)) => ConfigValue::UInt(u),
                (None, None) => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ConfigValue::Str(s),
            Value::Array(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(entries) => ConfigValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(ConfigValue::from)
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(i64::from(v))
    }
}

impl From<u32> for ConfigValue {
    fn from(v: u32) -> Self {
        ConfigValue::Int(i64::from(v))
    }
}

impl From<u64> for ConfigValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => ConfigValue::Int(i),
            Err(_) => ConfigValue::UInt(v),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConfigValue>, const N: usize> From<[T; N]> for ConfigValue {
    fn from(items: [T; N]) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(entries: BTreeMap<String, ConfigValue>) -> Self {
        ConfigValue::Map(entries)
    }
}

impl From<DType> for ConfigValue {
    fn from(v: DType) -> Self {
        ConfigValue::DType(v)
    }
}

impl From<PlatformDevice> for ConfigValue {
    fn from(v: PlatformDevice) -> Self {
        ConfigValue::Device(v)
    }
}

impl From<Precision> for ConfigValue {
    fn from(v: Precision) -> Self {
        ConfigValue::Precision(v)
    }
}

impl From<DeviceKind> for ConfigValue {
    fn from(v: DeviceKind) -> Self {
        ConfigValue::DeviceKind(v)
    }
}

impl From<EngineCapability> for ConfigValue {
    fn from(v: EngineCapability) -> Self {
        ConfigValue::Capability(v)
    }
}

impl From<CalibratorRef> for ConfigValue {
    fn from(v: CalibratorRef) -> Self {
        ConfigValue::Calibrator(v)
    }
}
