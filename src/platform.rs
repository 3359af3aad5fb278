//! Handles owned by the host tensor framework.
//!
//! Users may hand the framework's own dtype and device objects to the compile
//! config instead of plain tokens. These are the Rust-side stand-ins for those
//! handles: `DType` for tensor element types and `PlatformDevice` for devices
//! such as `cuda:0`.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Tensor element type as named by the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    UInt8,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    BFloat16,
    Float32,
    Float64,
}

impl DType {
    /// Look up a dtype by its framework name or alias (`half`, `float`, `long`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let dtype = match name {
            "bool" => DType::Bool,
            "uint8" => DType::UInt8,
            "int8" => DType::Int8,
            "int16" | "short" => DType::Int16,
            "int32" | "int" => DType::Int32,
            "int64" | "long" => DType::Int64,
            "float16" | "half" => DType::Float16,
            "bfloat16" => DType::BFloat16,
            "float32" | "float" => DType::Float32,
            "float64" | "double" => DType::Float64,
            _ => return None,
        };
        Some(dtype)
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::UInt8 => "uint8",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float16 => "float16",
            DType::BFloat16 => "bfloat16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// kind[:index], e.g. "cuda", "cuda:1", "cpu"
static DEVICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([a-z][a-z0-9_]*)(?::(\d+))?\s*$").expect("device pattern is valid")
});

/// A framework device handle: a backend kind plus an optional ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformDevice {
    pub kind: String,
    pub index: Option<u32>,
}

impl PlatformDevice {
    pub fn new(kind: impl Into<String>, index: Option<u32>) -> Self {
        Self {
            kind: kind.into(),
            index,
        }
    }

    pub fn cuda(index: Option<u32>) -> Self {
        Self::new("cuda", index)
    }

    pub fn cpu() -> Self {
        Self::new("cpu", None)
    }

    /// Parse a framework device string such as `"cuda:0"`.
    ///
    /// Returns `None` when the string is not of the form `kind[:index]` or the
    /// index does not fit in a `u32`.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = DEVICE_RE.captures(s)?;
        let kind = caps.get(1)?.as_str();
        let index = match caps.get(2) {
            Some(m) => Some(m.as_str().parse::<u32>().ok()?),
            None => None,
        };
        Some(Self::new(kind, index))
    }

    pub fn is_cuda(&self) -> bool {
        self.kind == "cuda"
    }
}

impl fmt::Display for PlatformDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}:{}", self.kind, i),
            None => f.write_str(&self.kind),
        }
    }
}
