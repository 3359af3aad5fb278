//! Input shape ranges.
//!
//! Each `input_shapes` entry takes one of three forms:
//! - `{"min": [...], "opt": [...], "max": [...]}`: a dynamic range
//! - `{"opt": [...]}`: a fixed shape written in range form
//! - `[...]` (list, tuple or framework size): a static shape
//!
//! All of them normalize to a `ShapeRange` whose three dimension vectors share
//! one rank.

use crate::diagnostics;
use crate::spec::{Result, SpecError};
use crate::value::ConfigValue;
use serde::Serialize;

const RANGE_KEYS: [&str; 3] = ["min", "opt", "max"];

/// Envelope of input sizes an engine must accept. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeRange {
    min: Vec<u64>,
    opt: Vec<u64>,
    max: Vec<u64>,
}

/// Recognized shape forms, borrowed from the raw entry.
enum ShapeInput<'a> {
    Range {
        min: &'a ConfigValue,
        opt: &'a ConfigValue,
        max: &'a ConfigValue,
    },
    Opt(&'a ConfigValue),
    Static(&'a ConfigValue),
}

impl<'a> ShapeInput<'a> {
    fn classify(entry: &'a ConfigValue) -> Result<Self> {
        match entry {
            ConfigValue::Map(fields) => {
                if let Some(unknown) = fields.keys().find(|k| !RANGE_KEYS.contains(&k.as_str())) {
                    return Err(SpecError::InvalidShapeSpec(format!(
                        "unrecognized key `{}` in shape range (expected min, opt, max)",
                        unknown
                    )));
                }
                match (fields.get("min"), fields.get("opt"), fields.get("max")) {
                    (Some(min), Some(opt), Some(max)) => Ok(ShapeInput::Range { min, opt, max }),
                    (None, Some(opt), None) => Ok(ShapeInput::Opt(opt)),
                    (_, None, _) => Err(SpecError::InvalidShapeSpec(
                        "shape range is missing `opt`".to_string(),
                    )),
                    (_, Some(_), _) => Err(SpecError::InvalidShapeSpec(
                        "shape range must give both `min` and `max`, or only `opt`".to_string(),
                    )),
                }
            }
            ConfigValue::List(_) | ConfigValue::Tuple(_) | ConfigValue::Size(_) => {
                Ok(ShapeInput::Static(entry))
            }
            other => Err(SpecError::InvalidShapeSpec(format!(
                "{} is not a supported size container (expected a list, tuple or size, \
                 or a dict of min/opt/max)",
                other.kind()
            ))),
        }
    }
}

impl ShapeRange {
    /// A static shape: min = opt = max.
    pub fn fixed(dims: Vec<u64>) -> Result<Self> {
        Self::new(dims.clone(), dims.clone(), dims)
    }

    /// A dynamic range. All three vectors must be non-empty and of equal rank.
    pub fn new(min: Vec<u64>, opt: Vec<u64>, max: Vec<u64>) -> Result<Self> {
        for (name, dims) in [("min", &min), ("opt", &opt), ("max", &max)] {
            if dims.is_empty() {
                return Err(SpecError::InvalidShapeSpec(format!(
                    "`{}` must have at least one dimension",
                    name
                )));
            }
        }
        if min.len() != opt.len() || opt.len() != max.len() {
            return Err(SpecError::InvalidShapeSpec(format!(
                "min/opt/max ranks differ ({}, {}, {})",
                min.len(),
                opt.len(),
                max.len()
            )));
        }
        Ok(Self { min, opt, max })
    }

    /// Normalize one raw `input_shapes` entry.
    pub fn parse(entry: &ConfigValue) -> Result<Self> {
        let range = match ShapeInput::classify(entry)? {
            ShapeInput::Range { min, opt, max } => {
                Self::new(dims("min", min)?, dims("opt", opt)?, dims("max", max)?)?
            }
            ShapeInput::Opt(opt) => Self::fixed(dims("opt", opt)?)?,
            ShapeInput::Static(seq) => Self::fixed(dims("shape", seq)?)?,
        };

        if !range.is_ordered() {
            diagnostics::warn(format!(
                "shape range min {:?} / opt {:?} / max {:?} is not ordered per dimension",
                range.min, range.opt, range.max
            ));
        }
        Ok(range)
    }

    pub fn min(&self) -> &[u64] {
        &self.min
    }

    pub fn opt(&self) -> &[u64] {
        &self.opt
    }

    pub fn max(&self) -> &[u64] {
        &self.max
    }

    pub fn rank(&self) -> usize {
        self.opt.len()
    }

    pub fn is_static(&self) -> bool {
        self.min == self.opt && self.opt == self.max
    }

    /// min <= opt <= max in every dimension.
    pub fn is_ordered(&self) -> bool {
        self.min
            .iter()
            .zip(&self.opt)
            .zip(&self.max)
            .all(|((lo, mid), hi)| lo <= mid && mid <= hi)
    }
}

/// Decode a dimension sequence. Copies, so later edits to the raw entry are not observed.
fn dims(what: &str, value: &ConfigValue) -> Result<Vec<u64>> {
    let items = match value {
        ConfigValue::Size(dims) => return Ok(dims.clone()),
        ConfigValue::List(items) | ConfigValue::Tuple(items) => items,
        other => {
            return Err(SpecError::InvalidShapeSpec(format!(
                "`{}` must be a sequence of dimensions, got {}",
                what,
                other.kind()
            )));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            ConfigValue::Int(d) if *d >= 0 => Ok(*d as u64),
            ConfigValue::UInt(d) => Ok(*d),
            other => Err(SpecError::InvalidShapeSpec(format!(
                "`{}` dimension {} must be a non-negative integer, got {}",
                what,
                i,
                describe(other)
            ))),
        })
        .collect()
}

fn describe(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Int(d) => d.to_string(),
        ConfigValue::UInt(d) => d.to_string(),
        other => other.kind().to_string(),
    }
}
