//! Compile spec: raw config record in, validated `CompileSpec` out.
//!
//! JSON shape (only `input_shapes` is required):
//! {
//!   "input_shapes": [
//!     [1, 3, 224, 224],                        // static
//!     {"min": [1, 3, 224, 224],                // dynamic range
//!      "opt": [1, 3, 512, 512],
//!      "max": [1, 3, 1024, 1024]},
//!     {"opt": [1, 16]}                         // fixed, range form
//!   ],
//!   "op_precision": "fp16",
//!   "device": {"device_type": "dla", "gpu_id": 0, "dla_core": 1, "allow_gpu_fallback": true},
//!   "disable_tf32": false, "refit": false, "debug": false, "strict_types": false,
//!   "capability": "default",
//!   "num_min_timing_iters": 2, "num_avg_timing_iters": 1,
//!   "workspace_size": 0, "max_batch_size": 0,
//!   "truncate_long_and_double": false
//! }
//!
//! Fields are resolved in a fixed order (shapes, precision, calibrator, boolean
//! flags, device, capability, integer knobs) and the first failure is returned.
//! Nothing is observable until every field has been validated.

use crate::diagnostics;
use crate::spec::{
    CalibratorRef, DeviceSpec, EngineCapability, Precision, Result, ShapeRange, SpecError,
};
use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_NUM_MIN_TIMING_ITERS: i64 = 2;
pub const DEFAULT_NUM_AVG_TIMING_ITERS: i64 = 1;

const KNOWN_KEYS: [&str; 14] = [
    "input_shapes",
    "op_precision",
    "calibrator",
    "disable_tf32",
    "refit",
    "debug",
    "strict_types",
    "device",
    "capability",
    "num_min_timing_iters",
    "num_avg_timing_iters",
    "workspace_size",
    "max_batch_size",
    "truncate_long_and_double",
];

/// Raw, loosely-typed compile config as the user wrote it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawCompileSpec {
    fields: BTreeMap<String, ConfigValue>,
}

/// Canonical, fully validated compile spec handed to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileSpec {
    /// One range per graph input, in input order.
    pub input_ranges: Vec<ShapeRange>,
    pub op_precision: Precision,
    pub calibrator: Option<CalibratorRef>,
    pub disable_tf32: bool,
    pub refit: bool,
    pub debug: bool,
    pub strict_types: bool,
    pub device: DeviceSpec,
    pub capability: EngineCapability,
    pub num_min_timing_iters: i64,
    pub num_avg_timing_iters: i64,
    /// 0 = leave to the backend.
    pub workspace_size: u64,
    /// 0 = unset.
    pub max_batch_size: u64,
    pub truncate_long_and_double: bool,
}

impl RawCompileSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.fields.get(key)
    }

    fn bool_field(&self, key: &str, default: bool) -> Result<bool> {
        self.get(key).map_or(Ok(default), |v| v.expect_bool(key))
    }

    fn int_field(&self, key: &str, default: i64) -> Result<i64> {
        self.get(key).map_or(Ok(default), |v| v.expect_int(key))
    }

    fn uint_field(&self, key: &str, default: u64) -> Result<u64> {
        self.get(key).map_or(Ok(default), |v| v.expect_uint(key))
    }

    /// Validate every field and assemble the canonical spec.
    pub fn validate_and_build(&self) -> Result<CompileSpec> {
        // Phase 1: input shapes (mandatory).
        let shapes = self
            .get("input_shapes")
            .ok_or_else(|| SpecError::MissingField("input_shapes".to_string()))?;
        let input_ranges = parse_input_ranges(shapes)?;

        // Phase 2: precision + calibrator.
        let op_precision = match self.get("op_precision") {
            Some(v) => Precision::resolve(v)?,
            None => Precision::default(),
        };
        let calibrator = match self.get("calibrator") {
            None | Some(ConfigValue::Null) => None,
            Some(ConfigValue::Calibrator(c)) => Some(c.clone()),
            Some(other) => {
                return Err(SpecError::type_mismatch("calibrator", "calibrator", other));
            }
        };

        // Phase 3: boolean flags.
        let disable_tf32 = self.bool_field("disable_tf32", false)?;
        let refit = self.bool_field("refit", false)?;
        let debug = self.bool_field("debug", false)?;
        let strict_types = self.bool_field("strict_types", false)?;

        // Phase 4: device + capability.
        let device = match self.get("device") {
            Some(v) => DeviceSpec::resolve(v)?,
            None => DeviceSpec::default(),
        };
        let capability = match self.get("capability") {
            Some(v) => EngineCapability::resolve(v)?,
            None => EngineCapability::default(),
        };

        // Phase 5: integer knobs.
        let num_min_timing_iters =
            self.int_field("num_min_timing_iters", DEFAULT_NUM_MIN_TIMING_ITERS)?;
        let num_avg_timing_iters =
            self.int_field("num_avg_timing_iters", DEFAULT_NUM_AVG_TIMING_ITERS)?;
        let workspace_size = self.uint_field("workspace_size", 0)?;
        let max_batch_size = self.uint_field("max_batch_size", 0)?;
        let truncate_long_and_double = self.bool_field("truncate_long_and_double", false)?;

        // Non-fatal checks only past this point.
        for key in self.fields.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            diagnostics::warn(format!("ignoring unknown compile spec field `{}`", key));
        }
        if calibrator.is_some() && op_precision != Precision::Int8 {
            diagnostics::warn(format!(
                "calibrator is only used for int8, but op_precision is {}",
                op_precision
            ));
        }

        tracing::debug!(
            inputs = input_ranges.len(),
            precision = %op_precision,
            device = %device.kind,
            capability = %capability,
            "built compile spec"
        );

        Ok(CompileSpec {
            input_ranges,
            op_precision,
            calibrator,
            disable_tf32,
            refit,
            debug,
            strict_types,
            device,
            capability,
            num_min_timing_iters,
            num_avg_timing_iters,
            workspace_size,
            max_batch_size,
            truncate_long_and_double,
        })
    }
}

impl TryFrom<serde_json::Value> for RawCompileSpec {
    type Error = SpecError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match ConfigValue::from(value) {
            ConfigValue::Map(fields) => Ok(Self { fields }),
            other => Err(SpecError::type_mismatch("compile_spec", "dict", &other)),
        }
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for RawCompileSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Build a compile spec from a raw config record.
pub fn build(raw: &RawCompileSpec) -> Result<CompileSpec> {
    raw.validate_and_build()
}

/// Build one spec per scripted method (`{"forward": {...}, ...}`).
///
/// Stops at the first invalid method; the error carries the method name.
pub fn build_method_specs(
    methods: &BTreeMap<String, RawCompileSpec>,
) -> Result<BTreeMap<String, CompileSpec>> {
    methods
        .iter()
        .map(|(name, raw)| {
            let spec = raw.validate_and_build().map_err(|e| SpecError::Method {
                method: name.clone(),
                source: Box::new(e),
            })?;
            Ok((name.clone(), spec))
        })
        .collect()
}

fn parse_input_ranges(shapes: &ConfigValue) -> Result<Vec<ShapeRange>> {
    let entries = match shapes {
        ConfigValue::List(entries) | ConfigValue::Tuple(entries) => entries,
        other => return Err(SpecError::type_mismatch("input_shapes", "list", other)),
    };
    if entries.is_empty() {
        return Err(SpecError::InvalidShapeSpec(
            "input_shapes must describe at least one input".to_string(),
        ));
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            ShapeRange::parse(entry).map_err(|e| match e {
                SpecError::InvalidShapeSpec(detail) => {
                    SpecError::InvalidShapeSpec(format!("input {}: {}", i, detail))
                }
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::DeviceKind;
    use crate::value::ValueKind;

    fn static_input() -> RawCompileSpec {
        RawCompileSpec::new().with("input_shapes", vec![ConfigValue::from([1, 3, 224, 224])])
    }

    #[test]
    fn defaults_fill_every_optional_field() {
        let spec = static_input().validate_and_build().unwrap();
        assert_eq!(
            spec.input_ranges,
            vec![ShapeRange::fixed(vec![1, 3, 224, 224]).unwrap()]
        );
        assert_eq!(spec.op_precision, Precision::Fp32);
        assert_eq!(spec.device, DeviceSpec::default());
        assert_eq!(spec.device.kind, DeviceKind::Gpu);
        assert_eq!(spec.capability, EngineCapability::Default);
        assert_eq!((spec.num_min_timing_iters, spec.num_avg_timing_iters), (2, 1));
        assert_eq!((spec.workspace_size, spec.max_batch_size), (0, 0));
        assert!(!spec.disable_tf32 && !spec.refit && !spec.debug && !spec.strict_types);
        assert!(!spec.truncate_long_and_double);
        assert!(spec.calibrator.is_none());
    }

    #[test]
    fn missing_input_shapes_wins_over_other_errors() {
        let raw = RawCompileSpec::new()
            .with("op_precision", 12)
            .with("workspace_size", "big");
        assert_eq!(
            raw.validate_and_build().unwrap_err(),
            SpecError::MissingField("input_shapes".to_string())
        );
    }

    #[test]
    fn first_error_follows_assembly_order() {
        // refit (flags) is checked before device, device before workspace_size
        let raw = static_input()
            .with("workspace_size", "big")
            .with("device", ConfigValue::map([("gpu_id", 0)]))
            .with("refit", 1);
        assert_eq!(raw.validate_and_build().unwrap_err().field(), Some("refit"));

        let raw = static_input()
            .with("workspace_size", "big")
            .with("device", ConfigValue::map([("gpu_id", 0)]));
        assert_eq!(
            raw.validate_and_build().unwrap_err(),
            SpecError::MissingField("device_type".to_string())
        );
    }

    #[test]
    fn shape_errors_name_the_input() {
        let raw = RawCompileSpec::new().with(
            "input_shapes",
            vec![ConfigValue::from([1, 2]), ConfigValue::from(true)],
        );
        let err = raw.validate_and_build().unwrap_err();
        assert!(
            err.to_string().contains("input 1: bool is not a supported size container"),
            "{}",
            err
        );
    }

    #[test]
    fn input_shapes_must_be_a_non_empty_sequence() {
        let err = RawCompileSpec::new()
            .with("input_shapes", ConfigValue::from([1, 3, 224, 224]))
            .validate_and_build()
            .unwrap_err();
        // a bare shape is a list whose entries are ints, not shapes
        assert!(matches!(err, SpecError::InvalidShapeSpec(_)));

        let err = RawCompileSpec::new()
            .with("input_shapes", "1x3x224x224")
            .validate_and_build()
            .unwrap_err();
        assert_eq!(
            err,
            SpecError::TypeMismatch {
                field: "input_shapes".to_string(),
                expected: "list",
                actual: ValueKind::Str,
            }
        );

        let err = RawCompileSpec::new()
            .with("input_shapes", Vec::<ConfigValue>::new())
            .validate_and_build()
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidShapeSpec(_)));
    }

    #[test]
    fn null_calibrator_means_none() {
        let spec = static_input()
            .with("calibrator", ConfigValue::Null)
            .validate_and_build()
            .unwrap();
        assert!(spec.calibrator.is_none());

        let err = static_input()
            .with("calibrator", "cache.bin")
            .validate_and_build()
            .unwrap_err();
        assert_eq!(err.field(), Some("calibrator"));
    }

    #[test]
    fn method_errors_carry_the_method_name() {
        let mut methods = BTreeMap::new();
        methods.insert("forward".to_string(), static_input());
        methods.insert("encode".to_string(), RawCompileSpec::new());
        let err = build_method_specs(&methods).unwrap_err();
        assert_eq!(err.to_string(), "method `encode`: missing required field `input_shapes`");
        assert_eq!(err.field(), Some("input_shapes"));
    }
}
