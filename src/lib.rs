//! Normalization and validation of accelerator compile specs.
//!
//! A user describes how a network should be compiled with a loosely-typed
//! record: input shapes as lists, tuples or min/opt/max ranges, precision as a
//! dtype or token, a device dict, plus tuning knobs. This crate turns that
//! record into a `CompileSpec` that a code generator can trust without further
//! checks, or fails on the first invalid field.
//!
//! ```
//! use compile_spec::{ConfigValue, Precision, RawCompileSpec};
//!
//! let raw = RawCompileSpec::new()
//!     .with("input_shapes", vec![ConfigValue::from([1, 3, 224, 224])])
//!     .with("op_precision", "half");
//! let spec = raw.validate_and_build().unwrap();
//! assert_eq!(spec.op_precision, Precision::Fp16);
//! assert!(spec.input_ranges[0].is_static());
//! ```

pub mod backend;
pub mod diagnostics;
pub mod platform;
pub mod spec;
pub mod value;

pub use backend::BackendSpecSink;
pub use platform::{DType, PlatformDevice};
pub use spec::{
    Calibrator, CalibratorHandle, CalibratorRef, CompileSpec, DeviceKind, DeviceSpec,
    EngineCapability, Precision, RawCompileSpec, Result, ShapeRange, SpecError, build,
    build_method_specs,
};
pub use value::{ConfigValue, ValueKind};
