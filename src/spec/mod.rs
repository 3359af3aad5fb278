//! Spec layer: raw compile config in, validated compile spec out.
//!
//! Each configurable field has its own resolver module; `compile` orders them
//! and assembles the final `CompileSpec`.

pub mod calibrator;
pub mod capability;
pub mod compile;
pub mod device;
pub mod error;
pub mod precision;
pub mod shape;

pub use calibrator::{Calibrator, CalibratorHandle, CalibratorRef};
pub use capability::EngineCapability;
pub use compile::{CompileSpec, RawCompileSpec, build, build_method_specs};
pub use device::{DeviceKind, DeviceSpec};
pub use error::{Result, SpecError};
pub use precision::Precision;
pub use shape::ShapeRange;
