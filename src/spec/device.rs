//! Target device selection.

use crate::diagnostics;
use crate::platform::PlatformDevice;
use crate::spec::{Result, SpecError};
use crate::value::ConfigValue;
use serde::Serialize;
use std::fmt;

const DEVICE_KEYS: [&str; 4] = ["device_type", "gpu_id", "dla_core", "allow_gpu_fallback"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceKind {
    #[default]
    Gpu,
    Dla,
}

impl DeviceKind {
    /// Resolve a `device_type` value.
    ///
    /// Accepts a canonical `DeviceKind`, a CUDA framework device, the tokens
    /// `gpu`/`dla` in any case, or a framework device string like `cuda:0`.
    pub fn resolve(value: &ConfigValue) -> Result<Self> {
        Self::resolve_with_ordinal(value).map(|(kind, _)| kind)
    }

    /// Like `resolve`, but also returns the ordinal carried by a framework
    /// device (`cuda:1` -> `Some(1)`).
    fn resolve_with_ordinal(value: &ConfigValue) -> Result<(Self, Option<u32>)> {
        match value {
            ConfigValue::DeviceKind(kind) => Ok((*kind, None)),
            ConfigValue::Device(dev) => Self::from_platform(dev),
            ConfigValue::Str(s) => {
                if s.eq_ignore_ascii_case("gpu") {
                    Ok((DeviceKind::Gpu, None))
                } else if s.eq_ignore_ascii_case("dla") {
                    Ok((DeviceKind::Dla, None))
                } else {
                    match PlatformDevice::parse(s) {
                        Some(dev) => Self::from_platform(&dev),
                        None => Err(SpecError::InvalidDeviceType(s.clone())),
                    }
                }
            }
            other => Err(SpecError::type_mismatch("device_type", "device", other)),
        }
    }

    fn from_platform(dev: &PlatformDevice) -> Result<(Self, Option<u32>)> {
        if dev.is_cuda() {
            Ok((DeviceKind::Gpu, dev.index))
        } else {
            Err(SpecError::InvalidDeviceType(dev.to_string()))
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Gpu => f.write_str("GPU"),
            DeviceKind::Dla => f.write_str("DLA"),
        }
    }
}

/// Where the engine runs. `dla_core` and `allow_gpu_fallback` only matter for DLA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct DeviceSpec {
    pub kind: DeviceKind,
    pub gpu_id: u32,
    pub dla_core: u32,
    pub allow_gpu_fallback: bool,
}

impl DeviceSpec {
    /// Resolve a `device` descriptor (a dict with a mandatory `device_type`).
    ///
    /// A framework device with an ordinal (`cuda:1`) supplies the default
    /// `gpu_id`; an explicit `gpu_id` must agree with it.
    pub fn resolve(descriptor: &ConfigValue) -> Result<Self> {
        let ConfigValue::Map(fields) = descriptor else {
            return Err(SpecError::type_mismatch("device", "dict", descriptor));
        };

        let (kind, ordinal) = match fields.get("device_type") {
            Some(v) => DeviceKind::resolve_with_ordinal(v)?,
            None => return Err(SpecError::MissingField("device_type".to_string())),
        };

        let mut spec = DeviceSpec {
            kind,
            gpu_id: ordinal.unwrap_or(0),
            ..DeviceSpec::default()
        };
        if let Some(v) = fields.get("gpu_id") {
            let gpu_id = v.expect_u32("gpu_id")?;
            if let Some(ordinal) = ordinal.filter(|o| *o != gpu_id) {
                return Err(SpecError::ConflictingGpuId { ordinal, gpu_id });
            }
            spec.gpu_id = gpu_id;
        }
        if let Some(v) = fields.get("dla_core") {
            spec.dla_core = v.expect_u32("dla_core")?;
        }
        if let Some(v) = fields.get("allow_gpu_fallback") {
            spec.allow_gpu_fallback = v.expect_bool("allow_gpu_fallback")?;
        }

        for key in fields.keys().filter(|k| !DEVICE_KEYS.contains(&k.as_str())) {
            diagnostics::warn(format!("ignoring unknown device field `{}`", key));
        }
        if spec.kind == DeviceKind::Gpu && (spec.dla_core != 0 || spec.allow_gpu_fallback) {
            diagnostics::warn(format!(
                "dla_core={} / allow_gpu_fallback={} have no effect on a GPU device",
                spec.dla_core, spec.allow_gpu_fallback
            ));
        }

        tracing::debug!(
            kind = %spec.kind,
            gpu_id = spec.gpu_id,
            dla_core = spec.dla_core,
            "resolved device"
        );
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn device(entries: Vec<(&str, ConfigValue)>) -> ConfigValue {
        ConfigValue::map(entries)
    }

    #[test]
    fn dla_with_core_and_fallback() {
        let d = DeviceSpec::resolve(&device(vec![
            ("device_type", "dla".into()),
            ("dla_core", 1.into()),
            ("allow_gpu_fallback", true.into()),
        ]))
        .unwrap();
        assert_eq!(
            d,
            DeviceSpec {
                kind: DeviceKind::Dla,
                gpu_id: 0,
                dla_core: 1,
                allow_gpu_fallback: true,
            }
        );
    }

    #[test]
    fn device_type_forms() {
        for (value, expected) in [
            (ConfigValue::from("GPU"), DeviceKind::Gpu),
            (ConfigValue::from("Dla"), DeviceKind::Dla),
            (ConfigValue::from("cuda:1"), DeviceKind::Gpu),
            (ConfigValue::Device(PlatformDevice::cuda(None)), DeviceKind::Gpu),
            (ConfigValue::DeviceKind(DeviceKind::Dla), DeviceKind::Dla),
        ] {
            assert_eq!(DeviceKind::resolve(&value).unwrap(), expected, "{:?}", value);
        }
    }

    #[test]
    fn non_gpu_platform_device_is_rejected() {
        let err = DeviceKind::resolve(&ConfigValue::Device(PlatformDevice::cpu())).unwrap_err();
        assert_eq!(err, SpecError::InvalidDeviceType("cpu".to_string()));
        let err = DeviceKind::resolve(&ConfigValue::from("tpu")).unwrap_err();
        assert_eq!(err, SpecError::InvalidDeviceType("tpu".to_string()));
        let err = DeviceKind::resolve(&ConfigValue::from("the big one")).unwrap_err();
        assert_eq!(err, SpecError::InvalidDeviceType("the big one".to_string()));
    }

    #[test]
    fn device_ordinal_becomes_gpu_id() {
        let d = DeviceSpec::resolve(&device(vec![("device_type", "cuda:1".into())])).unwrap();
        assert_eq!(d.kind, DeviceKind::Gpu);
        assert_eq!(d.gpu_id, 1);

        let handle = ConfigValue::Device(PlatformDevice::cuda(Some(3)));
        let d = DeviceSpec::resolve(&device(vec![("device_type", handle)])).unwrap();
        assert_eq!(d.gpu_id, 3);

        // No ordinal on the handle: the default applies.
        let handle = ConfigValue::Device(PlatformDevice::cuda(None));
        let d = DeviceSpec::resolve(&device(vec![("device_type", handle)])).unwrap();
        assert_eq!(d.gpu_id, 0);
    }

    #[test]
    fn explicit_gpu_id_must_match_device_ordinal() {
        let d = DeviceSpec::resolve(&device(vec![
            ("device_type", "cuda:1".into()),
            ("gpu_id", 1.into()),
        ]))
        .unwrap();
        assert_eq!(d.gpu_id, 1);

        let err = DeviceSpec::resolve(&device(vec![
            ("device_type", ConfigValue::Device(PlatformDevice::cuda(Some(1)))),
            ("gpu_id", 0.into()),
        ]))
        .unwrap_err();
        assert_eq!(err, SpecError::ConflictingGpuId { ordinal: 1, gpu_id: 0 });
        assert_eq!(err.field(), Some("gpu_id"));
    }

    #[test]
    fn device_type_is_mandatory() {
        let err = DeviceSpec::resolve(&device(vec![("gpu_id", 1.into())])).unwrap_err();
        assert_eq!(err, SpecError::MissingField("device_type".to_string()));
    }

    #[test]
    fn optional_fields_are_type_checked() {
        let err = DeviceSpec::resolve(&device(vec![
            ("device_type", "gpu".into()),
            ("gpu_id", "0".into()),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            SpecError::TypeMismatch {
                field: "gpu_id".to_string(),
                expected: "int",
                actual: ValueKind::Str,
            }
        );

        let err = DeviceSpec::resolve(&device(vec![
            ("device_type", "dla".into()),
            ("allow_gpu_fallback", 1.into()),
        ]))
        .unwrap_err();
        assert_eq!(err.field(), Some("allow_gpu_fallback"));
    }

    #[test]
    fn descriptor_must_be_a_dict() {
        let err = DeviceSpec::resolve(&ConfigValue::from("gpu")).unwrap_err();
        assert_eq!(
            err,
            SpecError::TypeMismatch {
                field: "device".to_string(),
                expected: "dict",
                actual: ValueKind::Str,
            }
        );
    }

    #[test]
    fn gpu_keeps_dla_fields_verbatim() {
        let d = DeviceSpec::resolve(&device(vec![
            ("device_type", "gpu".into()),
            ("gpu_id", 2.into()),
            ("dla_core", 1.into()),
        ]))
        .unwrap();
        assert_eq!(d.kind, DeviceKind::Gpu);
        assert_eq!(d.gpu_id, 2);
        assert_eq!(d.dla_core, 1);
    }

    #[test]
    fn gpu_with_fallback_flag_still_resolves() {
        let d = DeviceSpec::resolve(&device(vec![
            ("device_type", "gpu".into()),
            ("dla_core", 1.into()),
            ("allow_gpu_fallback", true.into()),
        ]))
        .unwrap();
        assert_eq!(
            d,
            DeviceSpec {
                kind: DeviceKind::Gpu,
                gpu_id: 0,
                dla_core: 1,
                allow_gpu_fallback: true,
            }
        );
    }

    #[test]
    fn unknown_device_keys_are_ignored() {
        let d = DeviceSpec::resolve(&device(vec![
            ("device_type", "dla".into()),
            ("dla_core", 1.into()),
            ("stream", 7.into()),
        ]))
        .unwrap();
        assert_eq!(d.kind, DeviceKind::Dla);
        assert_eq!(d.dla_core, 1);
    }

    #[test]
    fn ids_must_fit_in_32_bits() {
        let too_big = ConfigValue::Int(i64::from(u32::MAX) + 1);
        for field in ["gpu_id", "dla_core"] {
            let err = DeviceSpec::resolve(&device(vec![
                ("device_type", "dla".into()),
                (field, too_big.clone()),
            ]))
            .unwrap_err();
            assert_eq!(
                err,
                SpecError::TypeMismatch {
                    field: field.to_string(),
                    expected: "32-bit int",
                    actual: ValueKind::Int,
                }
            );
        }
    }
}
