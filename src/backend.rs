//! Hand-off to the compiler backend.
//!
//! The backend is an external collaborator. It exposes one-way setters and we
//! drive them exactly once per field; nothing is ever read back.

use crate::spec::{
    CalibratorHandle, CompileSpec, DeviceSpec, EngineCapability, Precision, ShapeRange,
};

pub trait BackendSpecSink {
    fn append_input_range(&mut self, range: ShapeRange);
    fn set_device(&mut self, device: DeviceSpec);
    fn set_op_precision(&mut self, precision: Precision);
    fn set_disable_tf32(&mut self, disable_tf32: bool);
    fn set_refit(&mut self, refit: bool);
    fn set_debug(&mut self, debug: bool);
    fn set_strict_types(&mut self, strict_types: bool);
    fn set_capability(&mut self, capability: EngineCapability);
    fn set_num_min_timing_iters(&mut self, iters: i64);
    fn set_num_avg_timing_iters(&mut self, iters: i64);
    fn set_workspace_size(&mut self, bytes: u64);
    fn set_max_batch_size(&mut self, batch: u64);
    fn set_truncate_long_and_double(&mut self, truncate: bool);
    /// `None` when no calibrator was given or the caller already dropped it.
    fn set_ptq_calibrator(&mut self, calibrator: Option<CalibratorHandle>);
}

impl CompileSpec {
    /// Transfer this spec into a backend. Input ranges are appended in input order.
    pub fn apply_to<B: BackendSpecSink + ?Sized>(self, backend: &mut B) {
        let calibrator = self.calibrator.as_ref().and_then(|c| c.handle());

        for range in self.input_ranges {
            backend.append_input_range(range);
        }
        backend.set_device(self.device);
        backend.set_op_precision(self.op_precision);
        backend.set_disable_tf32(self.disable_tf32);
        backend.set_refit(self.refit);
        backend.set_debug(self.debug);
        backend.set_strict_types(self.strict_types);
        backend.set_capability(self.capability);
        backend.set_num_min_timing_iters(self.num_min_timing_iters);
        backend.set_num_avg_timing_iters(self.num_avg_timing_iters);
        backend.set_workspace_size(self.workspace_size);
        backend.set_max_batch_size(self.max_batch_size);
        backend.set_truncate_long_and_double(self.truncate_long_and_double);
        backend.set_ptq_calibrator(calibrator);
    }
}
