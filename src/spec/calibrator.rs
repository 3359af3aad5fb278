//! Non-owning reference to a caller-owned int8 calibrator.
//!
//! The calibrator is opaque here: we never call into it beyond asking for its
//! handle, and we never keep it alive. If the caller drops it, the reference
//! simply yields no handle.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, Weak};

/// Opaque token the backend uses to find the calibrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CalibratorHandle(pub u64);

/// Supplies representative data for int8 range calibration.
pub trait Calibrator: Send + Sync {
    fn handle(&self) -> CalibratorHandle;
}

#[derive(Clone)]
pub struct CalibratorRef(Weak<dyn Calibrator>);

impl CalibratorRef {
    pub fn new<C: Calibrator + 'static>(calibrator: &Arc<C>) -> Self {
        let weak: Weak<C> = Arc::downgrade(calibrator);
        Self(weak)
    }

    /// Handle of the referenced calibrator, or `None` once it has been dropped.
    pub fn handle(&self) -> Option<CalibratorHandle> {
        self.0.upgrade().map(|c| c.handle())
    }
}

/// Two refs are equal when they point at the same calibrator.
impl PartialEq for CalibratorRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CalibratorRef {}

impl fmt::Debug for CalibratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CalibratorRef").field(&self.handle()).finish()
    }
}

impl Serialize for CalibratorRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.handle().serialize(serializer)
    }
}
