//! Equalization phases and the join barrier that guards them.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::error::{EqualizeError, Result};

/// Stage of an equalization run.
///
/// ```text
/// Idle -> Extracting -> Counting -> [Reducing] -> MappingLookup -> Applying -> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Extracting,
    Counting,
    Reducing,
    MappingLookup,
    Applying,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Extracting => "extracting",
            Phase::Counting => "counting",
            Phase::Reducing => "reducing",
            Phase::MappingLookup => "mapping lookup",
            Phase::Applying => "applying",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Run one parallel phase to its join point.
///
/// A panic in any worker is re-raised by rayon at the join; it is caught here
/// and reported as `WorkerFailed` so no partial result escapes.
pub(crate) fn run_phase<T>(phase: Phase, work: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(work)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(%phase, %message, "worker panicked");
        EqualizeError::WorkerFailed { phase, message }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
