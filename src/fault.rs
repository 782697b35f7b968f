//! Fault-reporting sink for send failures.

use tracing::error;

/// Fire-and-forget exception capture. Implementations must not fail the caller.
pub trait FaultReporter: Send + Sync {
    fn capture(&self, error: &(dyn std::error::Error + 'static));
}

/// Default sink: records the fault as a structured `error` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultReporter;

impl FaultReporter for TracingFaultReporter {
    fn capture(&self, error: &(dyn std::error::Error + 'static)) {
        error!(fault = true, "Captured fault: {}", error);
    }
}
