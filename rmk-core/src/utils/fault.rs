//! Fault reporting collaborator.

/// Receives fault reports from the control loop.
///
/// Policy (log, halt, escalate) belongs to the implementor; the loop itself
/// always recovers with a neutral output.
pub trait FaultReporter {
    fn report(&self, site: &str, line: u32, message: &str);
}

/// Reporter that routes faults to `tracing::error!`.
pub struct LogFaultReporter;

impl FaultReporter for LogFaultReporter {
    fn report(&self, site: &str, line: u32, message: &str) {
        tracing::error!("{}:{}: {}", site, line, message);
    }
}

/// Default reporter installed by every constructor.
pub static LOG_FAULTS: LogFaultReporter = LogFaultReporter;
