//! Per-call error policy and the sink that receives suppressed faults.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// What a call does when it detects a fault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the call and return the error.
    #[default]
    Stop,
    /// Report the fault to the executor's [`FaultSink`] and carry on.
    Continue,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stop" => Ok(ErrorPolicy::Stop),
            "continue" => Ok(ErrorPolicy::Continue),
            other => Err(format!(
                "unknown error action '{}' (expected 'stop' or 'continue')",
                other
            )),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Stop => write!(f, "stop"),
            ErrorPolicy::Continue => write!(f, "continue"),
        }
    }
}

/// Receives faults that were suppressed under [`ErrorPolicy::Continue`].
pub trait FaultSink: Send + Sync {
    fn fault_suppressed(&self, url: &str, fault: &Error);
}

/// Default sink: one `tracing` warning per suppressed fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFaults;

impl FaultSink for LogFaults {
    fn fault_suppressed(&self, url: &str, fault: &Error) {
        tracing::warn!(url = %url, "{}, continuing", fault);
    }
}

impl<F> FaultSink for F
where
    F: Fn(&str, &Error) + Send + Sync,
{
    fn fault_suppressed(&self, url: &str, fault: &Error) {
        self(url, fault)
    }
}
