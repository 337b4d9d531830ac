//! Diagnostics adapters.

mod tracing_diagnostics;

pub use tracing_diagnostics::TracingDiagnostics;
