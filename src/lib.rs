pub mod config;
pub mod error;
pub mod logger;
pub mod report;

// Re-export commonly used types
pub use config::ReporterConfig;
pub use error::{ReportError, Result};
pub use report::{Details, RunReporter, StepId, StepStatus};
