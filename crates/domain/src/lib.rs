//! Shared contract of the prescription lambdas

/// Domain errors
pub mod errors;

/// Request/response envelope
pub mod envelope;

/// Medication records
pub mod medications;

/// Log redaction
pub mod redact;

pub use envelope::{Request, Response};
pub use errors::Error;
pub use medications::{MedicationRecord, Standardized};
