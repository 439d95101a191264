/// Medication record
pub mod record;

/// Standardization outcome
pub mod outcome;

pub use outcome::{Standardized, NO_MEDICATIONS_MESSAGE};
pub use record::{retain_non_empty, MedicationRecord};
