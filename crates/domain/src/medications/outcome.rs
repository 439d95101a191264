use serde_json::{json, Value};

use super::record::{retain_non_empty, MedicationRecord};

pub const NO_MEDICATIONS_MESSAGE: &str =
    "No medications or SIG codes could be identified in the text";

/// Result of a successful standardization call.
///
/// Finding nothing is not a failure: the caller gets a 200 with the
/// `noMedications` flag instead of an error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Standardized {
    Medications(Vec<MedicationRecord>),
    NoMedications,
}

impl Standardized {
    pub fn from_records(records: Vec<MedicationRecord>) -> Self {
        let records = retain_non_empty(records);
        if records.is_empty() {
            Self::NoMedications
        } else {
            Self::Medications(records)
        }
    }

    /// Response payload, shaped the way the web client reads it
    /// (`text.medications`).
    pub fn into_body(self) -> Value {
        match self {
            Self::Medications(medications) => json!({
                "success": true,
                "text": { "medications": medications },
            }),
            Self::NoMedications => json!({
                "success": false,
                "noMedications": true,
                "message": NO_MEDICATIONS_MESSAGE,
            }),
        }
    }
}
