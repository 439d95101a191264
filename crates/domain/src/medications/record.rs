use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One medication extracted from a prescription signature.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct MedicationRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub medication: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sig_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub refills: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub purpose: Option<String>,
}

impl MedicationRecord {
    pub const FIELDS: [&'static str; 7] = [
        "medication",
        "sig_code",
        "dosage",
        "frequency",
        "quantity",
        "refills",
        "purpose",
    ];

    /// A record is empty when the model filled in none of its fields.
    pub fn is_empty(&self) -> bool {
        [
            &self.medication,
            &self.sig_code,
            &self.dosage,
            &self.frequency,
            &self.quantity,
            &self.refills,
            &self.purpose,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

/// Drops empty records, keeping the remaining ones in their original order.
pub fn retain_non_empty(records: Vec<MedicationRecord>) -> Vec<MedicationRecord> {
    records.into_iter().filter(|r| !r.is_empty()).collect()
}

// Models occasionally answer `"refills": 0` or `"quantity": 30`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string or null, found {}",
            other
        ))),
    }
}
