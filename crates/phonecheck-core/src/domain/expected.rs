use crate::domain::phone::NormalizedPhone;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// One row of the ground-truth file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedPhoneRecord {
    /// 1-based data row, header excluded.
    pub row: usize,
    pub country: Option<String>,
    /// Phone cell as it appeared in the file, trimmed.
    pub raw: String,
    pub phone: NormalizedPhone,
}

/// Immutable, non-empty list of expected phone numbers in file order.
///
/// Built once during setup and passed by reference to every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpectedPhones(Vec<ExpectedPhoneRecord>);

impl ExpectedPhones {
    pub fn new(records: Vec<ExpectedPhoneRecord>) -> Result<Self, CoreError> {
        if records.is_empty() {
            return Err(CoreError::NoExpectedPhones);
        }
        Ok(Self(records))
    }

    pub fn records(&self) -> &[ExpectedPhoneRecord] {
        &self.0
    }

    pub fn phones(&self) -> impl Iterator<Item = &NormalizedPhone> + '_ {
        self.0.iter().map(|record| &record.phone)
    }

    pub fn contains(&self, phone: &NormalizedPhone) -> bool {
        self.phones().any(|expected| expected == phone)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
