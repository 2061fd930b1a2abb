use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("not a phone number: {0:?}")]
    InvalidPhone(String),
    #[error("expected phone list is empty")]
    NoExpectedPhones,
}
