pub mod domain;
pub mod error;
pub mod extract;
pub mod rules;

pub use domain::*;
pub use error::CoreError;
pub use extract::{
    extract_phone_numbers, ExtractError, ExtractedPhoneSet, PageCapture, PageSource,
    PhoneSighting, SelectorTimeout, DEFAULT_WAIT_TIMEOUT,
};
pub use rules::*;
