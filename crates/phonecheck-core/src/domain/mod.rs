pub mod expected;
pub mod phone;

pub use expected::{ExpectedPhoneRecord, ExpectedPhones};
pub use phone::{normalize_phone, NormalizedPhone};
