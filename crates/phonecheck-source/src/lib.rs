pub mod error;
pub mod expected;
pub mod html;

pub use error::{Result, SourceError};
pub use expected::load_expected_phones;
pub use html::{PageElement, StaticPage};
