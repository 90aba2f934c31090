//! Request form extraction and validation

pub mod extractor;
pub mod fields;

pub use extractor::{Formed, validate_form};
pub use fields::check_reference_kind;
