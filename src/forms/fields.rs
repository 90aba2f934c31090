//! Validation rules for reference-typed form fields
//!
//! `Reference`, `BlobKey` and `Cursor` deserialize from their string forms,
//! so forms declare them directly; a malformed value fails deserialization.
//! Kind constraints are expressed as custom `validator` rules:
//!
//! ```rust,ignore
//! #[derive(Deserialize, Validate)]
//! struct TransferForm {
//!     #[validate(custom(function = "account_reference"))]
//!     account: Reference,
//! }
//!
//! fn account_reference(value: &Reference) -> Result<(), validator::ValidationError> {
//!     check_reference_kind(value, "Account")
//! }
//! ```

use std::borrow::Cow;
use validator::ValidationError;

use crate::core::reference::Reference;

/// Fail unless the reference names an entity of `kind`
pub fn check_reference_kind(reference: &Reference, kind: &str) -> Result<(), ValidationError> {
    if reference.kind() == kind {
        return Ok(());
    }

    let mut error = ValidationError::new("reference_kind");
    error.message = Some(Cow::Owned(format!(
        "Expected a reference to '{}', got '{}'.",
        kind,
        reference.kind()
    )));
    error.add_param(Cow::Borrowed("expected"), &kind);
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_kind_passes() {
        let reference = Reference::new("Account", 7).unwrap();
        assert!(check_reference_kind(&reference, "Account").is_ok());
    }

    #[test]
    fn test_other_kind_fails() {
        let reference = Reference::new("Person", 7).unwrap();
        let err = check_reference_kind(&reference, "Account").unwrap_err();
        assert_eq!(err.code, "reference_kind");
        assert!(err.message.unwrap().contains("Person"));
    }
}
