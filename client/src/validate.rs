//! Local input validation shared by the resource modules.
//!
//! These checks run before any request is built, so a violation fails
//! synchronously with [`Error::Validation`] and never reaches the transport.

use crate::error::Error;

/// Require a non-empty, non-whitespace value.
pub(crate) fn require_value(value: &str, what: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Require a positive record id.
pub(crate) fn require_id(id: u64) -> Result<(), Error> {
    if id == 0 {
        return Err(Error::Validation(
            "record id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(require_value("", "name").is_err());
        assert!(require_value("   ", "name").is_err());
        assert!(require_value("mydb", "name").is_ok());
    }

    #[test]
    fn error_message_names_the_field() {
        let err = require_value("", "database name").unwrap_err();
        assert_eq!(err.to_string(), "invalid input: database name must not be empty");
    }

    #[test]
    fn rejects_zero_id() {
        assert!(require_id(0).is_err());
        assert!(require_id(1).is_ok());
    }
}
