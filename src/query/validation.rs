//! Structured validation results
//!
//! Validation never fails fast: every violated rule produces one
//! [`ValidationError`], collected in order into [`ValidationErrors`].

use std::fmt;

use crate::error::QueryDslError;
use crate::query::ast::QueryNode;
use crate::Result;

/// A single violated validation rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered collection of validation errors for a query tree
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violated rule
    pub fn add(&mut self, message: impl Into<String>) {
        self.errors.push(ValidationError::new(message));
    }

    /// Append every error reported by an inner query
    ///
    /// Inner errors are appended after the ones already collected.
    pub fn add_inner<Q: QueryNode + ?Sized>(&mut self, inner: &Q) {
        self.errors.extend(inner.validate().errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Messages of all collected errors, in order
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(ValidationError::message).collect()
    }

    /// Turn a non-empty collection into an error
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(QueryDslError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation Failed: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "{}: {};", i + 1, error)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ok() {
        let errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_display_numbers_each_error() {
        let mut errors = ValidationErrors::new();
        errors.add("inner clause [match] cannot be null.");
        errors.add("parameter [end] needs to be positive.");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "Validation Failed: 1: inner clause [match] cannot be null.;2: parameter [end] needs to be positive.;"
        );
    }

    #[test]
    fn test_into_result_carries_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("field name is null or empty");

        match errors.into_result() {
            Err(QueryDslError::Validation(errors)) => {
                assert_eq!(errors.messages(), vec!["field name is null or empty"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
