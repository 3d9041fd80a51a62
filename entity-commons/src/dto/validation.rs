//! Field validation for transfer objects

use crate::error::{Error, FieldErrors};

/// Upper bound on user-supplied text fields
pub const MAX_FIELD_LENGTH: usize = 255;

/// Field name to message, as produced by [`Validate::validate`]
pub type ValidationErrors = FieldErrors;

/// Transfer objects that can check their own fields
pub trait Validate {
    /// Collect every field violation
    ///
    /// Each field reports at most one message.
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// [`Validate::validate`] mapped onto [`Error::InvalidData`]
    fn validated(&self) -> crate::error::Result<()> {
        self.validate().map_err(Error::invalid_fields)
    }
}

/// Accumulates field violations in declaration order
#[derive(Debug, Default)]
pub(crate) struct Violations {
    errors: ValidationErrors,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Value must be present
    pub(crate) fn not_empty(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.is_empty() {
            self.reject(field, message);
        }
        self
    }

    /// Character count must fall in `min..=max`
    ///
    /// An empty value is left to [`Violations::not_empty`].
    pub(crate) fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        let len = value.chars().count();
        if !value.is_empty() && (len < min || len > max) {
            self.reject(field, message);
        }
        self
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub(crate) fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}
