//! Validated type for accumulating field errors.
//!
//! Unlike `Result`, combining two `Validated` values with [`Validated::map2`]
//! or [`Validated::map3`] keeps the errors of every failed side instead of
//! stopping at the first one.
//!
//! # Examples
//!
//! ```rust
//! use family_groups::application::validated::Validated;
//!
//! let name: Validated<&str> = Validated::invalid("name", "This field is required.");
//! let age: Validated<u8> = Validated::invalid("age", "Not a number.");
//!
//! let result = name.map2(age, |name, age| (name, age));
//! assert_eq!(result.errors().len(), 2);
//! ```

use super::validation::{FieldError, ValidationError};

/// Either a valid value or every field error found so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<A> {
    Valid(A),
    Invalid(Vec<FieldError>),
}

impl<A> Validated<A> {
    #[must_use]
    pub const fn valid(value: A) -> Self {
        Self::Valid(value)
    }

    /// Creates an invalid result with a single field error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid(vec![FieldError::new(field, message)])
    }

    /// Lifts the outcome of a single-field rule, attributing a failure to
    /// `field`.
    #[must_use]
    pub fn check(field: &str, result: Result<A, String>) -> Self {
        match result {
            Ok(value) => Self::Valid(value),
            Err(message) => Self::invalid(field, message),
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The accumulated errors, empty when valid.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(errors) => errors,
        }
    }

    #[must_use]
    pub fn map<B, F>(self, function: F) -> Validated<B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Self::Valid(value) => Validated::Valid(function(value)),
            Self::Invalid(errors) => Validated::Invalid(errors),
        }
    }

    /// Combines two results, keeping the errors of both.
    #[must_use]
    pub fn map2<B, C, F>(self, other: Validated<B>, function: F) -> Validated<C>
    where
        F: FnOnce(A, B) -> C,
    {
        match (self, other) {
            (Self::Valid(a), Validated::Valid(b)) => Validated::Valid(function(a, b)),
            (Self::Invalid(mut e1), Validated::Invalid(e2)) => {
                e1.extend(e2);
                Validated::Invalid(e1)
            }
            (Self::Invalid(errors), Validated::Valid(_))
            | (Self::Valid(_), Validated::Invalid(errors)) => Validated::Invalid(errors),
        }
    }

    /// Combines three results, keeping the errors of all of them in order.
    #[must_use]
    pub fn map3<B, C, D, F>(
        self,
        second: Validated<B>,
        third: Validated<C>,
        function: F,
    ) -> Validated<D>
    where
        F: FnOnce(A, B, C) -> D,
    {
        self.map2(second, |a, b| (a, b))
            .map2(third, |(a, b), c| function(a, b, c))
    }

    /// Converts to a `Result` carrying every accumulated error.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if this is invalid.
    pub fn into_result(self) -> Result<A, ValidationError> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(ValidationError::new(errors)),
        }
    }
}

impl<A> Validated<Option<A>> {
    /// Checks `value` with `rule` when present; an absent value is valid.
    #[must_use]
    pub fn optional<T>(
        field: &str,
        value: Option<T>,
        rule: impl FnOnce(T) -> Result<A, String>,
    ) -> Self {
        match value {
            None => Self::Valid(None),
            Some(value) => Validated::check(field, rule(value)).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bad<A>(field: &str) -> Validated<A> {
        Validated::invalid(field, "bad")
    }

    #[rstest]
    fn map2_applies_function_when_both_valid() {
        let sum = Validated::valid(1).map2(Validated::valid(2), |a, b| a + b);

        assert_eq!(sum, Validated::Valid(3));
    }

    #[rstest]
    fn map2_keeps_errors_of_both_sides_in_order() {
        let result = bad::<i32>("first").map2(bad::<i32>("second"), |a, b| a + b);

        let fields: Vec<&str> = result.errors().iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["first", "second"]);
    }

    #[rstest]
    #[case(bad("a"), Validated::valid(2), Validated::valid(3), vec!["a"])]
    #[case(Validated::valid(1), bad("b"), bad("c"), vec!["b", "c"])]
    #[case(bad("a"), bad("b"), bad("c"), vec!["a", "b", "c"])]
    fn map3_accumulates_every_failure(
        #[case] first: Validated<i32>,
        #[case] second: Validated<i32>,
        #[case] third: Validated<i32>,
        #[case] expected: Vec<&str>,
    ) {
        let result = first.map3(second, third, |a, b, c| a + b + c);

        assert!(!result.is_valid());
        let fields: Vec<&str> = result.errors().iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, expected);
    }

    #[rstest]
    fn check_attributes_rule_failure_to_field() {
        let checked: Validated<u8> = Validated::check("age", Err("Not a number.".to_string()));

        assert_eq!(
            checked.into_result().unwrap_err().errors,
            vec![FieldError::new("age", "Not a number.")]
        );
    }

    #[rstest]
    fn optional_skips_absent_values() {
        let absent: Validated<Option<usize>> =
            Validated::optional("due_date", None::<&str>, |_| Err("never".to_string()));
        let present = Validated::optional("due_date", Some("x"), |value: &str| Ok(value.len()));

        assert_eq!(absent, Validated::Valid(None));
        assert_eq!(present, Validated::Valid(Some(1)));
    }
}
