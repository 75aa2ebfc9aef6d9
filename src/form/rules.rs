//! Ready-made [`ValidationRule`]s.
//!
//! Each constructor takes the message reported when the rule fails. Rules that
//! only make sense for one value kind pass values of any other kind, so
//! combining them with the wrong field never produces spurious errors.
//!
//! ```ignore
//! let rules = Rules::new()
//!     .rule("email", rules::required("Email is required"))
//!     .rule("email", rules::email("Please enter a valid email"))
//!     .rule("confirm", rules::equals_field("password", "Passwords do not match"));
//! ```

use regex::Regex;
use rust_decimal::Decimal;

use super::validation::ValidationRule;
use super::value::{FieldKey, FieldValue, Values};

fn check(ok: bool, message: &str) -> String {
    if ok { String::new() } else { message.to_string() }
}

/// Text must contain a non-whitespace character, lists must not be empty and
/// booleans must be `true`.
pub fn required(message: impl Into<String>) -> impl ValidationRule {
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        let present = match value {
            FieldValue::Text(text) => !text.trim().is_empty(),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Bool(flag) => *flag,
            FieldValue::Number(_) => true,
        };
        check(present, &message)
    }
}

/// Minimum length in characters for text, in items for lists.
pub fn min_length(min: usize, message: impl Into<String>) -> impl ValidationRule {
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        check(length(value).is_none_or(|len| len >= min), &message)
    }
}

pub fn max_length(max: usize, message: impl Into<String>) -> impl ValidationRule {
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        check(length(value).is_none_or(|len| len <= max), &message)
    }
}

fn length(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Text(text) => Some(text.chars().count()),
        FieldValue::List(items) => Some(items.len()),
        _ => None,
    }
}

/// Empty text passes; pair with [`required`] to demand a value.
pub fn email(message: impl Into<String>) -> impl ValidationRule {
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        let ok = value
            .as_text()
            .is_none_or(|text| text.is_empty() || email_address::EmailAddress::is_valid(text));
        check(ok, &message)
    }
}

pub fn pattern(regex: Regex, message: impl Into<String>) -> impl ValidationRule {
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        check(value.as_text().is_none_or(|text| regex.is_match(text)), &message)
    }
}

pub fn contains(needle: impl Into<String>, message: impl Into<String>) -> impl ValidationRule {
    let needle = needle.into();
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        check(value.as_text().is_none_or(|text| text.contains(&needle)), &message)
    }
}

pub fn min(min: impl Into<Decimal>, message: impl Into<String>) -> impl ValidationRule {
    let min = min.into();
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        check(value.as_number().is_none_or(|number| number >= min), &message)
    }
}

pub fn max(max: impl Into<Decimal>, message: impl Into<String>) -> impl ValidationRule {
    let max = max.into();
    let message = message.into();
    move |value: &FieldValue, _: &Values| {
        check(value.as_number().is_none_or(|number| number <= max), &message)
    }
}

pub fn checked(message: impl Into<String>) -> impl ValidationRule {
    let message = message.into();
    move |value: &FieldValue, _: &Values| check(value.as_bool().unwrap_or(true), &message)
}

/// The field must hold the same value as `other`.
pub fn equals_field(other: impl Into<FieldKey>, message: impl Into<String>) -> impl ValidationRule {
    let other = other.into();
    let message = message.into();
    move |value: &FieldValue, values: &Values| {
        check(values.get(other.as_str()) == Some(value), &message)
    }
}
