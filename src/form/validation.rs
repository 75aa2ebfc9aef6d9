use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};

use super::value::{FieldKey, FieldValue, Values};

pub const DEFAULT_PROGRESS_PRECISION: u32 = 2;

/// A synchronous check of one field.
///
/// Returns the error message for `value`, or an empty string when the value is
/// acceptable. `values` is the full value set so rules can compare fields.
pub trait ValidationRule {
    fn check(&self, value: &FieldValue, values: &Values) -> String;
}

impl<F> ValidationRule for F
where
    F: Fn(&FieldValue, &Values) -> String,
{
    fn check(&self, value: &FieldValue, values: &Values) -> String {
        (self)(value, values)
    }
}

pub type RuleFn = Rc<dyn ValidationRule>;

/// Ordered rule lists per field. Fields without an entry have no rules.
#[derive(Clone, Default)]
pub struct Rules {
    fields: IndexMap<FieldKey, Vec<RuleFn>>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rule` to the rules of `key`.
    pub fn rule<R>(mut self, key: impl Into<FieldKey>, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.push(key, rule);
        self
    }

    pub fn push<R>(&mut self, key: impl Into<FieldKey>, rule: R)
    where
        R: ValidationRule + 'static,
    {
        self.fields
            .entry(key.into())
            .or_default()
            .push(Rc::new(rule));
    }

    pub fn for_field(&self, key: &str) -> &[RuleFn] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rule_count(&self, key: &str) -> usize {
        self.for_field(key).len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }
}

impl Debug for Rules {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(key, rules)| (key, rules.len())))
            .finish()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationResult {
    pub invalid: bool,
    pub valid: bool,
    /// One entry per field in form order; an empty string means no error.
    pub errors: IndexMap<FieldKey, String>,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// Percentage of valid fields, rounded to the form's progress precision.
    pub progress: Decimal,
}

impl ValidationResult {
    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn is_field_valid(&self, key: &str) -> bool {
        self.error(key).is_some_and(str::is_empty)
    }

    pub fn total(&self) -> usize {
        self.errors.len()
    }

    pub fn first_error(&self) -> Option<(&FieldKey, &str)> {
        self.errors
            .iter()
            .find_map(|(key, error)| (!error.is_empty()).then_some((key, error.as_str())))
    }
}

pub fn validate(keys: &[FieldKey], values: &Values, rules: &Rules) -> ValidationResult {
    validate_with_precision(keys, values, rules, DEFAULT_PROGRESS_PRECISION)
}

/// Runs every field's rules in order, stopping at the first failure per field.
pub fn validate_with_precision(
    keys: &[FieldKey],
    values: &Values,
    rules: &Rules,
    precision: u32,
) -> ValidationResult {
    let mut errors = IndexMap::with_capacity(keys.len());
    let mut invalid_count = 0;

    for key in keys {
        let error = match values.get(key.as_str()) {
            Some(value) => first_failure(rules.for_field(key.as_str()), value, values),
            None => String::new(),
        };
        if !error.is_empty() {
            invalid_count += 1;
        }
        errors.insert(key.clone(), error);
    }

    let valid_count = keys.len() - invalid_count;
    ValidationResult {
        invalid: invalid_count > 0,
        valid: invalid_count == 0,
        errors,
        valid_count,
        invalid_count,
        progress: progress(valid_count, keys.len(), precision),
    }
}

fn first_failure(rules: &[RuleFn], value: &FieldValue, values: &Values) -> String {
    rules
        .iter()
        .map(|rule| rule.check(value, values))
        .find(|error| !error.is_empty())
        .unwrap_or_default()
}

// An empty form counts as complete.
pub(super) fn progress(valid_count: usize, total: usize, precision: u32) -> Decimal {
    if total == 0 {
        return Decimal::ONE_HUNDRED;
    }
    let ratio = Decimal::from(valid_count) * Decimal::ONE_HUNDRED / Decimal::from(total);
    ratio.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}
