use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Iter;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(Arc<str>);

impl FieldKey {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for FieldKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for FieldKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// The representation type of a [`FieldValue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Text,
    Number,
    Bool,
    List,
}

impl ValueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Number(_) => ValueKind::Number,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::List(_) => ValueKind::List,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Bool(flag) => write!(f, "{flag}"),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Number(Decimal::from(value))
                }
            }
        )*
    };
}

number_from!(i32, i64, u32, u64);

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("expected a {expected} value, found {found}")]
pub struct ValueKindError {
    pub expected: ValueKind,
    pub found: ValueKind,
}

impl ValueKindError {
    fn new(expected: ValueKind, value: &FieldValue) -> Self {
        Self {
            expected,
            found: value.kind(),
        }
    }
}

impl TryFrom<FieldValue> for String {
    type Error = ValueKindError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::Text(text) => Ok(text),
            other => Err(ValueKindError::new(ValueKind::Text, &other)),
        }
    }
}

impl TryFrom<FieldValue> for Decimal {
    type Error = ValueKindError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        value
            .as_number()
            .ok_or_else(|| ValueKindError::new(ValueKind::Number, &value))
    }
}

// Fractional or out-of-range numbers do not convert to integers.
macro_rules! integer_try_from {
    ($($ty:ty => $convert:ident),*) => {
        $(
            impl TryFrom<FieldValue> for $ty {
                type Error = ValueKindError;

                fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
                    value
                        .as_number()
                        .filter(Decimal::is_integer)
                        .and_then(|number| number.$convert())
                        .ok_or_else(|| ValueKindError::new(ValueKind::Number, &value))
                }
            }
        )*
    };
}

integer_try_from!(i32 => to_i32, i64 => to_i64, u32 => to_u32, u64 => to_u64);

impl TryFrom<FieldValue> for bool {
    type Error = ValueKindError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        value
            .as_bool()
            .ok_or_else(|| ValueKindError::new(ValueKind::Bool, &value))
    }
}

impl TryFrom<FieldValue> for Vec<String> {
    type Error = ValueKindError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::List(items) => Ok(items),
            other => Err(ValueKindError::new(ValueKind::List, &other)),
        }
    }
}

/// Field values in form order.
///
/// Iteration order is insertion order, which fixes the order fields are
/// validated in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Values {
    entries: IndexMap<FieldKey, FieldValue>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts or replaces a value. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the stored key for `key`, sharing its allocation.
    pub fn key(&self, key: &str) -> Option<&FieldKey> {
        self.entries.get_key_value(key).map(|(key, _)| key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> Iter<'_, FieldKey, FieldValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the mapping with one existing key replaced; `None` if `key` is
    /// not present.
    pub fn with_replaced(&self, key: &str, value: FieldValue) -> Option<Self> {
        let index = self.entries.get_index_of(key)?;
        let mut next = self.clone();
        if let Some((_, slot)) = next.entries.get_index_mut(index) {
            *slot = value;
        }
        Some(next)
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = (&'a FieldKey, &'a FieldValue);
    type IntoIter = Iter<'a, FieldKey, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Values
where
    K: Into<FieldKey>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}
