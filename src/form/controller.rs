use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;

use super::meta::{Metadata, compute_metadata};
use super::notifier::{ChangeEvent, ChangeNotifier, ChangeStream, Subscription};
use super::validation::{
    DEFAULT_PROGRESS_PRECISION, Rules, ValidationResult, validate_with_precision,
};
use super::value::{FieldKey, FieldValue, ValueKind, Values};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    /// Decimal places kept in `ValidationResult::progress`.
    pub progress_precision: u32,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            progress_precision: DEFAULT_PROGRESS_PRECISION,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("field change is missing a field name")]
    MissingFieldName,
    #[error("unknown field '{key}'")]
    UnknownField { key: String },
    #[error("field '{key}' holds a {expected} value, got {found}")]
    ValueKindMismatch {
        key: FieldKey,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("form state is busy while {0}")]
    StateBusy(&'static str),
}

impl FormError {
    pub fn unknown_field(key: impl Into<String>) -> Self {
        Self::UnknownField { key: key.into() }
    }
}

pub type FormResult<T> = Result<T, FormError>;

/// Values together with the validation and metadata derived from them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormState {
    pub values: Values,
    pub validation: ValidationResult,
    pub meta: Metadata,
}

impl FormState {
    fn initial(keys: &[FieldKey], values: Values, rules: &Rules, precision: u32) -> Self {
        let validation = validate_with_precision(keys, &values, rules, precision);
        Self {
            values,
            validation,
            meta: compute_metadata(false, false),
        }
    }

    fn with_value(
        &self,
        keys: &[FieldKey],
        rules: &Rules,
        precision: u32,
        key: &str,
        value: FieldValue,
    ) -> Option<Self> {
        let values = self.values.with_replaced(key, value)?;
        let validation = validate_with_precision(keys, &values, rules, precision);
        Some(Self {
            values,
            validation,
            meta: self.meta.touch(),
        })
    }

    fn confirmed(&self, keys: &[FieldKey], rules: &Rules, precision: u32) -> Self {
        Self {
            values: self.values.clone(),
            validation: validate_with_precision(keys, &self.values, rules, precision),
            meta: self.meta.confirm(),
        }
    }
}

/// Handle to one form instance.
///
/// Clones share state. The handle is single-threaded; change handlers may call
/// back into the form because the state is released before events go out.
#[derive(Clone)]
pub struct Form {
    pub(super) id: FormId,
    pub(super) options: FormOptions,
    pub(super) keys: Rc<[FieldKey]>,
    pub(super) rules: Rc<Rules>,
    pub(super) initial: Rc<FormState>,
    pub(super) state: Rc<RefCell<FormState>>,
    pub(super) notifier: ChangeNotifier,
}

impl Form {
    pub fn new(initial: Values, rules: Rules) -> Self {
        Self::with_options(initial, rules, FormOptions::default())
    }

    pub fn with_options(initial: Values, rules: Rules, options: FormOptions) -> Self {
        let id = FormId::next();
        let keys = initial.keys().cloned().collect::<Rc<[FieldKey]>>();
        for key in rules.keys() {
            if !initial.contains_key(key.as_str()) {
                tracing::warn!(form = %id, key = %key, "rules registered for an unknown field");
            }
        }
        let state = FormState::initial(&keys, initial, &rules, options.progress_precision);
        tracing::debug!(
            form = %id,
            fields = keys.len(),
            valid = state.validation.valid,
            "form created"
        );
        Self {
            id,
            options,
            keys,
            rules: Rc::new(rules),
            initial: Rc::new(state.clone()),
            state: Rc::new(RefCell::new(state)),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn keys(&self) -> &[FieldKey] {
        &self.keys
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.keys.iter().any(|known| known.as_str() == key)
    }

    pub fn set(&self, key: &str, value: impl Into<FieldValue>) -> FormResult<()> {
        let value = value.into();
        let event = {
            let mut state = borrow_state_mut(&self.state, "setting a field")?;
            let Some(next) = state.with_value(
                &self.keys,
                &self.rules,
                self.options.progress_precision,
                key,
                value.clone(),
            ) else {
                return Err(FormError::unknown_field(key));
            };
            let key = next
                .values
                .key(key)
                .cloned()
                .ok_or_else(|| FormError::unknown_field(key))?;
            *state = next;
            tracing::debug!(
                form = %self.id,
                key = %key,
                invalid_count = state.validation.invalid_count,
                "field set"
            );
            ChangeEvent { key, value }
        };
        self.notifier.emit(&event);
        Ok(())
    }

    /// Re-validates the current values and marks the form confirmed.
    pub fn confirm(&self) -> FormResult<()> {
        let mut state = borrow_state_mut(&self.state, "confirming the form")?;
        let next = state.confirmed(&self.keys, &self.rules, self.options.progress_precision);
        *state = next;
        tracing::debug!(form = %self.id, valid = state.validation.valid, "form confirmed");
        Ok(())
    }

    pub fn reset(&self) -> FormResult<()> {
        let mut state = borrow_state_mut(&self.state, "resetting the form")?;
        *state = FormState::clone(&self.initial);
        tracing::debug!(form = %self.id, "form reset");
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormState> {
        Ok(borrow_state(&self.state, "creating a snapshot")?.clone())
    }

    pub fn initial_state(&self) -> &FormState {
        &self.initial
    }

    pub fn values(&self) -> FormResult<Values> {
        Ok(borrow_state(&self.state, "reading values")?.values.clone())
    }

    pub fn value(&self, key: &str) -> FormResult<Option<FieldValue>> {
        Ok(borrow_state(&self.state, "reading a value")?
            .values
            .get(key)
            .cloned())
    }

    pub fn validation(&self) -> FormResult<ValidationResult> {
        Ok(borrow_state(&self.state, "reading validation")?
            .validation
            .clone())
    }

    pub fn meta(&self) -> FormResult<Metadata> {
        Ok(borrow_state(&self.state, "reading metadata")?.meta)
    }

    pub fn error(&self, key: &str) -> FormResult<Option<String>> {
        Ok(borrow_state(&self.state, "reading a field error")?
            .validation
            .error(key)
            .map(str::to_string))
    }

    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(borrow_state(&self.state, "reading validity")?.validation.valid)
    }

    pub fn progress(&self) -> FormResult<Decimal> {
        Ok(borrow_state(&self.state, "reading progress")?
            .validation
            .progress)
    }

    /// First field, in form order, that currently has an error.
    pub fn first_error(&self) -> FormResult<Option<FieldKey>> {
        Ok(borrow_state(&self.state, "reading first error")?
            .validation
            .first_error()
            .map(|(key, _)| key.clone()))
    }

    /// The error of `key` once the form has been touched or confirmed.
    pub fn visible_error(&self, key: &str) -> FormResult<Option<String>> {
        let state = borrow_state(&self.state, "reading display error")?;
        if !state.meta.reveals_errors() {
            return Ok(None);
        }
        Ok(state
            .validation
            .error(key)
            .filter(|error| !error.is_empty())
            .map(str::to_string))
    }

    pub fn dirty_fields(&self) -> FormResult<Vec<FieldKey>> {
        let state = borrow_state(&self.state, "reading dirty fields")?;
        Ok(self
            .keys
            .iter()
            .filter(|key| state.values.get(key.as_str()) != self.initial.values.get(key.as_str()))
            .cloned()
            .collect())
    }

    pub fn is_dirty(&self) -> FormResult<bool> {
        Ok(!self.dirty_fields()?.is_empty())
    }

    pub fn on<H>(&self, key: &str, handler: H) -> Subscription
    where
        H: Fn(&ChangeEvent) + 'static,
    {
        self.notifier.subscribe_key(key, handler)
    }

    pub fn on_where<P, H>(&self, predicate: P, handler: H) -> Subscription
    where
        P: Fn(&ChangeEvent) -> bool + 'static,
        H: Fn(&ChangeEvent) + 'static,
    {
        self.notifier.subscribe(predicate, handler)
    }

    pub fn watch(&self, key: &str) -> ChangeStream {
        let key = FieldKey::new(key);
        self.notifier.stream(move |event| event.key == key)
    }

    pub fn watch_where<P>(&self, predicate: P) -> ChangeStream
    where
        P: Fn(&ChangeEvent) -> bool + 'static,
    {
        self.notifier.stream(predicate)
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.id)
            .field("keys", &self.keys)
            .field("rules", &self.rules)
            .field("state", &self.state.try_borrow().ok())
            .field("notifier", &self.notifier)
            .finish()
    }
}

pub(super) fn borrow_state<'a>(
    state: &'a RefCell<FormState>,
    context: &'static str,
) -> FormResult<Ref<'a, FormState>> {
    state
        .try_borrow()
        .map_err(|_| FormError::StateBusy(context))
}

pub(super) fn borrow_state_mut<'a>(
    state: &'a RefCell<FormState>,
    context: &'static str,
) -> FormResult<RefMut<'a, FormState>> {
    state
        .try_borrow_mut()
        .map_err(|_| FormError::StateBusy(context))
}
