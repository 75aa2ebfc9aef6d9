use super::controller::{Form, FormError, FormResult, borrow_state};
use super::value::FieldValue;

/// A raw field change reported by an input control.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeChange {
    pub name: String,
    pub value: FieldValue,
}

impl NativeChange {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The submission event a host hands to [`Form::submit`].
pub trait SubmitEvent {
    fn prevent_default(&mut self);
}

impl<S: SubmitEvent + ?Sized> SubmitEvent for &mut S {
    fn prevent_default(&mut self) {
        (**self).prevent_default();
    }
}

impl Form {
    /// Applies an input control's change after checking it names a known field
    /// and keeps that field's value kind.
    ///
    /// Rejected changes are logged, leave the form untouched and emit nothing.
    pub fn change(&self, change: NativeChange) -> FormResult<()> {
        if let Err(error) = self.check_change(&change) {
            tracing::warn!(form = %self.id, name = %change.name, %error, "field change rejected");
            return Err(error);
        }
        self.set(&change.name, change.value)
    }

    fn check_change(&self, change: &NativeChange) -> FormResult<()> {
        if change.name.is_empty() {
            return Err(FormError::MissingFieldName);
        }
        let state = borrow_state(&self.state, "checking a field change")?;
        let Some((key, current)) = state
            .values
            .key(&change.name)
            .zip(state.values.get(&change.name))
        else {
            return Err(FormError::unknown_field(change.name.as_str()));
        };
        if current.kind() != change.value.kind() {
            return Err(FormError::ValueKindMismatch {
                key: key.clone(),
                expected: current.kind(),
                found: change.value.kind(),
            });
        }
        Ok(())
    }

    /// Stops the host's default submission, then confirms the form.
    pub fn submit<E>(&self, mut event: E) -> FormResult<()>
    where
        E: SubmitEvent,
    {
        event.prevent_default();
        tracing::debug!(form = %self.id, "form submitted");
        self.confirm()
    }
}
