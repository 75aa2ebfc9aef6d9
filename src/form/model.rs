use super::controller::{Form, FormOptions, FormResult};
use super::notifier::{ChangeEvent, Subscription};
use super::validation::Rules;
use super::value::{FieldKey, FieldValue, Values};

pub trait FieldLens<T>: Copy + 'static {
    type Value: Clone + PartialEq + Into<FieldValue> + TryFrom<FieldValue>;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

/// A struct whose fields seed a [`Form`]. Usually derived.
pub trait FormModel: Clone + Sized + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// The model's fields in declaration order.
    fn to_values(&self) -> Values;

    /// Rebuilds the model; `None` if a field is missing or of the wrong kind.
    fn from_values(values: &Values) -> Option<Self>;
}

impl Form {
    pub fn from_model<T: FormModel>(model: &T, rules: Rules) -> Self {
        Self::new(model.to_values(), rules)
    }

    pub fn from_model_with_options<T: FormModel>(
        model: &T,
        rules: Rules,
        options: FormOptions,
    ) -> Self {
        Self::with_options(model.to_values(), rules, options)
    }

    pub fn set_field<T, L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        self.set(lens.key().as_str(), value)
    }

    pub fn field<T, L>(&self, lens: L) -> FormResult<Option<L::Value>>
    where
        L: FieldLens<T>,
    {
        Ok(self
            .value(lens.key().as_str())?
            .and_then(|value| <L::Value as TryFrom<FieldValue>>::try_from(value).ok()))
    }

    pub fn model<T: FormModel>(&self) -> FormResult<Option<T>> {
        Ok(T::from_values(&self.values()?))
    }

    pub fn on_field<T, L, H>(&self, lens: L, handler: H) -> Subscription
    where
        L: FieldLens<T>,
        H: Fn(&ChangeEvent) + 'static,
    {
        self.notifier.subscribe_key(lens.key(), handler)
    }
}
