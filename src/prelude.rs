pub use crate::form::rules;
pub use crate::form::{
    ChangeEvent, ChangeStream, FieldKey, FieldLens, FieldValue, Form, FormError, FormModel,
    FormOptions, FormResult, FormState, Metadata, NativeChange, Rules, SubmitEvent, Subscription,
    ValidationResult, ValidationRule, ValueKind, Values,
};
