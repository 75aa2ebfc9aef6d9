mod binding;
mod controller;
mod meta;
mod model;
mod notifier;
pub mod rules;
mod validation;
mod value;


pub use binding::{NativeChange, SubmitEvent};
pub use calmform_derive::FormModel;
pub use controller::{Form, FormError, FormId, FormOptions, FormResult, FormState};
pub use meta::{Metadata, compute_metadata};
pub use model::{FieldLens, FormModel};
pub use notifier::{ChangeEvent, ChangeNotifier, ChangeStream, Subscription};
pub use validation::{
    DEFAULT_PROGRESS_PRECISION, RuleFn, Rules, ValidationResult, ValidationRule, validate,
    validate_with_precision,
};
pub use value::{FieldKey, FieldValue, ValueKind, ValueKindError, Values};
