use calmform::form::{FieldLens, FormModel};

#[derive(Clone, calmform::form::FormModel)]
struct DemoForm {
    email: String,
}

fn main() {
    let fields = DemoForm::fields();
    let lens = fields.email();
    let mut model = DemoForm {
        email: "a@calm.form".to_string(),
    };
    lens.set(&mut model, "b@calm.form".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "b@calm.form");

    let restored = DemoForm::from_values(&model.to_values()).expect("values convert back");
    assert_eq!(restored.email, "b@calm.form");
}
