use calmform::form::{Form, FormModel, Rules, rules};

#[derive(Clone, Debug, PartialEq, calmform::form::FormModel)]
struct SignupForm {
    email: String,
    age: u32,
    accept_terms: bool,
}

fn main() {
    let fields = SignupForm::fields();
    let form = Form::from_model(
        &SignupForm {
            email: String::new(),
            age: 0,
            accept_terms: false,
        },
        Rules::new()
            .rule("email", rules::email("invalid email"))
            .rule("email", rules::required("email is required"))
            .rule("age", rules::min(18, "too young"))
            .rule("accept_terms", rules::checked("accept the terms")),
    );
    assert_eq!(form.validation().expect("validation").invalid_count, 3);

    form.set_field(fields.email(), "a@calm.form".to_string())
        .expect("set email");
    form.set_field(fields.age(), 21).expect("set age");
    form.set_field(fields.accept_terms(), true)
        .expect("set terms");

    assert!(form.is_valid().expect("valid"));
    assert_eq!(
        form.model::<SignupForm>().expect("model"),
        Some(SignupForm {
            email: "a@calm.form".to_string(),
            age: 21,
            accept_terms: true,
        })
    );
}
