//! Reactive form state.
//!
//! A [`Form`](form::Form) owns a set of named field values and the rules that
//! check them. Every mutation re-validates the whole form, updates the
//! touch/confirmation flags and then broadcasts a change event to the
//! subscribers interested in that field.

pub mod form;
pub mod prelude;
