//! Form mode controller.
//!
//! Keeps the form's field set consistent with the selected customer type and
//! applies known customer attributes once. Every change is reported as a list
//! of [`UiEffect`](idgate_types::UiEffect)s for the host view to apply.

pub mod mode;
pub mod prefill;

pub use mode::set_mode;
pub use prefill::apply_prefill;
