//! Field validation engine for the verification form.
//!
//! Validation is pure and stateless apart from the inline messages it records
//! on fields in non-silent mode:
//! 1. **Skip**: disabled, hidden, and optional fields always pass.
//! 2. **Presence**: required fields need a trimmed value, declaration
//!    checkboxes need to be ticked.
//! 3. **Type rules**: per-field checks (age, PO Box, mobile, letters,
//!    postcode), only after presence passes.
//!
//! Sanitisers normalise raw input before it is validated.

pub mod engine;
pub mod rules;
pub mod sanitize;

pub use engine::{find_first_invalid, Validator};
pub use sanitize::{sanitize_form, sanitize_value};
