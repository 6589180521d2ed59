//! Form field model.

use serde::{Deserialize, Serialize};

/// Well-known field names used by the verification form.
pub mod names {
    pub const FULL_NAME: &str = "full_name";
    pub const DOB: &str = "dob";
    pub const EMAIL: &str = "email";
    pub const MOBILE: &str = "mobile";
    pub const ADDRESS_LINE1: &str = "address_line1";
    pub const ADDRESS_LINE2: &str = "address_line2";
    pub const SUBURB: &str = "suburb";
    pub const CITY: &str = "city";
    pub const POSTCODE: &str = "postcode";
    pub const CULINARY_USE: &str = "culinary_use";
    pub const NZBN: &str = "nzbn";
    pub const TRADING_NAME: &str = "trading_name";

    /// Prefix of declaration checkboxes (`decl_age`, `decl_terms`, ...).
    pub const DECLARATION_PREFIX: &str = "decl_";

    /// Fields that never block submission.
    pub const OPTIONAL: &[&str] = &[ADDRESS_LINE2];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Date,
    Select,
    TextArea,
    Checkbox,
    Hidden,
}

/// A single form control and its current state.
///
/// Validity is never stored; it is recomputed on demand by the validation
/// engine. `error` holds the inline message currently shown next to the field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Belongs to the business-only group; required only in business mode.
    #[serde(default)]
    pub business_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn business_only(mut self) -> Self {
        self.business_only = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// A declaration checkbox (`decl_*`) that must be ticked.
    pub fn is_declaration(&self) -> bool {
        self.kind == FieldKind::Checkbox && self.name.starts_with(names::DECLARATION_PREFIX)
    }

    pub fn is_optional(&self) -> bool {
        names::OPTIONAL.contains(&self.name.as_str())
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Record (or, with an empty message, clear) the inline error.
    pub fn set_error(&mut self, message: &str) {
        self.error = if message.is_empty() {
            None
        } else {
            Some(message.to_string())
        };
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
