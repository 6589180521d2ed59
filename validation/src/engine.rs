//! Per-field and whole-form validation.

use chrono::NaiveDate;

use idgate_types::{Clock, Field, FieldKind, Form};

use crate::rules::{self, MSG_DECLARATION, MSG_REQUIRED};

/// Evaluates field rules against a fixed "today".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validator {
    today: NaiveDate,
}

impl Validator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Validate one field.
    ///
    /// In non-silent mode the presence check records its message (or clears a
    /// stale one when it passes) and a failing type rule records its own.
    /// Silent mode never touches `field.error`.
    pub fn validate(&self, field: &mut Field, silent: bool) -> bool {
        if field.disabled || field.kind == FieldKind::Hidden || field.is_optional() {
            return true;
        }

        let declaration = field.is_declaration();
        if !field.required && !declaration {
            return true;
        }

        let present = if declaration {
            field.checked
        } else {
            !field.trimmed().is_empty()
        };

        if !silent {
            let message = match (present, declaration) {
                (true, _) => "",
                (false, true) => MSG_DECLARATION,
                (false, false) => MSG_REQUIRED,
            };
            field.set_error(message);
        }
        if !present {
            return false;
        }

        match rules::check(&field.name, field.trimmed(), self.today) {
            Ok(()) => true,
            Err(message) => {
                if !silent {
                    field.set_error(message);
                }
                false
            }
        }
    }

    /// Validate every field in the form.
    ///
    /// All fields are evaluated (no early exit) so that, in non-silent mode,
    /// every failing field carries its message.
    pub fn is_form_valid(&self, form: &mut Form, silent: bool) -> bool {
        form.fields
            .iter_mut()
            .fold(true, |valid, field| self.validate(field, silent) && valid)
    }
}

/// The field to scroll to after a failed submit: the first field flagged
/// invalid, else the first unticked declaration.
pub fn find_first_invalid(form: &Form) -> Option<&Field> {
    form.fields
        .iter()
        .find(|f| f.has_error())
        .or_else(|| form.fields.iter().find(|f| f.is_declaration() && !f.checked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_types::field::names;

    fn validator() -> Validator {
        Validator::new(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap())
    }

    fn complete_form() -> Form {
        let mut form = Form::standard();
        for (name, value) in [
            (names::FULL_NAME, "Ana Smith"),
            (names::DOB, "1990-04-02"),
            (names::EMAIL, "ana@example.com"),
            (names::MOBILE, "0211234567"),
            (names::ADDRESS_LINE1, "12 Queen Street"),
            (names::SUBURB, "Grey Lynn"),
            (names::CITY, "Auckland"),
            (names::POSTCODE, "1021"),
            (names::CULINARY_USE, "baking"),
        ] {
            form.field_mut(name).unwrap().value = value.into();
        }
        for decl in ["decl_age", "decl_use"] {
            form.field_mut(decl).unwrap().checked = true;
        }
        form
    }

    #[test]
    fn complete_form_is_valid() {
        let mut form = complete_form();
        assert!(validator().is_form_valid(&mut form, false));
        assert!(find_first_invalid(&form).is_none());
    }

    #[test]
    fn disabled_hidden_and_optional_always_pass() {
        let v = validator();
        let mut disabled = Field::text(names::MOBILE).required();
        disabled.disabled = true;
        assert!(v.validate(&mut disabled, false));

        let mut hidden = Field::new(names::POSTCODE, FieldKind::Hidden).required().with_value("x");
        assert!(v.validate(&mut hidden, false));

        let mut optional = Field::text(names::ADDRESS_LINE2).required();
        assert!(v.validate(&mut optional, false));
        assert!(!optional.has_error());
    }

    #[test]
    fn not_required_fields_pass_without_rules() {
        let mut field = Field::text(names::POSTCODE).with_value("abc");
        assert!(validator().validate(&mut field, false));
    }

    #[test]
    fn missing_required_value_records_message() {
        let mut field = Field::text(names::FULL_NAME).required().with_value("   ");
        assert!(!validator().validate(&mut field, false));
        assert_eq!(field.error.as_deref(), Some(MSG_REQUIRED));
    }

    #[test]
    fn unticked_declaration_records_message() {
        let mut field = Field::new("decl_age", FieldKind::Checkbox);
        assert!(!validator().validate(&mut field, false));
        assert_eq!(field.error.as_deref(), Some(MSG_DECLARATION));
    }

    #[test]
    fn silent_mode_leaves_errors_untouched() {
        let mut field = Field::text(names::MOBILE).required().with_value("12");
        assert!(!validator().validate(&mut field, true));
        assert!(field.error.is_none());

        field.error = Some("stale".into());
        field.value = "0211234567".into();
        assert!(validator().validate(&mut field, true));
        assert_eq!(field.error.as_deref(), Some("stale"));
    }

    #[test]
    fn passing_presence_clears_previous_message() {
        let mut field = Field::text(names::FULL_NAME).required();
        assert!(!validator().validate(&mut field, false));
        field.value = "Ana".into();
        assert!(validator().validate(&mut field, false));
        assert!(field.error.is_none());
    }

    #[test]
    fn type_rule_message_replaces_presence_message() {
        let mut field = Field::text(names::ADDRESS_LINE1).required().with_value("PO Box 12");
        assert!(!validator().validate(&mut field, false));
        assert_eq!(field.error.as_deref(), Some(rules::MSG_PO_BOX));
    }

    #[test]
    fn underage_dob_fails_and_exact_eighteenth_birthday_passes() {
        let v = validator();
        let mut young = Field::new(names::DOB, FieldKind::Date).required().with_value("2008-06-16");
        assert!(!v.validate(&mut young, false));
        assert_eq!(young.error.as_deref(), Some(rules::MSG_UNDERAGE));

        let mut exact = Field::new(names::DOB, FieldKind::Date).required().with_value("2008-06-15");
        assert!(v.validate(&mut exact, false));
    }

    #[test]
    fn every_failing_field_gets_a_message() {
        let mut form = complete_form();
        form.field_mut(names::MOBILE).unwrap().value = "12".into();
        form.field_mut(names::POSTCODE).unwrap().value = "12345".into();
        assert!(!validator().is_form_valid(&mut form, false));
        assert!(form.field(names::MOBILE).unwrap().has_error());
        assert!(form.field(names::POSTCODE).unwrap().has_error());
        assert_eq!(find_first_invalid(&form).unwrap().name, names::MOBILE);
    }

    #[test]
    fn first_invalid_falls_back_to_unticked_declaration() {
        let mut form = complete_form();
        form.field_mut("decl_use").unwrap().checked = false;
        assert!(!validator().is_form_valid(&mut form, true));
        assert_eq!(find_first_invalid(&form).unwrap().name, "decl_use");
    }
}
