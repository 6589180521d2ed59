//! Input normalisation applied as the customer types.

use idgate_types::field::names;
use idgate_types::{FieldKind, Form};

/// Normalise a raw value for the named field.
///
/// - `mobile`: digits only.
/// - `postcode`: digits only, at most 4.
/// - `suburb`, `city`: ASCII letters and spaces only.
///
/// Other fields are returned unchanged.
pub fn sanitize_value(name: &str, value: &str) -> String {
    match name {
        names::MOBILE => value.chars().filter(char::is_ascii_digit).collect(),
        names::POSTCODE => value.chars().filter(char::is_ascii_digit).take(4).collect(),
        names::SUBURB | names::CITY => value
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
            .collect(),
        _ => value.to_string(),
    }
}

/// Sanitise every free-text input in the form, returning the names of fields
/// whose value changed.
pub fn sanitize_form(form: &mut Form) -> Vec<String> {
    let mut changed = Vec::new();
    for field in form.fields.iter_mut() {
        if matches!(field.kind, FieldKind::Select | FieldKind::TextArea | FieldKind::Checkbox) {
            continue;
        }
        let clean = sanitize_value(&field.name, &field.value);
        if clean != field.value {
            field.value = clean;
            changed.push(field.name.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_keeps_digits() {
        assert_eq!(sanitize_value("mobile", "+64 21-123 4567"), "64211234567");
    }

    #[test]
    fn postcode_truncates_to_four_digits() {
        assert_eq!(sanitize_value("postcode", "10 21 9"), "1021");
    }

    #[test]
    fn place_names_keep_letters_and_spaces() {
        assert_eq!(sanitize_value("city", "Auckland 1010!"), "Auckland ");
        assert_eq!(sanitize_value("suburb", "Mt. Eden"), "Mt Eden");
    }

    #[test]
    fn other_fields_untouched() {
        assert_eq!(sanitize_value("full_name", "O'Brien-Smith 3rd"), "O'Brien-Smith 3rd");
    }

    #[test]
    fn sanitize_form_reports_changed_fields() {
        let mut form = Form::standard();
        form.field_mut("mobile").unwrap().value = "021 123 4567".into();
        form.field_mut("city").unwrap().value = "Auckland".into();
        assert_eq!(sanitize_form(&mut form), vec!["mobile".to_string()]);
        assert_eq!(form.value("mobile"), "0211234567");
    }
}
