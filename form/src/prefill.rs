//! One-time prefill of known customer attributes.

use idgate_types::field::names;
use idgate_types::{Form, Prefill, UiEffect};
use idgate_validation::sanitize_value;

/// Fill empty fields from `prefill`, once per form.
///
/// Values the customer already entered are never overwritten. A prefilled
/// email also locks the email field. Filled values go through the same
/// sanitisers as typed input. A second call is a no-op.
pub fn apply_prefill(form: &mut Form, prefill: &Prefill) -> Vec<UiEffect> {
    if form.prefill_applied {
        return Vec::new();
    }

    let address = &prefill.address;
    let assignments = [
        (names::FULL_NAME, prefill.full_name.as_deref()),
        (names::EMAIL, prefill.email.as_deref()),
        (names::ADDRESS_LINE1, address.line1.as_deref()),
        (names::ADDRESS_LINE2, address.line2.as_deref()),
        (names::SUBURB, address.suburb.as_deref()),
        (names::CITY, address.city.as_deref()),
        (names::POSTCODE, address.postcode.as_deref()),
    ];

    let mut effects = Vec::new();
    for (name, value) in assignments {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        let Some(field) = form.field_mut(name) else {
            continue;
        };
        if !field.value.is_empty() {
            continue;
        }
        field.value = sanitize_value(name, value);
        effects.push(UiEffect::FieldValue {
            field: name.to_string(),
            value: field.value.clone(),
        });
    }

    if prefill.email.as_deref().is_some_and(|e| !e.is_empty()) {
        if let Some(email) = form.field_mut(names::EMAIL) {
            email.read_only = true;
            effects.push(UiEffect::FieldReadOnly {
                field: names::EMAIL.to_string(),
            });
        }
    }

    form.prefill_applied = true;
    tracing::debug!(filled = effects.len(), "applied prefill");
    effects
}
