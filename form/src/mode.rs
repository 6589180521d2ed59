//! Individual / business mode switching.

use idgate_types::{CustomerType, Form, UiEffect};

/// Apply `mode` to the form.
///
/// Business-only fields are required iff the mode is business. Leaving
/// business mode clears their values and inline errors so hidden, stale input
/// can neither fail validation nor leak into the session payload.
pub fn set_mode(form: &mut Form, mode: CustomerType) -> Vec<UiEffect> {
    let business = mode.is_business();
    let mut effects = Vec::new();

    if form.business_visible != business {
        tracing::debug!(%mode, "toggling business fields");
    }
    form.business_visible = business;
    effects.push(UiEffect::BusinessFieldsVisible { visible: business });

    for field in form.business_fields_mut() {
        field.required = business;
        effects.push(UiEffect::FieldRequired {
            field: field.name.clone(),
            required: business,
        });

        if business {
            continue;
        }
        if !field.value.is_empty() {
            field.value.clear();
            effects.push(UiEffect::FieldValue {
                field: field.name.clone(),
                value: String::new(),
            });
        }
        if field.has_error() {
            field.clear_error();
            effects.push(UiEffect::FieldError {
                field: field.name.clone(),
                message: None,
            });
        }
    }

    effects
}
