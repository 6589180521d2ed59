//! Verification session payload, built fresh from the form on every attempt.

use serde::{Deserialize, Serialize};

use crate::customer::CustomerGid;
use crate::field::names;
use crate::form::Form;
use crate::mode::CustomerType;

/// Fixed session mode marker for provider-hosted verification.
pub const SESSION_MODE_HOSTED: &str = "hosted";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub customer_reference: CustomerGid,
    pub mode: String,
    pub form: FormSnapshot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub full_name: String,
    pub dob: String,
    pub email: String,
    pub mobile: String,
    pub address: AddressSnapshot,
    pub culinary_use: String,
    pub customer_type: CustomerType,
    pub nzbn: Option<String>,
    pub trading_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub line1: String,
    pub line2: Option<String>,
    pub suburb: String,
    pub city: String,
    pub postcode: String,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl SessionPayload {
    /// Build the payload from current (trimmed) field values.
    ///
    /// Business fields are only sent when the customer type is business.
    pub fn build(customer: CustomerGid, form: &Form, customer_type: CustomerType) -> Self {
        let business = customer_type.is_business();
        let business_value = |name: &str| {
            if business {
                non_empty(form.value(name))
            } else {
                None
            }
        };

        Self {
            customer_reference: customer,
            mode: SESSION_MODE_HOSTED.to_string(),
            form: FormSnapshot {
                full_name: form.value(names::FULL_NAME).to_string(),
                dob: form.value(names::DOB).to_string(),
                email: form.value(names::EMAIL).to_string(),
                mobile: form.value(names::MOBILE).to_string(),
                address: AddressSnapshot {
                    line1: form.value(names::ADDRESS_LINE1).to_string(),
                    line2: non_empty(form.value(names::ADDRESS_LINE2)),
                    suburb: form.value(names::SUBURB).to_string(),
                    city: form.value(names::CITY).to_string(),
                    postcode: form.value(names::POSTCODE).to_string(),
                },
                culinary_use: form.value(names::CULINARY_USE).to_string(),
                customer_type,
                nzbn: business_value(names::NZBN),
                trading_name: business_value(names::TRADING_NAME),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> Form {
        let mut form = Form::standard();
        for (name, value) in [
            ("full_name", " Ana Smith "),
            ("address_line2", "   "),
            ("nzbn", "9429041234567"),
            ("trading_name", "Whip Co"),
        ] {
            form.field_mut(name).unwrap().value = value.into();
        }
        form
    }

    #[test]
    fn individual_payload_omits_business_fields() {
        let gid = CustomerGid::from_id("1").unwrap();
        let payload = SessionPayload::build(gid, &filled_form(), CustomerType::Individual);
        assert_eq!(payload.mode, "hosted");
        assert_eq!(payload.form.full_name, "Ana Smith");
        assert_eq!(payload.form.address.line2, None);
        assert_eq!(payload.form.nzbn, None);
        assert_eq!(payload.form.trading_name, None);
    }

    #[test]
    fn business_payload_carries_business_fields() {
        let gid = CustomerGid::from_id("1").unwrap();
        let payload = SessionPayload::build(gid, &filled_form(), CustomerType::Business);
        assert_eq!(payload.form.nzbn.as_deref(), Some("9429041234567"));
        assert_eq!(payload.form.trading_name.as_deref(), Some("Whip Co"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["customer_reference"], "gid://shopify/Customer/1");
        assert_eq!(json["form"]["customer_type"], "business");
        assert!(json["form"]["address"]["line2"].is_null());
    }
}
