//! The verification form: an ordered set of fields plus group state.

use serde::{Deserialize, Serialize};

use crate::field::Field;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Whether the business-fields group is currently shown.
    #[serde(default)]
    pub business_visible: bool,
    /// Set once prefill has been applied; later prefill calls are no-ops.
    #[serde(default, skip_serializing)]
    pub prefill_applied: bool,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Trimmed value of the named field, or `""` when absent.
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(Field::trimmed).unwrap_or("")
    }

    pub fn business_fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut().filter(|f| f.business_only)
    }

    /// The standard verification form layout.
    pub fn standard() -> Self {
        use crate::field::{names, FieldKind};

        Self::new(vec![
            Field::text(names::FULL_NAME).required(),
            Field::new(names::DOB, FieldKind::Date).required(),
            Field::new(names::EMAIL, FieldKind::Email).required(),
            Field::new(names::MOBILE, FieldKind::Tel).required(),
            Field::text(names::ADDRESS_LINE1).required(),
            Field::text(names::ADDRESS_LINE2),
            Field::text(names::SUBURB).required(),
            Field::text(names::CITY).required(),
            Field::text(names::POSTCODE).required(),
            Field::new(names::CULINARY_USE, FieldKind::Select).required(),
            Field::text(names::NZBN).business_only(),
            Field::text(names::TRADING_NAME).business_only(),
            Field::new("decl_age", FieldKind::Checkbox),
            Field::new("decl_use", FieldKind::Checkbox),
        ])
    }
}
