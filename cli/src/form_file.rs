//! TOML description of a filled-in verification form.
//!
//! ```toml
//! mode = "individual"
//! return_to = "https://shop.example/cart"
//!
//! [values]
//! full_name = "Kim Tan"
//! dob = "1990-04-01"
//!
//! [declarations]
//! decl_age = true
//!
//! [customer]
//! id = "42"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use idgate_types::{CustomerContext, CustomerType, Form, Prefill};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FormFile {
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub declarations: BTreeMap<String, bool>,
    #[serde(default)]
    pub customer: Option<CustomerContext>,
    #[serde(default)]
    pub prefill: Option<Prefill>,
}

impl FormFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading form file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing form file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn root_id(&self) -> &str {
        self.root_id.as_deref().unwrap_or("main")
    }

    pub fn mode(&self) -> CustomerType {
        CustomerType::from_selection(self.mode.as_deref())
    }

    /// The standard form with this file's values and declarations applied.
    /// Names the form does not know are skipped with a warning.
    pub fn to_form(&self) -> Form {
        let mut form = Form::standard();
        for (name, value) in &self.values {
            match form.field_mut(name) {
                Some(field) => field.value = value.clone(),
                None => tracing::warn!(field = %name, "unknown form field in file"),
            }
        }
        for (name, checked) in &self.declarations {
            match form.field_mut(name) {
                Some(field) => field.checked = *checked,
                None => tracing::warn!(field = %name, "unknown declaration in file"),
            }
        }
        form
    }
}
