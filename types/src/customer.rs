//! Customer context and prefill data supplied once by the host page.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// Prefix of a global customer reference.
pub const CUSTOMER_GID_PREFIX: &str = "gid://shopify/Customer/";

/// An opaque global customer reference (e.g. `gid://shopify/Customer/42`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerGid(String);

impl CustomerGid {
    /// Wrap an existing reference. Blank references are rejected.
    pub fn new(gid: impl Into<String>) -> Result<Self, TypesError> {
        let gid = gid.into();
        if gid.trim().is_empty() {
            return Err(TypesError::InvalidCustomerGid(gid));
        }
        Ok(Self(gid))
    }

    /// Derive the global reference from a bare customer identifier.
    pub fn from_id(id: &str) -> Result<Self, TypesError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(TypesError::InvalidCustomerGid(id.to_string()));
        }
        Ok(Self(format!("{CUSTOMER_GID_PREFIX}{id}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in customer, as exposed by the host page.
///
/// Immutable for the lifetime of a page session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContext {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub gid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CustomerContext {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The global reference, derived from `id` when `gid` is absent.
    pub fn global_ref(&self) -> Option<CustomerGid> {
        if let Some(gid) = self.gid.as_deref().filter(|g| !g.trim().is_empty()) {
            return CustomerGid::new(gid).ok();
        }
        self.id.as_deref().and_then(|id| CustomerGid::from_id(id).ok())
    }

    /// Resolve the reference used for session creation and status polling.
    ///
    /// A customer gid carried by the prefill wins over the context.
    pub fn resolve_reference(&self, prefill: Option<&Prefill>) -> Result<CustomerGid, TypesError> {
        if let Some(gid) = prefill
            .and_then(|p| p.customer_gid.as_deref())
            .filter(|g| !g.trim().is_empty())
        {
            return CustomerGid::new(gid);
        }
        self.global_ref().ok_or(TypesError::MissingCustomer)
    }
}

/// Known customer attributes used to prefill the verification form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: PrefillAddress,
    #[serde(default, alias = "shopify_customer_gid")]
    pub customer_gid: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefillAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}
