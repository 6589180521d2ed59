//! Fundamental types for the idgate verification workflow.
//!
//! This crate defines the data model shared across every other crate in the
//! workspace: customer context, verification state, the form/field model,
//! session payloads, poll status, page location, the clock abstraction, and
//! the UI effects the engine emits.

pub mod customer;
pub mod effect;
pub mod error;
pub mod field;
pub mod form;
pub mod location;
pub mod mode;
pub mod payload;
pub mod state;
pub mod status;
pub mod time;

pub use customer::{CustomerContext, CustomerGid, Prefill, PrefillAddress};
pub use effect::{FlashTarget, PanelAction, StatusPanel, UiEffect, VerifyView};
pub use error::TypesError;
pub use field::{Field, FieldKind};
pub use form::Form;
pub use location::PageLocation;
pub use mode::CustomerType;
pub use payload::{AddressSnapshot, FormSnapshot, SessionPayload, SESSION_MODE_HOSTED};
pub use state::VerificationState;
pub use status::PollStatus;
pub use time::{Clock, SystemClock};
