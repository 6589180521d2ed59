//! UI effects emitted by the workflow.
//!
//! The engine never touches markup. Every visible consequence is one of these
//! values, applied in emission order by the host's view.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The host surface that renders effects (browser binding, terminal, test
/// recorder). Effects must be applied in the order received.
pub trait VerifyView: Send + Sync {
    fn apply(&self, effect: UiEffect);

    fn apply_all(&self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.apply(effect);
        }
    }
}

impl<V: VerifyView + ?Sized> VerifyView for Arc<V> {
    fn apply(&self, effect: UiEffect) {
        (**self).apply(effect);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum UiEffect {
    /// Page-level error region. `None` hides it.
    PageError { message: Option<String> },
    /// Inline message next to a field. `None` clears it.
    FieldError { field: String, message: Option<String> },
    FieldValue { field: String, value: String },
    FieldRequired { field: String, required: bool },
    FieldReadOnly { field: String },
    /// Live, silent validity of the whole form.
    FormValidity { valid: bool },
    BusinessFieldsVisible { visible: bool },
    /// Spinner shown and submit control disabled while `loading`.
    Loading { loading: bool },
    ReminderVisible { visible: bool },
    /// Scroll the verified reminder into view, focus it, flash it.
    EmphasizeReminder,
    /// Scroll to and focus a field.
    FocusField { field: String },
    Flash { target: FlashTarget },
    /// Navigate the browser away (terminal for the form).
    Navigate { url: String },
    /// Replace the address bar without reloading.
    ReplaceAddress { address: String },
    ShowProcessing { message: String },
    ShowPanel { panel: StatusPanel },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "name", rename_all = "snake_case")]
pub enum FlashTarget {
    Field(String),
    Reminder,
}

/// Terminal panels rendered by the status poller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusPanel {
    Success {
        message: String,
        continue_url: String,
    },
    Failure {
        message: String,
        action: PanelAction,
    },
    StillProcessing {
        message: String,
        action: PanelAction,
    },
}

/// The action offered by a panel's button, dispatched back as a user action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelAction {
    RetryVerification,
    CheckStatusAgain,
}

impl UiEffect {
    pub fn page_error(message: impl Into<String>) -> Self {
        Self::PageError {
            message: Some(message.into()),
        }
    }

    pub fn clear_page_error() -> Self {
        Self::PageError { message: None }
    }
}
