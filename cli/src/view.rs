//! Terminal rendering of UI effects.

use idgate_types::{StatusPanel, UiEffect, VerifyView};

/// Prints the effects a person would notice; the rest go to the debug log.
/// With `json`, every effect is printed as one JSON line instead.
pub struct TerminalView {
    json: bool,
}

impl TerminalView {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl VerifyView for TerminalView {
    fn apply(&self, effect: UiEffect) {
        if self.json {
            match serde_json::to_string(&effect) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "cannot encode effect"),
            }
            return;
        }

        match effect {
            UiEffect::PageError {
                message: Some(message),
            } => eprintln!("error: {message}"),
            UiEffect::FieldError {
                field,
                message: Some(message),
            } => eprintln!("  {field}: {message}"),
            UiEffect::EmphasizeReminder => {
                println!("You're already verified; no new verification is needed.")
            }
            UiEffect::Navigate { url } => println!("redirect: {url}"),
            UiEffect::ShowProcessing { message } => println!("{message}"),
            UiEffect::ShowPanel { panel } => match panel {
                StatusPanel::Success {
                    message,
                    continue_url,
                } => println!("{message}\ncontinue: {continue_url}"),
                StatusPanel::Failure { message, .. } => println!("{message}"),
                StatusPanel::StillProcessing { message, .. } => println!("{message}"),
            },
            other => tracing::debug!(effect = ?other, "ui effect"),
        }
    }
}
