//! Nullable view: records effects instead of rendering them.

use std::sync::Mutex;

use idgate_types::{StatusPanel, UiEffect, VerifyView};

/// A view that records every applied effect, in order.
#[derive(Default)]
pub struct RecordingView {
    effects: Mutex<Vec<UiEffect>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// All effects applied so far.
    pub fn effects(&self) -> Vec<UiEffect> {
        self.effects.lock().unwrap().clone()
    }

    /// Drain the recorded effects.
    pub fn take(&self) -> Vec<UiEffect> {
        std::mem::take(&mut *self.effects.lock().unwrap())
    }

    pub fn contains(&self, effect: &UiEffect) -> bool {
        self.effects.lock().unwrap().contains(effect)
    }

    pub fn count(&self, predicate: impl Fn(&UiEffect) -> bool) -> usize {
        self.effects.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    /// Index of the first effect matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&UiEffect) -> bool) -> Option<usize> {
        self.effects.lock().unwrap().iter().position(predicate)
    }

    /// Status panels rendered so far.
    pub fn panels(&self) -> Vec<StatusPanel> {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                UiEffect::ShowPanel { panel } => Some(panel.clone()),
                _ => None,
            })
            .collect()
    }

    /// The last page-level error message shown, if the region is visible.
    pub fn page_error(&self) -> Option<String> {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|e| match e {
                UiEffect::PageError { message } => Some(message.clone()),
                _ => None,
            })
            .flatten()
    }

    /// Whether the last loading effect left the form loading.
    pub fn is_loading(&self) -> bool {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|e| match e {
                UiEffect::Loading { loading } => Some(*loading),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl VerifyView for RecordingView {
    fn apply(&self, effect: UiEffect) {
        self.effects.lock().unwrap().push(effect);
    }
}
