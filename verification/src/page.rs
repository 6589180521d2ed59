//! One verification page view.
//!
//! Owns the services, the status poller and the registry of wired forms, and
//! routes user gestures to them.

use std::sync::{Arc, Mutex};

use idgate_types::field::names;
use idgate_types::{CustomerType, UiEffect};

use crate::poll::StatusPoller;
use crate::services::PageServices;
use crate::start::{start_verification, StartOutcome, StartParams};
use crate::submit::{FormContext, FormController, ShortCircuitSource, SubmitOutcome};
use crate::{lock, messages};

/// A user gesture on the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Submit {
        root_id: String,
    },
    ModeChanged {
        root_id: String,
        mode: CustomerType,
    },
    FieldInput {
        root_id: String,
        field: String,
        value: String,
    },
    FieldChecked {
        root_id: String,
        field: String,
        checked: bool,
    },
    /// A stand-alone start control. With a `root_id`, unset parameters are
    /// read from that form.
    QuickStart {
        root_id: Option<String>,
        params: StartParams,
    },
    /// The failure panel's retry button: submits the primary form.
    RetryVerification,
    /// The still-processing panel's button: restarts polling.
    CheckStatusAgain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Submitted(SubmitOutcome),
    Started(StartOutcome),
    /// A field or mode change was applied.
    Updated,
    /// Whether a new polling loop was started.
    Polling(bool),
    UnknownRoot(String),
    /// Retry requested but no form is wired.
    NoForm,
}

pub struct PageSession {
    services: Arc<PageServices>,
    poller: StatusPoller,
    forms: Mutex<Vec<Arc<FormController>>>,
}

impl PageSession {
    pub fn new(services: PageServices) -> Self {
        let customer = services
            .customer
            .resolve_reference(services.prefill.as_ref())
            .ok();
        let poller = StatusPoller::new(
            Arc::clone(&services.gateway),
            Arc::clone(&services.view),
            customer,
            services.location.clone(),
            services.config.restricted_collection_path.clone(),
            services.config.polling,
        );
        Self {
            services: Arc::new(services),
            poller,
            forms: Mutex::new(Vec::new()),
        }
    }

    pub fn services(&self) -> &PageServices {
        &self.services
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    /// The controller wired for `root_id`.
    pub fn form(&self, root_id: &str) -> Option<Arc<FormController>> {
        lock(&self.forms)
            .iter()
            .find(|c| c.root_id() == root_id)
            .cloned()
    }

    /// Root ids of every wired form, in wiring order.
    pub fn root_ids(&self) -> Vec<String> {
        lock(&self.forms)
            .iter()
            .map(|c| c.root_id().to_string())
            .collect()
    }

    /// Page ready: enter polling when redirected back from the hosted flow,
    /// wire every form root and reconcile reminders with fetched state.
    ///
    /// Returns the root ids wired by this call.
    pub async fn on_ready(&self, roots: Vec<FormContext>) -> Vec<String> {
        if self.services.location.is_processing() {
            self.services.view.apply(UiEffect::ShowProcessing {
                message: messages::PROCESSING.to_string(),
            });
            self.poller.start();
        }
        self.wire_and_reconcile(roots).await
    }

    /// Markup was replaced. Already wired roots are skipped.
    pub async fn on_section_load(&self, roots: Vec<FormContext>) -> Vec<String> {
        self.wire_and_reconcile(roots).await
    }

    async fn wire_and_reconcile(&self, roots: Vec<FormContext>) -> Vec<String> {
        let wired = self.wire(roots);
        for controller in &wired {
            controller.reconcile_reminder().await;
        }
        wired.iter().map(|c| c.root_id().to_string()).collect()
    }

    fn wire(&self, roots: Vec<FormContext>) -> Vec<Arc<FormController>> {
        let mut wired = Vec::new();
        for context in roots {
            let controller = {
                let mut forms = lock(&self.forms);
                if forms.iter().any(|c| c.root_id() == context.root_id) {
                    tracing::debug!(root = %context.root_id, "form already wired");
                    continue;
                }
                let controller = Arc::new(FormController::new(context, Arc::clone(&self.services)));
                forms.push(Arc::clone(&controller));
                controller
            };
            controller.wire();
            wired.push(controller);
        }
        wired
    }

    /// Route one user gesture.
    pub async fn dispatch(&self, action: UserAction) -> ActionOutcome {
        match action {
            UserAction::Submit { root_id } => match self.form(&root_id) {
                Some(controller) => self.submit(controller).await,
                None => ActionOutcome::UnknownRoot(root_id),
            },
            UserAction::ModeChanged { root_id, mode } => match self.form(&root_id) {
                Some(controller) => {
                    controller.change_mode(mode);
                    ActionOutcome::Updated
                }
                None => ActionOutcome::UnknownRoot(root_id),
            },
            UserAction::FieldInput {
                root_id,
                field,
                value,
            } => match self.form(&root_id) {
                Some(controller) => {
                    controller.input(&field, &value);
                    ActionOutcome::Updated
                }
                None => ActionOutcome::UnknownRoot(root_id),
            },
            UserAction::FieldChecked {
                root_id,
                field,
                checked,
            } => match self.form(&root_id) {
                Some(controller) => {
                    controller.set_checked(&field, checked);
                    ActionOutcome::Updated
                }
                None => ActionOutcome::UnknownRoot(root_id),
            },
            UserAction::QuickStart { root_id, params } => self.quick_start(root_id, params).await,
            UserAction::RetryVerification => {
                let primary = lock(&self.forms).first().cloned();
                match primary {
                    Some(controller) => self.submit(controller).await,
                    None => {
                        tracing::warn!("retry requested with no wired form");
                        ActionOutcome::NoForm
                    }
                }
            }
            UserAction::CheckStatusAgain => ActionOutcome::Polling(self.poller.start()),
        }
    }

    /// Run one attempt. When the server reported an existing verification,
    /// the reminder is reconciled in the background so loading is already
    /// reset when this returns.
    async fn submit(&self, controller: Arc<FormController>) -> ActionOutcome {
        let outcome = controller.submit().await;
        if outcome
            == (SubmitOutcome::ShortCircuited {
                source: ShortCircuitSource::ServerResponse,
            })
        {
            tokio::spawn(async move { controller.refresh_reminder().await });
        }
        ActionOutcome::Submitted(outcome)
    }

    async fn quick_start(&self, root_id: Option<String>, mut params: StartParams) -> ActionOutcome {
        let mut fallback_return = self.services.default_return_target();
        if let Some(root_id) = root_id {
            let Some(controller) = self.form(&root_id) else {
                return ActionOutcome::UnknownRoot(root_id);
            };
            let form = controller.form();
            params
                .mode
                .get_or_insert_with(|| controller.mode().as_str().to_string());
            if params.nzbn.is_none() {
                params.nzbn = Some(form.value(names::NZBN).to_string());
            }
            if params.business_name.is_none() {
                params.business_name = Some(form.value(names::TRADING_NAME).to_string());
            }
            fallback_return = controller.return_to().to_string();
        }

        let services = &self.services;
        let outcome = start_verification(
            services.gateway.as_ref(),
            services.view.as_ref(),
            &services.customer,
            params,
            &fallback_return,
        )
        .await;
        ActionOutcome::Started(outcome)
    }
}
