//! Submission orchestrator for one verification form.
//!
//! `Idle -> Validating -> (Invalid | CheckingShortCircuit)
//!       -> (ShortCircuited | Submitting) -> (Redirecting | SubmitFailed)`
//!
//! Side effects are strictly ordered: validation messages, loading on, the
//! session request, the terminal UI update, loading off. Loading is reset by
//! a guard, so it also happens when the submit future is dropped mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use idgate_client::ClientError;
use idgate_form::{apply_prefill, set_mode};
use idgate_types::{
    CustomerType, FlashTarget, Form, SessionPayload, UiEffect, VerificationState, VerifyView,
};
use idgate_validation::{find_first_invalid, sanitize_form, sanitize_value, Validator};

use crate::error::VerifyError;
use crate::services::PageServices;
use crate::{lock, messages};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Invalid,
    CheckingShortCircuit,
    ShortCircuited,
    Submitting,
    Redirecting,
    SubmitFailed,
}

/// What decided that the customer is already verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortCircuitSource {
    CachedState,
    ServerResponse,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; `focus` is the field scrolled to.
    Invalid { focus: Option<String> },
    ShortCircuited { source: ShortCircuitSource },
    Redirecting { url: String },
    Failed { message: String },
    /// Another attempt is still in flight.
    Busy,
}

/// Everything that belongs to one form root: its fields, selected mode, the
/// return target of its start control, and its own view handle (error region,
/// spinner, reminder, mode controls).
pub struct FormContext {
    pub root_id: String,
    pub form: Form,
    pub mode: CustomerType,
    pub return_to: Option<String>,
    pub view: Arc<dyn VerifyView>,
}

impl FormContext {
    pub fn new(root_id: impl Into<String>, form: Form, view: Arc<dyn VerifyView>) -> Self {
        Self {
            root_id: root_id.into(),
            form,
            mode: CustomerType::default(),
            return_to: None,
            view,
        }
    }

    pub fn with_mode(mut self, mode: CustomerType) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_return_to(mut self, return_to: impl Into<String>) -> Self {
        self.return_to = Some(return_to.into());
        self
    }
}

struct FormState {
    form: Form,
    mode: CustomerType,
    phase: SubmitPhase,
}

/// Drives one wired form.
pub struct FormController {
    root_id: String,
    return_to: String,
    view: Arc<dyn VerifyView>,
    services: Arc<PageServices>,
    state: Mutex<FormState>,
    in_flight: AtomicBool,
}

impl FormController {
    pub fn new(context: FormContext, services: Arc<PageServices>) -> Self {
        let return_to = context
            .return_to
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| services.default_return_target());
        Self {
            root_id: context.root_id,
            return_to,
            view: context.view,
            services,
            state: Mutex::new(FormState {
                form: context.form,
                mode: context.mode,
                phase: SubmitPhase::Idle,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The resolved return target of this form's start control.
    pub fn return_to(&self) -> &str {
        &self.return_to
    }

    pub fn phase(&self) -> SubmitPhase {
        lock(&self.state).phase
    }

    pub fn mode(&self) -> CustomerType {
        lock(&self.state).mode
    }

    /// A copy of the current form.
    pub fn form(&self) -> Form {
        lock(&self.state).form.clone()
    }

    /// Initial wiring: prefill, sanitise, apply the selected mode, show the
    /// reminder from the cached state and publish live validity.
    pub fn wire(&self) {
        let mut effects = Vec::new();
        {
            let mut state = lock(&self.state);
            let FormState { form, mode, .. } = &mut *state;
            if let Some(prefill) = &self.services.prefill {
                effects.extend(apply_prefill(form, prefill));
            }
            for name in sanitize_form(form) {
                let value = form.value(&name).to_string();
                effects.push(UiEffect::FieldValue { field: name, value });
            }
            effects.extend(set_mode(form, *mode));
        }
        self.view.apply_all(effects);
        self.update_reminder(self.services.cache.get_cached_state());
        self.recompute();
        tracing::debug!(root = %self.root_id, "form wired");
    }

    /// Reconcile the reminder with the (possibly freshly fetched) state.
    pub async fn reconcile_reminder(&self) {
        let state = self.services.cache.get_state().await;
        self.update_reminder(state);
    }

    /// A text input event.
    pub fn input(&self, field: &str, value: &str) {
        let effects = {
            let mut state = lock(&self.state);
            let Some(target) = state.form.field_mut(field) else {
                tracing::debug!(root = %self.root_id, field, "input for unknown field");
                return;
            };
            let sanitized = sanitize_value(field, value);
            let mut effects = Vec::new();
            if sanitized != value {
                effects.push(UiEffect::FieldValue {
                    field: field.to_string(),
                    value: sanitized.clone(),
                });
            }
            target.value = sanitized;
            target.clear_error();
            effects
        };
        self.after_edit(field, effects);
    }

    /// A checkbox change event.
    pub fn set_checked(&self, field: &str, checked: bool) {
        {
            let mut state = lock(&self.state);
            let Some(target) = state.form.field_mut(field) else {
                tracing::debug!(root = %self.root_id, field, "change for unknown field");
                return;
            };
            target.checked = checked;
            target.clear_error();
        }
        self.after_edit(field, Vec::new());
    }

    fn after_edit(&self, field: &str, mut effects: Vec<UiEffect>) {
        effects.push(UiEffect::FieldError {
            field: field.to_string(),
            message: None,
        });
        effects.push(UiEffect::clear_page_error());
        self.view.apply_all(effects);
        self.recompute();
    }

    /// The individual/business selector changed.
    pub fn change_mode(&self, mode: CustomerType) {
        let effects = {
            let mut state = lock(&self.state);
            state.mode = mode;
            set_mode(&mut state.form, mode)
        };
        tracing::debug!(root = %self.root_id, %mode, "mode changed");
        self.view.apply_all(effects);
        self.recompute();
        self.update_reminder(self.services.cache.get_cached_state());
    }

    /// Publish silent, whole-form validity.
    pub fn recompute(&self) {
        let valid = {
            let mut state = lock(&self.state);
            self.validator().is_form_valid(&mut state.form, true)
        };
        self.view.apply(UiEffect::FormValidity { valid });
    }

    /// Show the "already verified" reminder iff `state` means this customer
    /// need not verify again in the selected mode.
    pub fn update_reminder(&self, state: Option<VerificationState>) {
        let mode = self.mode();
        let visible = state.is_some_and(|s| s.satisfies(mode));
        self.view.apply(UiEffect::ReminderVisible { visible });
    }

    /// Scroll the reminder into view, focus it and flash it.
    pub fn emphasize_reminder(&self) {
        self.view.apply_all(vec![
            UiEffect::ReminderVisible { visible: true },
            UiEffect::EmphasizeReminder,
        ]);
    }

    /// The session payload for the current field values.
    pub fn build_payload(&self) -> Result<SessionPayload, VerifyError> {
        let customer = self
            .services
            .customer
            .resolve_reference(self.services.prefill.as_ref())
            .map_err(|_| VerifyError::MissingCustomer)?;
        let state = lock(&self.state);
        Ok(SessionPayload::build(customer, &state.form, state.mode))
    }

    /// Run one submission attempt.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(mut attempt) = Attempt::begin(self) else {
            tracing::debug!(root = %self.root_id, "submit ignored: attempt in flight");
            return SubmitOutcome::Busy;
        };

        self.transition(SubmitPhase::Validating);
        if let Some(outcome) = self.validate_for_submit() {
            self.transition(SubmitPhase::Invalid);
            self.transition(SubmitPhase::Idle);
            return outcome;
        }
        self.view.apply(UiEffect::clear_page_error());

        self.transition(SubmitPhase::CheckingShortCircuit);
        let state = self.services.cache.get_state().await;
        if state.is_some_and(|s| s.satisfies(self.mode())) {
            self.update_reminder(state);
            self.emphasize_reminder();
            self.recompute();
            self.transition(SubmitPhase::ShortCircuited);
            self.transition(SubmitPhase::Idle);
            return SubmitOutcome::ShortCircuited {
                source: ShortCircuitSource::CachedState,
            };
        }

        self.transition(SubmitPhase::Submitting);
        attempt.start_loading();
        match self.create_session().await {
            Ok(SessionStep::AlreadyVerified) => {
                self.handle_already_verified();
                self.transition(SubmitPhase::ShortCircuited);
                self.transition(SubmitPhase::Idle);
                SubmitOutcome::ShortCircuited {
                    source: ShortCircuitSource::ServerResponse,
                }
            }
            Ok(SessionStep::Redirect(url)) => {
                tracing::info!(root = %self.root_id, "redirecting to hosted verification");
                self.view.apply(UiEffect::Navigate { url: url.clone() });
                self.transition(SubmitPhase::Redirecting);
                SubmitOutcome::Redirecting { url }
            }
            Err(message) => {
                self.view.apply(UiEffect::page_error(message.clone()));
                self.transition(SubmitPhase::SubmitFailed);
                self.transition(SubmitPhase::Idle);
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Full, message-emitting validation. `None` when the form is valid.
    fn validate_for_submit(&self) -> Option<SubmitOutcome> {
        let (valid, effects, focus) = {
            let mut state = lock(&self.state);
            let valid = self.validator().is_form_valid(&mut state.form, false);
            let effects: Vec<UiEffect> = state
                .form
                .fields
                .iter()
                .map(|f| UiEffect::FieldError {
                    field: f.name.clone(),
                    message: f.error.clone(),
                })
                .collect();
            let focus = find_first_invalid(&state.form).map(|f| f.name.clone());
            (valid, effects, focus)
        };
        self.view.apply_all(effects);
        if valid {
            return None;
        }

        tracing::debug!(root = %self.root_id, ?focus, "submit blocked by validation");
        self.view.apply(UiEffect::page_error(messages::INCOMPLETE_FORM));
        if let Some(field) = &focus {
            self.view.apply_all(vec![
                UiEffect::FocusField {
                    field: field.clone(),
                },
                UiEffect::Flash {
                    target: FlashTarget::Field(field.clone()),
                },
            ]);
        }
        self.recompute();
        Some(SubmitOutcome::Invalid { focus })
    }

    /// Post the session payload. `Err` carries the user-facing message.
    async fn create_session(&self) -> Result<SessionStep, String> {
        let payload = self.build_payload().map_err(|err| {
            tracing::warn!(root = %self.root_id, error = %err, "cannot build session payload");
            messages::MISSING_DETAILS.to_string()
        })?;

        match self.services.gateway.create_session(&payload).await {
            Ok(response) if response.is_already_verified_individual() => {
                Ok(SessionStep::AlreadyVerified)
            }
            Ok(response) => match response.redirect_target() {
                Some(url) => Ok(SessionStep::Redirect(url.to_string())),
                None => {
                    tracing::warn!(root = %self.root_id, "session response without redirect");
                    Err(messages::MISSING_REDIRECT.to_string())
                }
            },
            Err(err) => {
                tracing::warn!(root = %self.root_id, error = %err, "session request failed");
                Err(failure_message(&err))
            }
        }
    }

    /// The server says an individual verification already applies.
    ///
    /// The reminder is shown at once from the cached state, or a verified
    /// fallback when nothing is cached. [`refresh_reminder`](Self::refresh_reminder)
    /// reconciles it once the attempt is over.
    fn handle_already_verified(&self) {
        let cached = self
            .services
            .cache
            .get_cached_state()
            .unwrap_or(VerificationState::VERIFIED_INDIVIDUAL);
        self.update_reminder(Some(cached));
        self.emphasize_reminder();
    }

    /// Re-read the verification state and reconcile the reminder with it.
    /// A failed read keeps the reminder visible.
    pub async fn refresh_reminder(&self) {
        let fresh = self
            .services
            .cache
            .refresh()
            .await
            .unwrap_or(VerificationState::VERIFIED_INDIVIDUAL);
        self.update_reminder(Some(fresh));
    }

    fn validator(&self) -> Validator {
        Validator::from_clock(self.services.clock.as_ref())
    }

    fn transition(&self, phase: SubmitPhase) {
        let mut state = lock(&self.state);
        tracing::trace!(root = %self.root_id, from = ?state.phase, to = ?phase, "submit phase");
        state.phase = phase;
    }
}

enum SessionStep {
    AlreadyVerified,
    Redirect(String),
}

fn failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Rejected { .. } => err
            .server_message()
            .unwrap_or(messages::UNABLE_TO_START)
            .to_string(),
        ClientError::Status { .. } => messages::UNABLE_TO_START.to_string(),
        ClientError::Network { .. }
        | ClientError::InvalidResponse { .. }
        | ClientError::Config { .. } => messages::START_UNAVAILABLE.to_string(),
    }
}

/// One submission attempt. Holds the in-flight flag and, once loading has
/// started, resets it on drop.
struct Attempt<'a> {
    controller: &'a FormController,
    loading: bool,
}

impl<'a> Attempt<'a> {
    fn begin(controller: &'a FormController) -> Option<Self> {
        controller
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            controller,
            loading: false,
        })
    }

    fn start_loading(&mut self) {
        self.loading = true;
        self.controller.view.apply(UiEffect::Loading { loading: true });
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if self.loading {
            self.controller.view.apply(UiEffect::Loading { loading: false });
            self.controller.recompute();
        }
        self.controller.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_client::SessionResponse;
    use idgate_nullables::{GatewayCall, NullClock, NullGateway, NullReply, RecordingView};
    use idgate_types::field::names;
    use idgate_types::{CustomerContext, PageLocation, Prefill};
    use std::time::Duration;

    use crate::config::IdgateConfig;

    struct Harness {
        gateway: Arc<NullGateway>,
        view: Arc<RecordingView>,
        controller: FormController,
    }

    fn filled_form() -> Form {
        let mut form = Form::standard();
        for (name, value) in [
            (names::FULL_NAME, "Kim Tan"),
            (names::DOB, "1990-04-01"),
            (names::EMAIL, "kim@example.com"),
            (names::MOBILE, "0211234567"),
            (names::ADDRESS_LINE1, "12 Queen Street"),
            (names::SUBURB, "Ponsonby"),
            (names::CITY, "Auckland"),
            (names::POSTCODE, "1011"),
            (names::CULINARY_USE, "baking"),
        ] {
            form.field_mut(name).unwrap().value = value.into();
        }
        form.field_mut("decl_age").unwrap().checked = true;
        form.field_mut("decl_use").unwrap().checked = true;
        form
    }

    fn harness_with(gateway: NullGateway, customer: CustomerContext, form: Form) -> Harness {
        let gateway = Arc::new(gateway);
        let view = Arc::new(RecordingView::new());
        let services = PageServices::new(
            gateway.clone(),
            Arc::new(RecordingView::new()),
            customer,
            PageLocation::parse("https://shop.test/pages/verify").unwrap(),
            IdgateConfig::default(),
        )
        .with_clock(Arc::new(NullClock::on(2026, 6, 15)));
        let controller = FormController::new(
            FormContext::new("main", form, view.clone()),
            Arc::new(services),
        );
        Harness {
            gateway,
            view,
            controller,
        }
    }

    fn harness(gateway: NullGateway) -> Harness {
        harness_with(gateway, CustomerContext::with_id("42"), filled_form())
    }

    #[tokio::test]
    async fn invalid_form_focuses_first_error_without_network() {
        let mut form = filled_form();
        form.field_mut(names::MOBILE).unwrap().value = "12".into();
        let h = harness_with(NullGateway::new(), CustomerContext::with_id("42"), form);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid {
                focus: Some(names::MOBILE.into())
            }
        );
        assert_eq!(h.view.page_error().as_deref(), Some(messages::INCOMPLETE_FORM));
        assert!(h.view.contains(&UiEffect::Flash {
            target: FlashTarget::Field(names::MOBILE.into())
        }));
        assert!(h.gateway.calls().is_empty());
        assert_eq!(h.controller.phase(), SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn unticked_declaration_is_focused() {
        let mut form = filled_form();
        form.field_mut("decl_use").unwrap().checked = false;
        let h = harness_with(NullGateway::new(), CustomerContext::with_id("42"), form);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid {
                focus: Some("decl_use".into())
            }
        );
    }

    #[tokio::test]
    async fn verified_individual_short_circuits_without_session_request() {
        let gateway = NullGateway::new();
        gateway.reply_state(NullReply::Ok(VerificationState::VERIFIED_INDIVIDUAL));
        let h = harness(gateway);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::ShortCircuited {
                source: ShortCircuitSource::CachedState
            }
        );
        assert_eq!(h.gateway.session_calls(), 0);
        assert!(h.view.contains(&UiEffect::EmphasizeReminder));
        assert!(!h.view.contains(&UiEffect::Loading { loading: true }));
    }

    #[tokio::test]
    async fn business_mode_is_not_short_circuited() {
        let gateway = NullGateway::new();
        gateway
            .reply_state(NullReply::Ok(VerificationState::VERIFIED_INDIVIDUAL))
            .reply_session(NullReply::Ok(SessionResponse::redirect("https://idv.test/b")));
        let mut form = filled_form();
        form.field_mut(names::NZBN).unwrap().value = "9429041234567".into();
        form.field_mut(names::TRADING_NAME).unwrap().value = "Kim's Kitchen".into();
        let h = harness_with(gateway, CustomerContext::with_id("42"), form);
        h.controller.change_mode(CustomerType::Business);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Redirecting {
                url: "https://idv.test/b".into()
            }
        );
        match &h.gateway.calls()[1] {
            GatewayCall::CreateSession(payload) => {
                assert_eq!(payload.form.customer_type, CustomerType::Business);
                assert_eq!(payload.form.nzbn.as_deref(), Some("9429041234567"));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn redirect_navigates_then_resets_loading() {
        let gateway = NullGateway::new();
        gateway
            .reply_state(NullReply::Ok(VerificationState::default()))
            .reply_session(NullReply::Ok(SessionResponse::redirect("https://idv.test/h/1")));
        let h = harness(gateway);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Redirecting {
                url: "https://idv.test/h/1".into()
            }
        );
        let loading_on = h.view.position(|e| *e == UiEffect::Loading { loading: true });
        let navigate = h.view.position(|e| matches!(e, UiEffect::Navigate { .. }));
        let loading_off = h.view.position(|e| *e == UiEffect::Loading { loading: false });
        assert!(loading_on < navigate && navigate < loading_off);
        assert_eq!(h.controller.phase(), SubmitPhase::Redirecting);
    }

    #[tokio::test]
    async fn server_message_is_shown_and_loading_reset() {
        let gateway = NullGateway::new();
        gateway
            .reply_state(NullReply::Ok(VerificationState::default()))
            .reply_session(NullReply::Rejected {
                status: 422,
                message: Some("Date of birth does not match".into()),
            });
        let h = harness(gateway);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Date of birth does not match".into()
            }
        );
        assert_eq!(h.view.page_error().as_deref(), Some("Date of birth does not match"));
        assert!(!h.view.is_loading());
        let error = h.view.position(|e| matches!(e, UiEffect::PageError { message: Some(_) }));
        let loading_off = h.view.position(|e| *e == UiEffect::Loading { loading: false });
        assert!(error < loading_off);
        assert_eq!(h.controller.phase(), SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn failure_messages_by_cause() {
        let cases = [
            (NullReply::Rejected { status: 500, message: None }, messages::UNABLE_TO_START),
            (NullReply::Network, messages::START_UNAVAILABLE),
            (NullReply::Ok(SessionResponse::default()), messages::MISSING_REDIRECT),
        ];
        for (reply, expected) in cases {
            let gateway = NullGateway::new();
            gateway
                .reply_state(NullReply::Ok(VerificationState::default()))
                .reply_session(reply);
            let h = harness(gateway);

            assert_eq!(
                h.controller.submit().await,
                SubmitOutcome::Failed {
                    message: expected.into()
                }
            );
            assert!(!h.view.is_loading());
        }
    }

    #[tokio::test]
    async fn missing_customer_fails_with_details_message() {
        let gateway = NullGateway::new();
        gateway.reply_state(NullReply::Ok(VerificationState::default()));
        let h = harness_with(gateway, CustomerContext::default(), filled_form());

        assert_eq!(
            h.controller.submit().await,
            SubmitOutcome::Failed {
                message: messages::MISSING_DETAILS.into()
            }
        );
        assert_eq!(h.gateway.session_calls(), 0);
        assert!(!h.view.is_loading());
    }

    #[tokio::test]
    async fn state_fetch_failure_does_not_block_submission() {
        let gateway = NullGateway::new();
        gateway
            .reply_state(NullReply::Network)
            .reply_session(NullReply::Ok(SessionResponse::redirect("https://idv.test/x")));
        let h = harness(gateway);

        assert!(matches!(
            h.controller.submit().await,
            SubmitOutcome::Redirecting { .. }
        ));
    }

    #[tokio::test]
    async fn server_already_verified_refreshes_reminder() {
        let gateway = NullGateway::new();
        gateway
            .reply_state(NullReply::Ok(VerificationState::default()))
            .reply_state(NullReply::Ok(VerificationState::VERIFIED_INDIVIDUAL))
            .reply_session(NullReply::Ok(SessionResponse::already_verified()));
        let h = harness(gateway);

        let outcome = h.controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::ShortCircuited {
                source: ShortCircuitSource::ServerResponse
            }
        );
        assert_eq!(h.gateway.state_calls(), 1);
        assert!(h.view.contains(&UiEffect::EmphasizeReminder));
        assert!(!h.view.is_loading());

        h.controller.refresh_reminder().await;
        assert_eq!(h.gateway.state_calls(), 2);
        let last_reminder = h
            .view
            .effects()
            .into_iter()
            .rev()
            .find(|e| matches!(e, UiEffect::ReminderVisible { .. }));
        assert_eq!(last_reminder, Some(UiEffect::ReminderVisible { visible: true }));
    }

    #[tokio::test(start_paused = true)]
    async fn server_already_verified_resets_loading_without_waiting_for_state() {
        let gateway = NullGateway::new().with_latency(Duration::from_secs(10));
        gateway
            .reply_state(NullReply::Ok(VerificationState::default()))
            .reply_session(NullReply::Ok(SessionResponse::already_verified()));
        let h = harness(gateway);

        // State read and session request take 10s each.
        let started = tokio::time::Instant::now();
        let outcome = h.controller.submit().await;
        assert_eq!(started.elapsed(), Duration::from_secs(20));
        assert!(matches!(outcome, SubmitOutcome::ShortCircuited { .. }));
        assert_eq!(h.gateway.state_calls(), 1);

        let effects = h.view.effects();
        let emphasized = effects
            .iter()
            .position(|e| *e == UiEffect::EmphasizeReminder)
            .expect("reminder emphasized");
        let reset = effects
            .iter()
            .position(|e| *e == UiEffect::Loading { loading: false })
            .expect("loading reset");
        assert!(emphasized < reset);
        assert_eq!(h.controller.phase(), SubmitPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submit_is_busy() {
        let gateway = NullGateway::new().with_latency(Duration::from_millis(100));
        gateway
            .reply_state(NullReply::Ok(VerificationState::default()))
            .reply_session(NullReply::Ok(SessionResponse::redirect("https://idv.test/1")));
        let h = harness(gateway);

        let (first, second) = tokio::join!(h.controller.submit(), h.controller.submit());
        assert!(matches!(first, SubmitOutcome::Redirecting { .. }));
        assert_eq!(second, SubmitOutcome::Busy);
        assert_eq!(h.gateway.session_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_still_resets_loading() {
        let gateway = NullGateway::new().with_latency(Duration::from_secs(10));
        gateway.reply_state(NullReply::Ok(VerificationState::default()));
        let h = harness(gateway);

        // State fetch takes 10s, the session call another 10s.
        let _ = tokio::time::timeout(Duration::from_secs(15), h.controller.submit()).await;
        assert!(h.view.contains(&UiEffect::Loading { loading: true }));
        assert!(!h.view.is_loading());

        h.gateway.reply_session(NullReply::Ok(SessionResponse::redirect("https://idv.test/2")));
        assert!(matches!(
            h.controller.submit().await,
            SubmitOutcome::Redirecting { .. }
        ));
    }

    #[test]
    fn input_sanitises_and_clears_errors() {
        let mut form = filled_form();
        form.field_mut(names::POSTCODE).unwrap().error = Some("Enter a 4-digit postcode.".into());
        let h = harness_with(NullGateway::new(), CustomerContext::with_id("42"), form);

        h.controller.input(names::POSTCODE, "10a11x9");
        assert_eq!(h.controller.form().value(names::POSTCODE), "1011");
        assert!(h.view.contains(&UiEffect::FieldValue {
            field: names::POSTCODE.into(),
            value: "1011".into()
        }));
        assert!(h.view.contains(&UiEffect::FieldError {
            field: names::POSTCODE.into(),
            message: None
        }));
        assert_eq!(
            h.view.effects().last(),
            Some(&UiEffect::FormValidity { valid: true })
        );
    }

    #[test]
    fn unchecking_a_declaration_makes_form_invalid() {
        let h = harness(NullGateway::new());
        h.controller.set_checked("decl_age", false);
        assert_eq!(
            h.view.effects().last(),
            Some(&UiEffect::FormValidity { valid: false })
        );
    }

    #[test]
    fn wire_applies_prefill_and_mode() {
        let gateway = Arc::new(NullGateway::new());
        let view = Arc::new(RecordingView::new());
        let services = PageServices::new(
            gateway,
            Arc::new(RecordingView::new()),
            CustomerContext::with_id("42"),
            PageLocation::parse("https://shop.test/pages/verify")
                .unwrap()
                .with_referrer("https://shop.test/cart"),
            IdgateConfig::default(),
        )
        .with_prefill(Prefill {
            email: Some("kim@example.com".into()),
            ..Prefill::default()
        });
        let controller = FormController::new(
            FormContext::new("main", Form::standard(), view.clone()),
            Arc::new(services),
        );

        controller.wire();
        assert_eq!(controller.return_to(), "https://shop.test/cart");
        assert_eq!(controller.form().value(names::EMAIL), "kim@example.com");
        assert!(view.contains(&UiEffect::FieldReadOnly {
            field: names::EMAIL.into()
        }));
        assert!(view.contains(&UiEffect::BusinessFieldsVisible { visible: false }));
        assert!(view.contains(&UiEffect::ReminderVisible { visible: false }));
        assert_eq!(
            view.effects().last(),
            Some(&UiEffect::FormValidity { valid: false })
        );
    }

    #[test]
    fn prefill_gid_wins_in_payload() {
        let gateway = Arc::new(NullGateway::new());
        let services = PageServices::new(
            gateway,
            Arc::new(RecordingView::new()),
            CustomerContext::with_id("42"),
            PageLocation::parse("https://shop.test/").unwrap(),
            IdgateConfig::default(),
        )
        .with_prefill(Prefill {
            customer_gid: Some("gid://shopify/Customer/99".into()),
            ..Prefill::default()
        });
        let controller = FormController::new(
            FormContext::new("main", filled_form(), Arc::new(RecordingView::new())),
            Arc::new(services),
        );

        let payload = controller.build_payload().unwrap();
        assert_eq!(payload.customer_reference.as_str(), "gid://shopify/Customer/99");
        assert_eq!(payload.form.address.line2, None);
    }
}
