//! The identity-verification workflow.
//!
//! Three cooperating state machines drive a verification page:
//! 1. **State cache**: one in-flight read of the customer's verification flags,
//!    shared by every caller.
//! 2. **Submission orchestrator**: validates the form, short-circuits already
//!    verified customers, creates the hosted session and redirects.
//! 3. **Status poller**: after the hosted flow redirects back with the
//!    processing marker, polls until a terminal result or timeout.
//!
//! A [`PageSession`] owns all three for one page view. Every visible change is
//! emitted as a [`UiEffect`](idgate_types::UiEffect) to the host's view.

pub mod cache;
pub mod config;
pub mod error;
pub mod messages;
pub mod page;
pub mod poll;
pub mod services;
pub mod start;
pub mod submit;

pub use cache::StateCache;
pub use config::IdgateConfig;
pub use error::VerifyError;
pub use page::{ActionOutcome, PageSession, UserAction};
pub use poll::{PollConfig, PollPhase, StatusPoller};
pub use services::PageServices;
pub use start::{start_verification, StartOutcome, StartParams, StartRoute};
pub use submit::{FormContext, FormController, ShortCircuitSource, SubmitOutcome, SubmitPhase};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
