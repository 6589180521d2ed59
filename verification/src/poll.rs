//! Status polling after the hosted verification redirects back.
//!
//! One polling loop at a time, driven by a spawned tokio task. The phase is
//! published on a `watch` channel so hosts and tests can await terminal
//! states.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use idgate_client::VerifyGateway;
use idgate_types::{CustomerGid, PageLocation, PanelAction, PollStatus, StatusPanel, UiEffect, VerifyView};

use crate::{lock, messages};

/// Polling cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Time between status requests; the first comes one interval after start.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Give up once this much time has elapsed without a terminal status.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_timeout_ms() -> u64 {
    60000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollPhase {
    #[default]
    Idle,
    Polling,
    Verified,
    Failed,
    TimedOut,
}

impl PollPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Failed | Self::TimedOut)
    }
}

#[derive(Default)]
struct PollSession {
    active: bool,
    /// Bumped on every start and stop; ticks from older sessions are ignored.
    generation: u64,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    gateway: Arc<dyn VerifyGateway>,
    view: Arc<dyn VerifyView>,
    customer: Option<CustomerGid>,
    location: PageLocation,
    continue_url: String,
    config: PollConfig,
    phase: watch::Sender<PollPhase>,
    session: Mutex<PollSession>,
}

/// Polls the status endpoint until verified, failed or timed out.
pub struct StatusPoller {
    shared: Arc<Shared>,
}

impl StatusPoller {
    pub fn new(
        gateway: Arc<dyn VerifyGateway>,
        view: Arc<dyn VerifyView>,
        customer: Option<CustomerGid>,
        location: PageLocation,
        continue_url: impl Into<String>,
        config: PollConfig,
    ) -> Self {
        let (phase, _) = watch::channel(PollPhase::Idle);
        Self {
            shared: Arc::new(Shared {
                gateway,
                view,
                customer,
                location,
                continue_url: continue_url.into(),
                config,
                phase,
                session: Mutex::new(PollSession::default()),
            }),
        }
    }

    /// Begin polling. Returns `false` (and does nothing) when already active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut session = lock(&self.shared.session);
        if session.active {
            tracing::debug!("status polling already active");
            return false;
        }

        session.active = true;
        session.generation += 1;
        let generation = session.generation;
        let started = Instant::now();
        self.shared.phase.send_replace(PollPhase::Polling);

        tracing::info!(
            interval_ms = self.shared.config.interval_ms,
            timeout_ms = self.shared.config.timeout_ms,
            "status polling started"
        );
        let shared = Arc::clone(&self.shared);
        session.task = Some(tokio::spawn(run(shared, generation, started)));
        true
    }

    /// Stop polling. Clears the active flag even when nothing is running.
    pub fn stop(&self) {
        let mut session = lock(&self.shared.session);
        if let Some(task) = session.task.take() {
            task.abort();
        }
        session.active = false;
        session.generation += 1;
        self.shared.phase.send_if_modified(|phase| {
            let was_polling = *phase == PollPhase::Polling;
            if was_polling {
                *phase = PollPhase::Idle;
            }
            was_polling
        });
    }

    pub fn is_active(&self) -> bool {
        lock(&self.shared.session).active
    }

    pub fn phase(&self) -> PollPhase {
        *self.shared.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollPhase> {
        self.shared.phase.subscribe()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.shared.session).task.take() {
            task.abort();
        }
    }
}

async fn run(shared: Arc<Shared>, generation: u64, started: Instant) {
    let period = shared.config.interval();
    let mut ticker = interval_at(started + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let status = shared.fetch_status().await;
        tracing::debug!(?status, "status poll");

        match status {
            PollStatus::Verified => {
                if shared.finish(generation, PollPhase::Verified) {
                    shared.view.apply(UiEffect::ShowPanel {
                        panel: StatusPanel::Success {
                            message: messages::VERIFIED.to_string(),
                            continue_url: shared.continue_url.clone(),
                        },
                    });
                    shared.clear_marker();
                }
                return;
            }
            PollStatus::Failed => {
                if shared.finish(generation, PollPhase::Failed) {
                    shared.view.apply(UiEffect::ShowPanel {
                        panel: StatusPanel::Failure {
                            message: messages::VERIFY_FAILED.to_string(),
                            action: PanelAction::RetryVerification,
                        },
                    });
                    shared.clear_marker();
                }
                return;
            }
            PollStatus::Pending if started.elapsed() > shared.config.timeout() => {
                if shared.finish(generation, PollPhase::TimedOut) {
                    tracing::info!("status polling timed out");
                    shared.view.apply(UiEffect::ShowPanel {
                        panel: StatusPanel::StillProcessing {
                            message: messages::STILL_PROCESSING.to_string(),
                            action: PanelAction::CheckStatusAgain,
                        },
                    });
                }
                return;
            }
            PollStatus::Pending => {}
        }
    }
}

impl Shared {
    /// One status read. Every failure counts as still pending.
    async fn fetch_status(&self) -> PollStatus {
        let Some(customer) = &self.customer else {
            tracing::debug!("no customer reference; treating status as pending");
            return PollStatus::Pending;
        };
        match self.gateway.check_status(customer).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "status poll failed; treating as pending");
                PollStatus::Pending
            }
        }
    }

    /// Leave `Polling` for `phase` if `generation` is still the live session.
    fn finish(&self, generation: u64, phase: PollPhase) -> bool {
        let mut session = lock(&self.session);
        if !session.active || session.generation != generation {
            tracing::debug!(?phase, "ignoring result of superseded poll");
            return false;
        }
        session.active = false;
        session.task = None;
        self.phase.send_replace(phase);
        tracing::info!(?phase, "status polling finished");
        true
    }

    fn clear_marker(&self) {
        if let Some(address) = self.location.without_status_marker() {
            self.view.apply(UiEffect::ReplaceAddress { address });
        }
    }
}
