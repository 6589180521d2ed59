//! Nullable gateway: scripted replies, recorded calls, no network.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use idgate_client::{
    ClientError, ClientResult, LegacyStartRequest, SessionResponse, StartRequest, StartResponse,
    VerifyGateway,
};
use idgate_types::{CustomerGid, PollStatus, SessionPayload, VerificationState};

/// One scripted reply of a [`NullGateway`] endpoint.
#[derive(Clone, Debug)]
pub enum NullReply<T> {
    Ok(T),
    /// Transport failure.
    Network,
    /// Bare non-success status.
    Status(u16),
    /// Non-success status with an optional server message.
    Rejected { status: u16, message: Option<String> },
    /// Undecodable body.
    Malformed,
}

impl<T: Clone> NullReply<T> {
    fn resolve(&self) -> ClientResult<T> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Network => Err(ClientError::Network {
                message: "null gateway: connection refused".into(),
            }),
            Self::Status(status) => Err(ClientError::Status { status: *status }),
            Self::Rejected { status, message } => Err(ClientError::Rejected {
                status: *status,
                message: message.clone(),
            }),
            Self::Malformed => Err(ClientError::InvalidResponse {
                message: "null gateway: malformed body".into(),
            }),
        }
    }
}

/// A recorded gateway call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    FetchState,
    Start(StartRequest),
    StartLegacy(LegacyStartRequest),
    CreateSession(SessionPayload),
    CheckStatus(CustomerGid),
}

/// Reply queue for one endpoint. The last reply repeats once the queue is
/// down to one entry.
struct Script<T> {
    replies: Mutex<VecDeque<NullReply<T>>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, reply: NullReply<T>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn next(&self) -> Option<ClientResult<T>> {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().map(|r| r.resolve())
        } else {
            replies.front().map(NullReply::resolve)
        }
    }
}

/// A test gateway with per-endpoint scripted replies.
///
/// Unscripted endpoints fail with a network error, except status checks,
/// which report `Pending`.
pub struct NullGateway {
    state: Script<VerificationState>,
    start: Script<StartResponse>,
    legacy: Script<StartResponse>,
    session: Script<SessionResponse>,
    status: Script<PollStatus>,
    latency: Mutex<Option<Duration>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl NullGateway {
    pub fn new() -> Self {
        Self {
            state: Script::new(),
            start: Script::new(),
            legacy: Script::new(),
            session: Script::new(),
            status: Script::new(),
            latency: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay every reply (honours paused tokio time).
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    pub fn reply_state(&self, reply: NullReply<VerificationState>) -> &Self {
        self.state.push(reply);
        self
    }

    pub fn reply_start(&self, reply: NullReply<StartResponse>) -> &Self {
        self.start.push(reply);
        self
    }

    pub fn reply_legacy(&self, reply: NullReply<StartResponse>) -> &Self {
        self.legacy.push(reply);
        self
    }

    pub fn reply_session(&self, reply: NullReply<SessionResponse>) -> &Self {
        self.session.push(reply);
        self
    }

    pub fn reply_status(&self, reply: NullReply<PollStatus>) -> &Self {
        self.status.push(reply);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn state_calls(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::FetchState))
    }

    pub fn start_calls(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::Start(_)))
    }

    pub fn legacy_calls(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::StartLegacy(_)))
    }

    pub fn session_calls(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::CreateSession(_)))
    }

    pub fn status_calls(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::CheckStatus(_)))
    }

    /// Forget recorded calls, keeping the scripts.
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for NullGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn unscripted<T>() -> ClientResult<T> {
    Err(ClientError::Network {
        message: "null gateway: no reply scripted".into(),
    })
}

#[async_trait]
impl VerifyGateway for NullGateway {
    async fn fetch_state(&self) -> ClientResult<VerificationState> {
        self.record(GatewayCall::FetchState).await;
        self.state.next().unwrap_or_else(unscripted)
    }

    async fn start(&self, request: &StartRequest) -> ClientResult<StartResponse> {
        self.record(GatewayCall::Start(request.clone())).await;
        self.start.next().unwrap_or_else(unscripted)
    }

    async fn start_legacy(&self, request: &LegacyStartRequest) -> ClientResult<StartResponse> {
        self.record(GatewayCall::StartLegacy(request.clone())).await;
        self.legacy.next().unwrap_or_else(unscripted)
    }

    async fn create_session(&self, payload: &SessionPayload) -> ClientResult<SessionResponse> {
        self.record(GatewayCall::CreateSession(payload.clone())).await;
        self.session.next().unwrap_or_else(unscripted)
    }

    async fn check_status(&self, customer: &CustomerGid) -> ClientResult<PollStatus> {
        self.record(GatewayCall::CheckStatus(customer.clone())).await;
        self.status.next().unwrap_or(Ok(PollStatus::Pending))
    }
}
