//! Out-of-band verification status reported by the status endpoint.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Verified,
    Failed,
    /// Anything else, including unknown values.
    #[default]
    Pending,
}

impl PollStatus {
    /// Normalise a raw status string; unknown values are pending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("verified") => Self::Verified,
            Some("failed") => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
