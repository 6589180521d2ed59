//! Remote verification state snapshot.

use serde::{Deserialize, Serialize};

use crate::mode::CustomerType;

/// The customer's current verification flags, as reported by the state endpoint.
///
/// Fetched, never mutated locally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationState {
    #[serde(default, rename = "isVerified18")]
    pub is_verified_18: bool,
    #[serde(default)]
    pub is_verified_business: bool,
    #[serde(default)]
    pub is_business_manual_review: bool,
}

impl VerificationState {
    /// State synthesised when the server reports an already verified individual
    /// and no fresher snapshot is available.
    pub const VERIFIED_INDIVIDUAL: Self = Self {
        is_verified_18: true,
        is_verified_business: false,
        is_business_manual_review: false,
    };

    /// Whether an existing verification already satisfies `mode`, so a new
    /// submission would be redundant.
    pub fn satisfies(&self, mode: CustomerType) -> bool {
        mode == CustomerType::Individual
            && self.is_verified_18
            && !self.is_verified_business
            && !self.is_business_manual_review
    }
}
