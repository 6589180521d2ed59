//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern: every external dependency
//! of the workflow (calendar clock, verification gateway, UI surface) sits
//! behind a trait. This crate provides test-friendly implementations that:
//! - Return scripted, deterministic values
//! - Record every call for assertions
//! - Never touch the network or a real UI
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod gateway;
pub mod view;

pub use clock::NullClock;
pub use gateway::{GatewayCall, NullGateway, NullReply};
pub use view::RecordingView;
