//! Test doubles for code built on this crate
//!
//! - [`MockCredentialProvider`]: in-memory provider with programmable
//!   validity, one-shot failures and call counters
//! - [`HostHarness`]: plays the host runtime, owning storage and the lease
//!   registry and driving the backend callbacks

mod harness;
mod mocks;

pub use harness::{HostHarness, IssuedLease};
pub use mocks::MockCredentialProvider;
