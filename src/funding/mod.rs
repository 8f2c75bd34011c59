//! Funding ledger
//!
//! Records monetary contributions against identities. Creation is
//! idempotent on the external payment reference: duplicate confirmations
//! converge to one record via a unique-constraint insert-or-fetch.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

#[cfg(test)]
mod integration_tests;

pub use models::{FundingId, FundingRecord};
pub use service::FundingLedger;
