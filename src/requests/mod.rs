//! Donation request lifecycle
//!
//! The aggregate, its persistence, and the engine that owns every mutation
//! of a request. The single concurrency-critical write (a donor accepting a
//! pending request) is a compare-and-set against the store.

pub mod engine;
pub mod handlers;
pub mod models;
pub mod repository;

#[cfg(test)]
mod integration_tests;

pub use engine::RequestEngine;
pub use models::{DonationRequest, RequestId, RequestStatus};
