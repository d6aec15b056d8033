//! Shared types and models for the Hardware Store Management Platform
//!
//! This crate contains the domain types used by the backend engines and
//! their tests: catalog entities, the stock ledger vocabulary, the purchase
//! order state machine, the sale cart value object, and pure validation
//! helpers that do not require a database.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
