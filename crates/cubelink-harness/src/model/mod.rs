//! Reference model for model-based testing.
//!
//! The model is a deliberately naive transition table for the connection
//! lifecycle and reconnection policy. It serves as the oracle against which
//! the real session is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Behavior, not mechanism: no generations, no actions, just outcomes
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod session;

pub use operation::{Operation, OperationResult};
pub use session::{ModelSession, ObservableState};
