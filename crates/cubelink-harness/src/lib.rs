//! Deterministic simulation harness for cubelink testing.
//!
//! - [`SimCube`]: an in-memory cube implementing
//!   [`Transport`](cubelink_client::Transport). It answers commands with real
//!   wire frames, fragments its output with a seeded RNG and can drop the
//!   link, refuse connections or lose its radio on demand.
//! - [`SimEnv`]: tokio-clock environment that counts sleeps, for use with
//!   `#[tokio::test(start_paused = true)]`.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the session
//! lifecycle. Operations are applied to both the model and the real
//! [`Session`](cubelink_core::Session), and their observable states are
//! compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod scenario;
pub mod sim_cube;
pub mod sim_env;

pub use model::{ModelSession, ObservableState, Operation, OperationResult};
pub use scenario::{Scenario, SimDevice};
pub use sim_cube::{SIM_DEVICE_ID, SimCube, TRANSPORT_CHANNEL_CAPACITY};
pub use sim_env::SimEnv;
