#![forbid(unsafe_code)]

//! Host-driven runner for the folio page controllers.
//!
//! [`PageRunner`] wires the reveal, rotator, cursor and image-fade
//! controllers to one timer queue, one geometry observer and one patch
//! buffer. On `wasm32` it is exported to JavaScript as `PortfolioRunner`;
//! natively it backs the tests and the input fuzzer.

pub mod error;
pub mod input;
pub mod runner_core;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::PortfolioRunner;

pub use error::InputError;
pub use input::HostInput;
pub use runner_core::{PageRunner, StepResult};
