//! HTTP clients for Flux Circuits.
//!
//! [`CodegenClient`] talks to a chat-completion endpoint to generate and
//! repair C source; [`FluxCircuitClient`] talks to the Flux compiler API
//! and degrades to a local mock schematic when the service is unreachable.
//! Both implement the capability traits defined in `flux-core`.

pub mod circuit;
pub mod codegen;
mod extract;
mod prompts;

pub use circuit::{CircuitConfig, FluxCircuitClient};
pub use codegen::{CodegenClient, CodegenConfig};
pub use extract::extract_code;
