//! register-transport: field-bus holding-register abstractions
//!
//! This crate provides the trait and types a device layer uses to move 16-bit holding
//! registers on and off a field bus. Framing, timing and retries live in the backend that
//! implements [`RegisterTransport`]. The default build enables a `mock` backend so that
//! binaries and tests can run on any host without a serial adapter.

mod types;
pub use types::{RegisterAddr, SlaveAddress};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::RegisterTransport;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockTransport, Operation, TransportCall};
