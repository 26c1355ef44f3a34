//! frames-client
//!
//! Blocking HTTP adapter over frames-core.
//! All wire work happens in the core crate; this crate only moves bytes.

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::ClientError;
pub use request::{ReadRequest, WriteParams};
pub use transport::{HttpTransport, Transport, WriteBody};
