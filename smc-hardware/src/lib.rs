//! smc-hardware
//!
//! Controller access for the SMC telemetry client: the wire protocol, the
//! transport seam, the IOKit driver (macOS), a simulated controller, and the
//! connection, registry and client layered on top of them.
//
//! Public API:
//! - `client::SmcClient` - telemetry reader, the main entry point
//! - `connection::Connection` - serialized round trips and key-info cache
//! - `registry::KeyRegistry` - catalog plus lazily probed working keys
//! - `mock::MockSmc` - in-memory controller for tests and `--mock` mode

pub mod client;
pub mod connection;
#[cfg(target_os = "macos")]
pub mod iokit;
pub mod mock;
pub mod protocol;
pub mod registry;
pub mod transport;

pub use client::SmcClient;
pub use connection::Connection;
#[cfg(target_os = "macos")]
pub use iokit::IoKitDriver;
pub use mock::{MockSmc, MockStats};
pub use registry::KeyRegistry;
pub use transport::SmcTransport;
