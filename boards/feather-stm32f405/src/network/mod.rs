#![deny(warnings)]
//! Network side of the gateway
//!
//! - **`collector`**: per-push TCP connection to the remote collector
//! - **`config`**: interface settings with `Default`
//! - **`error`**: simple error enum for socket operations
//! - **`manager`**: DHCP wait and collector resolution
//! - **`socket`**: listening socket for the control endpoint
//!
//! The W5500 driver (`embassy-net-wiznet`) feeds `embassy-net`; both sockets
//! here are plain `embassy-net` TCP sockets, and `gateway-core` only sees
//! them through the `gateway-hal` traits.

pub mod collector;
pub mod config;
pub mod error;
pub mod manager;
pub mod socket;

pub use collector::TcpCollector;
pub use config::NetworkConfig;
pub use socket::ControlSocket;
