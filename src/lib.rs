//! ipmi-sim: a simulated IPMI-over-LAN BMC.
//!
//! A [`Bmc`] accepts RMCP/IPMI v1.5 datagrams, tracks authenticated sessions
//! (in the [`session`] module), routes requests through a two-level
//! [`Dispatcher`](dispatch::Dispatcher) and answers them with authenticated
//! responses. The chassis boot options (in the [`chassis`] module) are
//! applied to simulated machines through the [`machine`] module.

#[macro_use]
mod fmt;
pub use fmt::{LogItem, LogOutput, Loggable, Logger};

mod bmc;
pub use bmc::Bmc;

pub mod chassis;

mod config;
pub use config::Config;

pub mod connection;

pub mod dispatch;

mod error;
pub use error::{DecodeError, EncodeError};

pub mod machine;

pub mod response;

pub mod session;

#[cfg(test)]
mod tests;
