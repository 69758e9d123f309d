//! Port-knocking client.
//!
//! Sends an empty TCP connect or UDP datagram to each port of a sequence, in
//! order, as an authentication signal for a listener watching those ports.
//! The sequence is either derived from a shared seed or given literally.
#[macro_use]
extern crate log;

pub mod config;
pub mod errors;
mod lagged_fib;
pub mod resolve;
pub mod sequence;
pub mod session;
pub mod status;
pub mod transport;

pub use config::{KnockConfig, Settings};
pub use errors::{ConfigError, KnockError, ResolveError};
pub use sequence::{PortSequence, PortSource};
pub use session::{knock, run, Session, KNOCK_DELAY};
pub use status::{Console, KnockEvent, Silent, StatusSink};
pub use transport::{IpFamily, Protocol, Tcp, Transport, TransportKind, Udp};
