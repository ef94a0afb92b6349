//! rvr-service: Binds a radar decoder to a live notification transport.
//!
//! The transport itself (connection, discovery, notification plumbing) is a
//! collaborator behind [`NotifyTransport`]. This crate owns the
//! enable/disable lifecycle and hands decoded measurements to an observer.

pub mod replay;
pub mod service;
pub mod session;
pub mod transport;

pub use replay::{ReplayError, ReplayTransport};
pub use service::RearViewRadarService;
pub use session::RadarSession;
pub use transport::{NotifyHandler, NotifyTransport};
