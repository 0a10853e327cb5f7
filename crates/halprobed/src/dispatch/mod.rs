//! Command dispatch for one session.
//!
//! The dispatcher maps each decoded command record to exactly one response
//! record and tells the session whether to keep reading.

mod dispatcher;
mod errors;
mod status;

pub(crate) use self::dispatcher::{CommandDispatcher, Dispatched, SessionControl};
pub(crate) use self::errors::DispatchError;
pub use self::status::{FixedStatusProbe, StatusProbe};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
