//! Call dispatch for the varlink service.
//!
//! Each complete frame read from a session goes through [`Dispatcher`]:
//! it is decoded and validated into a [`Call`], looked up in the method
//! table, and handed to its handler. Handlers either answer at once or, for
//! `WaitForEvent`, defer the reply to the broadcaster. Every failure becomes
//! an error reply to the caller; nothing here ends the service loop.

mod errors;
mod methods;
mod request;

pub use self::errors::VarlinkError;
pub(crate) use self::methods::{CallContext, Dispatcher};
pub use self::request::{Call, is_valid_method_name};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
