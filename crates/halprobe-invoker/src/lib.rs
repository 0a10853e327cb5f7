//! Function invocation contract for `halprobed` drivers.
//!
//! A driver bridges the generic call description carried by
//! `CALL_FUNCTION` to native operations on one loaded interface. Every
//! driver implements [`FunctionInvoker`]; most do so through
//! [`TableInvoker`], which owns a [`FunctionTable`] mapping each function
//! name to a handler built once when the driver is registered. The table
//! turns an unknown name into a single lookup miss, validates positional
//! arguments against the declared signature before the handler runs, and
//! times the native call with a [`Measurement`].
//!
//! Handlers read their arguments through [`Arguments`], which converts
//! tagged values into native primitives, enums and fixed arrays and reports
//! any mismatch as a [`MarshalError`] instead of truncating or padding.
//! Results are verified against expectations by comparing tags and values;
//! enumerated results may supply their own comparison through
//! [`NativeEnum`].
//!
//! Drivers are located through a [`DriverRegistry`] keyed by the component
//! identity recorded in its interface specification. Asynchronous
//! notifications from the target reach the agent through the
//! [`CallbackChannel`] handle passed into every call.
//!
//! # Example
//!
//! ```
//! use halprobe_invoker::{CallbackChannel, DriverRegistry, TargetComponent, loopback};
//! use halprobe_types::FunctionSpecDescription;
//!
//! let mut registry = DriverRegistry::new();
//! loopback::register(&mut registry).expect("loopback registers once");
//! let mut driver = registry
//!     .open(&loopback::driver_key(), &TargetComponent::service("default"))
//!     .expect("loopback driver opens");
//! let call = FunctionSpecDescription::call("prediscover", Vec::new());
//! let invocation = driver
//!     .call(&call, &CallbackChannel::disconnected())
//!     .expect("prediscover succeeds");
//! assert_eq!(invocation.results.len(), 1);
//! ```

pub mod callback;
pub mod error;
pub mod invoker;
pub mod loopback;
pub mod marshal;
pub mod measurement;
pub mod registry;
pub mod verify;

#[cfg(test)]
mod tests;

pub use self::callback::{CallbackChannel, CallbackRegistry};
pub use self::error::{CallbackError, DriverError, InvokeError, MarshalError, VerifyError};
pub use self::invoker::{
    AttributeGetter, FunctionHandler, FunctionInvoker, FunctionTable, Invocation, ResultVerifier,
    TableInvoker,
};
pub use self::marshal::{Arguments, NativeEnum, Primitive};
pub use self::measurement::Measurement;
pub use self::registry::{DriverFactory, DriverKey, DriverRegistry, TargetComponent};

/// Tracing target for invocation events.
pub(crate) const INVOKE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::invoke");
