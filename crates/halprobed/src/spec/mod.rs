//! Per-session component loading and invocation.
//!
//! Each session owns one [`SpecificationBuilder`]. Loading a component
//! resolves its interface specification file, opens the matching driver
//! from the daemon's registry and replaces whatever the session had loaded
//! before; a failed load leaves the previous component in place.

mod builder;
mod errors;
mod loader;
#[cfg(test)]
mod tests;

use halprobe_types::{FunctionResult, FunctionSpecDescription, InterfaceSpecification, LoadRequest};

pub(crate) use self::builder::{BuilderSettings, ComponentSpecificationBuilder};
pub use self::errors::{CallError, LoadError};
pub(crate) use self::loader::{ComponentQuery, find_component_specification};

const SPEC_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::spec");

/// Loads one target component and invokes functions on it.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait SpecificationBuilder {
    /// Loads the component named by `request`, replacing the current one.
    fn load_component(&mut self, request: &LoadRequest) -> Result<(), LoadError>;

    /// Invokes a function or reads an attribute of the loaded component.
    fn invoke_function(
        &mut self,
        call: &FunctionSpecDescription,
    ) -> Result<FunctionResult, CallError>;

    /// Specification of the loaded component, if any.
    fn interface_specification(&self) -> Option<InterfaceSpecification>;
}
