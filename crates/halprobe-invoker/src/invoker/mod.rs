//! The contract every driver satisfies, and its table-driven implementation.

mod table;

use std::time::Duration;

use halprobe_types::{
    FunctionSpecDescription, InterfaceSpecification, VariableValue, VerificationDescription,
};

use crate::callback::CallbackChannel;
use crate::error::{InvokeError, VerifyError};
use crate::measurement::as_nanos;

pub use self::table::{AttributeGetter, FunctionHandler, FunctionTable, ResultVerifier, TableInvoker};

/// Outcome of one native call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Native return values in declaration order.
    pub results: Vec<VariableValue>,
    /// Wall-clock duration of the native call.
    pub elapsed: Duration,
}

impl Invocation {
    /// Elapsed time in whole nanoseconds.
    #[must_use]
    pub fn elapsed_ns(&self) -> u64 {
        as_nanos(self.elapsed)
    }
}

/// Bridges generic call descriptions to one loaded interface.
///
/// Failures are reported, never fatal: an unknown name, a signature
/// mismatch or a failed verification leaves the driver usable for the next
/// call.
#[cfg_attr(test, mockall::automock)]
pub trait FunctionInvoker {
    /// Interface the driver serves.
    fn interface(&self) -> &InterfaceSpecification;

    /// Performs the native call named by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::NotFound`] for an unknown name,
    /// [`InvokeError::Arguments`] when the arguments do not fit the
    /// signature, or a driver-specific failure.
    fn call(
        &mut self,
        spec: &FunctionSpecDescription,
        callbacks: &CallbackChannel,
    ) -> Result<Invocation, InvokeError>;

    /// Compares `actual` results against `expected`.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyError`] describing the first difference.
    fn verify(
        &self,
        expected: &VerificationDescription,
        actual: &[VariableValue],
    ) -> Result<(), VerifyError>;

    /// Reads the attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::AttributeNotFound`] when the interface has no
    /// such attribute.
    fn attribute(&self, name: &str) -> Result<VariableValue, InvokeError>;
}
