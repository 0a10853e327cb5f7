use std::collections::HashMap;
use std::sync::Arc;

use halprobe_types::{
    AttributeSpec, FunctionSignature, FunctionSpecDescription, InterfaceSpecification,
    VariableValue, VerificationDescription,
};
use tracing::debug;

use super::{FunctionInvoker, Invocation};
use crate::INVOKE_TARGET;
use crate::callback::CallbackChannel;
use crate::error::{InvokeError, MarshalError, VerifyError};
use crate::marshal::Arguments;
use crate::measurement::{Measurement, as_nanos};
use crate::verify;

/// Native implementation of one function over driver state `D`.
pub type FunctionHandler<D> =
    fn(&mut D, Arguments<'_>, &CallbackChannel) -> Result<Vec<VariableValue>, InvokeError>;

/// Custom comparison of expected and actual results.
pub type ResultVerifier = fn(&[VariableValue], &[VariableValue]) -> Result<(), VerifyError>;

/// Reads one attribute from driver state `D`.
pub type AttributeGetter<D> = fn(&D) -> VariableValue;

struct FunctionEntry<D> {
    signature: FunctionSignature,
    handler: FunctionHandler<D>,
    verifier: Option<ResultVerifier>,
}

struct AttributeEntry<D> {
    getter: AttributeGetter<D>,
}

/// Name-keyed dispatch table for one interface.
///
/// The table is built once, when the driver is registered, and shared by
/// every session that opens the interface. Registering a function also
/// records its signature in the interface description the table reports.
pub struct FunctionTable<D> {
    interface: InterfaceSpecification,
    functions: HashMap<String, FunctionEntry<D>>,
    attributes: HashMap<String, AttributeEntry<D>>,
}

impl<D> FunctionTable<D> {
    /// Starts a table for `interface`.
    ///
    /// Functions and attributes already listed in `interface` are dropped;
    /// the table lists exactly what it can dispatch.
    #[must_use]
    pub fn new(mut interface: InterfaceSpecification) -> Self {
        interface.functions.clear();
        interface.attributes.clear();
        Self {
            interface,
            functions: HashMap::new(),
            attributes: HashMap::new(),
        }
    }

    /// Adds a function compared with the default tag-and-value verifier.
    #[must_use]
    pub fn function(self, signature: FunctionSignature, handler: FunctionHandler<D>) -> Self {
        self.insert_function(signature, handler, None)
    }

    /// Adds a function with its own result verifier.
    #[must_use]
    pub fn function_verified_by(
        self,
        signature: FunctionSignature,
        handler: FunctionHandler<D>,
        verifier: ResultVerifier,
    ) -> Self {
        self.insert_function(signature, handler, Some(verifier))
    }

    /// Adds a readable attribute.
    #[must_use]
    pub fn attribute(mut self, spec: AttributeSpec, getter: AttributeGetter<D>) -> Self {
        self.interface.attributes.retain(|existing| existing.name != spec.name);
        self.attributes
            .insert(spec.name.clone(), AttributeEntry { getter });
        self.interface.attributes.push(spec);
        self
    }

    fn insert_function(
        mut self,
        signature: FunctionSignature,
        handler: FunctionHandler<D>,
        verifier: Option<ResultVerifier>,
    ) -> Self {
        self.interface
            .functions
            .retain(|existing| existing.name != signature.name);
        self.interface.functions.push(signature.clone());
        self.functions.insert(
            signature.name.clone(),
            FunctionEntry {
                signature,
                handler,
                verifier,
            },
        );
        self
    }

    /// Interface described by the registered functions and attributes.
    #[must_use]
    pub const fn interface(&self) -> &InterfaceSpecification {
        &self.interface
    }

    /// Number of dispatchable functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` when no function is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&FunctionEntry<D>> {
        self.functions.get(name)
    }
}

fn check_arguments(
    signature: &FunctionSignature,
    args: &[VariableValue],
) -> Result<(), MarshalError> {
    if signature.args.len() != args.len() {
        return Err(MarshalError::Count {
            expected: signature.args.len(),
            actual: args.len(),
        });
    }
    for (index, (declared, value)) in signature.args.iter().zip(args).enumerate() {
        if !value.conforms_to(declared) {
            return Err(MarshalError::Kind {
                index,
                expected: declared.to_string(),
                found: value.shape().to_owned(),
            });
        }
    }
    Ok(())
}

/// A [`FunctionInvoker`] dispatching through a shared [`FunctionTable`].
pub struct TableInvoker<D> {
    state: D,
    table: Arc<FunctionTable<D>>,
}

impl<D> TableInvoker<D> {
    /// Pairs per-session driver state with the interface's table.
    #[must_use]
    pub const fn new(state: D, table: Arc<FunctionTable<D>>) -> Self {
        Self { state, table }
    }

    /// Driver state, for inspection.
    #[must_use]
    pub const fn state(&self) -> &D {
        &self.state
    }
}

impl<D> FunctionInvoker for TableInvoker<D> {
    fn interface(&self) -> &InterfaceSpecification {
        self.table.interface()
    }

    fn call(
        &mut self,
        spec: &FunctionSpecDescription,
        callbacks: &CallbackChannel,
    ) -> Result<Invocation, InvokeError> {
        let entry = self
            .table
            .entry(&spec.name)
            .ok_or_else(|| InvokeError::NotFound {
                name: spec.name.clone(),
            })?;
        check_arguments(&entry.signature, &spec.args)
            .map_err(|source| InvokeError::arguments(&spec.name, source))?;

        let measurement = Measurement::start();
        let results = (entry.handler)(&mut self.state, Arguments::new(&spec.args), callbacks)?;
        let elapsed = measurement.stop();

        if results.len() != entry.signature.returns.len() {
            return Err(InvokeError::driver(
                &spec.name,
                format!(
                    "returned {} value(s), signature declares {}",
                    results.len(),
                    entry.signature.returns.len()
                ),
            ));
        }
        debug!(
            target: INVOKE_TARGET,
            function = %spec.name,
            elapsed_ns = as_nanos(elapsed),
            "native call completed"
        );
        Ok(Invocation { results, elapsed })
    }

    fn verify(
        &self,
        expected: &VerificationDescription,
        actual: &[VariableValue],
    ) -> Result<(), VerifyError> {
        let entry = self
            .table
            .entry(&expected.name)
            .ok_or_else(|| VerifyError::UnknownFunction {
                name: expected.name.clone(),
            })?;
        verify::check_count(&expected.expected, actual)?;
        match entry.verifier {
            Some(custom) => custom(&expected.expected, actual),
            None => verify::compare_results(&expected.expected, actual),
        }
    }

    fn attribute(&self, name: &str) -> Result<VariableValue, InvokeError> {
        self.table
            .attributes
            .get(name)
            .map(|attribute| (attribute.getter)(&self.state))
            .ok_or_else(|| InvokeError::AttributeNotFound {
                name: name.to_owned(),
            })
    }
}
