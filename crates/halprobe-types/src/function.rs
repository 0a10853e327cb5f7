//! Function call descriptions and their results.

use serde::{Deserialize, Serialize};

use crate::value::VariableValue;

/// What a [`FunctionSpecDescription`] addresses on the loaded component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallTarget {
    /// A callable function.
    #[default]
    Function,
    /// A read-only attribute.
    Attribute,
}

/// A request to invoke one function on the loaded component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpecDescription {
    /// Function (or attribute) name.
    pub name: String,
    /// Whether `name` is a function or an attribute.
    #[serde(default)]
    pub target: CallTarget,
    /// Positional arguments in declaration order.
    #[serde(default)]
    pub args: Vec<VariableValue>,
    /// When present, the invocation result is verified against these values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_results: Option<Vec<VariableValue>>,
}

impl FunctionSpecDescription {
    /// Describes a call to `name` with `args`.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<VariableValue>) -> Self {
        Self {
            name: name.into(),
            target: CallTarget::Function,
            args,
            expected_results: None,
        }
    }

    /// Describes a read of the attribute `name`.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: CallTarget::Attribute,
            args: Vec::new(),
            expected_results: None,
        }
    }

    /// Attaches expected results to verify against.
    #[must_use]
    pub fn expecting(mut self, expected: Vec<VariableValue>) -> Self {
        self.expected_results = Some(expected);
        self
    }

    /// Verification description derived from `expected_results`, if any.
    #[must_use]
    pub fn verification(&self) -> Option<VerificationDescription> {
        self.expected_results
            .as_ref()
            .map(|expected| VerificationDescription {
                name: self.name.clone(),
                expected: expected.clone(),
            })
    }
}

/// Expected results of one function, compared against an actual result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDescription {
    /// Function the expectations belong to.
    pub name: String,
    /// Expected values in declaration order.
    pub expected: Vec<VariableValue>,
}

/// Outcome of one invocation, returned as the `CALL_FUNCTION` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    /// Function that was invoked.
    pub name: String,
    /// Native return values in declaration order.
    pub results: Vec<VariableValue>,
    /// Wall-clock duration of the native call, in nanoseconds.
    pub elapsed_ns: u64,
    /// Verification outcome when expectations were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}
