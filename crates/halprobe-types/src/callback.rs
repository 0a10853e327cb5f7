use serde::{Deserialize, Serialize};

use crate::value::VariableValue;

/// Notification delivered to the agent when a target invokes a callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRequest {
    /// Agent-assigned identifier of the registered callback.
    pub id: String,
    /// Name of the callback function the target invoked.
    pub name: String,
    /// Arguments the target passed, in declaration order.
    #[serde(default)]
    pub args: Vec<VariableValue>,
}

impl CallbackRequest {
    /// Builds a callback notification.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Vec<VariableValue>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}
