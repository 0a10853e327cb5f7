//! Command and response records exchanged on a session socket.

use serde::{Deserialize, Serialize};

/// Wire enumeration of session commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    /// Ends the session after acknowledging.
    Exit,
    /// Loads a target component into the session.
    LoadHal,
    /// Liveness and introspection probe.
    GetStatus,
    /// Invokes a function on the loaded component.
    CallFunction,
    /// Describes the loaded component's interface.
    ListFunctions,
}

impl CommandType {
    /// Canonical wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exit => "EXIT",
            Self::LoadHal => "LOAD_HAL",
            Self::GetStatus => "GET_STATUS",
            Self::CallFunction => "CALL_FUNCTION",
            Self::ListFunctions => "LIST_FUNCTIONS",
        }
    }
}

/// One command as it appears on the wire.
///
/// Only the fields belonging to `command_type` are meaningful; the rest are
/// ignored by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Selects the operation.
    pub command_type: CommandType,
    /// Path of the target component (`LOAD_HAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Numeric component class (`LOAD_HAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_class: Option<i32>,
    /// Numeric component type (`LOAD_HAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<i32>,
    /// Component version (`LOAD_HAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<f32>,
    /// Module, package or component name (`LOAD_HAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Status query kind (`GET_STATUS`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<i32>,
    /// Serialised function description (`CALL_FUNCTION`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
}

impl CommandRecord {
    const fn bare(command_type: CommandType) -> Self {
        Self {
            command_type,
            file_path: None,
            target_class: None,
            target_type: None,
            target_version: None,
            module_name: None,
            status_type: None,
            arg: None,
        }
    }

    /// Builds an `EXIT` command.
    #[must_use]
    pub const fn exit() -> Self {
        Self::bare(CommandType::Exit)
    }

    /// Builds a `LOAD_HAL` command.
    #[must_use]
    pub fn load_hal(request: LoadRequest) -> Self {
        Self {
            file_path: Some(request.path),
            target_class: Some(request.class),
            target_type: Some(request.component_type),
            target_version: Some(request.version),
            module_name: Some(request.module_name),
            ..Self::bare(CommandType::LoadHal)
        }
    }

    /// Builds a `GET_STATUS` command.
    #[must_use]
    pub fn get_status(kind: i32) -> Self {
        Self {
            status_type: Some(kind),
            ..Self::bare(CommandType::GetStatus)
        }
    }

    /// Builds a `CALL_FUNCTION` command carrying serialised text.
    #[must_use]
    pub fn call_function(arg: impl Into<String>) -> Self {
        Self {
            arg: Some(arg.into()),
            ..Self::bare(CommandType::CallFunction)
        }
    }

    /// Builds a `LIST_FUNCTIONS` command.
    #[must_use]
    pub const fn list_functions() -> Self {
        Self::bare(CommandType::ListFunctions)
    }

    /// Projects the record onto the payload its command type owns.
    ///
    /// Absent fields take their zero value, so a `LOAD_HAL` missing its path
    /// reaches the loader as an empty path and fails there.
    #[must_use]
    pub fn into_command(self) -> Command {
        match self.command_type {
            CommandType::Exit => Command::Exit,
            CommandType::LoadHal => Command::LoadHal(LoadRequest {
                path: self.file_path.unwrap_or_default(),
                class: self.target_class.unwrap_or_default(),
                component_type: self.target_type.unwrap_or_default(),
                version: self.target_version.unwrap_or_default(),
                module_name: self.module_name.unwrap_or_default(),
            }),
            CommandType::GetStatus => Command::GetStatus {
                kind: self.status_type.unwrap_or_default(),
            },
            CommandType::CallFunction => Command::CallFunction {
                arg: self.arg.unwrap_or_default(),
            },
            CommandType::ListFunctions => Command::ListFunctions,
        }
    }
}

/// Parameters of a `LOAD_HAL` command.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Path of the target component library.
    pub path: String,
    /// Numeric component class.
    pub class: i32,
    /// Numeric component type.
    pub component_type: i32,
    /// Component version.
    pub version: f32,
    /// Module, package or component name.
    pub module_name: String,
}

/// A command with exactly one meaningful payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// End the session.
    Exit,
    /// Load a target component.
    LoadHal(LoadRequest),
    /// Status probe of the given kind.
    GetStatus {
        /// Caller-defined status kind.
        kind: i32,
    },
    /// Invoke a function described by serialised text.
    CallFunction {
        /// Serialised [`crate::FunctionSpecDescription`].
        arg: String,
    },
    /// Describe the loaded interface.
    ListFunctions,
}

impl Command {
    /// Command type this payload belongs to.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        match self {
            Self::Exit => CommandType::Exit,
            Self::LoadHal(_) => CommandType::LoadHal,
            Self::GetStatus { .. } => CommandType::GetStatus,
            Self::CallFunction { .. } => CommandType::CallFunction,
            Self::ListFunctions => CommandType::ListFunctions,
        }
    }
}

/// Outcome code of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    /// The driver handled the command.
    Success,
    /// The driver could not produce a usable result.
    Fail,
}

/// One response as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Outcome code.
    pub response_code: ResponseCode,
    /// Integer result (`LOAD_HAL`, `GET_STATUS`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<i32>,
    /// Text result (`CALL_FUNCTION`, `LIST_FUNCTIONS`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_message: Option<String>,
}

impl ResponseRecord {
    /// A `SUCCESS` response with no payload.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            response_code: ResponseCode::Success,
            return_value: None,
            return_message: None,
        }
    }

    /// A `FAIL` response with no payload.
    #[must_use]
    pub const fn failure() -> Self {
        Self {
            response_code: ResponseCode::Fail,
            return_value: None,
            return_message: None,
        }
    }

    /// A `SUCCESS` response carrying an integer.
    #[must_use]
    pub const fn with_value(value: i32) -> Self {
        Self {
            response_code: ResponseCode::Success,
            return_value: Some(value),
            return_message: None,
        }
    }

    /// A `SUCCESS` response carrying text.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            response_code: ResponseCode::Success,
            return_value: None,
            return_message: Some(message.into()),
        }
    }

    /// Whether the response code is `SUCCESS`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_code == ResponseCode::Success
    }
}
