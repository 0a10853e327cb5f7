//! In-memory reference driver for an NFC-style controller.
//!
//! The loopback controller answers every call without hardware: writes are
//! recorded and echoed back to the agent through the `sendData` callback,
//! lifecycle calls report completion through `sendEvent`. It is registered
//! in the daemon's default driver set so agents can exercise the full
//! command path, and it serves as the worked example of a
//! [`FunctionTable`]-based driver.

use std::sync::Arc;

use halprobe_types::{
    AttributeSpec, ComponentClass, FunctionSignature, InterfaceSpecification, ScalarKind,
    TypeDescriptor, VariableValue,
};
use tracing::warn;

use crate::INVOKE_TARGET;
use crate::callback::{CallbackChannel, CallbackRegistry};
use crate::error::{CallbackError, DriverError, InvokeError};
use crate::invoker::{FunctionInvoker, FunctionTable, TableInvoker};
use crate::marshal::{Arguments, NativeEnum, pack_enum, pack_scalar, pack_vector};
use crate::registry::{DriverKey, DriverRegistry, TargetComponent};
use crate::verify::compare_enums;

/// Package of the loopback interface.
pub const PACKAGE: &str = "loopback.nfc";
/// Interface name of the loopback controller.
pub const INTERFACE: &str = "INfc";
/// Interface version.
pub const VERSION: f32 = 1.0;
/// Callback interface agents implement to receive events.
pub const CLIENT_CALLBACK: &str = "loopback.nfc@1.0::INfcClientCallback";
/// Largest payload `write` accepts.
pub const DEFAULT_MAX_PAYLOAD: u32 = 255;

/// Status returned by controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcStatus {
    /// Operation accepted.
    Ok,
    /// Operation refused in the current state.
    Failed,
    /// Transport error.
    ErrTransport,
    /// Command timed out.
    ErrCmdTimeout,
    /// Request refused.
    Refused,
}

impl NativeEnum for NfcStatus {
    const TYPE_NAME: &'static str = "loopback.nfc@1.0::NfcStatus";
    type Repr = u32;

    fn from_repr(repr: u32) -> Option<Self> {
        match repr {
            0 => Some(Self::Ok),
            1 => Some(Self::Failed),
            2 => Some(Self::ErrTransport),
            3 => Some(Self::ErrCmdTimeout),
            4 => Some(Self::Refused),
            _ => None,
        }
    }

    fn to_repr(self) -> u32 {
        match self {
            Self::Ok => 0,
            Self::Failed => 1,
            Self::ErrTransport => 2,
            Self::ErrCmdTimeout => 3,
            Self::Refused => 4,
        }
    }
}

/// Events reported through `sendEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcEvent {
    /// `open` completed.
    OpenCplt,
    /// `close` completed.
    CloseCplt,
    /// `coreInitialized` completed.
    PostInitCplt,
    /// `prediscover` completed.
    PreDiscoverCplt,
    /// The controller requests control.
    RequestControl,
    /// The controller releases control.
    ReleaseControl,
    /// The controller hit an error.
    Error,
}

impl NativeEnum for NfcEvent {
    const TYPE_NAME: &'static str = "loopback.nfc@1.0::NfcEvent";
    type Repr = u32;

    fn from_repr(repr: u32) -> Option<Self> {
        match repr {
            0 => Some(Self::OpenCplt),
            1 => Some(Self::CloseCplt),
            2 => Some(Self::PostInitCplt),
            3 => Some(Self::PreDiscoverCplt),
            4 => Some(Self::RequestControl),
            5 => Some(Self::ReleaseControl),
            6 => Some(Self::Error),
            _ => None,
        }
    }

    fn to_repr(self) -> u32 {
        match self {
            Self::OpenCplt => 0,
            Self::CloseCplt => 1,
            Self::PostInitCplt => 2,
            Self::PreDiscoverCplt => 3,
            Self::RequestControl => 4,
            Self::ReleaseControl => 5,
            Self::Error => 6,
        }
    }
}

/// Per-session controller state.
#[derive(Debug)]
pub struct LoopbackNfc {
    service_name: String,
    opened: bool,
    callbacks: CallbackRegistry,
    written: Vec<u8>,
    max_payload: u32,
}

impl LoopbackNfc {
    /// A closed controller for the named service instance.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            opened: false,
            callbacks: CallbackRegistry::new(),
            written: Vec::new(),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Service instance the controller was opened for.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Whether `open` has succeeded and `close` has not followed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.opened
    }

    /// Every byte written since the controller was created.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    fn emit(&self, channel: &CallbackChannel, function: &str, args: Vec<VariableValue>) {
        let Ok(request) = self.callbacks.request(function, args) else {
            return;
        };
        match channel.notify(&request) {
            Ok(()) | Err(CallbackError::NotConnected) => {}
            Err(error) => warn!(
                target: INVOKE_TARGET,
                callback = function,
                %error,
                "loopback callback not delivered"
            ),
        }
    }

    fn event(&self, channel: &CallbackChannel, event: NfcEvent, status: NfcStatus) {
        self.emit(
            channel,
            "sendEvent",
            vec![pack_enum(event), pack_enum(status)],
        );
    }

    const fn status_if_open(&self) -> NfcStatus {
        if self.opened {
            NfcStatus::Ok
        } else {
            NfcStatus::Failed
        }
    }
}

type Outcome = Result<Vec<VariableValue>, InvokeError>;

fn status(value: NfcStatus) -> Outcome {
    Ok(vec![pack_enum(value)])
}

fn open(state: &mut LoopbackNfc, args: Arguments<'_>, channel: &CallbackChannel) -> Outcome {
    let client = args
        .callback(0)
        .map_err(|source| InvokeError::arguments("open", source))?;
    state.callbacks.register("sendEvent", client);
    state.callbacks.register("sendData", client);
    state.opened = true;
    state.event(channel, NfcEvent::OpenCplt, NfcStatus::Ok);
    status(NfcStatus::Ok)
}

fn write(state: &mut LoopbackNfc, args: Arguments<'_>, channel: &CallbackChannel) -> Outcome {
    let data: Vec<u8> = args
        .vector(0)
        .map_err(|source| InvokeError::arguments("write", source))?;
    let accepted = u32::try_from(data.len())
        .ok()
        .filter(|len| state.opened && *len <= state.max_payload)
        .unwrap_or(0);
    if accepted > 0 {
        state.written.extend_from_slice(&data);
        state.emit(channel, "sendData", vec![pack_vector(data.as_slice())]);
    }
    Ok(vec![pack_scalar(accepted)])
}

fn core_initialized(
    state: &mut LoopbackNfc,
    args: Arguments<'_>,
    channel: &CallbackChannel,
) -> Outcome {
    args.vector::<u8>(0)
        .map_err(|source| InvokeError::arguments("coreInitialized", source))?;
    let result = state.status_if_open();
    if result == NfcStatus::Ok {
        state.event(channel, NfcEvent::PostInitCplt, NfcStatus::Ok);
    }
    status(result)
}

fn prediscover(state: &mut LoopbackNfc, _: Arguments<'_>, channel: &CallbackChannel) -> Outcome {
    let result = state.status_if_open();
    if result == NfcStatus::Ok {
        state.event(channel, NfcEvent::PreDiscoverCplt, NfcStatus::Ok);
    }
    status(result)
}

fn close(state: &mut LoopbackNfc, _: Arguments<'_>, channel: &CallbackChannel) -> Outcome {
    if !state.opened {
        return status(NfcStatus::Failed);
    }
    state.opened = false;
    state.event(channel, NfcEvent::CloseCplt, NfcStatus::Ok);
    state.callbacks.clear();
    status(NfcStatus::Ok)
}

fn control_granted(state: &mut LoopbackNfc, _: Arguments<'_>, _: &CallbackChannel) -> Outcome {
    status(state.status_if_open())
}

fn power_cycle(state: &mut LoopbackNfc, _: Arguments<'_>, channel: &CallbackChannel) -> Outcome {
    let result = state.status_if_open();
    if result == NfcStatus::Ok {
        state.event(channel, NfcEvent::OpenCplt, NfcStatus::Ok);
    }
    status(result)
}

fn bytes() -> TypeDescriptor {
    TypeDescriptor::vector(TypeDescriptor::scalar(ScalarKind::Uint8))
}

fn status_function(name: &str, args: Vec<TypeDescriptor>) -> FunctionSignature {
    FunctionSignature::new(name, args, vec![NfcStatus::descriptor()])
}

/// Identity of the loopback interface.
#[must_use]
pub fn interface() -> InterfaceSpecification {
    table().interface().clone()
}

/// Registry key of the loopback driver.
#[must_use]
pub fn driver_key() -> DriverKey {
    DriverKey::new(ComponentClass::HalHidl, Some(PACKAGE), 0, VERSION, INTERFACE)
}

/// Dispatch table of the loopback controller.
#[must_use]
pub fn table() -> FunctionTable<LoopbackNfc> {
    let identity = InterfaceSpecification {
        component_class: ComponentClass::HalHidl,
        component_type: 0,
        component_type_version: VERSION,
        package: Some(PACKAGE.to_owned()),
        component_name: INTERFACE.to_owned(),
        functions: Vec::new(),
        attributes: Vec::new(),
    };
    let by_status = compare_enums::<NfcStatus>;
    FunctionTable::new(identity)
        .function_verified_by(
            status_function(
                "open",
                vec![TypeDescriptor::Callback {
                    interface: CLIENT_CALLBACK.to_owned(),
                }],
            ),
            open,
            by_status,
        )
        .function(
            FunctionSignature::new(
                "write",
                vec![bytes()],
                vec![TypeDescriptor::scalar(ScalarKind::Uint32)],
            ),
            write,
        )
        .function_verified_by(
            status_function("coreInitialized", vec![bytes()]),
            core_initialized,
            by_status,
        )
        .function_verified_by(status_function("prediscover", Vec::new()), prediscover, by_status)
        .function_verified_by(status_function("close", Vec::new()), close, by_status)
        .function_verified_by(
            status_function("controlGranted", Vec::new()),
            control_granted,
            by_status,
        )
        .function_verified_by(status_function("powerCycle", Vec::new()), power_cycle, by_status)
        .attribute(
            AttributeSpec {
                name: "max_payload".to_owned(),
                ty: TypeDescriptor::scalar(ScalarKind::Uint32),
            },
            |state: &LoopbackNfc| pack_scalar(state.max_payload),
        )
}

/// Adds the loopback driver to `registry`.
///
/// The dispatch table is built here, once, and shared by every session that
/// opens the driver.
///
/// # Errors
///
/// Returns [`DriverError::Duplicate`] when the loopback key is taken.
pub fn register(registry: &mut DriverRegistry) -> Result<(), DriverError> {
    let shared = Arc::new(table());
    registry.register(driver_key(), move |target: &TargetComponent| {
        let driver = TableInvoker::new(LoopbackNfc::new(&target.service_name), Arc::clone(&shared));
        Ok(Box::new(driver) as Box<dyn FunctionInvoker>)
    })
}

#[cfg(test)]
mod tests;
