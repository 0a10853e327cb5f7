//! Maps command records to response records.

use std::sync::Arc;
use std::time::Duration;

use halprobe_config::DEFAULT_SLOW_CALL_MS;
use halprobe_types::{
    Command, CommandRecord, FunctionResult, FunctionSpecDescription, LoadRequest, ResponseRecord,
    decode_text, encode_text,
};
use tracing::{debug, warn};

use crate::health::HealthReporter;
use crate::session::SessionId;
use crate::spec::SpecificationBuilder;

use super::{DISPATCH_TARGET, DispatchError, FixedStatusProbe, StatusProbe};

/// Whether the session keeps reading after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionControl {
    /// Read the next command.
    Continue,
    /// Stop once the response is sent.
    Terminate,
}

/// Response to one command plus the session's next step.
#[derive(Debug)]
pub(crate) struct Dispatched {
    pub(crate) response: ResponseRecord,
    pub(crate) control: SessionControl,
}

impl Dispatched {
    const fn proceed(response: ResponseRecord) -> Self {
        Self {
            response,
            control: SessionControl::Continue,
        }
    }

    const fn terminate(response: ResponseRecord) -> Self {
        Self {
            response,
            control: SessionControl::Terminate,
        }
    }
}

/// Routes commands of one session to its specification builder.
pub(crate) struct CommandDispatcher<B> {
    session: SessionId,
    builder: B,
    reporter: Arc<dyn HealthReporter>,
    status: Arc<dyn StatusProbe>,
    slow_call: Duration,
}

impl<B: SpecificationBuilder> CommandDispatcher<B> {
    pub(crate) fn new(session: SessionId, builder: B, reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            session,
            builder,
            reporter,
            status: Arc::new(FixedStatusProbe::default()),
            slow_call: Duration::from_millis(DEFAULT_SLOW_CALL_MS),
        }
    }

    /// Replaces the probe answering `GET_STATUS`.
    pub(crate) fn with_status_probe(mut self, status: Arc<dyn StatusProbe>) -> Self {
        self.status = status;
        self
    }

    /// Native calls slower than `threshold` are logged as warnings.
    pub(crate) const fn with_slow_call_threshold(mut self, threshold: Duration) -> Self {
        self.slow_call = threshold;
        self
    }

    /// Handles one command.
    pub(crate) fn dispatch(&mut self, record: CommandRecord) -> Dispatched {
        let command = record.into_command();
        debug!(
            target: DISPATCH_TARGET,
            session = %self.session,
            command = command.command_type().as_str(),
            "dispatching command"
        );
        match command {
            Command::Exit => Dispatched::terminate(ResponseRecord::success()),
            Command::LoadHal(request) => Dispatched::proceed(self.load_hal(&request)),
            Command::GetStatus { kind } => {
                Dispatched::proceed(ResponseRecord::with_value(self.status.status(kind)))
            }
            Command::CallFunction { arg } => Dispatched::proceed(self.call_function(&arg)),
            Command::ListFunctions => Dispatched::proceed(self.list_functions()),
        }
    }

    fn load_hal(&mut self, request: &LoadRequest) -> ResponseRecord {
        match self.builder.load_component(request) {
            Ok(()) => {
                self.reporter.component_loaded(self.session, request);
                ResponseRecord::with_value(0)
            }
            Err(error) => {
                self.reporter
                    .component_failed(self.session, request, &error);
                ResponseRecord::with_value(-1)
            }
        }
    }

    fn call_function(&mut self, arg: &str) -> ResponseRecord {
        match self.try_call_function(arg) {
            Ok(message) => ResponseRecord::with_message(message),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    session = %self.session,
                    error = %error,
                    "CALL_FUNCTION failed"
                );
                ResponseRecord::failure()
            }
        }
    }

    fn try_call_function(&mut self, arg: &str) -> Result<String, DispatchError> {
        let call: FunctionSpecDescription =
            decode_text(arg).map_err(DispatchError::MalformedCall)?;
        let result = self.builder.invoke_function(&call)?;
        self.watch(&result);
        encode_text(&result).map_err(DispatchError::Encode)
    }

    fn watch(&self, result: &FunctionResult) {
        let elapsed = Duration::from_nanos(result.elapsed_ns);
        if elapsed > self.slow_call {
            warn!(
                target: DISPATCH_TARGET,
                session = %self.session,
                function = %result.name,
                elapsed_ms = elapsed.as_millis(),
                threshold_ms = self.slow_call.as_millis(),
                "native call exceeded the slow-call threshold"
            );
        }
    }

    fn list_functions(&self) -> ResponseRecord {
        let Some(spec) = self.builder.interface_specification() else {
            return ResponseRecord::success();
        };
        match encode_text(&spec) {
            Ok(text) => ResponseRecord::with_message(text),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    session = %self.session,
                    error = %DispatchError::Encode(error),
                    "LIST_FUNCTIONS failed"
                );
                ResponseRecord::failure()
            }
        }
    }
}
