//! Command loop of one session.

use std::io::{BufRead, Write};

use halprobe_types::CommandRecord;
use tracing::debug;

use crate::dispatch::{CommandDispatcher, Dispatched, SessionControl};
use crate::spec::SpecificationBuilder;

use super::{ResponseWriter, SESSION_TARGET, SessionError, SessionId, read_frame};

/// Where a session stands after handling one frame.
#[derive(Debug)]
pub(crate) enum SessionState {
    /// Waiting for the next command.
    Running,
    /// No further commands will be read.
    Terminated(SessionEnd),
}

/// Why a session stopped.
#[derive(Debug)]
pub enum SessionEnd {
    /// The agent sent `EXIT`.
    Exited,
    /// The agent closed the connection.
    PeerClosed,
    /// Reading, decoding or answering a command failed.
    Failed(SessionError),
}

/// Outcome of a finished session.
#[derive(Debug)]
pub struct SessionSummary {
    /// Session that finished.
    pub session: SessionId,
    /// Commands dispatched, including the final `EXIT`.
    pub commands: u64,
    /// Reason the session stopped.
    pub end: SessionEnd,
}

/// Serves commands read from one connection.
pub(crate) struct SessionServer<B> {
    session: SessionId,
    dispatcher: CommandDispatcher<B>,
    commands: u64,
}

impl<B: SpecificationBuilder> SessionServer<B> {
    pub(crate) const fn new(session: SessionId, dispatcher: CommandDispatcher<B>) -> Self {
        Self {
            session,
            dispatcher,
            commands: 0,
        }
    }

    /// Serves commands until the session terminates.
    pub(crate) fn run<R: BufRead, W: Write>(mut self, mut reader: R, writer: W) -> SessionSummary {
        let mut writer = ResponseWriter::new(writer);
        let end = loop {
            if let SessionState::Terminated(end) = self.advance(&mut reader, &mut writer) {
                break end;
            }
        };
        debug!(
            target: SESSION_TARGET,
            session = %self.session,
            commands = self.commands,
            end = ?end,
            "session loop finished"
        );
        SessionSummary {
            session: self.session,
            commands: self.commands,
            end,
        }
    }

    /// Reads, dispatches and answers at most one command.
    pub(crate) fn advance<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut ResponseWriter<W>,
    ) -> SessionState {
        self.try_advance(reader, writer)
            .unwrap_or_else(|error| SessionState::Terminated(SessionEnd::Failed(error)))
    }

    fn try_advance<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut ResponseWriter<W>,
    ) -> Result<SessionState, SessionError> {
        let Some(frame) = read_frame(reader)? else {
            return Ok(SessionState::Terminated(SessionEnd::PeerClosed));
        };
        let record: CommandRecord =
            serde_json::from_slice(&frame).map_err(|source| SessionError::Decode { source })?;
        self.commands += 1;
        let Dispatched { response, control } = self.dispatcher.dispatch(record);
        writer.write_response(&response)?;
        Ok(match control {
            SessionControl::Continue => SessionState::Running,
            SessionControl::Terminate => SessionState::Terminated(SessionEnd::Exited),
        })
    }
}
