//! Line framing of command and response records.

use std::io::{self, BufRead, Write};

use halprobe_types::ResponseRecord;

use super::SessionError;

/// Largest command line accepted, excluding the newline.
pub(crate) const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Reads one newline-terminated frame.
///
/// Partial reads accumulate until a newline arrives. Returns `Ok(None)` when
/// the peer closes the connection before sending any byte of a new frame;
/// a final frame without its newline is returned as is.
pub(crate) fn read_frame<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>, SessionError> {
    let mut frame = Vec::new();
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(SessionError::Read { source }),
        };
        if available.is_empty() {
            return Ok((!frame.is_empty()).then_some(frame));
        }
        let newline = available.iter().position(|byte| *byte == b'\n');
        let chunk = match newline {
            Some(end) => available.split_at(end).0,
            None => available,
        };
        if frame.len() + chunk.len() > MAX_FRAME_BYTES {
            return Err(SessionError::FrameTooLarge {
                limit: MAX_FRAME_BYTES,
            });
        }
        frame.extend_from_slice(chunk);
        let consumed = chunk.len() + usize::from(newline.is_some());
        reader.consume(consumed);
        if newline.is_some() {
            return Ok(Some(frame));
        }
    }
}

/// Writes response records as single lines.
pub(crate) struct ResponseWriter<W> {
    inner: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(crate) const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Serialises `response`, terminates it with a newline and flushes.
    pub(crate) fn write_response(&mut self, response: &ResponseRecord) -> Result<(), SessionError> {
        let mut line =
            serde_json::to_vec(response).map_err(|source| SessionError::Encode { source })?;
        line.push(b'\n');
        self.inner
            .write_all(&line)
            .and_then(|()| self.inner.flush())
            .map_err(|source| SessionError::Write { source })
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}
