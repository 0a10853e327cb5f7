//! Answers to `GET_STATUS` probes.

/// Produces the value returned for a `GET_STATUS` command.
///
/// One probe is shared by every session of a daemon run.
pub trait StatusProbe: Send + Sync {
    /// Status value for the caller-defined `kind`.
    fn status(&self, kind: i32) -> i32;
}

/// Probe answering every kind with the same value.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedStatusProbe(i32);

impl FixedStatusProbe {
    /// Creates a probe that always reports `value`.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }
}

impl StatusProbe for FixedStatusProbe {
    fn status(&self, _kind: i32) -> i32 {
        self.0
    }
}
