use thiserror::Error;

/// Errors surfaced to the host, see [crate::prelude::Source::last_error].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The line supplying resource could not be acquired:
    /// the daemon is not reachable or refused a new client.
    #[error("failed to access the nmea line provider")]
    AccessError,
}
