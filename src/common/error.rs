// src/common/error.rs

use super::header::ResponseHeader;
use crate::processor::CreateError;

/// Errors surfaced by [`Board`](crate::board::Board) operations.
///
/// Generic over the error type of the underlying [`DeviceLink`](super::DeviceLink).
#[derive(Debug, thiserror::Error)]
pub enum BoardError<E = ()>
where
    E: core::fmt::Debug,
{
    /// The link refused the command.
    #[error("Link error: {0:?}")]
    Link(E),

    /// An encoded command would not fit in a single write.
    #[error(transparent)]
    CommandTooLong(#[from] CommandTooLong),

    /// Processor configuration bytes exceed what a create command can carry.
    #[error(transparent)]
    ConfigTooLong(#[from] ConfigTooLong),

    /// A processor could not be created. The creation callback has already
    /// been invoked with the same error.
    #[error("Processor creation failed: {0}")]
    Create(#[from] CreateError),

    /// The signal is not a processor confirmed by the board.
    #[error("Signal {0} is not a created processor")]
    NotAProcessor(ResponseHeader),
}

/// An encoded command is larger than the link accepts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("Command needs {needed} bytes, limit is {limit}")]
pub struct CommandTooLong {
    pub needed: usize,
    pub limit: usize,
}

/// Processor configuration is larger than a create command can carry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("Processor config is {len} bytes, limit is {limit}")]
pub struct ConfigTooLong {
    pub len: usize,
    pub limit: usize,
}
