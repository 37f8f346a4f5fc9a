// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction over the write side of the board transport (e.g. a BLE
/// characteristic write without response).
///
/// Commands are fire-and-forget: `Ok(())` only means the link accepted the
/// bytes, not that the board acted on them. Inbound notifications travel the
/// other way and are fed to [`Board::handle_packet`](crate::board::Board::handle_packet)
/// by whoever owns the notify path.
pub trait DeviceLink {
    /// Associated error type for link failures.
    type Error: Debug;

    /// Attempts to queue one complete command for transmission.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the link cannot take the command
    /// yet (e.g. its write queue is full). Other errors are returned as
    /// `Err(nb::Error::Other(Self::Error))`. A command is never split across calls.
    fn write_command(&mut self, bytes: &[u8]) -> nb::Result<(), Self::Error>;
}
