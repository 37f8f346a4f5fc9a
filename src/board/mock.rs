// src/board/mock.rs

use alloc::vec::Vec;

use crate::common::DeviceLink;

// --- Mock Link Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockLinkError;

// --- Mock Link ---
/// Records every accepted command. Can report `WouldBlock` a few times
/// before accepting, or start failing after a number of writes.
#[derive(Debug, Default)]
pub(crate) struct MockLink {
    sent: Vec<Vec<u8>>,
    attempts: usize,
    block_remaining: usize,
    fail_after: Option<usize>,
}

impl MockLink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer the next `count` writes with `WouldBlock`.
    pub(crate) fn would_block(mut self, count: usize) -> Self {
        self.block_remaining = count;
        self
    }

    /// Reject every write.
    pub(crate) fn failing(self) -> Self {
        self.fail_after(0)
    }

    /// Accept `accepted` writes, then reject the rest.
    pub(crate) fn fail_after(mut self, accepted: usize) -> Self {
        self.fail_after = Some(accepted);
        self
    }

    pub(crate) fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts
    }

    pub(crate) fn clear(&mut self) {
        self.sent.clear();
        self.attempts = 0;
    }
}

impl DeviceLink for MockLink {
    type Error = MockLinkError;

    fn write_command(&mut self, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        self.attempts += 1;
        if self.block_remaining > 0 {
            self.block_remaining -= 1;
            return Err(nb::Error::WouldBlock);
        }
        if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
            return Err(nb::Error::Other(MockLinkError));
        }
        self.sent.push(bytes.to_vec());
        Ok(())
    }
}

/// Routes `log` output through the test harness. Safe to call from every test.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
