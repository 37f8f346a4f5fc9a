// src/board/event.rs

use alloc::vec::Vec;
use log::debug;

use super::Board;
use crate::common::{BoardError, Command, DeviceLink, ResponseHeader};

/// Firmware command ids programmed against one event, in the order they
/// were recorded. No duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLedger {
    command_ids: Vec<u8>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `command_id` was already recorded.
    pub fn record(&mut self, command_id: u8) -> bool {
        if self.command_ids.contains(&command_id) {
            return false;
        }
        self.command_ids.push(command_id);
        true
    }

    pub fn command_ids(&self) -> &[u8] {
        &self.command_ids
    }

    pub fn is_empty(&self) -> bool {
        self.command_ids.is_empty()
    }

    fn take(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.command_ids)
    }
}

impl<L> Board<L>
where
    L: DeviceLink,
{
    /// Notes that the board programmed command `command_id` against `event`.
    pub fn record_event_command(&mut self, event: &ResponseHeader, command_id: u8) -> bool {
        self.ledgers.entry(*event).or_default().record(command_id)
    }

    pub fn event_command_ids(&self, event: &ResponseHeader) -> &[u8] {
        self.ledgers
            .get(event)
            .map(EventLedger::command_ids)
            .unwrap_or(&[])
    }

    /// Erases every command recorded against `event`, one remove command
    /// per id, in recording order. Returns how many were erased.
    ///
    /// If the link fails part way, the ids not yet sent stay recorded.
    pub fn erase_event_commands(&mut self, event: &ResponseHeader) -> Result<usize, BoardError<L::Error>> {
        let Some(ids) = self.ledgers.get_mut(event).map(EventLedger::take) else {
            return Ok(0);
        };

        for (sent, command_id) in ids.iter().enumerate() {
            if let Err(e) = self.send_command(&Command::RemoveEventCommand { command_id: *command_id }) {
                let ledger = self.ledgers.entry(*event).or_default();
                for unsent in &ids[sent..] {
                    ledger.record(*unsent);
                }
                return Err(e);
            }
        }

        self.ledgers.remove(event);
        debug!("Erased {} commands for event {}", ids.len(), event);
        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::mock::{init_logger, MockLink};
    use alloc::vec;

    #[test]
    fn test_ledger_dedups_and_keeps_order() {
        let mut ledger = EventLedger::new();
        assert!(ledger.record(9));
        assert!(ledger.record(3));
        assert!(!ledger.record(9));
        assert_eq!(ledger.command_ids(), &[9, 3]);
    }

    #[test]
    fn test_erase_sends_one_remove_per_id_in_order() {
        init_logger();
        let mut board = Board::new(MockLink::new());
        let event = ResponseHeader::new(0x01, 0x01);
        for id in [3, 7, 9] {
            board.record_event_command(&event, id);
        }

        assert_eq!(board.erase_event_commands(&event).unwrap(), 3);
        assert_eq!(
            board.link().sent(),
            &[vec![0x0A, 0x04, 0x03], vec![0x0A, 0x04, 0x07], vec![0x0A, 0x04, 0x09]]
        );
        assert!(board.event_command_ids(&event).is_empty());
    }

    #[test]
    fn test_erase_unknown_event_sends_nothing() {
        let mut board = Board::new(MockLink::new());
        assert_eq!(board.erase_event_commands(&ResponseHeader::new(0x01, 0x01)).unwrap(), 0);
        assert!(board.link().sent().is_empty());
    }

    #[test]
    fn test_erase_keeps_unsent_ids_on_link_failure() {
        let mut board = Board::new(MockLink::new().fail_after(1));
        let event = ResponseHeader::with_id(0x01, 0x01, 0);
        for id in [3, 7, 9] {
            board.record_event_command(&event, id);
        }

        assert!(board.erase_event_commands(&event).is_err());
        assert_eq!(board.link().sent(), &[vec![0x0A, 0x04, 0x03]]);
        assert_eq!(board.event_command_ids(&event), &[7, 9]);
    }

    #[test]
    fn test_ledgers_are_per_event() {
        let mut board = Board::new(MockLink::new());
        let a = ResponseHeader::new(0x01, 0x01);
        let b = a.sub_channel(0);
        board.record_event_command(&a, 1);
        board.record_event_command(&b, 2);
        board.erase_event_commands(&a).unwrap();
        assert_eq!(board.event_command_ids(&b), &[2]);
    }
}
