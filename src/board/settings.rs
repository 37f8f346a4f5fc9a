// src/board/settings.rs

use alloc::rc::Rc;

use super::Board;
use crate::common::registers::{self, read_register};
use crate::common::{BoardError, Command, DecodeSpec, DeviceLink, ResponseHeader};
use crate::signal::DataSignal;

/// Header the board answers a charger status read with.
pub const CHARGER_STATUS_READ: ResponseHeader =
    ResponseHeader::new(registers::SETTINGS, read_register(registers::SETTINGS_POWER_STATUS));

impl<L> Board<L>
where
    L: DeviceLink,
{
    /// Tells the board to stop advertising. Fire-and-forget; nothing is routed.
    pub fn stop_advertising(&mut self) -> Result<(), BoardError<L::Error>> {
        self.send_command(&Command::StopAdvertising)
    }

    /// Power source notifications: 1 when external power is attached.
    pub fn power_status_signal(&mut self) -> Rc<DataSignal> {
        self.get_or_create_singleton_signal(
            ResponseHeader::new(registers::SETTINGS, registers::SETTINGS_POWER_STATUS),
            DecodeSpec::status_byte(),
        )
    }

    /// Charge state notifications: 1 while charging.
    pub fn charge_status_signal(&mut self) -> Rc<DataSignal> {
        self.get_or_create_singleton_signal(
            ResponseHeader::new(registers::SETTINGS, registers::SETTINGS_CHARGE_STATUS),
            DecodeSpec::status_byte(),
        )
    }

    /// Readable charger status, one unsigned byte.
    pub fn charger_status_read_signal(&mut self) -> Rc<DataSignal> {
        self.get_or_create_singleton_signal(CHARGER_STATUS_READ, DecodeSpec::status_byte())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::mock::MockLink;
    use crate::board::ResponseHandler;
    use crate::common::DataInterpreter;
    use alloc::vec;

    #[test]
    fn test_stop_advertising_sends_two_bytes_and_routes_nothing() {
        let mut board = Board::new(MockLink::new());
        let routes = board.responses().len();
        board.stop_advertising().unwrap();
        assert_eq!(board.link().sent(), &[vec![0x11, 0x17]]);
        assert_eq!(board.responses().len(), routes);
    }

    #[test]
    fn test_charger_status_read_signal() {
        let mut board = Board::new(MockLink::new());
        let signal = board.charger_status_read_signal();

        assert_eq!(signal.header(), &ResponseHeader::new(0x11, 0x91));
        assert_eq!(signal.header().data_id, None);
        let decode = signal.decode_spec();
        assert_eq!(decode.interpreter, DataInterpreter::UInt32);
        assert_eq!((decode.channel_count, decode.channel_size), (1, 1));
        assert!(!decode.is_signed);
        assert!(matches!(
            board.responses().get(&CHARGER_STATUS_READ),
            Some(ResponseHandler::DataWithoutId)
        ));
        assert!(Rc::ptr_eq(&signal, &board.charger_status_read_signal()));
    }

    #[test]
    fn test_power_and_charge_are_distinct_signals() {
        let mut board = Board::new(MockLink::new());
        let power = board.power_status_signal();
        let charge = board.charge_status_signal();
        assert!(!Rc::ptr_eq(&power, &charge));
        assert_eq!(power.register_id(), 0x11);
        assert_eq!(charge.register_id(), 0x12);
    }
}
