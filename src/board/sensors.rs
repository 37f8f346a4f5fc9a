// src/board/sensors.rs

use alloc::rc::Rc;

use super::Board;
use crate::common::registers;
use crate::common::{DecodeSpec, DeviceLink, ResponseHeader};
use crate::signal::DataSignal;

impl<L> Board<L>
where
    L: DeviceLink,
{
    /// Push-button state: 1 pressed, 0 released.
    pub fn switch_state_signal(&mut self) -> Rc<DataSignal> {
        self.get_or_create_singleton_signal(
            ResponseHeader::new(registers::SWITCH, registers::SWITCH_STATE),
            DecodeSpec::status_byte(),
        )
    }

    /// Sensor fusion orientation as a w, x, y, z quaternion.
    pub fn sensor_fusion_quaternion_signal(&mut self) -> Rc<DataSignal> {
        self.get_or_create_singleton_signal(
            ResponseHeader::new(registers::SENSOR_FUSION, registers::SENSOR_FUSION_QUATERNION),
            DecodeSpec::quaternion(),
        )
    }
}
