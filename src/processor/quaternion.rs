// src/processor/quaternion.rs

//! Averaging filter for sensor fusion quaternions.
//!
//! Stock firmware has no processor type for this, so the host tags it with
//! a synthetic type and binds the firmware filter id the caller supplies.
//! The right id depends on the firmware revision; see
//! [`quaternion_average_filter_id`].

use alloc::rc::Rc;

use super::{CreateError, ProcessorConfig, ProcessorSpec};
use crate::board::Board;
use crate::common::registers::{QUATERNION_AVERAGE_FILTER_ID, QUATERNION_AVERAGE_FILTER_ID_LEGACY};
use crate::common::{BoardError, DecodeSpec, DeviceLink};
use crate::signal::DataSignal;

/// Name the synthetic processor type is allocated under.
pub const QUATERNION_AVERAGE: &str = "quaternion-average";

/// Firmware filter id implementing the quaternion average on `firmware_revision`.
pub fn quaternion_average_filter_id(firmware_revision: &str) -> u8 {
    match firmware_revision {
        "1.4.97" => QUATERNION_AVERAGE_FILTER_ID_LEGACY,
        _ => QUATERNION_AVERAGE_FILTER_ID,
    }
}

impl<L> Board<L>
where
    L: DeviceLink,
{
    /// Averages the last `depth` quaternions of `source` on the board.
    ///
    /// The output decodes as four signed 4-byte channels. Completion is
    /// reported through `on_created` exactly like
    /// [`create_processor`](Board::create_processor).
    pub fn quaternion_average_create<F>(
        &mut self,
        source: &Rc<DataSignal>,
        depth: u8,
        filter_id: u8,
        on_created: F,
    ) -> Result<(), BoardError<L::Error>>
    where
        F: FnOnce(Result<Rc<DataSignal>, CreateError>) + 'static,
    {
        let Some(processor_type) = self.filter_ids.allocate_synthetic(QUATERNION_AVERAGE) else {
            on_created(Err(CreateError::SyntheticTypesExhausted));
            return Err(CreateError::SyntheticTypesExhausted.into());
        };
        let spec = ProcessorSpec::new(
            processor_type,
            ProcessorConfig::from_byte(depth),
            DecodeSpec::quaternion(),
        )
        .with_filter_id(filter_id);

        self.create_processor(source, spec, on_created)
    }
}
