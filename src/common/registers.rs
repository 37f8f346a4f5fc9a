// src/common/registers.rs

// Module and register ids as the board firmware numbers them.
// Register ids with READ_FLAG set address the "read" variant of a register;
// responses to a read carry the same flagged register id back.

// === Flags ===

/// Set on a register id to request (or identify the response to) a read.
pub const READ_FLAG: u8 = 0x80;

/// Wire value standing in for an absent data id.
pub const NO_DATA_ID: u8 = 0xFF;

/// Returns the read variant of `register`.
#[inline]
pub const fn read_register(register: u8) -> u8 {
    READ_FLAG | register
}

// === Module Ids ===

pub const SWITCH: u8 = 0x01;
pub const DATA_PROCESSOR: u8 = 0x09;
pub const EVENT: u8 = 0x0A;
pub const SETTINGS: u8 = 0x11;
pub const SENSOR_FUSION: u8 = 0x19;

// === Switch Registers ===

pub const SWITCH_STATE: u8 = 0x01;

// === Settings Registers ===

/// Power source present/absent.
pub const SETTINGS_POWER_STATUS: u8 = 0x11;
/// Battery charging/not charging.
pub const SETTINGS_CHARGE_STATUS: u8 = 0x12;
/// Write-only; stops BLE advertising until the next reset.
pub const SETTINGS_STOP_ADVERTISING: u8 = 0x17;

// === Sensor Fusion Registers ===

pub const SENSOR_FUSION_QUATERNION: u8 = 0x07;

// === Data Processor Registers ===

/// Create a processor; the board answers on the same register with the new processor id.
pub const DATA_PROCESSOR_ADD: u8 = 0x02;
/// Processor output, tagged with the processor id.
pub const DATA_PROCESSOR_NOTIFY: u8 = 0x03;
pub const DATA_PROCESSOR_REMOVE: u8 = 0x06;
pub const DATA_PROCESSOR_REMOVE_ALL: u8 = 0x08;

// === Event Registers ===

pub const EVENT_ENTRY: u8 = 0x02;
pub const EVENT_REMOVE: u8 = 0x04;
pub const EVENT_REMOVE_ALL: u8 = 0x05;

// === Link Limits ===

/// Largest command the board accepts in one write (default BLE ATT payload).
pub const MAX_COMMAND_LEN: usize = 20;

/// Bytes of a processor create command preceding the config:
/// module, opcode, source module, source register, source data id, filter id.
pub const PROCESSOR_CREATE_HEADER_LEN: usize = 6;

// === Firmware Filter Ids ===

/// Quaternion average filter id on firmware 1.4.97.
pub const QUATERNION_AVERAGE_FILTER_ID_LEGACY: u8 = 18;
/// Quaternion average filter id on every later custom firmware build.
pub const QUATERNION_AVERAGE_FILTER_ID: u8 = 26;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_register_sets_flag() {
        assert_eq!(read_register(SETTINGS_POWER_STATUS), 0x91);
        assert_eq!(read_register(0x00), READ_FLAG);
        // Already flagged registers stay flagged
        assert_eq!(read_register(0x91), 0x91);
    }

    #[test]
    fn test_config_fits_in_a_command() {
        assert!(PROCESSOR_CREATE_HEADER_LEN < MAX_COMMAND_LEN);
    }
}
