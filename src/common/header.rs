// src/common/header.rs

use super::registers::NO_DATA_ID;
use core::fmt;

/// Composite routing key: module id, register id and an optional data id.
///
/// Used both to address outbound command targets and to route inbound
/// responses. An absent data id is a distinct key from `Some(0)`: `0` is the
/// first sub-channel, `None` means the register is not sub-addressed at all.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ResponseHeader {
    pub module_id: u8,
    pub register_id: u8,
    pub data_id: Option<u8>,
}

impl ResponseHeader {
    /// Header without sub-channel addressing.
    #[inline]
    pub const fn new(module_id: u8, register_id: u8) -> Self {
        ResponseHeader { module_id, register_id, data_id: None }
    }

    /// Header addressing sub-channel `data_id`.
    #[inline]
    pub const fn with_id(module_id: u8, register_id: u8, data_id: u8) -> Self {
        ResponseHeader { module_id, register_id, data_id: Some(data_id) }
    }

    /// Same module and register, different data id.
    #[inline]
    pub const fn sub_channel(&self, data_id: u8) -> Self {
        Self::with_id(self.module_id, self.register_id, data_id)
    }

    #[inline]
    pub const fn has_data_id(&self) -> bool {
        self.data_id.is_some()
    }

    /// Three byte wire form; an absent id is written as [`NO_DATA_ID`].
    ///
    /// Note that `Some(0xFF)` and `None` share a wire form. Firmware never
    /// assigns 0xFF as an id.
    pub fn to_wire(&self) -> [u8; 3] {
        [
            self.module_id,
            self.register_id,
            self.data_id.unwrap_or(NO_DATA_ID),
        ]
    }
}

impl fmt::Display for ResponseHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_id {
            Some(id) => write!(f, "{:02x}:{:02x}:{:02x}", self.module_id, self.register_id, id),
            None => write!(f, "{:02x}:{:02x}:--", self.module_id, self.register_id),
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;

    #[test]
    fn test_absent_and_zero_ids_are_distinct() {
        let absent = ResponseHeader::new(0x11, 0x11);
        let zero = ResponseHeader::with_id(0x11, 0x11, 0);
        assert_ne!(absent, zero);

        let mut map = BTreeMap::new();
        map.insert(absent, "absent");
        map.insert(zero, "zero");
        assert_eq!(map.len(), 2);
        assert_eq!(map[&absent], "absent");
        assert_eq!(map[&zero], "zero");
    }

    #[test]
    fn test_headers_differing_in_any_field_do_not_alias() {
        let base = ResponseHeader::with_id(0x01, 0x01, 1);
        let variants = [
            ResponseHeader::with_id(0x02, 0x01, 1),
            ResponseHeader::with_id(0x01, 0x02, 1),
            ResponseHeader::with_id(0x01, 0x01, 2),
            ResponseHeader::new(0x01, 0x01),
        ];
        let mut map = BTreeMap::new();
        map.insert(base, 0usize);
        for (i, h) in variants.iter().enumerate() {
            assert_ne!(*h, base);
            map.insert(*h, i + 1);
        }
        assert_eq!(map.len(), 5);
        assert_eq!(map[&base], 0);
    }

    #[test]
    fn test_sub_channel_keeps_module_and_register() {
        let switch = ResponseHeader::new(0x01, 0x01);
        let pressed = switch.sub_channel(1);
        assert_eq!(pressed, ResponseHeader::with_id(0x01, 0x01, 1));
        assert!(pressed.has_data_id());
        assert!(!switch.has_data_id());
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(ResponseHeader::new(0x19, 0x07).to_wire(), [0x19, 0x07, 0xFF]);
        assert_eq!(ResponseHeader::with_id(0x09, 0x03, 0).to_wire(), [0x09, 0x03, 0x00]);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResponseHeader::new(0x11, 0x91).to_string(), "11:91:--");
        assert_eq!(ResponseHeader::with_id(0x09, 0x03, 0x1a).to_string(), "09:03:1a");
    }
}
