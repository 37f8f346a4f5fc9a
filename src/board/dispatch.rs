// src/board/dispatch.rs

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::fmt;

use crate::common::ResponseHeader;

/// Caller-supplied handler: receives the resolved header and the payload
/// (packet bytes after the header).
pub type CustomHandler = Box<dyn FnMut(&ResponseHeader, &[u8])>;

/// What to do with a packet whose header matched a route.
///
/// `DataWithId` and `DataWithoutId` are handled the same way; they only
/// label the route. Where the payload starts comes from [`Route::payload_offset`].
pub enum ResponseHandler {
    /// Decode with the registered signal's decode metadata and deliver; the header carries a data id.
    DataWithId,
    /// Decode with the registered signal's decode metadata and deliver; no data id.
    DataWithoutId,
    /// Board confirmed a processor creation.
    ProcessorCreated,
    /// Anything else.
    Custom(CustomHandler),
}

impl fmt::Debug for ResponseHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseHandler::DataWithId => f.write_str("DataWithId"),
            ResponseHandler::DataWithoutId => f.write_str("DataWithoutId"),
            ResponseHandler::ProcessorCreated => f.write_str("ProcessorCreated"),
            ResponseHandler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Header of a matched packet and where its payload starts.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Route {
    pub header: ResponseHeader,
    pub payload_offset: usize,
}

/// Board-scoped table of response routes.
///
/// Registration is last-writer-wins. Packets without a route are dropped
/// and counted; modules nobody listens to are expected to chatter.
#[derive(Debug, Default)]
pub struct DispatchTable {
    routes: BTreeMap<ResponseHeader, ResponseHandler>,
    unhandled: u32,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `header` to `handler`, replacing any previous binding.
    /// Returns `true` if a binding was replaced.
    pub fn register(&mut self, header: ResponseHeader, handler: ResponseHandler) -> bool {
        self.routes.insert(header, handler).is_some()
    }

    pub fn unregister(&mut self, header: &ResponseHeader) -> Option<ResponseHandler> {
        self.routes.remove(header)
    }

    pub fn contains(&self, header: &ResponseHeader) -> bool {
        self.routes.contains_key(header)
    }

    pub fn get(&self, header: &ResponseHeader) -> Option<&ResponseHandler> {
        self.routes.get(header)
    }

    pub fn get_mut(&mut self, header: &ResponseHeader) -> Option<&mut ResponseHandler> {
        self.routes.get_mut(header)
    }

    /// Matches a raw inbound packet against the table.
    ///
    /// `[module, register, ...]` is tried without a data id first (payload
    /// starts at byte 2), then with byte 2 as the data id (payload starts at
    /// byte 3). A miss bumps the unhandled counter.
    pub fn resolve(&mut self, packet: &[u8]) -> Option<Route> {
        let route = match packet {
            [module, register, rest @ ..] => {
                let plain = ResponseHeader::new(*module, *register);
                if self.routes.contains_key(&plain) {
                    Some(Route { header: plain, payload_offset: 2 })
                } else {
                    rest.first()
                        .map(|id| ResponseHeader::with_id(*module, *register, *id))
                        .filter(|h| self.routes.contains_key(h))
                        .map(|header| Route { header, payload_offset: 3 })
                }
            }
            _ => None,
        };

        if route.is_none() {
            self.unhandled = self.unhandled.saturating_add(1);
        }
        route
    }

    /// Packets dropped so far for lack of a route.
    pub fn unhandled_packets(&self) -> u32 {
        self.unhandled
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn test_register_is_last_writer_wins() {
        let mut table = DispatchTable::new();
        let header = ResponseHeader::new(0x11, 0x91);
        assert!(!table.register(header, ResponseHandler::DataWithId));
        assert!(table.register(header, ResponseHandler::DataWithoutId));
        assert_eq!(table.len(), 1);
        assert!(matches!(table.get(&header), Some(ResponseHandler::DataWithoutId)));
    }

    #[test]
    fn test_resolve_prefers_route_without_id() {
        let mut table = DispatchTable::new();
        table.register(ResponseHeader::new(0x09, 0x02), ResponseHandler::ProcessorCreated);
        table.register(ResponseHeader::with_id(0x09, 0x02, 0x05), ResponseHandler::DataWithId);

        let route = table.resolve(&[0x09, 0x02, 0x05]).unwrap();
        assert_eq!(route.header, ResponseHeader::new(0x09, 0x02));
        assert_eq!(route.payload_offset, 2);
    }

    #[test]
    fn test_resolve_falls_back_to_data_id() {
        let mut table = DispatchTable::new();
        table.register(ResponseHeader::with_id(0x09, 0x03, 0x00), ResponseHandler::DataWithId);

        let route = table.resolve(&[0x09, 0x03, 0x00, 0xAA, 0xBB]).unwrap();
        assert_eq!(route.header, ResponseHeader::with_id(0x09, 0x03, 0));
        assert_eq!(route.payload_offset, 3);
        assert_eq!(table.unhandled_packets(), 0);
    }

    #[test]
    fn test_unmatched_packets_are_counted() {
        let mut table = DispatchTable::new();
        table.register(ResponseHeader::with_id(0x01, 0x01, 1), ResponseHandler::DataWithId);

        assert!(table.resolve(&[0x01, 0x01, 0x02]).is_none());
        assert!(table.resolve(&[0x01, 0x01]).is_none());
        assert!(table.resolve(&[0x01]).is_none());
        assert!(table.resolve(&[]).is_none());
        assert_eq!(table.unhandled_packets(), 4);
    }

    #[test]
    fn test_custom_handler_is_callable_through_table() {
        let seen: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut table = DispatchTable::new();
        let header = ResponseHeader::new(0xFE, 0x01);
        table.register(
            header,
            ResponseHandler::Custom(Box::new(move |_, payload| sink.borrow_mut().extend_from_slice(payload))),
        );

        if let Some(ResponseHandler::Custom(handler)) = table.get_mut(&header) {
            handler(&header, &[1, 2, 3]);
        }
        assert_eq!(seen.borrow().as_slice(), &[1, 2, 3]);
        assert!(table.unregister(&header).is_some());
        assert!(table.is_empty());
    }
}
