// src/board/mod.rs

//! The board handle: owns the link plus every board-scoped table.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use core::fmt;
use log::{debug, trace, warn};

use crate::common::{
    registers, BoardError, Command, DecodeSpec, DeviceLink, ResponseHeader,
};
use crate::processor::builder::PendingCreate;
use crate::processor::FilterIdTable;
use crate::signal::{DataSample, DataSignal};

pub mod dispatch;
pub mod event;
pub mod registry;
pub mod sensors;
pub mod settings;

#[cfg(test)]
pub(crate) mod mock;

pub use dispatch::{CustomHandler, DispatchTable, ResponseHandler, Route};
pub use event::EventLedger;
pub use registry::SignalRegistry;

/// Receives decoded samples for one signal.
pub type SampleHandler = Box<dyn FnMut(&DataSample)>;

/// Host-side view of one connected board.
///
/// Every table here (signals, response routes, filter ids, event ledgers)
/// is scoped to this value; two boards never share state. Mutation goes
/// through `&mut self`, and the handle is `!Send` because signals are `Rc`s.
pub struct Board<L>
where
    L: DeviceLink,
{
    link: L,
    pub(crate) signals: SignalRegistry,
    pub(crate) responses: DispatchTable,
    pub(crate) filter_ids: FilterIdTable,
    pub(crate) pending_creates: VecDeque<PendingCreate>,
    pub(crate) ledgers: BTreeMap<ResponseHeader, EventLedger>,
    pub(crate) subscribers: BTreeMap<ResponseHeader, SampleHandler>,
}

impl<L> fmt::Debug for Board<L>
where
    L: DeviceLink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("signals", &self.signals.len())
            .field("responses", &self.responses)
            .field("filter_ids", &self.filter_ids)
            .field("pending_creates", &self.pending_creates.len())
            .field("ledgers", &self.ledgers)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl<L> Board<L>
where
    L: DeviceLink,
{
    /// Board with the stock firmware filter table.
    pub fn new(link: L) -> Self {
        Self::with_filter_ids(link, FilterIdTable::default())
    }

    pub fn with_filter_ids(link: L, filter_ids: FilterIdTable) -> Self {
        let mut responses = DispatchTable::new();
        responses.register(
            ResponseHeader::new(registers::DATA_PROCESSOR, registers::DATA_PROCESSOR_ADD),
            ResponseHandler::ProcessorCreated,
        );
        Board {
            link,
            signals: SignalRegistry::new(),
            responses,
            filter_ids,
            pending_creates: VecDeque::new(),
            ledgers: BTreeMap::new(),
            subscribers: BTreeMap::new(),
        }
    }

    // --- Accessors ---

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn filter_ids(&self) -> &FilterIdTable {
        &self.filter_ids
    }

    pub fn filter_ids_mut(&mut self) -> &mut FilterIdTable {
        &mut self.filter_ids
    }

    pub fn responses(&self) -> &DispatchTable {
        &self.responses
    }

    /// Packets dropped so far because no route matched them.
    pub fn unhandled_packets(&self) -> u32 {
        self.responses.unhandled_packets()
    }

    // --- Outbound ---

    /// Encodes `command` and hands it to the link, waiting out `WouldBlock`.
    pub fn send_command(&mut self, command: &Command) -> Result<(), BoardError<L::Error>> {
        let bytes = command.encode()?;
        nb::block!(self.link.write_command(bytes.as_slice())).map_err(BoardError::Link)?;
        trace!("Sent {:02x?}", bytes.as_slice());
        Ok(())
    }

    /// Asks the board to report the current value of `signal`. The answer
    /// arrives through [`handle_packet`](Self::handle_packet).
    pub fn read_signal(&mut self, signal: &DataSignal) -> Result<(), BoardError<L::Error>> {
        self.send_command(&Command::ReadSignal { header: *signal.header() })
    }

    // --- Signals ---

    pub fn lookup_signal(&self, header: &ResponseHeader) -> Option<Rc<DataSignal>> {
        self.signals.get(header).cloned()
    }

    /// Sub-channel `index` of `signal`.
    ///
    /// The first call creates an unsigned, unsized signal and routes its
    /// responses as id-carrying data. Later calls return the same `Rc`.
    pub fn get_or_create_id_signal(&mut self, signal: &DataSignal, index: u8) -> Rc<DataSignal> {
        let header = signal.header().sub_channel(index);
        let (id_signal, created) = self
            .signals
            .get_or_insert_with(header, || DataSignal::new(header, DecodeSpec::id_signal()));
        if created {
            self.responses.register(header, ResponseHandler::DataWithId);
            debug!("Created id signal {}", header);
        }
        id_signal
    }

    /// The one signal living at `header`.
    ///
    /// `decode` only applies when the signal is created. The response route
    /// is rebound on every call, so this also repairs a route that a custom
    /// handler took over.
    pub fn get_or_create_singleton_signal(
        &mut self,
        header: ResponseHeader,
        decode: DecodeSpec,
    ) -> Rc<DataSignal> {
        let (signal, created) = self
            .signals
            .get_or_insert_with(header, || DataSignal::new(header, decode));
        self.responses.register(header, ResponseHandler::DataWithoutId);
        if created {
            debug!("Created signal {}", header);
        }
        signal
    }

    // --- Inbound ---

    /// Routes caller-defined responses. Replaces whatever `header` was bound to.
    pub fn register_response_handler<F>(&mut self, header: ResponseHeader, handler: F)
    where
        F: FnMut(&ResponseHeader, &[u8]) + 'static,
    {
        if self.responses.register(header, ResponseHandler::Custom(Box::new(handler))) {
            debug!("Replaced response route {}", header);
        }
    }

    /// Delivers decoded samples of `signal` to `handler`, returning the
    /// handler it replaced.
    pub fn subscribe<F>(&mut self, signal: &DataSignal, handler: F) -> Option<SampleHandler>
    where
        F: FnMut(&DataSample) + 'static,
    {
        self.subscribers.insert(*signal.header(), Box::new(handler))
    }

    pub fn unsubscribe(&mut self, signal: &DataSignal) -> Option<SampleHandler> {
        self.subscribers.remove(signal.header())
    }

    /// Dispatches one inbound packet.
    ///
    /// Packets nothing is routed for are dropped and counted in
    /// [`unhandled_packets`](Self::unhandled_packets).
    pub fn handle_packet(&mut self, packet: &[u8]) {
        let Some(route) = self.responses.resolve(packet) else {
            trace!("Dropped unrouted packet {:02x?}", packet);
            return;
        };
        let header = route.header;
        let payload = packet.get(route.payload_offset..).unwrap_or(&[]);
        trace!("Routing {} ({} payload bytes)", header, payload.len());

        if let Some(ResponseHandler::Custom(handler)) = self.responses.get_mut(&header) {
            handler(&header, payload);
            return;
        }
        if matches!(self.responses.get(&header), Some(ResponseHandler::ProcessorCreated)) {
            self.complete_pending_create(payload);
        } else {
            self.deliver_sample(header, payload);
        }
    }

    fn deliver_sample(&mut self, header: ResponseHeader, payload: &[u8]) {
        let Some(signal) = self.signals.get(&header) else {
            trace!("No signal registered for {}", header);
            return;
        };
        match signal.decode_spec().decode(payload) {
            Ok(value) => {
                if let Some(subscriber) = self.subscribers.get_mut(&header) {
                    subscriber(&DataSample { header, value });
                }
            }
            Err(e) => warn!("Could not decode {}: {}", header, e),
        }
    }

    // --- Teardown ---

    /// Removes every processor and event command from the board and forgets
    /// the matching host-side state. Pending creates are aborted.
    ///
    /// Local state is cleared before the commands go out, so a link failure
    /// leaves the host clean but the board possibly still programmed.
    pub fn tear_down(&mut self) -> Result<(), BoardError<L::Error>> {
        let aborted = self.abort_pending_creates();
        let processors = self.signals.drain_where(|signal| signal.is_processor());
        for processor in &processors {
            self.responses.unregister(processor.header());
            self.subscribers.remove(processor.header());
        }
        self.ledgers.clear();
        debug!(
            "Tearing down: {} processors dropped, {} creates aborted",
            processors.len(),
            aborted
        );

        self.send_command(&Command::RemoveAllProcessors)?;
        self.send_command(&Command::RemoveAllEventCommands)
    }
}

impl<L> Drop for Board<L>
where
    L: DeviceLink,
{
    fn drop(&mut self) {
        self.abort_pending_creates();
    }
}
