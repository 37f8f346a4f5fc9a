// src/processor/builder.rs

use alloc::boxed::Box;
use alloc::rc::Rc;
use log::{debug, warn};

use super::{CreateError, ProcessorConfig, ProcessorSpec, ProcessorType};
use crate::board::{Board, ResponseHandler};
use crate::common::registers;
use crate::common::{BoardError, Command, DecodeSpec, DeviceLink, ResponseHeader};
use crate::signal::{DataSignal, ProcessorInfo};

/// Completion callback of a processor creation. Runs exactly once.
pub type ProcessorCallback = Box<dyn FnOnce(Result<Rc<DataSignal>, CreateError>)>;

/// A create command that went out and has not been confirmed yet.
pub(crate) struct PendingCreate {
    processor_type: ProcessorType,
    config: ProcessorConfig,
    decode: DecodeSpec,
    source: Rc<DataSignal>,
    on_created: ProcessorCallback,
}

impl PendingCreate {
    fn fail(self, error: CreateError) {
        (self.on_created)(Err(error));
    }
}

impl<L> Board<L>
where
    L: DeviceLink,
{
    /// Creates a firmware processor fed by `source`.
    ///
    /// If `spec.filter_id` is set it is bound for the processor type before
    /// anything is sent. The board confirms asynchronously; `on_created`
    /// then receives the new processor signal, already registered and routed.
    ///
    /// When the create cannot be issued, `on_created` is called right away
    /// with the reason and the same error is returned. `source` is not
    /// checked for compatibility with the processor type.
    pub fn create_processor<F>(
        &mut self,
        source: &Rc<DataSignal>,
        spec: ProcessorSpec,
        on_created: F,
    ) -> Result<(), BoardError<L::Error>>
    where
        F: FnOnce(Result<Rc<DataSignal>, CreateError>) + 'static,
    {
        let ProcessorSpec { processor_type, config, decode, filter_id } = spec;
        if let Some(filter_id) = filter_id {
            self.filter_ids.bind(processor_type, filter_id);
        }
        let Some(filter_id) = self.filter_ids.filter_id(processor_type) else {
            let error = CreateError::UnboundType(processor_type);
            on_created(Err(error));
            return Err(error.into());
        };

        let command = Command::CreateProcessor {
            source: *source.header(),
            filter_id,
            config: config.clone(),
        };
        self.pending_creates.push_back(PendingCreate {
            processor_type,
            config,
            decode,
            source: Rc::clone(source),
            on_created: Box::new(on_created),
        });

        if let Err(e) = self.send_command(&command) {
            if let Some(pending) = self.pending_creates.pop_back() {
                pending.fail(CreateError::LinkFailed);
            }
            return Err(e);
        }
        debug!(
            "Requested {} processor on {} (filter {:#04x})",
            processor_type,
            source.header(),
            filter_id
        );
        Ok(())
    }

    /// Number of creates still waiting for the board.
    pub fn pending_creates(&self) -> usize {
        self.pending_creates.len()
    }

    /// Fails every unconfirmed create with [`CreateError::Aborted`].
    /// Returns how many were aborted.
    pub fn abort_pending_creates(&mut self) -> usize {
        let count = self.pending_creates.len();
        while let Some(pending) = self.pending_creates.pop_front() {
            pending.fail(CreateError::Aborted);
        }
        count
    }

    /// Board's answer to the oldest create: `[processor_id]`.
    pub(crate) fn complete_pending_create(&mut self, payload: &[u8]) {
        let Some(pending) = self.pending_creates.pop_front() else {
            warn!("Processor confirmation without a pending create");
            return;
        };
        let Some(&processor_id) = payload.first() else {
            warn!("Processor confirmation carried no id");
            pending.fail(CreateError::MalformedConfirmation);
            return;
        };

        let PendingCreate { processor_type, config, decode, source, on_created } = pending;
        let header = processor_header(processor_id);
        let processor = Rc::new(DataSignal::processor(
            header,
            decode,
            ProcessorInfo { processor_type, config, source },
        ));
        if self.signals.insert(Rc::clone(&processor)).is_some() {
            // Board reused an id we still had cached
            self.subscribers.remove(&header);
        }
        self.responses.register(header, ResponseHandler::DataWithId);
        debug!("Created {} processor {}", processor_type, header);

        on_created(Ok(processor));
    }

    /// Processor the board knows as `processor_id`, if this host created it.
    pub fn lookup_processor(&self, processor_id: u8) -> Option<Rc<DataSignal>> {
        self.signals
            .get(&processor_header(processor_id))
            .filter(|signal| signal.is_processor())
            .cloned()
    }

    /// Removes `processor` from the board, then forgets it here.
    pub fn remove_processor(&mut self, processor: &DataSignal) -> Result<(), BoardError<L::Error>> {
        let header = *processor.header();
        let processor_id = processor.processor_id().ok_or(BoardError::NotAProcessor(header))?;
        // A stale handle may carry an id the board has since reassigned
        let registered = self
            .signals
            .get(&header)
            .is_some_and(|current| core::ptr::eq(Rc::as_ptr(current), processor));
        if !registered {
            return Err(BoardError::NotAProcessor(header));
        }

        self.send_command(&Command::RemoveProcessor { processor_id })?;
        self.signals.remove(&header);
        self.responses.unregister(&header);
        self.subscribers.remove(&header);
        debug!("Removed processor {}", header);
        Ok(())
    }
}

#[inline]
fn processor_header(processor_id: u8) -> ResponseHeader {
    ResponseHeader::with_id(registers::DATA_PROCESSOR, registers::DATA_PROCESSOR_NOTIFY, processor_id)
}
