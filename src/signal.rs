// src/signal.rs

use alloc::rc::Rc;

use crate::common::{registers, DataValue, DecodeSpec, ResponseHeader};
use crate::processor::{ProcessorConfig, ProcessorType};

/// Host-side handle to a value stream exposed by the board, either read
/// straight from a module register or produced by a firmware processor.
///
/// Signals are shared as `Rc<DataSignal>` and compared by identity
/// (`Rc::ptr_eq`): the board never hands out two instances for one header.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSignal {
    header: ResponseHeader,
    decode: DecodeSpec,
    kind: SignalKind,
}

/// What produces a signal's data.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    /// A module register.
    Device,
    /// A firmware processor stage.
    Processor(ProcessorInfo),
}

/// Processor-specific state carried by a processor signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorInfo {
    pub processor_type: ProcessorType,
    pub config: ProcessorConfig,
    /// Upstream signal the processor consumes.
    pub source: Rc<DataSignal>,
}

impl DataSignal {
    pub fn new(header: ResponseHeader, decode: DecodeSpec) -> Self {
        DataSignal { header, decode, kind: SignalKind::Device }
    }

    pub(crate) fn processor(header: ResponseHeader, decode: DecodeSpec, info: ProcessorInfo) -> Self {
        DataSignal { header, decode, kind: SignalKind::Processor(info) }
    }

    #[inline]
    pub fn header(&self) -> &ResponseHeader {
        &self.header
    }

    #[inline]
    pub fn decode_spec(&self) -> &DecodeSpec {
        &self.decode
    }

    #[inline]
    pub fn kind(&self) -> &SignalKind {
        &self.kind
    }

    #[inline]
    pub fn module_id(&self) -> u8 {
        self.header.module_id
    }

    #[inline]
    pub fn register_id(&self) -> u8 {
        self.header.register_id
    }

    pub fn is_processor(&self) -> bool {
        matches!(self.kind, SignalKind::Processor(_))
    }

    pub fn processor_info(&self) -> Option<&ProcessorInfo> {
        match &self.kind {
            SignalKind::Processor(info) => Some(info),
            SignalKind::Device => None,
        }
    }

    /// Board-assigned processor id, if this is a confirmed processor.
    pub fn processor_id(&self) -> Option<u8> {
        if self.is_processor() && self.header.module_id == registers::DATA_PROCESSOR {
            self.header.data_id
        } else {
            None
        }
    }
}

/// One decoded sample delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSample {
    /// Header of the signal the sample belongs to.
    pub header: ResponseHeader,
    pub value: DataValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_signal_is_not_a_processor() {
        let sig = DataSignal::new(ResponseHeader::new(0x01, 0x01), DecodeSpec::status_byte());
        assert!(!sig.is_processor());
        assert!(sig.processor_info().is_none());
        assert_eq!(sig.processor_id(), None);
        assert_eq!(sig.module_id(), 0x01);
        assert_eq!(sig.register_id(), 0x01);
    }

    #[test]
    fn test_processor_signal_exposes_id_and_source() {
        let source = Rc::new(DataSignal::new(ResponseHeader::new(0x19, 0x07), DecodeSpec::quaternion()));
        let info = ProcessorInfo {
            processor_type: ProcessorType::AVERAGE,
            config: ProcessorConfig::from_byte(4),
            source: Rc::clone(&source),
        };
        let header = ResponseHeader::with_id(registers::DATA_PROCESSOR, registers::DATA_PROCESSOR_NOTIFY, 3);
        let proc_sig = DataSignal::processor(header, DecodeSpec::quaternion(), info);

        assert!(proc_sig.is_processor());
        assert_eq!(proc_sig.processor_id(), Some(3));
        let info = proc_sig.processor_info().unwrap();
        assert!(Rc::ptr_eq(&info.source, &source));
        assert_eq!(info.config.as_bytes(), &[4]);
    }
}
