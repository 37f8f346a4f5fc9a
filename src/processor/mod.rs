// src/processor/mod.rs

//! Data processor pipelines.
//!
//! A processor is a transform stage that runs inside the board firmware and
//! consumes another signal. The host keeps a proxy for every processor it
//! creates (a [`DataSignal`](crate::signal::DataSignal) of kind
//! `Processor`) plus a per-board [`FilterIdTable`] that tells the firmware
//! which filter implements each processor type.

use alloc::collections::BTreeMap;
use arrayvec::ArrayVec;
use core::fmt;

use crate::common::error::ConfigTooLong;
use crate::common::registers::{MAX_COMMAND_LEN, PROCESSOR_CREATE_HEADER_LEN};
use crate::common::DecodeSpec;

pub(crate) mod builder;
pub mod quaternion;

pub use builder::ProcessorCallback;
pub use quaternion::{quaternion_average_filter_id, QUATERNION_AVERAGE};

// --- Processor Types ---

/// Host-side processor type tag.
///
/// Values up to [`ProcessorType::LAST_KNOWN`] mirror the firmware's own
/// enumeration. Anything above is a synthetic tag handed out by
/// [`FilterIdTable::allocate_synthetic`] for processor kinds the stock
/// enumeration does not know about.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ProcessorType(pub u8);

impl ProcessorType {
    pub const ACCUMULATOR: ProcessorType = ProcessorType(0);
    pub const AVERAGE: ProcessorType = ProcessorType(1);
    pub const BUFFER: ProcessorType = ProcessorType(2);
    pub const COMBINER: ProcessorType = ProcessorType(3);
    pub const COMPARATOR: ProcessorType = ProcessorType(4);
    pub const COUNTER: ProcessorType = ProcessorType(5);
    pub const DELTA: ProcessorType = ProcessorType(6);
    pub const MATH: ProcessorType = ProcessorType(7);
    pub const MULTI_COMPARATOR: ProcessorType = ProcessorType(8);
    pub const PASSTHROUGH: ProcessorType = ProcessorType(9);
    pub const PULSE: ProcessorType = ProcessorType(10);
    pub const SAMPLE: ProcessorType = ProcessorType(11);
    pub const THRESHOLD: ProcessorType = ProcessorType(12);
    pub const TIME: ProcessorType = ProcessorType(13);
    pub const HIGH_PASS: ProcessorType = ProcessorType(14);
    pub const PACKER: ProcessorType = ProcessorType(15);
    pub const ACCOUNTER: ProcessorType = ProcessorType(16);
    pub const FUSER: ProcessorType = ProcessorType(17);

    /// Last type the stock firmware enumerates.
    pub const LAST_KNOWN: ProcessorType = Self::FUSER;

    /// Firmware-known types with the filter id each one maps to.
    const FIRMWARE_FILTERS: [(ProcessorType, u8, &'static str); 18] = [
        (Self::ACCUMULATOR, 0x02, "accumulator"),
        (Self::AVERAGE, 0x03, "average"),
        (Self::BUFFER, 0x0F, "buffer"),
        (Self::COMBINER, 0x07, "combiner"),
        (Self::COMPARATOR, 0x06, "comparator"),
        (Self::COUNTER, 0x02, "counter"),
        (Self::DELTA, 0x0C, "delta"),
        (Self::MATH, 0x09, "math"),
        (Self::MULTI_COMPARATOR, 0x06, "multi-comparator"),
        (Self::PASSTHROUGH, 0x01, "passthrough"),
        (Self::PULSE, 0x0B, "pulse"),
        (Self::SAMPLE, 0x0A, "sample"),
        (Self::THRESHOLD, 0x0D, "threshold"),
        (Self::TIME, 0x08, "time"),
        (Self::HIGH_PASS, 0x03, "high-pass"),
        (Self::PACKER, 0x10, "packer"),
        (Self::ACCOUNTER, 0x11, "accounter"),
        (Self::FUSER, 0x1B, "fuser"),
    ];

    #[inline]
    pub const fn is_synthetic(&self) -> bool {
        self.0 > Self::LAST_KNOWN.0
    }

    /// Firmware name of a known type.
    pub fn name(&self) -> Option<&'static str> {
        Self::FIRMWARE_FILTERS
            .iter()
            .find(|(t, _, _)| t == self)
            .map(|(_, _, name)| *name)
    }
}

impl fmt::Display for ProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "synthetic({})", self.0),
        }
    }
}

// --- Processor Config ---

/// Largest config a single create command can carry.
pub const MAX_CONFIG_LEN: usize = MAX_COMMAND_LEN - PROCESSOR_CREATE_HEADER_LEN;

/// Owned, processor-type-specific configuration bytes. Zero length is legal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessorConfig(ArrayVec<u8, MAX_CONFIG_LEN>);

impl ProcessorConfig {
    /// Copies `bytes` into an owned config.
    pub fn new(bytes: &[u8]) -> Result<Self, ConfigTooLong> {
        let mut buf = ArrayVec::new();
        buf.try_extend_from_slice(bytes).map_err(|_| ConfigTooLong {
            len: bytes.len(),
            limit: MAX_CONFIG_LEN,
        })?;
        Ok(ProcessorConfig(buf))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_byte(byte: u8) -> Self {
        let mut buf = ArrayVec::new();
        buf.push(byte);
        ProcessorConfig(buf)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// --- Filter Id Table ---

/// Board-scoped map from processor type to the firmware filter id that
/// implements it, plus the allocator for synthetic type tags.
///
/// Synthetic tags are handed out in order starting right after
/// [`ProcessorType::LAST_KNOWN`], one per name, so two host-only processor
/// kinds never share a tag.
#[derive(Debug, Clone)]
pub struct FilterIdTable {
    ids: BTreeMap<ProcessorType, u8>,
    synthetic: BTreeMap<&'static str, ProcessorType>,
    next_synthetic: Option<u8>,
}

impl Default for FilterIdTable {
    /// Table seeded with every firmware-known processor type.
    fn default() -> Self {
        let mut table = Self::empty();
        for (processor_type, filter_id, _) in ProcessorType::FIRMWARE_FILTERS {
            table.ids.insert(processor_type, filter_id);
        }
        table
    }
}

impl FilterIdTable {
    /// Table with no bindings at all.
    pub fn empty() -> Self {
        FilterIdTable {
            ids: BTreeMap::new(),
            synthetic: BTreeMap::new(),
            next_synthetic: Some(ProcessorType::LAST_KNOWN.0 + 1),
        }
    }

    /// Binds `processor_type` to `filter_id`, returning the previous binding.
    pub fn bind(&mut self, processor_type: ProcessorType, filter_id: u8) -> Option<u8> {
        self.ids.insert(processor_type, filter_id)
    }

    pub fn unbind(&mut self, processor_type: ProcessorType) -> Option<u8> {
        self.ids.remove(&processor_type)
    }

    pub fn filter_id(&self, processor_type: ProcessorType) -> Option<u8> {
        self.ids.get(&processor_type).copied()
    }

    /// Returns the synthetic tag registered under `name`, allocating the
    /// next free one on first use. `None` once the tag space is exhausted.
    pub fn allocate_synthetic(&mut self, name: &'static str) -> Option<ProcessorType> {
        if let Some(existing) = self.synthetic.get(name) {
            return Some(*existing);
        }
        let tag = ProcessorType(self.next_synthetic?);
        self.next_synthetic = tag.0.checked_add(1);
        self.synthetic.insert(name, tag);
        Some(tag)
    }

    /// Synthetic tag previously allocated under `name`.
    pub fn synthetic(&self, name: &str) -> Option<ProcessorType> {
        self.synthetic.get(name).copied()
    }
}

// --- Creation Request ---

/// Everything needed to create one processor on top of a source signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSpec {
    pub processor_type: ProcessorType,
    pub config: ProcessorConfig,
    /// Decode metadata for the processor's output.
    pub decode: DecodeSpec,
    /// Filter id to bind for `processor_type` before the create command is
    /// sent. `None` uses whatever the board's table already holds.
    pub filter_id: Option<u8>,
}

impl ProcessorSpec {
    pub fn new(processor_type: ProcessorType, config: ProcessorConfig, decode: DecodeSpec) -> Self {
        ProcessorSpec { processor_type, config, decode, filter_id: None }
    }

    pub fn with_filter_id(mut self, filter_id: u8) -> Self {
        self.filter_id = Some(filter_id);
        self
    }
}

/// Why a processor creation callback received no processor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CreateError {
    #[error("No firmware filter id bound for processor type {0}")]
    UnboundType(ProcessorType),
    #[error("Link rejected the create command")]
    LinkFailed,
    #[error("Creation aborted before the board confirmed it")]
    Aborted,
    #[error("Creation confirmation carried no processor id")]
    MalformedConfirmation,
    #[error("No synthetic processor types left to allocate")]
    SyntheticTypesExhausted,
}
