// src/lib.rs

#![no_std] // Specify no_std at the crate root

extern crate alloc;

pub mod board;
pub mod common;
pub mod processor;
pub mod signal;

// Re-export key types for convenience
pub use board::Board;
pub use common::{BoardError, DeviceLink, ResponseHeader};
pub use processor::{CreateError, FilterIdTable, ProcessorConfig, ProcessorSpec, ProcessorType};
pub use signal::{DataSample, DataSignal};
