// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod error;
pub mod hal_traits;
pub mod header;
pub mod registers;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From command.rs
pub use command::{Command, CommandBuffer};

// From error.rs
pub use error::{BoardError, CommandTooLong, ConfigTooLong};

// From hal_traits.rs
pub use hal_traits::DeviceLink;

// From header.rs
pub use header::ResponseHeader;

// From types.rs
pub use types::{Converter, DataInterpreter, DataValue, DecodeError, DecodeSpec, Quaternion};

// Protocol constants stay namespaced: common::registers::SETTINGS etc.
