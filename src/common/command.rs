// src/common/command.rs

//! Board command definitions.
//!
//! Every command is `[module_id, register_or_opcode, ...payload]` and is
//! written to the board in a single link write.

use arrayvec::ArrayVec;

use super::error::CommandTooLong;
use super::header::ResponseHeader;
use super::registers::{self, MAX_COMMAND_LEN};
use crate::processor::ProcessorConfig;

/// Encoded command bytes, at most [`MAX_COMMAND_LEN`] long.
pub type CommandBuffer = ArrayVec<u8, MAX_COMMAND_LEN>;

/// Commands this crate issues to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `[SETTINGS, 0x17]` - stop advertising. No response.
    StopAdvertising,

    /// `[module, register, (data_id)]` - request a read of a readable signal.
    /// The data id byte is only present for sub-addressed headers.
    ReadSignal { header: ResponseHeader },

    /// `[DATA_PROCESSOR, ADD, src_module, src_register, src_data_id, filter_id, config...]`.
    /// An absent source data id is sent as `0xFF`.
    CreateProcessor {
        source: ResponseHeader,
        filter_id: u8,
        config: ProcessorConfig,
    },

    /// `[DATA_PROCESSOR, REMOVE, processor_id]`.
    RemoveProcessor { processor_id: u8 },

    /// `[DATA_PROCESSOR, REMOVE_ALL]`.
    RemoveAllProcessors,

    /// `[EVENT, REMOVE, command_id]` - erase one command programmed against an event.
    RemoveEventCommand { command_id: u8 },

    /// `[EVENT, REMOVE_ALL]`.
    RemoveAllEventCommands,
}

impl Command {
    /// Encodes the command into its wire form.
    pub fn encode(&self) -> Result<CommandBuffer, CommandTooLong> {
        let mut buf = CommandBuffer::new();
        let mut put = |bytes: &[u8]| {
            buf.try_extend_from_slice(bytes).map_err(|_| CommandTooLong {
                needed: buf.len() + bytes.len(),
                limit: MAX_COMMAND_LEN,
            })
        };

        match self {
            Command::StopAdvertising => {
                put(&[registers::SETTINGS, registers::SETTINGS_STOP_ADVERTISING])?
            }
            Command::ReadSignal { header } => {
                put(&[header.module_id, header.register_id])?;
                if let Some(id) = header.data_id {
                    put(&[id])?;
                }
            }
            Command::CreateProcessor { source, filter_id, config } => {
                put(&[registers::DATA_PROCESSOR, registers::DATA_PROCESSOR_ADD])?;
                put(&source.to_wire())?;
                put(&[*filter_id])?;
                put(config.as_bytes())?;
            }
            Command::RemoveProcessor { processor_id } => put(&[
                registers::DATA_PROCESSOR,
                registers::DATA_PROCESSOR_REMOVE,
                *processor_id,
            ])?,
            Command::RemoveAllProcessors => {
                put(&[registers::DATA_PROCESSOR, registers::DATA_PROCESSOR_REMOVE_ALL])?
            }
            Command::RemoveEventCommand { command_id } => {
                put(&[registers::EVENT, registers::EVENT_REMOVE, *command_id])?
            }
            Command::RemoveAllEventCommands => {
                put(&[registers::EVENT, registers::EVENT_REMOVE_ALL])?
            }
        }

        Ok(buf)
    }

    /// Module the command is addressed to.
    pub fn module_id(&self) -> u8 {
        match self {
            Command::StopAdvertising => registers::SETTINGS,
            Command::ReadSignal { header } => header.module_id,
            Command::CreateProcessor { .. }
            | Command::RemoveProcessor { .. }
            | Command::RemoveAllProcessors => registers::DATA_PROCESSOR,
            Command::RemoveEventCommand { .. } | Command::RemoveAllEventCommands => {
                registers::EVENT
            }
        }
    }

    /// Whether the board answers this command with a packet of its own.
    pub fn expects_response(&self) -> bool {
        matches!(self, Command::ReadSignal { .. } | Command::CreateProcessor { .. })
    }
}
